//! Jump-chain generator tests
//!
//! Checks block shape, label layout and single-path coverage of generated
//! jump chains across seeds, widths and range settings.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rvstim::ir::{Category, InstrName, Register};
use rvstim::stream::{JalPlan, LabelRef};
use rvstim::config::MAX_COUNT;
use rvstim::{CountRange, DirectedStream, ErrorKind, GenConfig, JalStream, JumpChain, Xlen};

fn generate(config: &GenConfig, seed: u64) -> rvstim::InstrStream {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    JalStream::new("riscv_jal_instr_0", config)
        .generate(&mut rng)
        .unwrap()
}

// ============================================================================
// Fixed scenarios
// ============================================================================

#[test]
fn test_three_node_chain_layout() {
    let config = GenConfig::default();
    let plan = JalPlan::from_order(vec![2, 0, 1]).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let stream = JalStream::new("riscv_jal_instr_0", &config)
        .build(&plan, &mut rng)
        .unwrap();

    assert_eq!(stream.len(), 5);
    let start = &stream.instr_list[0];
    assert_eq!(start.name, InstrName::Jal);
    assert_eq!(start.rd, config.ra);
    assert_eq!(start.imm_str.as_deref(), Some("2f"));

    let expected = [("0", "1f"), ("1", "3f"), ("2", "0b")];
    for (instr, (label, target)) in stream.instr_list[1..4].iter().zip(expected) {
        assert_eq!(instr.label, label);
        assert_eq!(instr.imm_str.as_deref(), Some(target));
    }
    assert_eq!(stream.instr_list[4].label, "3");

    let chain = JumpChain::from_stream(&stream).unwrap();
    assert_eq!(chain.path(), vec![2, 0, 1, 3]);
    chain.validate().unwrap();
}

#[test]
fn test_single_node_chain() {
    let mut config = GenConfig::default();
    config.jal.num_of_jump_instr = CountRange::new(1, 1);
    let stream = generate(&config, 3);

    assert_eq!(stream.len(), 3);
    assert_eq!(stream.instr_list[0].imm_str.as_deref(), Some("0f"));
    assert_eq!(stream.instr_list[1].imm_str.as_deref(), Some("1f"));
    JumpChain::from_stream(&stream).unwrap().validate().unwrap();
}

#[test]
fn test_exact_count() {
    let mut config = GenConfig::default();
    config.jal.num_of_jump_instr = CountRange::new(17, 17);
    for seed in 0..5 {
        assert_eq!(generate(&config, seed).len(), 19);
    }
}

#[test]
fn test_listing_marks_every_label() {
    let mut config = GenConfig::default();
    config.jal.num_of_jump_instr = CountRange::new(4, 4);
    let listing = generate(&config, 9).to_string();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 6);
    for (i, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("{}:", i)), "{}", line);
    }
    assert!(lines[0].contains("# Start riscv_jal_instr_0"));
    assert!(lines[5].contains("# End riscv_jal_instr_0"));
}

#[test]
fn test_reserved_ra_is_never_a_body_destination() {
    let config = GenConfig {
        reserved_regs: vec![Register::Sp, Register::Tp, Register::T1],
        ..GenConfig::default()
    };
    for seed in 0..20 {
        let stream = generate(&config, seed);
        let k = stream.len() - 2;
        for instr in &stream.instr_list[1..=k] {
            if instr.has_rd() {
                assert!(!config.reserved_regs.contains(&instr.rd));
            }
        }
    }
}

#[test]
fn test_unwritable_ra_is_rejected() {
    for ra in [Register::Sp, Register::Zero] {
        let config = GenConfig {
            ra,
            ..GenConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let err = JalStream::new("riscv_jal_instr_0", &config)
            .generate(&mut rng)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn test_jump_count_above_limit_is_rejected() {
    let mut config = GenConfig::default();
    config.jal.num_of_jump_instr = CountRange::new(1, MAX_COUNT + 1);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    assert!(JalStream::new("riscv_jal_instr_0", &config)
        .generate(&mut rng)
        .is_err());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_chain_is_single_path(seed in any::<u64>(), min in 1u32..12, extra in 0u32..12, rv64 in any::<bool>()) {
        let mut config = GenConfig {
            xlen: if rv64 { Xlen::Rv64 } else { Xlen::Rv32 },
            ..GenConfig::default()
        };
        config.jal.num_of_jump_instr = CountRange::new(min, min + extra);
        let stream = generate(&config, seed);

        let k = stream.len() - 2;
        prop_assert!(config.jal.num_of_jump_instr.contains(k));
        prop_assert!(stream.iter().all(|i| i.has_label && i.atomic));
        prop_assert!(Category::BASIC.contains(&stream.instr_list[k + 1].category));

        let chain = JumpChain::from_stream(&stream).unwrap();
        prop_assert!(chain.validate().is_ok());
        prop_assert_eq!(chain.path().len(), k + 1);
    }

    #[test]
    fn prop_references_point_the_right_way(seed in any::<u64>()) {
        let stream = generate(&GenConfig::default(), seed);
        let k = stream.len() - 2;
        for (pos, instr) in stream.instr_list[..=k].iter().enumerate() {
            let target = LabelRef::parse(instr.imm_str.as_deref().unwrap_or_default()).unwrap();
            // body at program position pos is node pos - 1
            let own = pos.checked_sub(1);
            match own {
                Some(node) => prop_assert_eq!(target, LabelRef::between(node, target.index)),
                None => prop_assert_eq!(target, LabelRef::forward(target.index)),
            }
        }
    }
}
