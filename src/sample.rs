//! Explicit sampling functions used in place of declarative constraints
//!
//! Every generator decision goes through one of these helpers so each kind
//! of draw can be tested on its own:
//!
//! - closed-range count draws
//! - unbiased permutations
//! - rejection filtering of excluded registers
//! - sampling without replacement for unique register sets
//! - weighted register draws
//! - width-limited bit patterns

use crate::config::CountRange;
use crate::error::{GenError, GenResult};
use crate::ir::Register;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a count uniformly from `range` (inclusive on both ends).
///
/// `what` names the quantity in the error message.
pub fn draw_count<R: Rng + ?Sized>(rng: &mut R, range: CountRange, what: &str) -> GenResult<usize> {
    range.check(what)?;
    Ok(rng.gen_range(range.min..=range.max) as usize)
}

/// Uniformly random permutation of `0..n` (Fisher-Yates).
pub fn permutation<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Keep the candidates that are neither `zero` nor listed in `excluded`.
pub fn reject_excluded(candidates: &[Register], excluded: &[Register]) -> Vec<Register> {
    candidates
        .iter()
        .copied()
        .filter(|r| *r != Register::Zero && !excluded.contains(r))
        .collect()
}

/// Draw `n` distinct elements of `candidates` in random order.
pub fn sample_unique<T: Copy, R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[T],
    n: usize,
) -> GenResult<Vec<T>> {
    if n > candidates.len() {
        return Err(GenError::config(format!(
            "cannot draw {} unique values from {} candidates",
            n,
            candidates.len()
        )));
    }
    let mut pool = candidates.to_vec();
    let (chosen, _) = pool.partial_shuffle(rng, n);
    Ok(chosen.to_vec())
}

/// Draw one register according to relative `weights`.
pub fn weighted_register<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &[(Register, f64)],
) -> GenResult<Register> {
    let dist = WeightedIndex::new(weights.iter().map(|(_, w)| *w))
        .map_err(|e| GenError::config(format!("invalid register weights: {}", e)))?;
    Ok(weights[dist.sample(rng)].0)
}

/// Uniform value in `[0, 2^bits)`; `bits` may be 64.
pub fn draw_bits<R: Rng + ?Sized>(rng: &mut R, bits: u32) -> u64 {
    let raw: u64 = rng.gen();
    if bits >= 64 {
        raw
    } else {
        raw & ((1u64 << bits) - 1)
    }
}

/// Interpret the low `bits` of `raw` as a two's complement value.
pub fn sign_extend(raw: u64, bits: u32) -> i64 {
    if bits == 0 || bits >= 64 {
        return raw as i64;
    }
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}
