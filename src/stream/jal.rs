//! Jump-chain generator
//!
//! Builds a block of `K` unconditional jumps whose targets thread one path
//! through every jump in a random order before landing on a sentinel:
//!
//! ```text
//!         jal  ra, 2f        # start: enter the chain at node order[0]
//! 0:      jal  t4, 1f
//! 1:      c.j  3f            # last node in order -> sentinel
//! 2:      jal  ra, 0b
//! 3:      addi a3, s1, 12    # sentinel
//! ```
//!
//! Bodies stay in creation order in the program; only their targets follow
//! the permutation, so both forward and backward jumps occur.

use super::chain::LabelRef;
use super::{DirectedStream, InstrStream, LabelPolicy};
use crate::config::GenConfig;
use crate::error::{GenError, GenResult};
use crate::ir::{InstrFilter, InstrName, InstrSet, Register};
use crate::sample;
use rand::{Rng, RngCore};
use tracing::{debug, trace};

/// Jump instructions a chain node may use, before target filtering.
const JUMP_INSTRS: [InstrName; 3] = [InstrName::Jal, InstrName::CJ, InstrName::CJal];

/// Resolved shape of one chain: `order[p]` is the body visited at step `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JalPlan {
    order: Vec<usize>,
}

impl JalPlan {
    /// Accept `order` only if it is a permutation of `0..order.len()` with
    /// at least one element.
    pub fn from_order(order: Vec<usize>) -> GenResult<Self> {
        if order.is_empty() {
            return Err(GenError::config("jump chain needs at least one node"));
        }
        let mut seen = vec![false; order.len()];
        for &node in &order {
            if node >= order.len() || seen[node] {
                return Err(GenError::config(format!(
                    "{:?} is not a permutation of 0..{}",
                    order,
                    order.len()
                )));
            }
            seen[node] = true;
        }
        Ok(Self { order })
    }

    pub fn num_of_jump_instr(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Node reached after body `order[p]`; the sentinel `K` after the last.
    pub fn successor(&self, p: usize) -> usize {
        self.order
            .get(p + 1)
            .copied()
            .unwrap_or(self.num_of_jump_instr())
    }
}

/// Destination weights for chain jumps: `ra` 5, `t1` 2, `sp..=t0` sharing 1,
/// `t2..=t6` sharing 2. Reserved registers and `zero` are dropped.
pub fn jump_rd_weights(reserved: &[Register]) -> Vec<(Register, f64)> {
    let mut weights = vec![(Register::Ra, 5.0), (Register::T1, 2.0)];
    let low: Vec<Register> = Register::range(Register::Sp, Register::T0).collect();
    let high: Vec<Register> = Register::range(Register::T2, Register::T6).collect();
    weights.extend(low.iter().map(|r| (*r, 1.0 / low.len() as f64)));
    weights.extend(high.iter().map(|r| (*r, 2.0 / high.len() as f64)));
    weights.retain(|(r, _)| *r != Register::Zero && !reserved.contains(r));
    weights
}

/// Generator of single-path jump chains.
#[derive(Debug, Clone)]
pub struct JalStream {
    name: String,
    label: String,
    config: GenConfig,
    instr_set: InstrSet,
}

impl JalStream {
    pub fn new(name: impl Into<String>, config: &GenConfig) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            config: config.clone(),
            instr_set: InstrSet::new(config),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// `jal`, plus `c.j` unless compressed instructions are disabled, plus
    /// `c.jal` on RV32 only.
    pub fn jump_filter(&self) -> InstrFilter {
        InstrFilter::new().include_instr(&JUMP_INSTRS)
    }

    /// Draw `K` and the visiting order.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<JalPlan> {
        self.config.validate_registers()?;
        self.config.jal.validate()?;
        let range = self.config.jal.num_of_jump_instr;
        let k = sample::draw_count(rng, range, "number of jump instructions")?;
        let plan = JalPlan::from_order(sample::permutation(rng, k))?;
        debug!(stream = %self.name, num_of_jump_instr = k, order = ?plan.order, "planned jump chain");
        Ok(plan)
    }

    /// Materialize the block for a resolved plan.
    pub fn build<R: Rng + ?Sized>(&self, plan: &JalPlan, rng: &mut R) -> GenResult<InstrStream> {
        self.config.validate_registers()?;
        let xlen = self.config.xlen;
        let reserved = &self.config.reserved_regs;
        let k = plan.num_of_jump_instr();
        let order = plan.order();
        let rd_weights = jump_rd_weights(reserved);

        let mut jump_start = self.instr_set.get_instr(InstrName::Jal)?;
        jump_start.randomize(rng, xlen, &[], reserved)?;
        jump_start.rd = self.config.ra;
        jump_start.imm_str = Some(LabelRef::forward(order[0]).to_string());
        jump_start.label = self.label.clone();

        let mut jump_end = self.instr_set.get_rand_instr(rng, &InstrFilter::basic())?;
        jump_end.randomize(rng, xlen, &[], reserved)?;
        jump_end.label = k.to_string();

        let filter = self.jump_filter();
        let mut jumps = Vec::with_capacity(k);
        for i in 0..k {
            let mut jump = self.instr_set.get_rand_instr(rng, &filter)?;
            jump.randomize(rng, xlen, &[], reserved)?;
            if jump.has_rd() {
                jump.rd = sample::weighted_register(rng, &rd_weights)?;
            }
            jump.label = i.to_string();
            jumps.push(jump);
        }

        for (p, &node) in order.iter().enumerate() {
            let target = plan.successor(p);
            let target_ref = LabelRef::between(node, target);
            trace!(node, target = %target_ref, "chain edge");
            jumps[node].imm_str = Some(target_ref.to_string());
        }

        let mut stream = InstrStream::new(self.name.clone())
            .with_label(self.label.clone())
            .with_label_policy(LabelPolicy::Retain);
        stream.push(jump_start);
        stream.instr_list.extend(jumps);
        stream.push(jump_end);
        stream.finalize()?;
        Ok(stream)
    }
}

impl DirectedStream for JalStream {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn generate(&self, rng: &mut dyn RngCore) -> GenResult<InstrStream> {
        let plan = self.plan(rng)?;
        self.build(&plan, rng)
    }
}
