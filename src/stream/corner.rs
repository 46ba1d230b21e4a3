//! Numeric corner-value generator
//!
//! Seeds a pool of registers with boundary values (zero, one, the most
//! negative value, or a random pattern) through `li`, then runs a burst of
//! integer arithmetic that reads and writes only that pool.

use super::{DirectedStream, InstrStream, LabelPolicy};
use crate::config::GenConfig;
use crate::error::{GenError, GenResult};
use crate::ir::{Category, Group, Instr, InstrFilter, InstrName, InstrSet, Register, Xlen};
use crate::sample;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Boundary class of an initial register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerKind {
    NormalValue,
    Zero,
    AllOne,
    NegativeMax,
}

impl CornerKind {
    pub const ALL: [CornerKind; 4] = [
        CornerKind::NormalValue,
        CornerKind::Zero,
        CornerKind::AllOne,
        CornerKind::NegativeMax,
    ];

    /// Resolve to a bit pattern using [`ALL_ONE_RESOLUTION`].
    ///
    /// `normal` is the pre-drawn pattern used for `NormalValue`.
    pub fn resolve(self, xlen: Xlen, normal: u64) -> u64 {
        self.resolve_with(xlen, normal, ALL_ONE_RESOLUTION)
    }

    pub fn resolve_with(self, xlen: Xlen, normal: u64, all_one: AllOneResolution) -> u64 {
        match self {
            CornerKind::NormalValue => normal & xlen.mask(),
            CornerKind::Zero => 0,
            CornerKind::AllOne => match all_one {
                AllOneResolution::LiteralOne => 1,
                AllOneResolution::WidthMask => xlen.mask(),
            },
            CornerKind::NegativeMax => xlen.sign_bit(),
        }
    }
}

/// What `AllOne` loads into a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllOneResolution {
    /// The literal value 1.
    LiteralOne,
    /// Every bit of the register set.
    WidthMask,
}

/// `AllOne` loads the literal 1, matching the stimulus existing regressions
/// were built against.
pub const ALL_ONE_RESOLUTION: AllOneResolution = AllOneResolution::LiteralOne;

/// A classified, resolved initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerValue {
    pub kind: CornerKind,
    pub value: u64,
}

/// Distinct writable registers shared by the loads and the arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPool {
    regs: Vec<Register>,
}

impl RegisterPool {
    /// Wrap `regs`, rejecting an empty pool, duplicates, `zero`, and
    /// reserved registers.
    pub fn new(regs: Vec<Register>, reserved: &[Register]) -> GenResult<Self> {
        if regs.is_empty() {
            return Err(GenError::config("register pool is empty"));
        }
        for (i, reg) in regs.iter().enumerate() {
            if *reg == Register::Zero || reserved.contains(reg) {
                return Err(GenError::config(format!("{} cannot join the pool", reg)));
            }
            if regs[..i].contains(reg) {
                return Err(GenError::config(format!("{} appears twice in the pool", reg)));
            }
        }
        Ok(Self { regs })
    }

    /// Draw exactly `config.corner.num_of_avail_regs` registers.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, config: &GenConfig) -> GenResult<Self> {
        let wanted = config.corner.num_of_avail_regs;
        let available = config.available_regs();
        if wanted == 0 || wanted > available.len() {
            return Err(GenError::config(format!(
                "num_of_avail_regs {} must be between 1 and {} (registers left after excluding zero and {:?})",
                wanted,
                available.len(),
                config.reserved_regs
            )));
        }
        let regs = sample::sample_unique(rng, &available, wanted)?;
        Self::new(regs, &config.reserved_regs)
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    pub fn contains(&self, reg: Register) -> bool {
        self.regs.contains(&reg)
    }

    pub fn as_slice(&self) -> &[Register] {
        &self.regs
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Register {
        // never empty, see `new`
        self.regs[rng.gen_range(0..self.regs.len())]
    }
}

/// Resolved shape of one corner stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerPlan {
    pool: RegisterPool,
    values: Vec<CornerValue>,
    num_of_instr: usize,
}

impl CornerPlan {
    /// Resolve per-slot values from already drawn classifications.
    ///
    /// `NormalValue` slots draw their pattern from `rng`; the other kinds
    /// consume no randomness.
    pub fn new<R: Rng + ?Sized>(
        pool: RegisterPool,
        kinds: &[CornerKind],
        num_of_instr: usize,
        xlen: Xlen,
        rng: &mut R,
    ) -> GenResult<Self> {
        if kinds.len() != pool.len() {
            return Err(GenError::config(format!(
                "{} value classes for a pool of {} registers",
                kinds.len(),
                pool.len()
            )));
        }
        let values = kinds
            .iter()
            .map(|&kind| {
                let normal = match kind {
                    CornerKind::NormalValue => sample::draw_bits(rng, xlen.bits()),
                    _ => 0,
                };
                CornerValue {
                    kind,
                    value: kind.resolve(xlen, normal),
                }
            })
            .collect();
        Ok(Self {
            pool,
            values,
            num_of_instr,
        })
    }

    pub fn pool(&self) -> &RegisterPool {
        &self.pool
    }

    pub fn values(&self) -> &[CornerValue] {
        &self.values
    }

    pub fn num_of_instr(&self) -> usize {
        self.num_of_instr
    }
}

/// Generator of corner-value arithmetic streams.
#[derive(Debug, Clone)]
pub struct IntNumericCornerStream {
    name: String,
    label: String,
    config: GenConfig,
    instr_set: InstrSet,
}

impl IntNumericCornerStream {
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

    /// Integer arithmetic only: compressed and floating-point groups are
    /// excluded.
    pub fn arithmetic_filter() -> InstrFilter {
        InstrFilter::new()
            .include_category(&[Category::Arithmetic])
            .exclude_group(&Group::COMPRESSED)
            .exclude_group(&Group::FLOATING_POINT)
    }

    /// Draw the pool, one class per slot, and the arithmetic count.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<CornerPlan> {
        self.config.validate_registers()?;
        self.config.corner.validate()?;
        let pool = RegisterPool::draw(rng, &self.config)?;
        let kinds: Vec<CornerKind> = (0..pool.len())
            .map(|_| CornerKind::ALL[rng.gen_range(0..CornerKind::ALL.len())])
            .collect();
        let num_of_instr =
            sample::draw_count(rng, self.config.corner.num_of_instr, "number of instructions")?;
        debug!(
            stream = %self.name,
            pool = ?pool.as_slice(),
            kinds = ?kinds,
            num_of_instr,
            "planned corner stream"
        );
        CornerPlan::new(pool, &kinds, num_of_instr, self.config.xlen, rng)
    }

    /// Materialize loads then arithmetic for a resolved plan.
    pub fn build<R: Rng + ?Sized>(&self, plan: &CornerPlan, rng: &mut R) -> GenResult<InstrStream> {
        self.config.validate_registers()?;
        let mut stream = InstrStream::new(self.name.clone())
            .with_label(self.label.clone())
            .with_label_policy(LabelPolicy::Clear);

        for (reg, value) in plan.pool().as_slice().iter().zip(plan.values()) {
            let mut li = self.instr_set.get_instr(InstrName::Li)?;
            li.rd = *reg;
            li.imm = value.value as i64;
            li.imm_str = Some(format!("{:#x}", value.value));
            trace!(rd = %reg, kind = ?value.kind, imm = %format!("{:#x}", value.value), "init");
            stream.push(li);
        }

        let filter = Self::arithmetic_filter();
        for _ in 0..plan.num_of_instr() {
            let mut instr = self.instr_set.get_rand_instr(rng, &filter)?;
            instr.randomize(rng, self.config.xlen, &[], &self.config.reserved_regs)?;
            randomize_gpr(&mut instr, plan.pool(), rng);
            stream.push(instr);
        }

        stream.finalize()?;
        Ok(stream)
    }
}

/// Overwrite every general-purpose register operand with a pool member,
/// keeping each operand's role.
pub fn randomize_gpr<R: Rng + ?Sized>(instr: &mut Instr, pool: &RegisterPool, rng: &mut R) {
    for (role, _) in instr.gpr_operands() {
        instr.set_gpr(role, pool.choose(rng));
    }
}

impl DirectedStream for IntNumericCornerStream {
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
