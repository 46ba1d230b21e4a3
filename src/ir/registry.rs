//! Supported instruction table and category-filtered selection.

use super::format::{Category, Format, Group, InstrName, Xlen};
use super::instr::Instr;
use crate::config::GenConfig;
use crate::error::{GenError, GenResult};
use rand::seq::SliceRandom;
use rand::Rng;

/// Static description of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDef {
    pub name: InstrName,
    pub category: Category,
    pub group: Group,
    pub format: Format,
    /// Pseudo instructions are only created by name, never drawn at random.
    pub pseudo: bool,
}

const fn def(name: InstrName, format: Format, category: Category, group: Group) -> InstrDef {
    InstrDef {
        name,
        category,
        group,
        format,
        pseudo: false,
    }
}

use Category::*;
use Format as F;
use Group::*;
use InstrName as N;

static INSTR_TABLE: &[InstrDef] = &[
    // RV32I
    def(N::Lui, F::U, Load, Rv32i),
    def(N::Auipc, F::U, Arithmetic, Rv32i),
    def(N::Jal, F::J, Jump, Rv32i),
    def(N::Jalr, F::I, Jump, Rv32i),
    def(N::Beq, F::B, Branch, Rv32i),
    def(N::Bne, F::B, Branch, Rv32i),
    def(N::Blt, F::B, Branch, Rv32i),
    def(N::Bge, F::B, Branch, Rv32i),
    def(N::Bltu, F::B, Branch, Rv32i),
    def(N::Bgeu, F::B, Branch, Rv32i),
    def(N::Lb, F::Load, Load, Rv32i),
    def(N::Lh, F::Load, Load, Rv32i),
    def(N::Lw, F::Load, Load, Rv32i),
    def(N::Lbu, F::Load, Load, Rv32i),
    def(N::Lhu, F::Load, Load, Rv32i),
    def(N::Sb, F::S, Store, Rv32i),
    def(N::Sh, F::S, Store, Rv32i),
    def(N::Sw, F::S, Store, Rv32i),
    def(N::Addi, F::I, Arithmetic, Rv32i),
    def(N::Slti, F::I, Compare, Rv32i),
    def(N::Sltiu, F::I, Compare, Rv32i),
    def(N::Xori, F::I, Logical, Rv32i),
    def(N::Ori, F::I, Logical, Rv32i),
    def(N::Andi, F::I, Logical, Rv32i),
    def(N::Slli, F::IShift, Shift, Rv32i),
    def(N::Srli, F::IShift, Shift, Rv32i),
    def(N::Srai, F::IShift, Shift, Rv32i),
    def(N::Add, F::R, Arithmetic, Rv32i),
    def(N::Sub, F::R, Arithmetic, Rv32i),
    def(N::Sll, F::R, Shift, Rv32i),
    def(N::Slt, F::R, Compare, Rv32i),
    def(N::Sltu, F::R, Compare, Rv32i),
    def(N::Xor, F::R, Logical, Rv32i),
    def(N::Srl, F::R, Shift, Rv32i),
    def(N::Sra, F::R, Shift, Rv32i),
    def(N::Or, F::R, Logical, Rv32i),
    def(N::And, F::R, Logical, Rv32i),
    def(N::Fence, F::None, Synch, Rv32i),
    def(N::Ecall, F::None, System, Rv32i),
    def(N::Ebreak, F::None, System, Rv32i),
    // RV64I
    def(N::Addiw, F::I, Arithmetic, Rv64i),
    def(N::Slliw, F::IShiftW, Shift, Rv64i),
    def(N::Srliw, F::IShiftW, Shift, Rv64i),
    def(N::Sraiw, F::IShiftW, Shift, Rv64i),
    def(N::Addw, F::R, Arithmetic, Rv64i),
    def(N::Subw, F::R, Arithmetic, Rv64i),
    def(N::Sllw, F::R, Shift, Rv64i),
    def(N::Srlw, F::R, Shift, Rv64i),
    def(N::Sraw, F::R, Shift, Rv64i),
    def(N::Lwu, F::Load, Load, Rv64i),
    def(N::Ld, F::Load, Load, Rv64i),
    def(N::Sd, F::S, Store, Rv64i),
    // RV32M / RV64M
    def(N::Mul, F::R, Arithmetic, Rv32m),
    def(N::Mulh, F::R, Arithmetic, Rv32m),
    def(N::Mulhsu, F::R, Arithmetic, Rv32m),
    def(N::Mulhu, F::R, Arithmetic, Rv32m),
    def(N::Div, F::R, Arithmetic, Rv32m),
    def(N::Divu, F::R, Arithmetic, Rv32m),
    def(N::Rem, F::R, Arithmetic, Rv32m),
    def(N::Remu, F::R, Arithmetic, Rv32m),
    def(N::Mulw, F::R, Arithmetic, Rv64m),
    def(N::Divw, F::R, Arithmetic, Rv64m),
    def(N::Divuw, F::R, Arithmetic, Rv64m),
    def(N::Remw, F::R, Arithmetic, Rv64m),
    def(N::Remuw, F::R, Arithmetic, Rv64m),
    // RV32C / RV64C
    def(N::CAddi, F::CI, Arithmetic, Rv32c),
    def(N::CLi, F::CI, Arithmetic, Rv32c),
    def(N::CMv, F::CR, Arithmetic, Rv32c),
    def(N::CAdd, F::CR, Arithmetic, Rv32c),
    def(N::CSub, F::CA, Arithmetic, Rv32c),
    def(N::CAnd, F::CA, Logical, Rv32c),
    def(N::CJ, F::CJ, Jump, Rv32c),
    def(N::CJal, F::CJ, Jump, Rv32c),
    def(N::CAddiw, F::CI, Arithmetic, Rv64c),
    def(N::CAddw, F::CA, Arithmetic, Rv64c),
    def(N::CSubw, F::CA, Arithmetic, Rv64c),
    // RV32F / RV32D / RV64F / RV64D
    def(N::FaddS, F::FR, Arithmetic, Rv32f),
    def(N::FsubS, F::FR, Arithmetic, Rv32f),
    def(N::FmulS, F::FR, Arithmetic, Rv32f),
    def(N::FaddD, F::FR, Arithmetic, Rv32d),
    def(N::FsubD, F::FR, Arithmetic, Rv32d),
    def(N::FmulD, F::FR, Arithmetic, Rv32d),
    def(N::FcvtLS, F::FToX, Arithmetic, Rv64f),
    def(N::FcvtLD, F::FToX, Arithmetic, Rv64d),
    // Pseudo
    InstrDef {
        name: N::Li,
        category: Load,
        group: Rv32i,
        format: F::Li,
        pseudo: true,
    },
];

/// Selection criteria for [`InstrSet::get_rand_instr`].
///
/// Empty include lists accept everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrFilter {
    pub include_instr: Vec<InstrName>,
    pub include_category: Vec<Category>,
    pub exclude_category: Vec<Category>,
    pub exclude_group: Vec<Group>,
}

impl InstrFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift, arithmetic, logical and compare instructions.
    pub fn basic() -> Self {
        Self::new().include_category(&Category::BASIC)
    }

    pub fn include_instr(mut self, names: &[InstrName]) -> Self {
        self.include_instr.extend_from_slice(names);
        self
    }

    pub fn include_category(mut self, categories: &[Category]) -> Self {
        self.include_category.extend_from_slice(categories);
        self
    }

    pub fn exclude_category(mut self, categories: &[Category]) -> Self {
        self.exclude_category.extend_from_slice(categories);
        self
    }

    pub fn exclude_group(mut self, groups: &[Group]) -> Self {
        self.exclude_group.extend_from_slice(groups);
        self
    }

    pub fn matches(&self, def: &InstrDef) -> bool {
        (self.include_instr.is_empty() || self.include_instr.contains(&def.name))
            && (self.include_category.is_empty() || self.include_category.contains(&def.category))
            && !self.exclude_category.contains(&def.category)
            && !self.exclude_group.contains(&def.group)
    }
}

/// Instructions supported by one target configuration.
#[derive(Debug, Clone)]
pub struct InstrSet {
    xlen: Xlen,
    defs: Vec<&'static InstrDef>,
}

impl InstrSet {
    /// Build the supported list: RV64-only groups are dropped on RV32,
    /// `c.jal` is RV32-only, and compressed groups disappear when
    /// `disable_compressed_instr` is set.
    pub fn new(config: &GenConfig) -> Self {
        let xlen = config.xlen;
        let defs = INSTR_TABLE
            .iter()
            .filter(|d| xlen == Xlen::Rv64 || !d.group.is_rv64_only())
            .filter(|d| !(config.disable_compressed_instr && d.group.is_compressed()))
            .filter(|d| !(d.name == InstrName::CJal && xlen != Xlen::Rv32))
            .collect();
        Self { xlen, defs }
    }

    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn contains(&self, name: InstrName) -> bool {
        self.defs.iter().any(|d| d.name == name)
    }

    pub fn def(&self, name: InstrName) -> Option<&'static InstrDef> {
        self.defs.iter().copied().find(|d| d.name == name)
    }

    /// Fresh, unrandomized instruction by name.
    pub fn get_instr(&self, name: InstrName) -> GenResult<Instr> {
        self.def(name).map(Instr::new).ok_or_else(|| {
            GenError::config(format!("{} is not supported on {}", name, self.xlen))
        })
    }

    /// Non-pseudo instructions accepted by `filter`, in table order.
    pub fn candidates(&self, filter: &InstrFilter) -> Vec<&'static InstrDef> {
        self.defs
            .iter()
            .copied()
            .filter(|d| !d.pseudo && filter.matches(d))
            .collect()
    }

    /// Shift, arithmetic, logical and compare instructions of this target.
    pub fn basic_instr(&self) -> Vec<&'static InstrDef> {
        self.candidates(&InstrFilter::basic())
    }

    /// Fresh, unrandomized instruction drawn uniformly among the candidates.
    pub fn get_rand_instr<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        filter: &InstrFilter,
    ) -> GenResult<Instr> {
        self.candidates(filter)
            .choose(rng)
            .map(|d| Instr::new(d))
            .ok_or_else(|| GenError::config(format!("no instruction matches {:?}", filter)))
    }
}
