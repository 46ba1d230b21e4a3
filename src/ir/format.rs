//! RISC-V register file, instruction names and classification tags
//!
//! The tables here cover the subset of RV32/RV64 I, M, C, F and D that the
//! directed streams draw from.
//!
//! # Operand formats
//!
//! ```text
//! R       rd, rs1, rs2          add  a0, a1, a2
//! I       rd, rs1, imm12        addi a0, a1, -4
//! IShift  rd, rs1, shamt        slli a0, a1, 3
//! U       rd, imm20             lui  a0, 0x12345
//! J       rd, offset21          jal  ra, 3f
//! B       rs1, rs2, offset13    beq  a0, a1, 1b
//! S       rs2, imm12(rs1)       sw   a0, 8(sp)
//! Load    rd, imm12(rs1)        lw   a0, 8(sp)
//! CI      rd, imm6              c.addi a0, 3
//! CR      rd, rs2               c.add a0, a1
//! CA      rd', rs2'             c.sub s0, a1
//! CJ      offset12              c.j  2b
//! FR      fd, fs1, fs2          fadd.s f1, f2, f3
//! FToX    rd, fs1               fcvt.l.s a0, f2
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Architectural general-purpose register, named by its ABI alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Register {
    Zero = 0,
    Ra = 1,
    Sp = 2,
    Gp = 3,
    Tp = 4,
    T0 = 5,
    T1 = 6,
    T2 = 7,
    S0 = 8,
    S1 = 9,
    A0 = 10,
    A1 = 11,
    A2 = 12,
    A3 = 13,
    A4 = 14,
    A5 = 15,
    A6 = 16,
    A7 = 17,
    S2 = 18,
    S3 = 19,
    S4 = 20,
    S5 = 21,
    S6 = 22,
    S7 = 23,
    S8 = 24,
    S9 = 25,
    S10 = 26,
    S11 = 27,
    T3 = 28,
    T4 = 29,
    T5 = 30,
    T6 = 31,
}

impl Register {
    /// All 32 registers in index order.
    pub const ALL: [Register; 32] = [
        Register::Zero,
        Register::Ra,
        Register::Sp,
        Register::Gp,
        Register::Tp,
        Register::T0,
        Register::T1,
        Register::T2,
        Register::S0,
        Register::S1,
        Register::A0,
        Register::A1,
        Register::A2,
        Register::A3,
        Register::A4,
        Register::A5,
        Register::A6,
        Register::A7,
        Register::S2,
        Register::S3,
        Register::S4,
        Register::S5,
        Register::S6,
        Register::S7,
        Register::S8,
        Register::S9,
        Register::S10,
        Register::S11,
        Register::T3,
        Register::T4,
        Register::T5,
        Register::T6,
    ];

    /// Convert from a register index, returning None above x31
    pub fn from_u8(val: u8) -> Option<Self> {
        Self::ALL.get(val as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inclusive index range `[from, to]`, e.g. `T2..=T6`.
    pub fn range(from: Register, to: Register) -> impl Iterator<Item = Register> {
        (from.index()..=to.index()).filter_map(Register::from_u8)
    }

    /// Whether the register is addressable by the 3-bit fields of compressed
    /// formats (x8..x15).
    pub fn is_compressible(self) -> bool {
        (8..=15).contains(&(self as u8))
    }

    pub fn abi_name(self) -> &'static str {
        match self {
            Register::Zero => "zero",
            Register::Ra => "ra",
            Register::Sp => "sp",
            Register::Gp => "gp",
            Register::Tp => "tp",
            Register::T0 => "t0",
            Register::T1 => "t1",
            Register::T2 => "t2",
            Register::S0 => "s0",
            Register::S1 => "s1",
            Register::A0 => "a0",
            Register::A1 => "a1",
            Register::A2 => "a2",
            Register::A3 => "a3",
            Register::A4 => "a4",
            Register::A5 => "a5",
            Register::A6 => "a6",
            Register::A7 => "a7",
            Register::S2 => "s2",
            Register::S3 => "s3",
            Register::S4 => "s4",
            Register::S5 => "s5",
            Register::S6 => "s6",
            Register::S7 => "s7",
            Register::S8 => "s8",
            Register::S9 => "s9",
            Register::S10 => "s10",
            Register::S11 => "s11",
            Register::T3 => "t3",
            Register::T4 => "t4",
            Register::T5 => "t5",
            Register::T6 => "t6",
        }
    }

    /// Parse an ABI name (`a0`) or architectural name (`x10`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(num) = s.strip_prefix('x') {
            if let Ok(idx) = num.parse::<u8>() {
                return Self::from_u8(idx);
            }
        }
        if s == "fp" {
            return Some(Register::S0);
        }
        Self::ALL.iter().copied().find(|r| r.abi_name() == s)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abi_name())
    }
}

/// Architectural register width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Xlen {
    #[default]
    Rv32,
    Rv64,
}

impl Xlen {
    pub fn bits(self) -> u32 {
        match self {
            Xlen::Rv32 => 32,
            Xlen::Rv64 => 64,
        }
    }

    /// Mask covering every bit of a register.
    pub fn mask(self) -> u64 {
        match self {
            Xlen::Rv32 => 0xFFFF_FFFF,
            Xlen::Rv64 => u64::MAX,
        }
    }

    /// Value with only the sign bit set.
    pub fn sign_bit(self) -> u64 {
        1u64 << (self.bits() - 1)
    }
}

impl TryFrom<u32> for Xlen {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(Xlen::Rv32),
            64 => Ok(Xlen::Rv64),
            other => Err(format!("unsupported xlen {}, expected 32 or 64", other)),
        }
    }
}

impl From<Xlen> for u32 {
    fn from(xlen: Xlen) -> u32 {
        xlen.bits()
    }
}

impl fmt::Display for Xlen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rv{}", self.bits())
    }
}

/// Functional category of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Load,
    Store,
    Shift,
    Arithmetic,
    Logical,
    Compare,
    Branch,
    Jump,
    Synch,
    System,
}

impl Category {
    /// Categories of the "basic" instruction set: no control transfer, no
    /// memory access.
    pub const BASIC: [Category; 4] = [
        Category::Shift,
        Category::Arithmetic,
        Category::Logical,
        Category::Compare,
    ];
}

/// ISA extension group an instruction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Group {
    Rv32i,
    Rv64i,
    Rv32m,
    Rv64m,
    Rv32c,
    Rv64c,
    Rv32f,
    Rv64f,
    Rv32d,
    Rv64d,
}

impl Group {
    /// Compressed-encoding groups.
    pub const COMPRESSED: [Group; 2] = [Group::Rv32c, Group::Rv64c];

    /// Groups whose instructions carry floating-point operands.
    pub const FLOATING_POINT: [Group; 4] = [Group::Rv32f, Group::Rv64f, Group::Rv32d, Group::Rv64d];

    pub fn is_compressed(self) -> bool {
        Self::COMPRESSED.contains(&self)
    }

    pub fn is_floating_point(self) -> bool {
        Self::FLOATING_POINT.contains(&self)
    }

    /// Groups only present on RV64 targets.
    pub fn is_rv64_only(self) -> bool {
        matches!(
            self,
            Group::Rv64i | Group::Rv64m | Group::Rv64c | Group::Rv64f | Group::Rv64d
        )
    }
}

/// Operand layout of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    R,
    I,
    IShift,
    IShiftW,
    U,
    J,
    B,
    S,
    Load,
    /// `rd` doubles as first source; immediate is 6-bit signed.
    CI,
    /// `rd` doubles as first source.
    CR,
    /// Like CR, restricted to x8..x15.
    CA,
    CJ,
    FR,
    FToX,
    /// Load-immediate pseudo instruction: `rd` plus a full-width literal.
    Li,
    None,
}

/// Role a general-purpose register plays within an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    Rd,
    Rs1,
    Rs2,
}

impl OperandRole {
    pub fn is_destination(self) -> bool {
        matches!(self, OperandRole::Rd)
    }
}

/// Width and signedness of an immediate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImmSpec {
    pub bits: u32,
    pub signed: bool,
    /// Offset immediates are always even.
    pub even: bool,
}

impl Format {
    pub fn has_rd(self) -> bool {
        matches!(
            self,
            Format::R
                | Format::I
                | Format::IShift
                | Format::IShiftW
                | Format::U
                | Format::J
                | Format::Load
                | Format::CI
                | Format::CR
                | Format::CA
                | Format::FToX
                | Format::Li
        )
    }

    pub fn has_rs1(self) -> bool {
        matches!(
            self,
            Format::R
                | Format::I
                | Format::IShift
                | Format::IShiftW
                | Format::B
                | Format::S
                | Format::Load
        )
    }

    pub fn has_rs2(self) -> bool {
        matches!(
            self,
            Format::R | Format::B | Format::S | Format::CR | Format::CA
        )
    }

    pub fn has_imm(self) -> bool {
        self.imm_spec(Xlen::Rv32).is_some()
    }

    /// Formats whose register fields name floating-point registers.
    pub fn is_floating_point(self) -> bool {
        matches!(self, Format::FR)
    }

    /// General-purpose register roles carried by this format.
    pub fn gpr_roles(self) -> Vec<OperandRole> {
        if self.is_floating_point() {
            return Vec::new();
        }
        let mut roles = Vec::with_capacity(3);
        if self.has_rd() {
            roles.push(OperandRole::Rd);
        }
        if self.has_rs1() {
            roles.push(OperandRole::Rs1);
        }
        if self.has_rs2() {
            roles.push(OperandRole::Rs2);
        }
        roles
    }

    pub fn imm_spec(self, xlen: Xlen) -> Option<ImmSpec> {
        let spec = |bits, signed, even| Some(ImmSpec { bits, signed, even });
        match self {
            Format::I | Format::S | Format::Load => spec(12, true, false),
            Format::IShift => spec(xlen.bits().trailing_zeros(), false, false),
            Format::IShiftW => spec(5, false, false),
            Format::U => spec(20, false, false),
            Format::J => spec(21, true, true),
            Format::B => spec(13, true, true),
            Format::CI => spec(6, true, false),
            Format::CJ => spec(12, true, true),
            Format::Li => spec(xlen.bits(), false, false),
            Format::R | Format::CR | Format::CA | Format::FR | Format::FToX | Format::None => {
                None
            }
        }
    }
}

macro_rules! instr_names {
    ($($variant:ident => $mnemonic:literal),* $(,)?) => {
        /// Instruction mnemonic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum InstrName {
            $($variant,)*
        }

        impl InstrName {
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(InstrName::$variant => $mnemonic,)*
                }
            }
        }
    };
}

instr_names! {
    // RV32I
    Lui => "lui",
    Auipc => "auipc",
    Jal => "jal",
    Jalr => "jalr",
    Beq => "beq",
    Bne => "bne",
    Blt => "blt",
    Bge => "bge",
    Bltu => "bltu",
    Bgeu => "bgeu",
    Lb => "lb",
    Lh => "lh",
    Lw => "lw",
    Lbu => "lbu",
    Lhu => "lhu",
    Sb => "sb",
    Sh => "sh",
    Sw => "sw",
    Addi => "addi",
    Slti => "slti",
    Sltiu => "sltiu",
    Xori => "xori",
    Ori => "ori",
    Andi => "andi",
    Slli => "slli",
    Srli => "srli",
    Srai => "srai",
    Add => "add",
    Sub => "sub",
    Sll => "sll",
    Slt => "slt",
    Sltu => "sltu",
    Xor => "xor",
    Srl => "srl",
    Sra => "sra",
    Or => "or",
    And => "and",
    Fence => "fence",
    Ecall => "ecall",
    Ebreak => "ebreak",
    // RV64I
    Addiw => "addiw",
    Slliw => "slliw",
    Srliw => "srliw",
    Sraiw => "sraiw",
    Addw => "addw",
    Subw => "subw",
    Sllw => "sllw",
    Srlw => "srlw",
    Sraw => "sraw",
    Lwu => "lwu",
    Ld => "ld",
    Sd => "sd",
    // RV32M / RV64M
    Mul => "mul",
    Mulh => "mulh",
    Mulhsu => "mulhsu",
    Mulhu => "mulhu",
    Div => "div",
    Divu => "divu",
    Rem => "rem",
    Remu => "remu",
    Mulw => "mulw",
    Divw => "divw",
    Divuw => "divuw",
    Remw => "remw",
    Remuw => "remuw",
    // RV32C / RV64C
    CAddi => "c.addi",
    CLi => "c.li",
    CMv => "c.mv",
    CAdd => "c.add",
    CSub => "c.sub",
    CAnd => "c.and",
    CJ => "c.j",
    CJal => "c.jal",
    CAddiw => "c.addiw",
    CAddw => "c.addw",
    CSubw => "c.subw",
    // RV32F / RV64F / RV32D / RV64D
    FaddS => "fadd.s",
    FsubS => "fsub.s",
    FmulS => "fmul.s",
    FaddD => "fadd.d",
    FsubD => "fsub.d",
    FmulD => "fmul.d",
    FcvtLS => "fcvt.l.s",
    FcvtLD => "fcvt.l.d",
    // Pseudo
    Li => "li",
}

impl fmt::Display for InstrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_roundtrip_index() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index() as usize, i);
            assert_eq!(Register::from_u8(i as u8), Some(*reg));
        }
        assert_eq!(Register::from_u8(32), None);
    }

    #[test]
    fn test_register_parse() {
        assert_eq!(Register::parse("a0"), Some(Register::A0));
        assert_eq!(Register::parse("x10"), Some(Register::A0));
        assert_eq!(Register::parse("fp"), Some(Register::S0));
        assert_eq!(Register::parse("ZERO"), Some(Register::Zero));
        assert_eq!(Register::parse("x32"), None);
        assert_eq!(Register::parse("q1"), None);
    }

    #[test]
    fn test_register_range() {
        let regs: Vec<_> = Register::range(Register::Sp, Register::T0).collect();
        assert_eq!(
            regs,
            vec![Register::Sp, Register::Gp, Register::Tp, Register::T0]
        );
        assert_eq!(Register::range(Register::T2, Register::T6).count(), 25);
    }

    #[test]
    fn test_compressible() {
        assert!(Register::S0.is_compressible());
        assert!(Register::A5.is_compressible());
        assert!(!Register::A6.is_compressible());
        assert!(!Register::Ra.is_compressible());
    }

    #[test]
    fn test_xlen() {
        assert_eq!(Xlen::Rv32.sign_bit(), 0x8000_0000);
        assert_eq!(Xlen::Rv64.sign_bit(), 0x8000_0000_0000_0000);
        assert_eq!(Xlen::try_from(64), Ok(Xlen::Rv64));
        assert!(Xlen::try_from(128).is_err());
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(InstrName::CJal.mnemonic(), "c.jal");
        assert_eq!(InstrName::FcvtLS.mnemonic(), "fcvt.l.s");
        assert_eq!(InstrName::Jal.to_string(), "jal");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&InstrName::CJal).unwrap();
        assert_eq!(json, "\"C_JAL\"");
        let json = serde_json::to_string(&Group::Rv32c).unwrap();
        assert_eq!(json, "\"RV32C\"");
        let reg: Register = serde_json::from_str("\"s10\"").unwrap();
        assert_eq!(reg, Register::S10);
    }

    #[test]
    fn test_gpr_roles() {
        assert_eq!(
            Format::R.gpr_roles(),
            vec![OperandRole::Rd, OperandRole::Rs1, OperandRole::Rs2]
        );
        assert_eq!(Format::U.gpr_roles(), vec![OperandRole::Rd]);
        assert!(Format::FR.gpr_roles().is_empty());
        assert_eq!(Format::FToX.gpr_roles(), vec![OperandRole::Rd]);
        assert!(Format::CJ.gpr_roles().is_empty());
    }

    #[test]
    fn test_shift_width_follows_xlen() {
        assert_eq!(Format::IShift.imm_spec(Xlen::Rv32).unwrap().bits, 5);
        assert_eq!(Format::IShift.imm_spec(Xlen::Rv64).unwrap().bits, 6);
        assert_eq!(Format::IShiftW.imm_spec(Xlen::Rv64).unwrap().bits, 5);
    }
}
