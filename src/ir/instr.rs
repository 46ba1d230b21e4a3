//! Mutable instruction object shared by every stream generator.

use super::format::{Category, Format, Group, InstrName, OperandRole, Register, Xlen};
use super::registry::InstrDef;
use crate::error::{GenError, GenResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single instruction of a generated stream.
///
/// For floating-point formats the register fields hold FPR indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instr {
    pub name: InstrName,
    pub category: Category,
    pub group: Group,
    pub format: Format,
    pub rd: Register,
    pub rs1: Register,
    pub rs2: Register,
    /// Literal immediate, as drawn by [`Instr::randomize`].
    pub imm: i64,
    /// Textual immediate overriding `imm`: a literal (`0x80000000`) or a
    /// label reference (`3f`, `0b`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imm_str: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub has_label: bool,
    #[serde(default)]
    pub atomic: bool,
    #[serde(default)]
    pub comment: String,
}

impl Instr {
    /// Create an unrandomized instruction: every register `zero`, immediate 0.
    pub fn new(def: &InstrDef) -> Self {
        Self {
            name: def.name,
            category: def.category,
            group: def.group,
            format: def.format,
            rd: Register::Zero,
            rs1: Register::Zero,
            rs2: Register::Zero,
            imm: 0,
            imm_str: None,
            label: String::new(),
            has_label: false,
            atomic: false,
            comment: String::new(),
        }
    }

    pub fn has_rd(&self) -> bool {
        self.format.has_rd()
    }

    pub fn has_imm(&self) -> bool {
        self.format.has_imm()
    }

    /// Randomize registers and immediate.
    ///
    /// Registers are drawn from `avail_regs` (every register when empty);
    /// the destination additionally avoids `zero` and `reserved`.
    /// Compressed formats narrow both sets to their encodable registers.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        xlen: Xlen,
        avail_regs: &[Register],
        reserved: &[Register],
    ) -> GenResult<()> {
        let pool: &[Register] = if avail_regs.is_empty() {
            &Register::ALL
        } else {
            avail_regs
        };
        let compressed_only = self.format == Format::CA;

        if self.format.is_floating_point() {
            self.rd = random_fpr(rng);
            self.rs1 = random_fpr(rng);
            self.rs2 = random_fpr(rng);
        } else {
            for role in self.format.gpr_roles() {
                let candidates: Vec<Register> = pool
                    .iter()
                    .copied()
                    .filter(|r| !compressed_only || r.is_compressible())
                    .filter(|r| {
                        if role.is_destination() {
                            *r != Register::Zero && !reserved.contains(r)
                        } else {
                            // c.mv / c.add forbid x0 as the source too
                            self.format != Format::CR || *r != Register::Zero
                        }
                    })
                    .collect();
                let reg = candidates.choose(rng).copied().ok_or_else(|| {
                    GenError::config(format!(
                        "no register available for {:?} of {}",
                        role, self.name
                    ))
                })?;
                self.set_gpr(role, reg);
            }
            if self.format == Format::FToX {
                self.rs1 = random_fpr(rng);
            }
        }

        if let Some(spec) = self.format.imm_spec(xlen) {
            let raw = crate::sample::draw_bits(rng, spec.bits);
            let mut imm = if spec.signed {
                crate::sample::sign_extend(raw, spec.bits)
            } else {
                raw as i64
            };
            if spec.even {
                imm &= !1;
            }
            self.imm = imm;
        }
        Ok(())
    }

    /// General-purpose register operands with their roles.
    pub fn gpr_operands(&self) -> Vec<(OperandRole, Register)> {
        self.format
            .gpr_roles()
            .into_iter()
            .map(|role| (role, self.gpr(role)))
            .collect()
    }

    pub fn gpr(&self, role: OperandRole) -> Register {
        match role {
            OperandRole::Rd => self.rd,
            OperandRole::Rs1 => self.rs1,
            OperandRole::Rs2 => self.rs2,
        }
    }

    pub fn set_gpr(&mut self, role: OperandRole, reg: Register) {
        match role {
            OperandRole::Rd => self.rd = reg,
            OperandRole::Rs1 => self.rs1 = reg,
            OperandRole::Rs2 => self.rs2 = reg,
        }
    }

    /// Immediate as it appears in the listing.
    pub fn imm_text(&self) -> String {
        match &self.imm_str {
            Some(s) => s.clone(),
            None if self.format == Format::Li || self.format == Format::U => {
                format!("{:#x}", self.imm)
            }
            None => self.imm.to_string(),
        }
    }

    fn operands(&self) -> String {
        let fpr = |r: Register| format!("f{}", r.index());
        match self.format {
            Format::R => format!("{}, {}, {}", self.rd, self.rs1, self.rs2),
            Format::I | Format::IShift | Format::IShiftW => {
                format!("{}, {}, {}", self.rd, self.rs1, self.imm_text())
            }
            Format::U | Format::J | Format::CI | Format::Li => {
                format!("{}, {}", self.rd, self.imm_text())
            }
            Format::B => format!("{}, {}, {}", self.rs1, self.rs2, self.imm_text()),
            Format::S => format!("{}, {}({})", self.rs2, self.imm_text(), self.rs1),
            Format::Load => format!("{}, {}({})", self.rd, self.imm_text(), self.rs1),
            Format::CR | Format::CA => format!("{}, {}", self.rd, self.rs2),
            Format::CJ => self.imm_text(),
            Format::FR => format!("{}, {}, {}", fpr(self.rd), fpr(self.rs1), fpr(self.rs2)),
            Format::FToX => format!("{}, {}", self.rd, fpr(self.rs1)),
            Format::None => String::new(),
        }
    }
}

fn random_fpr<R: Rng + ?Sized>(rng: &mut R) -> Register {
    Register::ALL[rng.gen_range(0..Register::ALL.len())]
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.has_label && !self.label.is_empty() {
            format!("{}:", self.label)
        } else {
            String::new()
        };
        let body = format!("{} {}", self.name.mnemonic(), self.operands());
        let body = body.trim_end();
        if self.comment.is_empty() {
            write!(f, "{:<8}{}", prefix, body)
        } else {
            write!(f, "{:<8}{:<32}# {}", prefix, body, self.comment)
        }
    }
}
