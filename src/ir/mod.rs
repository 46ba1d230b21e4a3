//! Instruction model
//!
//! Defines the RISC-V registers, instruction tags, the mutable [`Instr`]
//! object that generators fill in, and the per-target [`InstrSet`] they draw
//! from.
//!
//! Only what the directed streams need is modeled: operand roles, immediate
//! widths, and a one-line listing. Encoding is out of scope.

pub mod format;
pub mod instr;
pub mod registry;

pub use format::*;
pub use instr::Instr;
pub use registry::{InstrDef, InstrFilter, InstrSet};
