//! Directed instruction streams
//!
//! A directed stream is a short, self-contained block of instructions built
//! to stress one processor behavior. Every generator works in two phases:
//!
//! 1. **Plan**: draw the shape (counts, permutation, register pool, value
//!    classes) from the random source.
//! 2. **Build**: materialize instructions from the resolved plan, then run the
//!    shared [`finalize`] pass.
//!
//! ```text
//! GenConfig ──► Generator::plan(rng) ──► Plan ──► Generator::build(plan, rng) ──► InstrStream
//! ```

pub mod chain;
pub mod corner;
pub mod finalize;
pub mod jal;

pub use chain::{Direction, JumpChain, JumpEdge, LabelRef};
pub use corner::{
    AllOneResolution, CornerKind, CornerPlan, CornerValue, IntNumericCornerStream, RegisterPool,
    ALL_ONE_RESOLUTION,
};
pub use finalize::finalize;
pub use jal::{JalPlan, JalStream};

use crate::error::GenResult;
use crate::ir::Instr;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the finalization pass treats `has_label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Clear every label flag except the stream's external label.
    #[default]
    Clear,
    /// Every instruction is a label target and keeps its flag.
    Retain,
}

/// An ordered, named block of instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrStream {
    pub name: String,
    /// External label stamped onto the first instruction
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default)]
    pub label_policy: LabelPolicy,
    pub instr_list: Vec<Instr>,
}

impl InstrStream {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            label_policy: LabelPolicy::default(),
            instr_list: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.instr_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instr_list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instr> {
        self.instr_list.iter()
    }

    pub fn push(&mut self, instr: Instr) {
        self.instr_list.push(instr);
    }

    /// Run the finalization pass with this stream's label policy.
    pub fn finalize(&mut self) -> GenResult<()> {
        finalize(self)
    }

    pub fn into_instrs(self) -> Vec<Instr> {
        self.instr_list
    }
}

impl fmt::Display for InstrStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instr_list {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}

/// A generator of one kind of directed stream.
pub trait DirectedStream {
    /// Stream name, used in the start/end comments
    fn name(&self) -> &str;

    /// External label for the first instruction (may be empty)
    fn label(&self) -> &str;

    /// Plan and build one stream.
    fn generate(&self, rng: &mut dyn RngCore) -> GenResult<InstrStream>;
}
