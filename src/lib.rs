//! rvstim - directed RISC-V instruction stream generation
//!
//! Builds short, self-contained instruction blocks that stress one processor
//! behavior each, for use inside a larger random test program.
//!
//! # Streams
//!
//! - **Jump chain** ([`JalStream`]): `K` unconditional jumps threaded into a
//!   single path through every jump, visited in a random order, ending on a
//!   sentinel instruction.
//! - **Numeric corners** ([`IntNumericCornerStream`]): a register pool loaded
//!   with boundary values, then integer arithmetic confined to that pool.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rvstim::{DirectedStream, GenConfig, JalStream};
//!
//! let config = GenConfig::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let stream = JalStream::new("jal_0", &config).generate(&mut rng).unwrap();
//!
//! // start + K bodies + sentinel
//! assert!(stream.len() >= 12);
//! print!("{}", stream);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐
//! │  GenConfig   │────►│  InstrSet (ir)    │  filtered instruction table
//! └──────┬───────┘     └─────────┬─────────┘
//!        │                       │
//!        ▼                       ▼
//! ┌──────────────────────────────────────────┐
//! │  stream::{JalStream, IntNumericCorner..} │  plan ─► build
//! └──────────────────┬───────────────────────┘
//!                    ▼
//!             stream::finalize   labels, atomic, Start/End comments
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod ir;
pub mod sample;
pub mod stream;

pub use config::{ConfigError, CornerConfig, CountRange, GenConfig, JalConfig};
pub use error::{ErrorKind, GenError, GenResult};
pub use ir::{Category, Format, Group, Instr, InstrName, InstrSet, Register, Xlen};
pub use stream::{
    DirectedStream, InstrStream, IntNumericCornerStream, JalStream, JumpChain, LabelPolicy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
