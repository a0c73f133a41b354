//! Random expression programs for procedural art.
//!
//! The pipeline: a [`Catalog`] names the operators and input kinds a style
//! allows; [`synthesize`] grows a random expression [`Tree`] from a seeded
//! [`RngStream`]; [`compose`] renders the tree as text; [`compile`] flattens
//! it into a [`Program`] of `u32` instruction records for an external
//! executor. [`evaluate`] and [`interpret`] give the sequential reference
//! semantics; tree and instruction stream agree bit for bit.
//!
//! [`generate`] and [`generate_batch`] wrap the whole pipeline behind a
//! seed.

pub mod catalog;
pub mod compile;
pub mod compose;
pub mod error;
pub mod eval;
pub mod generation;
pub mod program;
pub mod rng;
pub mod synth;
pub mod tree;

// Re-export the public surface at the crate root
pub use catalog::{Catalog, InputKind, OpKind, Operator, CONSTANT_OPCODE};
pub use compile::compile;
pub use compose::compose;
pub use error::{ConfigError, Error, InvariantError};
pub use eval::{channel, evaluate, interpret, pixel};
pub use generation::{generate, generate_batch, Generation};
pub use program::{Program, Record};
pub use rng::RngStream;
pub use synth::synthesize;
pub use tree::{Node, NodeId, Tree};
