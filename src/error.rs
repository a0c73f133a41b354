//! Error taxonomy.
//!
//! Two disjoint families: [`ConfigError`] for problems a caller can correct
//! before synthesis starts (bad style definitions, a zero node count), and
//! [`InvariantError`] for internal contract breaches (a tree or instruction
//! stream that violates its own structure). Invariant breaches are never
//! papered over with default values; they surface as errors so the bad
//! artifact is caught, not rendered.

use std::path::PathBuf;

use thiserror::Error;

/// A problem with caller-supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("style defines no operators")]
    NoOperators,

    #[error("style defines no input kinds")]
    NoInputs,

    #[error("operator with opcode {opcode} has arity 0 (must be at least 1)")]
    ZeroArity { opcode: u32 },

    #[error("operator opcode {opcode} must be below the reserved constant opcode 1000")]
    OperatorOpcodeReserved { opcode: u32 },

    #[error("input opcode {opcode} must be above the reserved constant opcode 1000")]
    InputOpcodeReserved { opcode: u32 },

    #[error("opcode {opcode} is declared more than once")]
    DuplicateOpcode { opcode: u32 },

    #[error("node count must be at least 1")]
    ZeroNodeCount,

    #[error("invalid style name '{name}'")]
    InvalidStyleName { name: String },

    #[error("unknown style '{name}' (looked for 'styles/{name}.toml')")]
    UnknownStyle { name: String },

    #[error("{}: {message}", path.display())]
    StyleFile { path: PathBuf, message: String },
}

/// An internal contract breach in a tree or instruction stream.
///
/// These indicate a corrupt artifact or a bug, not a user mistake. Every
/// consumer treats them as fatal for the artifact in question.
#[derive(Debug, Error)]
pub enum InvariantError {
    #[error("an operand slot was left unbound after synthesis")]
    UnboundSlot,

    #[error("node reference {id} points outside the tree")]
    DanglingNode { id: u32 },

    #[error("operator index {index} is not in the catalog")]
    UnknownOperator { index: usize },

    #[error("input index {index} is not in the catalog")]
    UnknownInput { index: usize },

    #[error("operator with opcode {opcode} expects {expected} operands, found {found}")]
    ArityMismatch {
        opcode: u32,
        expected: usize,
        found: usize,
    },

    #[error("opcode {opcode} is not defined by the catalog")]
    UnknownOpcode { opcode: u32 },

    #[error("record for opcode {opcode} is cut short at the end of the stream")]
    TruncatedRecord { opcode: u32 },

    #[error("input kind at position {position} has no coordinate to map to")]
    UnmappedInput { position: usize },

    #[error("memory cell {cell} is outside the allocated range")]
    CellOutOfRange { cell: u32 },

    #[error("program contains no records")]
    EmptyProgram,
}

/// Top-level error for the generation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateOpcode { opcode: 3 };
        assert_eq!(err.to_string(), "opcode 3 is declared more than once");
    }

    #[test]
    fn test_invariant_error_display() {
        let err = InvariantError::ArityMismatch {
            opcode: 1,
            expected: 2,
            found: 3,
        };
        assert!(err.to_string().contains("expects 2 operands, found 3"));
    }

    #[test]
    fn test_error_wraps_both_families() {
        let config: Error = ConfigError::ZeroNodeCount.into();
        assert!(config.to_string().starts_with("invalid configuration:"));

        let invariant: Error = InvariantError::UnboundSlot.into();
        assert!(invariant.to_string().starts_with("invariant violated:"));
    }
}
