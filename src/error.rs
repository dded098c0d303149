//! Error types for predsql.

use thiserror::Error;

use crate::ast::NodeKind;

/// The main error type for predsql operations.
#[derive(Debug, Error)]
pub enum PredsqlError {
    /// A predicate node, method or operand the compiler does not translate.
    #[error("Unsupported expression: {kind} ({detail})")]
    UnsupportedExpression { kind: NodeKind, detail: String },

    /// Positional values do not line up with the `@name` placeholders of a statement.
    #[error("Parameter count mismatch: statement expects {expected}, got {found}")]
    ParameterCount { expected: usize, found: usize },

    /// Error reported by the data store executing a prepared query.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML input.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PredsqlError {
    /// Create an unsupported expression error for the given node kind.
    pub fn unsupported(kind: NodeKind, detail: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            kind,
            detail: detail.into(),
        }
    }
}

/// Result type alias for predsql operations.
pub type PredsqlResult<T> = Result<T, PredsqlError>;
