//! Error types for dialects.

use thiserror::Error;

/// Result type alias for dialect operations.
pub type DialectResult<T> = Result<T, DialectError>;

/// Errors that can occur when looking up dialects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("Unknown dialect: {name} (expected one of: {expected})")]
    UnknownDialect { name: String, expected: String },
}

impl DialectError {
    /// Build a [`DialectError::UnknownDialect`] listing every supported dialect.
    pub fn unknown(name: impl Into<String>) -> Self {
        DialectError::UnknownDialect {
            name: name.into(),
            expected: crate::Dialect::all()
                .iter()
                .map(crate::Dialect::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
