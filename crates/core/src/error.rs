//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Keep this focused on deterministic failures such as malformed values.
/// IO concerns belong to the crate that performs the IO.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A string could not be parsed into a known value.
    #[error("unknown value: {0}")]
    UnknownValue(String),
}

impl DomainError {
    pub fn unknown_value(msg: impl Into<String>) -> Self {
        Self::UnknownValue(msg.into())
    }
}
