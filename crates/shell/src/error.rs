use thiserror::Error;

use sieeg_core::DomainError;

use crate::storage::StorageError;

/// Errors surfaced by shell actions.
///
/// None of these are fatal; the caller renders or logs them.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The session's role does not expose the control that was invoked.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ShellError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
