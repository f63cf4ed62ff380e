use thiserror::Error;

use learnflow_core::error::{TransferError, ValidationError};

/// Errors returned by library operations. None of them leave partial state.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Card not found: {0}")]
    CardNotFound(i64),

    #[error("Paraphrase not found: {0}")]
    ParaphraseNotFound(i64),

    #[error("No test in progress")]
    NoActiveSession,
}

pub type Result<T> = std::result::Result<T, LibraryError>;
