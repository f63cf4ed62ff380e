//! Error types for learnflow-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Rejections raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("a paraphrase needs at least one variation")]
    NoVariations,

    #[error("no cards available for testing")]
    NoCards,

    #[error("no cards found in the selected units")]
    NoCardsInUnits,

    #[error("multiple choice needs at least {required} cards, found {available}")]
    NotEnoughCards { required: usize, available: usize },

    #[error("no paraphrases available for practice")]
    NoParaphrases,

    #[error("session is already complete")]
    SessionComplete,
}

/// Errors raised while importing or exporting card text.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("nothing to import")]
    EmptyInput,

    #[error("no valid cards found in the input")]
    NoCards,

    #[error("no cards to export")]
    NothingToExport,

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
