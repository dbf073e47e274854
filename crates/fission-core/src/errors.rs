//! Error types for the fission core library.

/// Top-level error enum for the fission core library.
///
/// Almost everything in the analysis pipeline degrades gracefully (missing
/// labels are dropped with a warning, external types are skipped).  The
/// variants here cover the few conditions that must propagate: invalid matrix
/// shapes, a class that no partition owns, and a discovered API class without
/// a refactoring decision.
#[derive(Debug, thiserror::Error)]
pub enum FissionError {
    #[error("Matrix shape mismatch in {context}: {left} vs {right}")]
    Shape {
        context: String,
        left: String,
        right: String,
    },

    #[error("No partition owns class: {0}")]
    UnknownOwner(String),

    #[error("No refactoring decision for API class: {0}")]
    MissingDecision(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FissionResult<T> = Result<T, FissionError>;
