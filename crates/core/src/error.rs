//! Error types for the unredaction pipeline.
//!
//! Only stage-level precondition failures and I/O problems surface as
//! errors. Per-item problems (a malformed span, an unmatched rectangle, an
//! unclassifiable context) are resolved to defaults inside the stage.

use thiserror::Error;

/// Primary error type for pipeline operations.
#[derive(Error, Debug)]
pub enum UnredactError {
    #[error("stage `{stage}` requires `{field}`, which no earlier stage produced")]
    MissingUpstream {
        stage: &'static str,
        field: &'static str,
    },

    #[error("document contains no redactions to profile")]
    NoRedactions,

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnredactError {
    /// True for errors raised because an upstream stage output is absent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingUpstream { .. } | Self::NoRedactions)
    }
}

/// Convenience Result type alias for UnredactError.
pub type Result<T> = std::result::Result<T, UnredactError>;
