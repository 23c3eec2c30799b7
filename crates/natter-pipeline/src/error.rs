use natter_store::StoreError;
use thiserror::Error;

/// Classified failure raised by a pipeline stage.
///
/// These are the caller-visible kinds: handlers translate them 1:1 into
/// transport responses, and no kind is ever downgraded into a generic
/// failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or missing request parameters.  Raised by shape validation
    /// before any store access.
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The relationship already exists.
    #[error("{0}")]
    Conflict(String),

    /// Underlying store failure; the diagnostic passes through verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Stable kind string used in trace output and error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "store_error",
        }
    }
}
