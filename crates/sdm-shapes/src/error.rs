//! Error types for shape loading

use sdm_store::FormatError;

/// Errors retrieving shape text
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Transport failed before a response arrived
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    /// Nothing is known under that URL
    #[error("no document at {0}")]
    NotFound(String),
}

impl FetchError {
    /// URL the failure relates to
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::NotFound(url) => url,
        }
    }
}

/// Shape loading errors
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// No shape document was configured
    #[error("no shape sources configured")]
    NoSources,

    /// Fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Shape text is not valid Turtle
    #[error("shape document {url} is invalid: {source}")]
    Syntax {
        url: String,
        #[source]
        source: FormatError,
    },
}

impl ShapeError {
    /// Check if error indicates a setup defect rather than a transient failure
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoSources)
    }
}
