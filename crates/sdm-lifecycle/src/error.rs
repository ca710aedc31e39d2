//! Error types for the lifecycle manager

use sdm_store::{FormatError, StoreError};

/// Lifecycle operation errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Submitted statements could not be parsed; the caller must correct them
    #[error("submitted statements are invalid: {0}")]
    Parse(#[source] FormatError),

    /// Store read or write failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Graph contents could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[source] FormatError),

    /// A derived IRI is not valid (usually a bad namespace stem)
    #[error("invalid iri '{iri}': {message}")]
    InvalidIri { iri: String, message: String },

    /// The resource graph holds no statements
    #[error("resource not found: {0}")]
    NotFound(String),
}

impl LifecycleError {
    /// Check if the error needs user correction rather than a retry
    #[inline]
    #[must_use]
    pub fn requires_user_correction(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Check if error is transient (a retry may succeed)
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_transient())
    }

    /// Create invalid IRI error
    pub fn invalid_iri(iri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIri {
            iri: iri.into(),
            message: message.into(),
        }
    }
}
