//! Error types for the quad store
//!
//! Provides error handling for:
//! - Backend failures (the injected key-value medium)
//! - Record decoding (storage-format corruption)
//! - Text syntaxes (N-Quads, N-Triples, Turtle)

/// Errors raised by a key-value backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend has been closed
    #[error("backend is closed")]
    Closed,

    /// Underlying medium failed
    #[error("backend io error: {0}")]
    Io(String),

    /// A batch could not be applied as a whole
    #[error("batch rejected: {0}")]
    BatchRejected(String),
}

/// Errors decoding a stored record back into a quad
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// Key does not start with a known index tag
    #[error("unknown index tag: {0:#04x}")]
    UnknownIndex(u8),

    /// Key ended in the middle of a component
    #[error("truncated key at component {component}")]
    Truncated { component: usize },

    /// Component bytes are not UTF-8
    #[error("component {component} is not utf-8")]
    InvalidUtf8 { component: usize },

    /// Component text is not a valid term of the expected kind
    #[error("invalid {position} term: {message}")]
    InvalidTerm {
        position: &'static str,
        message: String,
    },

    /// Bytes remain after the fourth component
    #[error("{0} trailing bytes after quad")]
    TrailingBytes(usize),
}

/// Errors in textual RDF syntaxes
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Text is not valid in the requested syntax
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Base IRI for relative references is invalid
    #[error("invalid base iri '{iri}': {message}")]
    InvalidBase { iri: String, message: String },

    /// Serializer output failed
    #[error("serialization failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serializer produced non-UTF-8 output
    #[error("serializer produced invalid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Main quad store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Stored record could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(#[from] CodecError),

    /// Import/export text error
    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

impl StoreError {
    /// Check if error is transient (a retry may succeed)
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Io(_)))
    }
}
