//! Workspace error type

use sdm_lifecycle::LifecycleError;
use sdm_shapes::ShapeError;
use sdm_store::StoreError;

use crate::config::ConfigError;
use crate::form::FormError;

/// Errors surfaced by [`crate::Workspace`]
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shape loading failed
    #[error(transparent)]
    Shapes(#[from] ShapeError),

    /// Lifecycle operation failed
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Direct store access failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The form rejected its own contents
    #[error("form is invalid: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The form could not produce statements
    #[error(transparent)]
    Form(#[from] FormError),
}

impl WorkspaceError {
    /// Setup defect rather than a runtime failure
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Shapes(e) => e.is_configuration(),
            Self::Lifecycle(LifecycleError::InvalidIri { .. }) => true,
            _ => false,
        }
    }

    /// The user must fix their input; retrying will not help
    #[must_use]
    pub fn requires_user_correction(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Lifecycle(e) => e.requires_user_correction(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdm_store::FormatError;

    #[test]
    fn validation_lists_every_violation() {
        let err = WorkspaceError::Validation(vec!["name missing".into(), "bad date".into()]);
        assert_eq!(err.to_string(), "form is invalid: name missing; bad date");
        assert!(err.requires_user_correction());
        assert!(!err.is_configuration());
    }

    #[test]
    fn parse_errors_are_distinct_from_validation() {
        let err = WorkspaceError::from(LifecycleError::Parse(FormatError::Syntax("x".into())));
        assert!(err.requires_user_correction());
        assert!(!matches!(err, WorkspaceError::Validation(_)));
    }

    #[test]
    fn missing_sources_are_configuration() {
        assert!(WorkspaceError::from(ShapeError::NoSources).is_configuration());
    }
}
