//! Form capability
//!
//! The workspace never sees a concrete UI type. A form renderer implements
//! [`FormElement`]; the workspace asks it for statements and a verdict, and
//! hands it an [`InstanceProvider`] for pickers.

use std::sync::Arc;

use sdm_instances::InstanceProvider;
use sdm_lifecycle::StatementFormat;

/// Form failure while producing statements
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The form could not render its contents
    #[error("form serialization failed: {0}")]
    Serialize(String),
}

/// Verdict of a form's own validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Human-readable violations; empty when valid
    pub violations: Vec<String>,
}

impl ValidationOutcome {
    /// No violations
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// Outcome with the given violations
    #[must_use]
    pub fn invalid<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violations: violations.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the form may be saved
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A rendered form editing one resource
pub trait FormElement: Send + Sync {
    /// Current contents as statement text
    ///
    /// # Errors
    /// - `FormError::Serialize` if the form cannot render its contents
    fn serialize(&self) -> Result<String, FormError>;

    /// Syntax of [`serialize`](Self::serialize)'s output
    fn format(&self) -> StatementFormat {
        StatementFormat::NQuads
    }

    /// Check the contents against the form's own constraints
    fn validate(&self) -> ValidationOutcome;

    /// Receive the provider used to populate instance pickers
    fn set_instance_provider(&mut self, _provider: Arc<dyn InstanceProvider>) {}
}
