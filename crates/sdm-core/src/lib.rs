//! SDM Core
//!
//! Composes the quad store, shape discovery, the lifecycle manager and the
//! instance provider into one [`Workspace`], and defines the capability a
//! form renderer implements ([`FormElement`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use sdm_core::{Workspace, WorkspaceConfig};
//!
//! # async fn example(fetcher: std::sync::Arc<dyn sdm_shapes::ShapeFetcher>) -> Result<(), sdm_core::WorkspaceError> {
//! let config = WorkspaceConfig::new().with_shape_source("https://shapes.example/registry.ttl");
//! let workspace = Workspace::in_memory(config, fetcher)?;
//! let descriptors = workspace.refresh_shapes(false).await?;
//! let resources = workspace.list_resources().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod form;
pub mod workspace;

pub use config::{ConfigError, WorkspaceConfig};
pub use error::WorkspaceError;
pub use fetch::LocalOrRemoteFetcher;
pub use form::{FormElement, FormError, ValidationOutcome};
pub use workspace::Workspace;

pub use sdm_instances::{ClassInstanceProvider, InstanceProvider};
pub use sdm_lifecycle::{
    Identifiers, LifecycleError, ListOptions, ResourceManager, ResourceRecord, SaveOptions,
    StatementFormat,
};
pub use sdm_shapes::{DescriptorSet, ShapeDescriptor, ShapeFetcher};
pub use sdm_store::QuadStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding a workspace
    pub use crate::{
        FormElement, Identifiers, ShapeDescriptor, ValidationOutcome, Workspace, WorkspaceConfig,
        WorkspaceError,
    };
}
