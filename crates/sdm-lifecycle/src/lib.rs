//! SDM Resource Lifecycle Manager
//!
//! Generic CRUD over shape-described resources, one named graph per
//! resource:
//! - Lists resources per descriptor with labels and expiry
//! - Saves a resource's full statement set as one atomic graph rewrite
//! - Stamps creation (once) and modification (every update) timestamps
//! - Retires resources by ending a validity interval instead of deleting
//! - Finds and repairs references to retired resources
//!
//! # Example
//!
//! ```rust,ignore
//! use sdm_lifecycle::ResourceManager;
//!
//! # async fn example(store: std::sync::Arc<sdm_store::QuadStore>, descriptor: sdm_shapes::ShapeDescriptor) -> Result<(), sdm_lifecycle::LifecycleError> {
//! let manager = ResourceManager::new(store);
//! let ids = manager.mint_identifiers(&descriptor)?;
//! let text = format!("<{}> <http://www.w3.org/2004/02/skos/core#prefLabel> \"Acme\" .", ids.subject.as_str());
//! manager.save(&text, &ids.subject, &ids.graph, &descriptor.target_type).await?;
//! let listed = manager.list_resources(std::slice::from_ref(&descriptor)).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod audit;
pub mod error;
pub mod manager;
pub mod references;
pub mod types;
pub mod validity;

pub use audit::{Clock, ManualClock, SystemClock};
pub use error::LifecycleError;
pub use manager::ResourceManager;
pub use references::{DanglingReference, RepairReport};
pub use types::{
    ExportFormat, Identifiers, ListOptions, RemovalOutcome, ResourceRecord, ResourceState,
    SaveOptions, SaveOutcome, StatementFormat,
};
pub use validity::{ValidityIris, ValidityWindow};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the lifecycle manager
    pub use crate::{
        Identifiers, LifecycleError, ListOptions, ResourceManager, ResourceRecord, SaveOptions,
        StatementFormat,
    };
}
