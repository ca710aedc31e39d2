//! SDM Quad Store
//!
//! Durable, pattern-queryable storage of RDF quads over a pluggable ordered
//! key-value backend.
//!
//! # Core Operations
//!
//! - **Write**: `put` / `delete` / `replace` batches, each one atomic backend batch
//! - **Read**: `get` by partial pattern, `get_dataset` for membership tests
//! - **Observe**: `subscribe` to `put` / `delete` / `clear` events
//! - **Recover**: undecodable records trigger a full clear instead of an error
//!
//! # Architecture
//!
//! ```text
//! QuadStore ──encode──▶ [SPOG | POGS | OGSP | GSPO] keys ──batch──▶ KvBackend
//!     │
//!     └──▶ ListenerRegistry ──▶ StoreEvent::{Put, Delete, Clear}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sdm_store::{QuadPattern, QuadStore};
//!
//! # async fn example(quads: Vec<oxrdf::Quad>) -> Result<(), sdm_store::StoreError> {
//! let store = QuadStore::in_memory();
//! let _subscription = store.subscribe(|event| println!("{:?}", event.kind()));
//! store.put(quads).await?;
//! let typed = store.get(&QuadPattern::any().predicate(sdm_store::vocab::rdf::TYPE)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod codec;
pub mod dataset;
pub mod error;
pub mod events;
pub mod format;
pub mod pattern;
pub mod store;
pub mod vocab;

pub use backend::{BatchOp, KvBackend, MemoryBackend};
pub use dataset::Dataset;
pub use error::{BackendError, CodecError, FormatError, StoreError};
pub use events::{ChangeKind, StoreEvent, Subscription};
pub use pattern::QuadPattern;
pub use store::QuadStore;

/// Re-exported RDF model so downstream crates share one term vocabulary
pub use oxrdf;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the quad store
    pub use crate::{Dataset, QuadPattern, QuadStore, StoreError, StoreEvent};
    pub use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
}
