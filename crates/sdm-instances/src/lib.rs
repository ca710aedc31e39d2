//! SDM Class Instance Provider
//!
//! Answers "which instances of type T exist?" for form pickers. Results are
//! N-Triples snapshots (type triple plus a label triple per instance), cached
//! per type and invalidated by store change events that touch `rdf:type`
//! statements of that type. Concurrent requests for the same type share one
//! computation.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod provider;

pub use provider::{ClassInstanceProvider, InstanceCacheStats, InstanceProvider};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
