//! SDM Shape Descriptor Discovery
//!
//! Reads a graph of shape declarations and derives, per declared resource
//! type, the metadata that drives generic CRUD screens.
//!
//! # Core Operations
//!
//! - **Discover**: shape statements → sorted [`ShapeDescriptor`]s
//! - **Name**: regular pluralisation and URL-safe slugs
//! - **Load**: fetch shape documents through a [`ShapeFetcher`], cached per URL
//!
//! # Architecture
//!
//! ```text
//! URL ──ShapeFetcher──▶ Turtle text ──parse──▶ quads ──discover──▶ DescriptorSet
//!          ↑___________↓
//!          ShapeTextCache (per URL, force_reload / reset)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod naming;
pub mod source;

pub use cache::{CacheStats, ShapeTextCache};
pub use descriptor::{DescriptorSet, ShapeDescriptor};
pub use discovery::discover;
pub use error::{FetchError, ShapeError};
pub use naming::{pluralize, slugify};
pub use source::{HttpFetcher, ShapeFetcher, ShapeSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
