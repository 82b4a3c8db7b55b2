//! Catalog index for workspace templates.
//!
//! This crate holds the read side of the catalog: the serialized entry
//! model, an immutable snapshot store with atomic refresh, multi-criteria
//! filtering, and version-selector resolution.
//!
//! # Quick Start
//!
//! ```no_run
//! use stencil_index::{filter, resolve, FilterParams, IndexStore, Selector};
//!
//! # async fn example() -> Result<(), stencil_index::IndexError> {
//! let store = IndexStore::open("/registry/index.json").await?;
//!
//! let params = FilterParams {
//!     tags: Some(vec!["Go".to_string()]),
//!     max_schema_version: Some("2.0.0".to_string()),
//!     ..Default::default()
//! };
//! for entry in filter(&store.snapshot(), &params)? {
//!     let newest = resolve(&entry.versions, &Selector::Latest)?;
//!     println!("{} {}", entry.name, newest.version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod schema;
pub mod store;
pub mod version;

// Re-export main types
pub use error::{IndexError, IndexResult};
pub use filter::{filter, FilterParams};
pub use schema::{CatalogEntry, EntryType, GitSource, VersionRecord};
pub use store::{IndexSnapshot, IndexStore};
pub use version::{parse_loose, resolve, Selector};
