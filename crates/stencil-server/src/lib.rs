//! Transport-agnostic catalog service for workspace templates.
//!
//! Composes the index crate (snapshot store, filtering, version
//! resolution) with the OCI crate (digest-verified pulls, raw
//! forwarding) into the three operations a transport layer exposes:
//!
//! - [`CatalogService::list_entries`]: filtered catalog listing
//! - [`CatalogService::resolve_and_fetch`]: selector + predicates down to
//!   artifact bytes
//! - [`CatalogService::proxy`]: raw registry v2 passthrough
//!
//! # Quick Start
//!
//! ```no_run
//! use stencil_server::{CatalogConfig, CatalogService};
//! use stencil_index::FilterParams;
//!
//! # async fn example() -> Result<(), stencil_server::ServiceError> {
//! let config = CatalogConfig::from_env();
//! let service = CatalogService::open(config).await?;
//!
//! let artifact = service
//!     .resolve_and_fetch("go", Some("latest"), &FilterParams::default())
//!     .await?;
//! println!("{} bytes of {}", artifact.bytes.len(), artifact.content_type);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod locator;
pub mod service;

// Re-export main types
pub use config::CatalogConfig;
pub use error::{ServiceError, ServiceResult};
pub use locator::{ArtifactLocator, ArtifactRef};
pub use service::{CatalogService, ResolvedArtifact, SnapshotStats};
