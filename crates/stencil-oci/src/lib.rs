//! OCI artifact retrieval for Stencil.
//!
//! This crate implements the registry-facing half of the catalog server:
//!
//! - Artifact reference parsing (`host/name:tag`, `host/name@sha256:...`)
//! - Manifest and blob pulls over the registry v2 API
//! - Digest verification on every pulled blob
//! - Raw byte-for-byte forwarding for v2 traffic the server does not
//!   interpret
//!
//! # Quick Start
//!
//! ```no_run
//! use stencil_oci::{ArtifactReference, OciClient, TransportConfig, TEMPLATE_FILE_NAME};
//!
//! # async fn example() -> Result<(), stencil_oci::OciError> {
//! let client = OciClient::new(TransportConfig::default())?;
//! let reference = ArtifactReference::parse("registry.example.dev/go:1.2.0")?;
//! let artifact = client.fetch_artifact(&reference, TEMPLATE_FILE_NAME).await?;
//! println!("pulled {} bytes, digest {}", artifact.bytes.len(), artifact.digest);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod proxy;
pub mod reference;

// Re-export main types
pub use client::{FetchedArtifact, OciClient, TransportConfig};
pub use error::{OciError, OciResult};
pub use manifest::{
    Descriptor, ImageManifest, CONFIG_MEDIA_TYPE, LAYER_MEDIA_TYPE, MANIFEST_MEDIA_TYPE,
    TEMPLATE_FILE_NAME, TITLE_ANNOTATION,
};
pub use proxy::{ProxyForwarder, RawRequest, RawResponse};
pub use reference::{ArtifactReference, RefKind};
