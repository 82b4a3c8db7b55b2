//! Artifact location.
//!
//! Decides once, per resolved (entry, version) pair, where the artifact
//! bytes live: a flat file under the samples root, or an OCI reference in
//! the upstream registry. Downstream code dispatches on the returned
//! variant instead of re-branching on entry type.

use std::path::PathBuf;

use stencil_index::{CatalogEntry, EntryType, VersionRecord};
use stencil_oci::{ArtifactReference, LAYER_MEDIA_TYPE, TEMPLATE_FILE_NAME};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// A resolved pointer to artifact bytes.
#[derive(Debug, Clone)]
pub enum ArtifactRef {
    /// Flat file on local disk.
    Local {
        /// Absolute path of the sample file.
        path: PathBuf,
    },

    /// Content-addressed artifact in the upstream registry. The digest is
    /// discovered during manifest fetch, not known here.
    Oci {
        /// Registry reference (`host/name:version`).
        reference: ArtifactReference,

        /// Expected artifact media type.
        media_type: String,
    },
}

/// Maps resolved entries to retrieval plans.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    samples_root: PathBuf,
    registry_host: String,
}

impl ArtifactLocator {
    /// Create a locator.
    pub fn new(samples_root: impl Into<PathBuf>, registry_host: impl Into<String>) -> Self {
        Self {
            samples_root: samples_root.into(),
            registry_host: registry_host.into(),
        }
    }

    /// Locate the artifact for a resolved (entry, version) pair.
    pub async fn locate(
        &self,
        entry: &CatalogEntry,
        version: &VersionRecord,
    ) -> ServiceResult<ArtifactRef> {
        match entry.entry_type {
            EntryType::Sample => {
                let path = self
                    .samples_root
                    .join(&entry.name)
                    .join(TEMPLATE_FILE_NAME);
                debug!(name = %entry.name, path = %path.display(), "locating sample artifact");
                if tokio::fs::metadata(&path).await.is_err() {
                    // Index/storage inconsistency: the entry exists, the file
                    // does not.
                    return Err(ServiceError::LocalArtifactMissing { path });
                }
                Ok(ArtifactRef::Local { path })
            }
            EntryType::Stack => {
                let reference = ArtifactReference::with_tag(
                    self.registry_host.clone(),
                    entry.name.clone(),
                    version.version.to_string(),
                )?;
                debug!(name = %entry.name, reference = %reference, "locating stack artifact");
                Ok(ArtifactRef::Oci {
                    reference,
                    media_type: LAYER_MEDIA_TYPE.to_string(),
                })
            }
        }
    }
}
