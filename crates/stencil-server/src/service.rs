//! The composed catalog service.
//!
//! One facade over the index and retrieval layers: filtered listing, the
//! resolve-then-fetch pipeline, and raw upstream forwarding. Every call
//! works against the snapshot current at its start; a concurrent index
//! reload never changes a request mid-flight.

use chrono::{DateTime, Utc};
use stencil_index::{
    filter, resolve, CatalogEntry, EntryType, FilterParams, IndexError, IndexStore, Selector,
};
use stencil_oci::{OciClient, ProxyForwarder, RawRequest, RawResponse, TEMPLATE_FILE_NAME};
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::locator::{ArtifactLocator, ArtifactRef};

/// Content type reported for flat-file samples.
const LOCAL_CONTENT_TYPE: &str = "application/x-yaml";

/// Artifact bytes with their response metadata, the same shape for both
/// retrieval paths.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    /// Artifact bytes.
    pub bytes: Vec<u8>,

    /// Content type to report to the caller.
    pub content_type: String,

    /// Verified digest, present for registry-pulled artifacts.
    pub digest: Option<String>,
}

/// Summary of the current snapshot, for health and readiness reporting.
#[derive(Debug, Clone)]
pub struct SnapshotStats {
    /// Total entries.
    pub entries: usize,

    /// Registry-hosted stacks.
    pub stacks: usize,

    /// Flat-file samples.
    pub samples: usize,

    /// When the snapshot was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// The catalog service.
pub struct CatalogService {
    store: IndexStore,
    client: OciClient,
    forwarder: ProxyForwarder,
    locator: ArtifactLocator,
}

impl CatalogService {
    /// Load the index and assemble the service.
    pub async fn open(config: CatalogConfig) -> ServiceResult<Self> {
        let store = IndexStore::open(&config.index_path).await?;
        info!(
            registry = %config.registry_host,
            samples = %config.samples_root.display(),
            "catalog service ready"
        );
        Self::with_store(store, &config)
    }

    /// Assemble the service around an already-built store, for tests and
    /// embedding.
    pub fn with_store(store: IndexStore, config: &CatalogConfig) -> ServiceResult<Self> {
        let transport = config.transport();
        let client = OciClient::new(transport.clone())?;
        let forwarder = ProxyForwarder::new(config.registry_host.clone(), &transport)?;
        let locator =
            ArtifactLocator::new(config.samples_root.clone(), config.registry_host.clone());
        Ok(Self {
            store,
            client,
            forwarder,
            locator,
        })
    }

    /// Summary of the current snapshot.
    pub fn snapshot_stats(&self) -> SnapshotStats {
        let snapshot = self.store.snapshot();
        SnapshotStats {
            entries: snapshot.len(),
            stacks: snapshot.count_of_type(EntryType::Stack),
            samples: snapshot.count_of_type(EntryType::Sample),
            loaded_at: snapshot.loaded_at(),
        }
    }

    /// Re-read the index file and swap in the fresh snapshot.
    pub async fn reload_index(&self) -> ServiceResult<()> {
        self.store.reload().await.map_err(Into::into)
    }

    /// Filtered catalog listing without artifact retrieval. Returned entries
    /// carry their narrowed version lists.
    pub fn list_entries(&self, params: &FilterParams) -> ServiceResult<Vec<CatalogEntry>> {
        let snapshot = self.store.snapshot();
        let matched = filter(&snapshot, params)?;
        debug!(matched = matched.len(), total = snapshot.len(), "listed catalog entries");
        Ok(matched)
    }

    /// Resolve one entry and version and fetch the artifact bytes.
    ///
    /// Predicates narrow first, the selector resolves over the survivors,
    /// and the artifact is then read locally or pulled (digest-verified)
    /// from the registry.
    pub async fn resolve_and_fetch(
        &self,
        name: &str,
        selector: Option<&str>,
        params: &FilterParams,
    ) -> ServiceResult<ResolvedArtifact> {
        let selector = Selector::parse(selector)?;
        let snapshot = self.store.snapshot();
        let candidates = filter(&snapshot, params)?;

        let entry = find_entry(&candidates, name).ok_or_else(|| ServiceError::NotFound {
            name: name.to_string(),
            detail: "no entry satisfies the combined predicates".to_string(),
        })?;
        let record = resolve(&entry.versions, &selector).map_err(|e| match e {
            IndexError::VersionNotFound { selector } => ServiceError::NotFound {
                name: name.to_string(),
                detail: format!("no version matching {selector}"),
            },
            other => other.into(),
        })?;
        debug!(name, version = %record.version, selector = %selector, "resolved catalog entry");

        match self.locator.locate(entry, record).await? {
            ArtifactRef::Local { path } => {
                let bytes = tokio::fs::read(&path).await.map_err(|_| {
                    ServiceError::LocalArtifactMissing { path: path.clone() }
                })?;
                Ok(ResolvedArtifact {
                    bytes,
                    content_type: LOCAL_CONTENT_TYPE.to_string(),
                    digest: None,
                })
            }
            ArtifactRef::Oci { reference, .. } => {
                let artifact = self
                    .client
                    .fetch_artifact(&reference, TEMPLATE_FILE_NAME)
                    .await?;
                Ok(ResolvedArtifact {
                    bytes: artifact.bytes,
                    content_type: artifact.media_type,
                    digest: Some(artifact.digest),
                })
            }
        }
    }

    /// Forward raw registry traffic to the upstream, verbatim.
    pub async fn proxy(&self, request: RawRequest) -> ServiceResult<RawResponse> {
        Ok(self.forwarder.forward(request).await?)
    }
}

/// Exact-name lookup over filtered candidates. Names are unique per type
/// partition only; stacks shadow samples of the same name.
fn find_entry<'a>(entries: &'a [CatalogEntry], name: &str) -> Option<&'a CatalogEntry> {
    entries
        .iter()
        .find(|e| e.entry_type == EntryType::Stack && e.name == name)
        .or_else(|| entries.iter().find(|e| e.name == name))
}
