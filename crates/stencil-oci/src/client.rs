//! OCI pull client.
//!
//! Implements the read side of the registry v2 API this system needs:
//! manifest fetch, blob fetch, and the composed artifact pull with digest
//! verification.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::digest;
use crate::error::{OciError, OciResult};
use crate::manifest::{ImageManifest, MANIFEST_MEDIA_TYPE};
use crate::reference::ArtifactReference;

/// User agent for upstream requests.
const USER_AGENT_VALUE: &str = concat!("stencil-oci/", env!("CARGO_PKG_VERSION"));

/// Transport configuration shared by the pull client and the forwarder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// URL scheme for upstream calls.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Request timeout in seconds; also bounds a caller's request-scoped
    /// deadline on upstream work.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            timeout_secs: default_timeout(),
        }
    }
}

impl TransportConfig {
    /// Set the scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// A pulled artifact with its verified digest.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    /// Artifact bytes.
    pub bytes: Vec<u8>,

    /// Media type declared by the artifact layer.
    pub media_type: String,

    /// Verified content digest.
    pub digest: String,
}

/// Client for pulling template artifacts from an upstream registry.
#[derive(Debug, Clone)]
pub struct OciClient {
    http: reqwest::Client,
    config: TransportConfig,
}

impl OciClient {
    /// Create a new client.
    pub fn new(config: TransportConfig) -> OciResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| OciError::Upstream {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { http, config })
    }

    /// Fetch and parse the manifest for a reference.
    pub async fn fetch_manifest(&self, reference: &ArtifactReference) -> OciResult<ImageManifest> {
        let url = reference.manifest_url(&self.config.scheme);
        debug!(reference = %reference, url = %url, "fetching manifest");

        let response = self.get(&url, Some(MANIFEST_MEDIA_TYPE), reference).await?;
        let body = response.bytes().await.map_err(|e| OciError::Upstream {
            message: format!("failed to read manifest body: {}", e),
        })?;

        serde_json::from_slice(&body).map_err(|e| OciError::MalformedManifest {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fetch a blob by digest from a reference's repository.
    pub async fn fetch_blob(
        &self,
        reference: &ArtifactReference,
        blob_digest: &str,
    ) -> OciResult<Vec<u8>> {
        let url = reference.blob_url(&self.config.scheme, blob_digest);
        debug!(reference = %reference, digest = blob_digest, "fetching blob");

        let response = self.get(&url, None, reference).await?;
        let body = response.bytes().await.map_err(|e| OciError::Upstream {
            message: format!("failed to read blob body: {}", e),
        })?;
        Ok(body.to_vec())
    }

    /// Pull the artifact file a reference points at.
    ///
    /// Locates the layer annotated with `file_name`, fetches its blob by the
    /// declared digest, and recomputes the digest over the received bytes.
    /// Bytes whose digest does not match never leave this function.
    pub async fn fetch_artifact(
        &self,
        reference: &ArtifactReference,
        file_name: &str,
    ) -> OciResult<FetchedArtifact> {
        let manifest = self.fetch_manifest(reference).await?;

        let layer = manifest.artifact_layer(file_name).ok_or_else(|| {
            OciError::MalformedManifest {
                reference: reference.to_string(),
                reason: format!("no layer annotated as {}", file_name),
            }
        })?;
        let declared = digest::parse(&layer.digest).map_err(|e| OciError::MalformedManifest {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

        let bytes = self.fetch_blob(reference, &declared).await?;
        digest::verify(&declared, &bytes)?;

        info!(
            reference = %reference,
            digest = %declared,
            size = bytes.len(),
            "fetched artifact"
        );

        Ok(FetchedArtifact {
            bytes,
            media_type: layer.media_type.clone(),
            digest: declared,
        })
    }

    async fn get(
        &self,
        url: &str,
        accept: Option<&'static str>,
        reference: &ArtifactReference,
    ) -> OciResult<reqwest::Response> {
        let mut request = self.http.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url, error = %e, "transport failure reaching upstream registry");
            OciError::Upstream {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(response),
            404 => Err(OciError::NotFound {
                reference: reference.to_string(),
            }),
            _ => Err(OciError::Upstream {
                message: format!("HTTP {} from upstream registry", status.as_u16()),
            }),
        }
    }
}
