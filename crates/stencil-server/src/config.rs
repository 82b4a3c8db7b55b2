//! Catalog service configuration.
//!
//! All paths and upstream coordinates are explicit construction-time values;
//! components never read process-wide mutable state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stencil_oci::TransportConfig;

/// Configuration for the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path of the serialized index.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Directory holding flat-file samples, one subdirectory per entry.
    #[serde(default = "default_samples_root")]
    pub samples_root: PathBuf,

    /// Upstream registry host (with optional port) stacks are pulled from.
    #[serde(default = "default_registry_host")]
    pub registry_host: String,

    /// URL scheme for upstream calls.
    #[serde(default = "default_registry_scheme")]
    pub registry_scheme: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_index_path() -> PathBuf {
    PathBuf::from("/registry/index.json")
}

fn default_samples_root() -> PathBuf {
    PathBuf::from("/registry/samples")
}

fn default_registry_host() -> String {
    "localhost:5000".to_string()
}

fn default_registry_scheme() -> String {
    "http".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            samples_root: default_samples_root(),
            registry_host: default_registry_host(),
            registry_scheme: default_registry_scheme(),
            timeout_secs: default_timeout(),
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `STENCIL_INDEX_PATH` | Serialized index path |
    /// | `STENCIL_SAMPLES_ROOT` | Flat-file samples directory |
    /// | `STENCIL_REGISTRY_HOST` | Upstream registry host |
    /// | `STENCIL_REGISTRY_SCHEME` | Upstream scheme (default: `http`) |
    /// | `STENCIL_TIMEOUT` | Upstream timeout in seconds (default: 30) |
    pub fn from_env() -> Self {
        Self {
            index_path: std::env::var("STENCIL_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_index_path()),
            samples_root: std::env::var("STENCIL_SAMPLES_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_samples_root()),
            registry_host: std::env::var("STENCIL_REGISTRY_HOST")
                .unwrap_or_else(|_| default_registry_host()),
            registry_scheme: std::env::var("STENCIL_REGISTRY_SCHEME")
                .unwrap_or_else(|_| default_registry_scheme()),
            timeout_secs: std::env::var("STENCIL_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the index path.
    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = path.into();
        self
    }

    /// Set the samples root.
    pub fn with_samples_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.samples_root = path.into();
        self
    }

    /// Set the upstream registry host.
    pub fn with_registry_host(mut self, host: impl Into<String>) -> Self {
        self.registry_host = host.into();
        self
    }

    /// Set the upstream scheme.
    pub fn with_registry_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.registry_scheme = scheme.into();
        self
    }

    /// Transport configuration for the OCI client and forwarder.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_scheme(self.registry_scheme.clone())
            .with_timeout_secs(self.timeout_secs)
    }
}
