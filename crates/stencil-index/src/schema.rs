//! Catalog entry model.
//!
//! The serialized index is a JSON list of [`CatalogEntry`] records. Field
//! names are camelCase on the wire; every optional field tolerates absence so
//! indexes produced by older generators still load.

use std::collections::HashMap;

use semver::Version;
use serde::{Deserialize, Serialize};

/// The kind of catalog entry.
///
/// Stacks are published to the OCI registry as content-addressed artifacts;
/// samples live on local disk as flat files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Registry-hosted template stack.
    Stack,

    /// Flat-file sample.
    Sample,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stack => write!(f, "stack"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

/// Git source coordinates attached to an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    /// Remote name to url.
    #[serde(default)]
    pub remotes: HashMap<String, String>,

    /// Repository url.
    #[serde(default)]
    pub url: Option<String>,

    /// Primary remote name.
    #[serde(default)]
    pub remote_name: Option<String>,

    /// Subdirectory of the repository holding the template.
    #[serde(default)]
    pub sub_dir: Option<String>,

    /// Branch, tag, or commit reference.
    #[serde(default)]
    pub revision: Option<String>,
}

/// One released version of a catalog entry.
///
/// `version` is the entry's own release number; `schema_version` is the
/// template-format version that release targets. The two are independently
/// ordered axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Release version.
    pub version: Version,

    /// Template-format version this release targets.
    pub schema_version: Version,

    /// Flag for the entry's default version. At most one record per entry
    /// carries it.
    #[serde(default)]
    pub default: bool,

    /// Whether this release is deprecated.
    #[serde(default)]
    pub is_deprecated: bool,

    /// Architectures this release supports; empty means any.
    #[serde(default)]
    pub architectures: Vec<String>,

    /// Command groups defined by the template.
    #[serde(default)]
    pub command_groups: Vec<String>,

    /// File resources shipped with this release.
    #[serde(default)]
    pub resources: Vec<String>,

    /// Starter project names.
    #[serde(default)]
    pub starter_projects: Vec<String>,
}

/// One named catalog entry with its version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Unique name within the entry's type partition.
    pub name: String,

    /// User readable name.
    #[serde(default)]
    pub display_name: String,

    /// Description text.
    #[serde(default)]
    pub description: String,

    /// Entry kind.
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Icon uri.
    #[serde(default)]
    pub icon: String,

    /// Subject tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Entry-level supported architectures; empty means any.
    #[serde(default)]
    pub architectures: Vec<String>,

    /// Kind of project the template produces.
    #[serde(default)]
    pub project_type: String,

    /// Primary programming language.
    #[serde(default)]
    pub language: String,

    /// Publishing provider.
    #[serde(default)]
    pub provider: String,

    /// Support url.
    #[serde(default)]
    pub support_url: String,

    /// Whether the whole entry is deprecated.
    #[serde(default)]
    pub deprecated: bool,

    /// Free-form attributes.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// Git source coordinates, if the entry is backed by a repository.
    #[serde(default)]
    pub git: Option<GitSource>,

    /// Starter project names.
    #[serde(default)]
    pub starter_projects: Vec<String>,

    /// Version history, unordered.
    #[serde(default)]
    pub versions: Vec<VersionRecord>,

    /// File resources.
    #[serde(default)]
    pub resources: Vec<String>,

    /// Named links.
    #[serde(default)]
    pub links: HashMap<String, String>,
}

impl CatalogEntry {
    /// The record flagged as default, or the highest release version when no
    /// record carries the flag.
    pub fn default_version(&self) -> Option<&VersionRecord> {
        self.versions
            .iter()
            .find(|v| v.default)
            .or_else(|| self.latest_version())
    }

    /// The record with the highest release version.
    pub fn latest_version(&self) -> Option<&VersionRecord> {
        self.versions.iter().max_by(|a, b| a.version.cmp(&b.version))
    }

    /// Union of the entry-level architecture set and every version record's
    /// set. An empty union means the entry declares no constraint.
    pub fn architecture_union(&self) -> Vec<&str> {
        let mut archs: Vec<&str> = self.architectures.iter().map(String::as_str).collect();
        for record in &self.versions {
            for arch in &record.architectures {
                if !archs.contains(&arch.as_str()) {
                    archs.push(arch);
                }
            }
        }
        archs
    }
}
