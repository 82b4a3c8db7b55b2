//! OCI image manifest model.
//!
//! Only the pull-side subset this system reads: the manifest's layer list
//! and the annotations used to locate the template artifact layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Media type of OCI image manifests.
pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";

/// Config media type marking a repository that holds one template artifact.
pub const CONFIG_MEDIA_TYPE: &str = "application/vnd.stencil.template.config.v1+json";

/// Layer media type of the template artifact itself.
pub const LAYER_MEDIA_TYPE: &str = "application/vnd.stencil.template.layer.v1+tar";

/// Annotation naming the file a layer carries.
pub const TITLE_ANNOTATION: &str = "org.opencontainers.image.title";

/// File name of the template artifact inside a repository.
pub const TEMPLATE_FILE_NAME: &str = "template.yaml";

/// A content descriptor: one addressable piece of a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Media type of the referenced content.
    pub media_type: String,

    /// Content digest (`sha256:...`).
    pub digest: String,

    /// Size in bytes.
    pub size: i64,

    /// Descriptor annotations.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// An OCI image manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifest {
    /// Manifest schema version (2 for OCI).
    pub schema_version: u32,

    /// Manifest media type.
    #[serde(default)]
    pub media_type: Option<String>,

    /// Config descriptor.
    pub config: Descriptor,

    /// Ordered layer descriptors.
    #[serde(default)]
    pub layers: Vec<Descriptor>,
}

impl ImageManifest {
    /// The layer whose title annotation names the artifact file, if any.
    pub fn artifact_layer(&self, file_name: &str) -> Option<&Descriptor> {
        self.layers.iter().find(|layer| {
            layer
                .annotations
                .get(TITLE_ANNOTATION)
                .is_some_and(|title| title == file_name)
        })
    }
}
