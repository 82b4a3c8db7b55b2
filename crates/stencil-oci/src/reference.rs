//! Artifact reference parsing.
//!
//! A reference names one artifact in an upstream registry:
//! - `registry.example.dev/go:1.2.0` → repository by tag
//! - `registry.example.dev/go@sha256:abc...` → repository by digest
//!
//! The repository name may contain path separators
//! (`registry.example.dev/catalog/go:1.2.0`).

use crate::digest;
use crate::error::{OciError, OciResult};

/// The tag-or-digest part of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// Mutable tag, usually a version string.
    Tag(String),

    /// Content-addressed digest (`sha256:...`).
    Digest(String),
}

/// A parsed artifact reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    host: String,
    name: String,
    kind: RefKind,
}

impl ArtifactReference {
    /// Build a tag reference from parts.
    pub fn with_tag(
        host: impl Into<String>,
        name: impl Into<String>,
        tag: impl Into<String>,
    ) -> OciResult<Self> {
        let reference = Self {
            host: host.into(),
            name: name.into(),
            kind: RefKind::Tag(tag.into()),
        };
        reference.validate()?;
        Ok(reference)
    }

    /// Parse a reference string.
    pub fn parse(reference: &str) -> OciResult<Self> {
        let reference = reference.trim();
        let Some((host, rest)) = reference.split_once('/') else {
            return Err(OciError::InvalidReference {
                reference: reference.to_string(),
                reason: "missing registry host".to_string(),
            });
        };

        // A digest binds tighter than a tag: name@sha256:... wins even though
        // the digest itself contains a colon.
        let (name, kind) = if let Some((name, digest_part)) = rest.split_once('@') {
            let normalized = digest::parse(digest_part).map_err(|e| OciError::InvalidReference {
                reference: reference.to_string(),
                reason: e.to_string(),
            })?;
            (name, RefKind::Digest(normalized))
        } else if let Some((name, tag)) = rest.rsplit_once(':') {
            (name, RefKind::Tag(tag.to_string()))
        } else {
            (rest, RefKind::Tag("latest".to_string()))
        };

        let parsed = Self {
            host: host.to_string(),
            name: name.to_string(),
            kind,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> OciResult<()> {
        if self.host.is_empty() {
            return Err(self.invalid("registry host cannot be empty"));
        }
        if self.name.is_empty() {
            return Err(self.invalid("repository name cannot be empty"));
        }
        let name_ok = self.name.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-".contains(c))
        });
        if !name_ok {
            return Err(self.invalid(
                "repository name segments may only contain lowercase letters, digits, '.', '_', and '-'",
            ));
        }
        if let RefKind::Tag(tag) = &self.kind {
            if tag.is_empty() {
                return Err(self.invalid("tag cannot be empty"));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> OciError {
        OciError::InvalidReference {
            reference: self.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Registry host (with optional port).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository name within the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag or digest this reference points at.
    pub fn kind(&self) -> &RefKind {
        &self.kind
    }

    /// Tag string or digest string, as used in the manifest URL.
    pub fn reference_part(&self) -> &str {
        match &self.kind {
            RefKind::Tag(tag) => tag,
            RefKind::Digest(digest) => digest,
        }
    }

    /// URL of this reference's manifest.
    pub fn manifest_url(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{}/v2/{}/manifests/{}",
            self.host,
            self.name,
            self.reference_part()
        )
    }

    /// URL of a blob in this reference's repository.
    pub fn blob_url(&self, scheme: &str, blob_digest: &str) -> String {
        format!("{scheme}://{}/v2/{}/blobs/{blob_digest}", self.host, self.name)
    }
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            RefKind::Tag(tag) => write!(f, "{}/{}:{}", self.host, self.name, tag),
            RefKind::Digest(digest) => write!(f, "{}/{}@{}", self.host, self.name, digest),
        }
    }
}

impl std::str::FromStr for ArtifactReference {
    type Err = OciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
