//! Error types for the OCI pull client and forwarder.

/// OCI transport and content errors.
#[derive(Debug, thiserror::Error)]
pub enum OciError {
    /// The registry does not know the requested manifest or blob.
    #[error("not found in registry: {reference}")]
    NotFound { reference: String },

    /// The registry returned a structurally invalid manifest.
    #[error("malformed manifest for {reference}: {reason}")]
    MalformedManifest { reference: String, reason: String },

    /// Recomputed blob digest does not match the manifest-declared one.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// A digest string is not algorithm-prefixed hex.
    #[error("invalid digest: {digest} - {reason}")]
    InvalidDigest { digest: String, reason: String },

    /// An artifact reference could not be parsed.
    #[error("invalid reference: {reference} - {reason}")]
    InvalidReference { reference: String, reason: String },

    /// A raw request could not be turned into an upstream call.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Transport-level failure reaching the upstream registry.
    #[error("upstream unavailable: {message}")]
    Upstream { message: String },
}

impl From<reqwest::Error> for OciError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            message: err.to_string(),
        }
    }
}

/// Result type for OCI operations.
pub type OciResult<T> = Result<T, OciError>;
