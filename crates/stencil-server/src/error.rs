//! Service-level error taxonomy.
//!
//! Every failure is scoped to the request that triggered it; nothing here is
//! fatal to the process or touches the shared index snapshot.

use std::path::PathBuf;

use stencil_index::IndexError;
use stencil_oci::OciError;

/// Errors reported by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Unparseable version selector or range bound. User error; retrying
    /// cannot change the outcome.
    #[error("invalid selector: {input} - {reason}")]
    InvalidSelector { input: String, reason: String },

    /// No entry or version satisfies the combined predicates and selector.
    #[error("not found: {name} - {detail}")]
    NotFound { name: String, detail: String },

    /// The upstream registry returned structurally invalid data.
    #[error("malformed manifest for {reference}: {reason}")]
    MalformedManifest { reference: String, reason: String },

    /// Pulled bytes failed digest verification.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// Transport-level failure reaching the upstream registry.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Index lists a sample whose flat file is absent on disk.
    #[error("local artifact missing: {path}")]
    LocalArtifactMissing { path: PathBuf },

    /// The index file could not be loaded.
    #[error("index load failed: {message}")]
    IndexLoad { message: String },

    /// Internal plumbing failure that should not be surfaced as any of the
    /// request-path outcomes above.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    /// Whether the error is the caller's fault (bad input), as opposed to a
    /// registry-side or storage-side failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelector { .. } | Self::NotFound { .. }
        )
    }

    /// Whether a retry could plausibly produce a different outcome.
    /// Deterministic resolution results never qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}

impl From<IndexError> for ServiceError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::InvalidSelector { input, reason } => {
                Self::InvalidSelector { input, reason }
            }
            IndexError::InvalidRange { min, max } => Self::InvalidSelector {
                input: format!("{min}..{max}"),
                reason: "min bound is greater than max bound".to_string(),
            },
            IndexError::EntryNotFound { name } => Self::NotFound {
                name,
                detail: "no catalog entry with this name".to_string(),
            },
            IndexError::VersionNotFound { selector } => Self::NotFound {
                name: selector,
                detail: "no version satisfies the selector".to_string(),
            },
            IndexError::Load { path, message } => Self::IndexLoad {
                message: format!("{path}: {message}"),
            },
        }
    }
}

impl From<OciError> for ServiceError {
    fn from(err: OciError) -> Self {
        match err {
            OciError::NotFound { reference } => Self::NotFound {
                name: reference,
                detail: "artifact not found in upstream registry".to_string(),
            },
            OciError::MalformedManifest { reference, reason } => {
                Self::MalformedManifest { reference, reason }
            }
            OciError::DigestMismatch { expected, actual } => {
                Self::DigestMismatch { expected, actual }
            }
            OciError::Upstream { message } => Self::UpstreamUnavailable { message },
            OciError::InvalidDigest { digest, reason } => Self::MalformedManifest {
                reference: digest,
                reason,
            },
            OciError::InvalidReference { reference, reason } => Self::Internal {
                message: format!("bad registry reference {reference}: {reason}"),
            },
            OciError::InvalidRequest { reason } => Self::Internal {
                message: format!("bad proxy request: {reason}"),
            },
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_errors_map_to_taxonomy() {
        let err: ServiceError = IndexError::InvalidSelector {
            input: "2.0.0.0".to_string(),
            reason: "not a semantic version".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::InvalidSelector { .. }));
        assert!(err.is_caller_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn oci_errors_map_to_taxonomy() {
        let err: ServiceError = OciError::Upstream {
            message: "connection refused".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::UpstreamUnavailable { .. }));
        assert!(err.is_retryable());

        let err: ServiceError = OciError::DigestMismatch {
            expected: "sha256:aa".to_string(),
            actual: "sha256:bb".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::DigestMismatch { .. }));
        assert!(!err.is_retryable());
    }
}
