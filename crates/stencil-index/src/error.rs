//! Error types for index loading, filtering, and version resolution.

/// Index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Version selector or range bound could not be parsed.
    #[error("invalid version selector: {input} - {reason}")]
    InvalidSelector { input: String, reason: String },

    /// A version range was supplied with min above max.
    #[error("invalid version range: min {min} is greater than max {max}")]
    InvalidRange { min: String, max: String },

    /// No catalog entry with the given name.
    #[error("entry not found: {name}")]
    EntryNotFound { name: String },

    /// No version record satisfies the selector.
    #[error("no version matching {selector}")]
    VersionNotFound { selector: String },

    /// Index file could not be read or parsed.
    #[error("failed to load index from {path}: {message}")]
    Load { path: String, message: String },
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
