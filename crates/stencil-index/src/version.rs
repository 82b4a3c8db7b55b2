//! Version selectors and resolution.
//!
//! A selector names which version of an entry to resolve: the entry's
//! default, the newest release, or one exact version. Resolution runs over a
//! version list that filtering may already have narrowed, so a range filter
//! and a selector compose without either knowing about the other.

use semver::Version;

use crate::error::{IndexError, IndexResult};
use crate::schema::VersionRecord;

/// A parsed version selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The record flagged as default, falling back to the newest release.
    Default,

    /// The newest release, ignoring the default flag.
    Latest,

    /// One exact release version.
    Exact(Version),
}

impl Selector {
    /// Parse a client-supplied selector. `None` selects the default.
    pub fn parse(input: Option<&str>) -> IndexResult<Self> {
        match input {
            None => Ok(Self::Default),
            Some(s) if s.eq_ignore_ascii_case("default") => Ok(Self::Default),
            Some(s) if s.eq_ignore_ascii_case("latest") => Ok(Self::Latest),
            Some(s) => Ok(Self::Exact(parse_loose(s)?)),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Latest => write!(f, "latest"),
            Self::Exact(version) => write!(f, "{}", version),
        }
    }
}

/// Parse a version string, padding omitted minor/patch components.
///
/// Clients may send partial versions for bounds (`2` or `2.1`); those pad to
/// `2.0.0` / `2.1.0`. Anything that is not one to three numeric components
/// (with optional pre-release on a full triple) is rejected.
pub fn parse_loose(input: &str) -> IndexResult<Version> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IndexError::InvalidSelector {
            input: input.to_string(),
            reason: "empty version".to_string(),
        });
    }

    if let Ok(version) = Version::parse(trimmed) {
        return Ok(version);
    }

    // Pad one- and two-component versions to a full triple.
    let padded = match trimmed.split('.').count() {
        1 => format!("{trimmed}.0.0"),
        2 => format!("{trimmed}.0"),
        _ => {
            return Err(IndexError::InvalidSelector {
                input: input.to_string(),
                reason: "not a semantic version".to_string(),
            })
        }
    };

    Version::parse(&padded).map_err(|e| IndexError::InvalidSelector {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve a selector against a (possibly narrowed) version list.
///
/// Absence of an exact version is reported the same way whether the version
/// never existed or a range filter excluded it.
pub fn resolve<'a>(
    versions: &'a [VersionRecord],
    selector: &Selector,
) -> IndexResult<&'a VersionRecord> {
    match selector {
        Selector::Default => versions
            .iter()
            .find(|v| v.default)
            .map(Ok)
            .unwrap_or_else(|| newest(versions, selector)),
        Selector::Latest => newest(versions, selector),
        Selector::Exact(want) => versions
            .iter()
            .find(|v| v.version == *want)
            .ok_or_else(|| IndexError::VersionNotFound {
                selector: selector.to_string(),
            }),
    }
}

fn newest<'a>(versions: &'a [VersionRecord], selector: &Selector) -> IndexResult<&'a VersionRecord> {
    versions
        .iter()
        .max_by(|a, b| a.version.cmp(&b.version))
        .ok_or_else(|| IndexError::VersionNotFound {
            selector: selector.to_string(),
        })
}
