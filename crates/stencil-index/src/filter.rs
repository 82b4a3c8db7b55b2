//! Multi-criteria index filtering.
//!
//! Each supplied predicate constrains one field and all predicates combine
//! with logical AND. String predicates are case-sensitive substring matches,
//! set predicates require a non-empty intersection, and version ranges narrow
//! the per-entry version list so later selection (default/latest/exact) runs
//! over the survivors only.

use semver::Version;
use serde::Deserialize;

use crate::error::{IndexError, IndexResult};
use crate::schema::{CatalogEntry, EntryType, VersionRecord};
use crate::store::IndexSnapshot;
use crate::version::parse_loose;

/// Per-field filter predicates. Every field is optional; an absent field
/// constrains nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParams {
    /// Restrict to one entry kind.
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,

    /// Substring of the entry name.
    pub name: Option<String>,

    /// Substring of the display name.
    pub display_name: Option<String>,

    /// Substring of the description.
    pub description: Option<String>,

    /// Substring of the icon uri.
    pub icon_uri: Option<String>,

    /// Substring of the project type.
    pub project_type: Option<String>,

    /// Substring of the language.
    pub language: Option<String>,

    /// Substring of the provider.
    pub provider: Option<String>,

    /// Substring of the support url.
    pub support_url: Option<String>,

    /// Substring of the git repository url.
    pub git_url: Option<String>,

    /// Substring of the primary git remote name.
    pub git_remote_name: Option<String>,

    /// Substring of the git subdirectory.
    pub git_sub_dir: Option<String>,

    /// Substring of the git revision.
    pub git_revision: Option<String>,

    /// Requested tag set.
    pub tags: Option<Vec<String>>,

    /// Requested architecture set, matched against the union of entry-level
    /// and per-version sets. An entry declaring no architectures matches any
    /// request.
    #[serde(rename = "arch")]
    pub architectures: Option<Vec<String>>,

    /// Requested free-form attribute names.
    pub attribute_names: Option<Vec<String>>,

    /// Requested resource file names.
    pub resources: Option<Vec<String>>,

    /// Requested starter project names.
    pub starter_projects: Option<Vec<String>>,

    /// Requested link names.
    pub link_names: Option<Vec<String>>,

    /// Requested git remote names.
    pub git_remote_names: Option<Vec<String>>,

    /// Requested git remote urls.
    pub git_remotes: Option<Vec<String>>,

    /// Requested command groups, matched against the union over version
    /// records.
    pub command_groups: Option<Vec<String>>,

    /// Entry-level deprecation flag.
    pub deprecated: Option<bool>,

    /// Version-level default flag; narrows the version list.
    pub default: Option<bool>,

    /// Inclusive lower bound on the release version.
    pub min_version: Option<String>,

    /// Inclusive upper bound on the release version.
    pub max_version: Option<String>,

    /// Inclusive lower bound on the template-format version.
    pub min_schema_version: Option<String>,

    /// Inclusive upper bound on the template-format version.
    pub max_schema_version: Option<String>,
}

impl FilterParams {
    /// Whether any version-scoped predicate is present.
    fn narrows_versions(&self) -> bool {
        self.default.is_some()
            || self.min_version.is_some()
            || self.max_version.is_some()
            || self.min_schema_version.is_some()
            || self.max_schema_version.is_some()
    }
}

/// An inclusive version range, parsed and validated once per filter call.
#[derive(Debug, Default)]
struct Bounds {
    min: Option<Version>,
    max: Option<Version>,
}

impl Bounds {
    fn parse(min: Option<&str>, max: Option<&str>) -> IndexResult<Self> {
        let min = min.map(parse_loose).transpose()?;
        let max = max.map(parse_loose).transpose()?;
        if let (Some(lo), Some(hi)) = (&min, &max) {
            if lo > hi {
                return Err(IndexError::InvalidRange {
                    min: lo.to_string(),
                    max: hi.to_string(),
                });
            }
        }
        Ok(Self { min, max })
    }

    fn contains(&self, version: &Version) -> bool {
        self.min.as_ref().map_or(true, |lo| version >= lo)
            && self.max.as_ref().map_or(true, |hi| version <= hi)
    }
}

/// Filter a snapshot down to the entries matching every supplied predicate.
///
/// Returned entries carry their narrowed version lists, so feeding the output
/// back through the same predicates is a no-op.
pub fn filter(snapshot: &IndexSnapshot, params: &FilterParams) -> IndexResult<Vec<CatalogEntry>> {
    let version_bounds = Bounds::parse(
        params.min_version.as_deref(),
        params.max_version.as_deref(),
    )?;
    let schema_bounds = Bounds::parse(
        params.min_schema_version.as_deref(),
        params.max_schema_version.as_deref(),
    )?;

    Ok(snapshot
        .entries()
        .iter()
        .filter_map(|entry| match_entry(entry, params, &version_bounds, &schema_bounds))
        .collect())
}

fn match_entry(
    entry: &CatalogEntry,
    params: &FilterParams,
    version_bounds: &Bounds,
    schema_bounds: &Bounds,
) -> Option<CatalogEntry> {
    if let Some(entry_type) = params.entry_type {
        if entry.entry_type != entry_type {
            return None;
        }
    }
    if let Some(deprecated) = params.deprecated {
        if entry.deprecated != deprecated {
            return None;
        }
    }

    let strings_match = substring(&entry.name, params.name.as_deref())
        && substring(&entry.display_name, params.display_name.as_deref())
        && substring(&entry.description, params.description.as_deref())
        && substring(&entry.icon, params.icon_uri.as_deref())
        && substring(&entry.project_type, params.project_type.as_deref())
        && substring(&entry.language, params.language.as_deref())
        && substring(&entry.provider, params.provider.as_deref())
        && substring(&entry.support_url, params.support_url.as_deref());
    if !strings_match {
        return None;
    }
    if !git_matches(entry, params) {
        return None;
    }

    if !intersects(&entry.tags, params.tags.as_deref())
        || !intersects(&entry.resources, params.resources.as_deref())
        || !intersects(&entry.starter_projects, params.starter_projects.as_deref())
    {
        return None;
    }
    if let Some(wanted) = params.attribute_names.as_deref() {
        if !wanted.iter().any(|name| entry.attributes.contains_key(name)) {
            return None;
        }
    }
    if let Some(wanted) = params.link_names.as_deref() {
        if !wanted.iter().any(|name| entry.links.contains_key(name)) {
            return None;
        }
    }

    // Version-scoped predicates narrow the list the entry is returned with.
    let mut versions: Vec<VersionRecord> = entry.versions.clone();
    if let Some(want_default) = params.default {
        versions.retain(|v| v.default == want_default);
    }
    versions.retain(|v| {
        version_bounds.contains(&v.version) && schema_bounds.contains(&v.schema_version)
    });
    if params.narrows_versions() && versions.is_empty() {
        return None;
    }

    if let Some(wanted) = params.command_groups.as_deref() {
        let groups: Vec<&str> = versions
            .iter()
            .flat_map(|v| v.command_groups.iter().map(String::as_str))
            .collect();
        if !wanted.iter().any(|g| groups.contains(&g.as_str())) {
            return None;
        }
    }

    if let Some(wanted) = params.architectures.as_deref() {
        let mut archs: Vec<&str> = entry.architectures.iter().map(String::as_str).collect();
        for record in &versions {
            for arch in &record.architectures {
                if !archs.contains(&arch.as_str()) {
                    archs.push(arch);
                }
            }
        }
        // No declared architectures means the entry runs everywhere.
        if !archs.is_empty() && !wanted.iter().any(|a| archs.contains(&a.as_str())) {
            return None;
        }
    }

    let mut narrowed = entry.clone();
    narrowed.versions = versions;
    Some(narrowed)
}

fn substring(field: &str, wanted: Option<&str>) -> bool {
    wanted.map_or(true, |w| field.contains(w))
}

fn intersects(set: &[String], wanted: Option<&[String]>) -> bool {
    wanted.map_or(true, |w| w.iter().any(|item| set.iter().any(|s| s == item)))
}

fn git_matches(entry: &CatalogEntry, params: &FilterParams) -> bool {
    let git_filter_active = params.git_url.is_some()
        || params.git_remote_name.is_some()
        || params.git_sub_dir.is_some()
        || params.git_revision.is_some()
        || params.git_remote_names.is_some()
        || params.git_remotes.is_some();
    let Some(git) = entry.git.as_ref() else {
        return !git_filter_active;
    };

    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    if !substring(&field(&git.url), params.git_url.as_deref())
        || !substring(&field(&git.remote_name), params.git_remote_name.as_deref())
        || !substring(&field(&git.sub_dir), params.git_sub_dir.as_deref())
        || !substring(&field(&git.revision), params.git_revision.as_deref())
    {
        return false;
    }
    if let Some(wanted) = params.git_remote_names.as_deref() {
        if !wanted.iter().any(|name| git.remotes.contains_key(name)) {
            return false;
        }
    }
    if let Some(wanted) = params.git_remotes.as_deref() {
        if !wanted
            .iter()
            .any(|url| git.remotes.values().any(|v| v == url))
        {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{resolve, Selector};
    use std::collections::HashMap;

    fn record(version: &str, schema: &str, default: bool, archs: &[&str]) -> VersionRecord {
        VersionRecord {
            version: Version::parse(version).unwrap(),
            schema_version: Version::parse(schema).unwrap(),
            default,
            is_deprecated: false,
            architectures: archs.iter().map(|s| s.to_string()).collect(),
            command_groups: vec!["build".to_string(), "run".to_string()],
            resources: Vec::new(),
            starter_projects: Vec::new(),
        }
    }

    fn stack(name: &str, archs: &[&str], versions: Vec<VersionRecord>) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            display_name: format!("{name} stack"),
            description: format!("{name} template"),
            entry_type: EntryType::Stack,
            icon: String::new(),
            tags: vec![name.to_string()],
            architectures: archs.iter().map(|s| s.to_string()).collect(),
            project_type: name.to_string(),
            language: name.to_string(),
            provider: "Example".to_string(),
            support_url: String::new(),
            deprecated: false,
            attributes: HashMap::new(),
            git: None,
            starter_projects: Vec::new(),
            versions,
            resources: Vec::new(),
            links: HashMap::new(),
        }
    }

    fn snapshot() -> IndexSnapshot {
        IndexSnapshot::from_entries(vec![
            stack(
                "go",
                &[],
                vec![
                    record("1.0.0", "2.0.0", false, &[]),
                    record("1.1.0", "2.0.0", true, &[]),
                    record("1.2.0", "2.1.0", false, &[]),
                ],
            ),
            stack(
                "java-maven",
                &["amd64"],
                vec![record("1.3.0", "2.2.0", true, &["arm64"])],
            ),
        ])
    }

    #[test]
    fn empty_params_match_everything() {
        let matched = filter(&snapshot(), &FilterParams::default()).unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn name_substring_is_case_sensitive() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("java".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "java-maven");

        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("Java".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn tag_intersection() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                tags: Some(vec!["go".to_string(), "unknown".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "go");
    }

    #[test]
    fn empty_architecture_set_matches_any_request() {
        // "go" declares no architectures at all, so it runs everywhere.
        let matched = filter(
            &snapshot(),
            &FilterParams {
                architectures: Some(vec!["s390x".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "go");
    }

    #[test]
    fn architecture_union_covers_version_level_sets() {
        // java-maven declares amd64 at the entry and arm64 on its version.
        let matched = filter(
            &snapshot(),
            &FilterParams {
                architectures: Some(vec!["arm64".to_string()]),
                name: Some("java".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("go".to_string()),
                min_version: Some("1.1.0".to_string()),
                max_version: Some("1.1.0".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].versions.len(), 1);
        assert_eq!(matched[0].versions[0].version, Version::new(1, 1, 0));

        // Default selection runs over the narrowed list.
        let resolved = resolve(&matched[0].versions, &Selector::Default).unwrap();
        assert_eq!(resolved.version, Version::new(1, 1, 0));
    }

    #[test]
    fn schema_range_narrows_then_latest_picks_older_release() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("go".to_string()),
                max_schema_version: Some("2.0.0".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        let resolved = resolve(&matched[0].versions, &Selector::Latest).unwrap();
        assert_eq!(resolved.version, Version::new(1, 1, 0));
    }

    #[test]
    fn range_excluding_all_versions_excludes_the_entry() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("go".to_string()),
                min_version: Some("9.0.0".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn default_flag_narrows_versions() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                default: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 2);
        for entry in &matched {
            assert!(entry.versions.iter().all(|v| v.default));
        }
    }

    #[test]
    fn malformed_bound_is_a_caller_error() {
        let result = filter(
            &snapshot(),
            &FilterParams {
                max_schema_version: Some("2.0.0.0".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(IndexError::InvalidSelector { .. })));
    }

    #[test]
    fn inverted_bounds_are_a_caller_error() {
        let result = filter(
            &snapshot(),
            &FilterParams {
                min_version: Some("2.0.0".to_string()),
                max_version: Some("1.0.0".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(IndexError::InvalidRange { .. })));
    }

    #[test]
    fn partial_bounds_are_padded() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                name: Some("go".to_string()),
                max_schema_version: Some("2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        // 2 pads to 2.0.0, keeping the two schemaVersion 2.0.0 records.
        assert_eq!(matched[0].versions.len(), 2);
    }

    #[test]
    fn command_groups_match_over_version_union() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                command_groups: Some(vec!["debug".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matched.is_empty());

        let matched = filter(
            &snapshot(),
            &FilterParams {
                command_groups: Some(vec!["run".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn git_predicates_require_a_git_source() {
        let matched = filter(
            &snapshot(),
            &FilterParams {
                git_url: Some("github".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matched.is_empty());

        let mut entries = vec![stack("go", &[], vec![record("1.0.0", "2.0.0", true, &[])])];
        entries[0].git = Some(crate::schema::GitSource {
            remotes: HashMap::from([(
                "origin".to_string(),
                "https://github.com/example/go".to_string(),
            )]),
            url: Some("https://github.com/example/go".to_string()),
            ..Default::default()
        });
        let matched = filter(
            &IndexSnapshot::from_entries(entries),
            &FilterParams {
                git_url: Some("github".to_string()),
                git_remote_names: Some(vec!["origin".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn filter_is_idempotent() {
        let params = FilterParams {
            max_schema_version: Some("2.0.0".to_string()),
            tags: Some(vec!["go".to_string()]),
            ..Default::default()
        };
        let once = filter(&snapshot(), &params).unwrap();
        let twice = filter(&IndexSnapshot::from_entries(once.clone()), &params).unwrap();
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn type_partition_filter() {
        let mut entries = vec![
            stack("go", &[], vec![record("1.0.0", "2.0.0", true, &[])]),
        ];
        let mut sample = stack("code-with-quarkus", &[], Vec::new());
        sample.entry_type = EntryType::Sample;
        entries.push(sample);

        let matched = filter(
            &IndexSnapshot::from_entries(entries),
            &FilterParams {
                entry_type: Some(EntryType::Sample),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "code-with-quarkus");
    }
}
