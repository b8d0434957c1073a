//! Configuration discovery and effective settings resolution.
//!
//! Tracklint reads `tracklint.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `output`: `human`
//! - `[audit]` patterns: none (the audit command requires at least one)
//! - `[audit].issue_kind`: unset (falls back to "issue" per batch)
//! - `[rules]`: every rule enabled
//! - `[thresholds]`: the built-in limits
//! - `[query].allowed_projects`: `["AP"]`, `max_query_length`: 1000,
//!   `strict`: true
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::context::Thresholds;
use crate::jql::DEFAULT_FIELDS;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Per-rule toggle under `[rules.<Name>]`.
pub struct RuleToggle {
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(transparent)]
/// Enable/disable map keyed by rule name. Absent entries default to enabled.
pub struct RulesConfig(pub HashMap<String, RuleToggle>);

impl RulesConfig {
    pub fn is_enabled(&self, rule_name: &str) -> bool {
        self.0
            .get(rule_name)
            .and_then(|t| t.enabled)
            .unwrap_or(true)
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Audit input configuration under `[audit]`.
pub struct AuditCfg {
    /// Glob patterns selecting exported issue JSON files.
    pub patterns: Option<Vec<String>>,
    /// Logical kind of the audited batch (e.g. "Epic").
    pub issue_kind: Option<String>,
    /// Known-valid component names for suggestions.
    pub components: Option<Vec<String>>,
    /// Path to the reference catalog JSON, relative to the repo root.
    pub catalog: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Numeric overrides under `[thresholds]`.
pub struct ThresholdsCfg {
    pub stale_days: Option<i64>,
    pub long_running_days: Option<i64>,
    pub min_description_length: Option<usize>,
    pub legacy_version_threshold: Option<f64>,
    pub high_priority_stale_days: Option<i64>,
    pub in_progress_default_days: Option<i64>,
}

impl ThresholdsCfg {
    /// Apply overrides on top of the built-in defaults.
    pub fn resolve(&self) -> Thresholds {
        let d = Thresholds::default();
        Thresholds {
            stale_days: self.stale_days.unwrap_or(d.stale_days),
            long_running_days: self.long_running_days.unwrap_or(d.long_running_days),
            min_description_length: self
                .min_description_length
                .unwrap_or(d.min_description_length),
            legacy_version_threshold: self
                .legacy_version_threshold
                .unwrap_or(d.legacy_version_threshold),
            high_priority_stale_days: self
                .high_priority_stale_days
                .unwrap_or(d.high_priority_stale_days),
            in_progress_default_days: self
                .in_progress_default_days
                .unwrap_or(d.in_progress_default_days),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Query validator configuration under `[query]`.
pub struct QueryCfg {
    pub allowed_projects: Option<Vec<String>>,
    pub allowed_fields: Option<Vec<String>>,
    pub max_query_length: Option<usize>,
    pub strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `tracklint.toml|yaml`.
pub struct TracklintConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub audit: Option<AuditCfg>,
    #[serde(default)]
    pub rules: Option<RulesConfig>,
    #[serde(default)]
    pub thresholds: Option<ThresholdsCfg>,
    #[serde(default)]
    pub query: Option<QueryCfg>,
}

#[derive(Debug, Clone)]
/// Resolved query validator settings.
pub struct QueryEffective {
    pub allowed_projects: Vec<String>,
    pub allowed_fields: Vec<String>,
    pub max_query_length: usize,
    pub strict: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub output: String,
    pub patterns: Vec<String>,
    pub issue_kind: Option<String>,
    pub components: Vec<String>,
    pub catalog: Option<String>,
    pub rules: RulesConfig,
    pub thresholds: Thresholds,
    pub query: QueryEffective,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `tracklint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("tracklint.toml").exists()
            || cur.join("tracklint.yaml").exists()
            || cur.join("tracklint.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `TracklintConfig` from `tracklint.toml` or `tracklint.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<TracklintConfig> {
    let toml_path = root.join("tracklint.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: TracklintConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["tracklint.yaml", "tracklint.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: TracklintConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_patterns: &[String],
    cli_kind: Option<&str>,
    cli_strict: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let audit = cfg.audit.unwrap_or_default();
    let patterns = if cli_patterns.is_empty() {
        audit.patterns.unwrap_or_default()
    } else {
        cli_patterns.to_vec()
    };
    let issue_kind = cli_kind.map(|s| s.to_string()).or(audit.issue_kind);

    let query_cfg = cfg.query.unwrap_or_default();
    let query = QueryEffective {
        allowed_projects: query_cfg
            .allowed_projects
            .unwrap_or_else(|| vec!["AP".to_string()]),
        allowed_fields: query_cfg
            .allowed_fields
            .unwrap_or_else(|| DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect()),
        max_query_length: query_cfg.max_query_length.unwrap_or(1000),
        strict: cli_strict.or(query_cfg.strict).unwrap_or(true),
    };

    Effective {
        repo_root,
        output,
        patterns,
        issue_kind,
        components: audit.components.unwrap_or_default(),
        catalog: audit.catalog,
        rules: cfg.rules.unwrap_or_default(),
        thresholds: cfg.thresholds.unwrap_or_default().resolve(),
        query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tracklint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[audit]
patterns = ["exports/*.json"]
issue_kind = "Epic"
components = ["Appointment 646"]
[thresholds]
stale_days = 90
[query]
allowed_projects = ["AP", "OPS"]
strict = false
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, &[], None, None);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.patterns, vec!["exports/*.json"]);
        assert_eq!(eff.issue_kind.as_deref(), Some("Epic"));
        assert_eq!(eff.components, vec!["Appointment 646"]);
        assert_eq!(eff.thresholds.stale_days, 90);
        // Unset thresholds keep defaults.
        assert_eq!(eff.thresholds.long_running_days, 365);
        assert_eq!(eff.query.allowed_projects, vec!["AP", "OPS"]);
        assert!(!eff.query.strict);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tracklint.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output: human
audit:
  patterns:
    - issues/*.json
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, &[], None, None);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.patterns, vec!["issues/*.json"]);
        // Query defaults when [query] is absent.
        assert_eq!(eff.query.allowed_projects, vec!["AP"]);
        assert_eq!(eff.query.max_query_length, 1000);
        assert!(eff.query.strict);
        assert!(eff.rules.is_enabled("StaleIssueRule"));
    }

    #[test]
    fn test_cli_precedence_over_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tracklint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[audit]
patterns = ["exports/*.json"]
issue_kind = "Epic"
[query]
strict = true
            "#
        )
        .unwrap();

        let cli_patterns = vec!["other/*.json".to_string()];
        let eff = resolve_effective(
            root.to_str(),
            Some("human"),
            &cli_patterns,
            Some("Story"),
            Some(false),
        );
        assert_eq!(eff.output, "human");
        assert_eq!(eff.patterns, vec!["other/*.json"]);
        assert_eq!(eff.issue_kind.as_deref(), Some("Story"));
        assert!(!eff.query.strict);
    }

    #[test]
    fn test_rule_toggles_loaded() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tracklint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
[rules.StaleIssueRule]
enabled = false
[rules.MissingPriorityRule]
enabled = true
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, &[], None, None);
        assert!(!eff.rules.is_enabled("StaleIssueRule"));
        assert!(eff.rules.is_enabled("MissingPriorityRule"));
        // Unknown entries default to enabled.
        assert!(eff.rules.is_enabled("MissingDescriptionRule"));
    }
}
