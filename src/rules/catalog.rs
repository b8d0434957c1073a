//! Catalog cross-check rules plus the pure parsers they rely on.
//!
//! The parsers (`find_api_references`, `extract_versions`,
//! `outdated_versions`) are free functions so the pattern matching can be
//! tested without any rule or catalog in play.

use crate::context::AuditContext;
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};
use crate::rules::Rule;
use regex::Regex;
use std::sync::OnceLock;

fn api_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bAPI\s*(\d{3})\b").expect("api reference pattern"))
}

fn version_res() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?i)\bv(\d+)(?:\.\d+)*\b").expect("version pattern"),
            Regex::new(r"(?i)\bversion\s*(\d+)\b").expect("version-word pattern"),
        ]
    })
}

/// Catalog codes embedded in free text, normalized to `API###`, unique, in
/// first-appearance order.
pub fn find_api_references(text: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for caps in api_ref_re().captures_iter(text) {
        let code = format!("API{}", &caps[1]);
        if !refs.contains(&code) {
            refs.push(code);
        }
    }
    refs
}

/// Major version references found in fix versions and free text, as
/// `v<major>` strings, deduplicated and numerically sorted.
pub fn extract_versions(fix_versions: &[String], text: &str) -> Vec<String> {
    let mut majors: Vec<u64> = Vec::new();
    let mut push = |n: u64| {
        if !majors.contains(&n) {
            majors.push(n);
        }
    };
    for name in fix_versions {
        for caps in version_res()[0].captures_iter(name) {
            if let Ok(n) = caps[1].parse() {
                push(n);
            }
        }
    }
    for re in version_res().iter() {
        for caps in re.captures_iter(text) {
            if let Ok(n) = caps[1].parse() {
                push(n);
            }
        }
    }
    majors.sort_unstable();
    majors.into_iter().map(|n| format!("v{}", n)).collect()
}

/// Versions numerically lower than `latest` (itself a `v<major>` string).
/// Returns nothing when `latest` has no parsable major.
pub fn outdated_versions(versions: &[String], latest: &str) -> Vec<String> {
    let latest_major = match version_res()[0]
        .captures(latest)
        .and_then(|c| c[1].parse::<u64>().ok())
    {
        Some(n) => n,
        None => return Vec::new(),
    };
    versions
        .iter()
        .filter(|v| {
            version_res()[0]
                .captures(v)
                .and_then(|c| c[1].parse::<u64>().ok())
                .map(|n| n < latest_major)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn search_text(issue: &Issue) -> String {
    format!(
        "{} {}",
        issue.summary.as_deref().unwrap_or_default(),
        issue.description.as_deref().unwrap_or_default()
    )
}

/// Referenced catalog APIs must exist and not be pinned to outdated versions.
pub struct ApiVersionRule;

impl Rule for ApiVersionRule {
    fn name(&self) -> &'static str {
        "ApiVersionRule"
    }

    fn category(&self) -> Category {
        Category::Business
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that referenced catalog APIs use current versions"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        !find_api_references(&search_text(issue)).is_empty()
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let text = search_text(issue);
        let mut results = Vec::new();
        for code in find_api_references(&text) {
            let entry = match ctx.catalog.lookup(&code) {
                Some(e) => e,
                None => {
                    results.push(RuleResult::fail(
                        self.name(),
                        &issue.key,
                        self.severity(),
                        format!("Referenced API '{}' not found in catalog", code),
                    ));
                    continue;
                }
            };
            let latest = match entry.latest_version.as_deref() {
                Some(v) => v,
                None => {
                    results.push(RuleResult::pass(
                        self.name(),
                        &issue.key,
                        format!("References {}; catalog has no version information", code),
                    ));
                    continue;
                }
            };
            let versions = extract_versions(&issue.fix_versions, &text);
            let outdated = outdated_versions(&versions, latest);
            if !outdated.is_empty() {
                results.push(
                    RuleResult::fail(
                        self.name(),
                        &issue.key,
                        self.severity(),
                        format!(
                            "Issue references {} ({}) with version(s) {} but latest available is {}",
                            code,
                            entry.long_name,
                            outdated.join(", "),
                            latest
                        ),
                    )
                    .with_suggestion(format!("Consider updating to use current version {}", latest)),
                );
            } else if versions.is_empty() {
                results.push(
                    RuleResult::fail(
                        self.name(),
                        &issue.key,
                        Severity::Info,
                        format!(
                            "Issue references {} ({}) but doesn't specify version. Latest available is {}",
                            code, entry.long_name, latest
                        ),
                    )
                    .with_suggestion(format!("Consider specifying version {} for clarity", latest)),
                );
            } else {
                results.push(RuleResult::pass(
                    self.name(),
                    &issue.key,
                    format!("References {} at a current version (latest {})", code, latest),
                ));
            }
        }
        Ok(results)
    }
}

/// Informational lookups for referenced catalog APIs.
pub struct ApiReferenceRule;

impl Rule for ApiReferenceRule {
    fn name(&self) -> &'static str {
        "ApiReferenceRule"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &'static str {
        "Report catalog information for referenced APIs"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        !find_api_references(&search_text(issue)).is_empty()
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        // Prefer title references; fall back to the description.
        let mut refs = find_api_references(issue.summary.as_deref().unwrap_or_default());
        if refs.is_empty() {
            refs = find_api_references(issue.description.as_deref().unwrap_or_default());
        }

        let mut results = Vec::new();
        for code in refs {
            match ctx.catalog.lookup(&code) {
                Some(entry) => {
                    let mut message = format!("References {}: {}", code, entry.long_name);
                    if let Some(latest) = entry.latest_version.as_deref() {
                        message.push_str(&format!(" (Latest: {})", latest));
                    }
                    let mut result = RuleResult::pass(self.name(), &issue.key, message);
                    if let Some(url) = entry.url.as_deref() {
                        result = result.with_suggestion(format!("Documentation: {}", url));
                    }
                    results.push(result);
                }
                None => {
                    results.push(RuleResult::fail(
                        self.name(),
                        &issue.key,
                        Severity::Warning,
                        format!("References {}: not found in catalog", code),
                    ));
                }
            }
        }
        Ok(results)
    }
}
