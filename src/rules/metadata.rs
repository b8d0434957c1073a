//! Metadata and content rules: components, fix versions, descriptions.

use crate::context::AuditContext;
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};
use crate::rules::catalog::find_api_references;
use crate::rules::Rule;

/// Issues should carry at least one component.
///
/// When the title embeds a catalog code, the failure suggestion proposes
/// components whose names contain the code's digits.
pub struct MissingComponentsRule;

impl Rule for MissingComponentsRule {
    fn name(&self) -> &'static str {
        "MissingComponentsRule"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has components assigned"
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        if !issue.components.is_empty() {
            return Ok(vec![RuleResult::pass(
                self.name(),
                &issue.key,
                format!(
                    "Has {} components: {}",
                    issue.components.len(),
                    issue.components.join(", ")
                ),
            )]);
        }

        let title = issue.summary.as_deref().unwrap_or_default();
        let suggestion = match find_api_references(title).first() {
            Some(code) => {
                let digits = code.trim_start_matches(|c: char| !c.is_ascii_digit());
                let matching: Vec<&str> = ctx
                    .components
                    .iter()
                    .filter(|name| !name.is_empty() && name.contains(digits))
                    .map(String::as_str)
                    .collect();
                if matching.is_empty() {
                    format!("No matching components found for code {}", code)
                } else {
                    format!("Consider adding component(s): {}", matching.join(", "))
                }
            }
            None => "Add relevant component(s) to categorize this issue".to_string(),
        };

        Ok(vec![RuleResult::fail(
            self.name(),
            &issue.key,
            self.severity(),
            format!("Issue [{}] has no components set", issue.key),
        )
        .with_suggestion(suggestion)])
    }
}

/// Issues should target at least one release.
pub struct MissingFixVersionRule;

impl Rule for MissingFixVersionRule {
    fn name(&self) -> &'static str {
        "MissingFixVersionRule"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has a fix version set"
    }

    fn check(&self, issue: &Issue, _ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        if issue.fix_versions.is_empty() {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!("Issue [{}] has no FixVersion set", issue.key),
            )
            .with_suggestion("Set a target release version for this issue")]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("FixVersion(s): {}", issue.fix_versions.join(", ")),
        )])
    }
}

/// Fix versions below the legacy cutoff get flagged, one result per value.
pub struct LegacyFixVersionRule;

impl LegacyFixVersionRule {
    /// Major release number of a version string: leading non-digits are
    /// stripped, the portion before the first `.` is parsed as f64.
    fn major_version(name: &str) -> Option<f64> {
        let cleaned = name.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
        let major = cleaned.split('.').next().unwrap_or(cleaned);
        major.parse::<f64>().ok()
    }
}

impl Rule for LegacyFixVersionRule {
    fn name(&self) -> &'static str {
        "LegacyFixVersionRule"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that fix versions are not below the legacy cutoff"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        // The empty case belongs to MissingFixVersionRule.
        !issue.fix_versions.is_empty()
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let cutoff = ctx.thresholds.legacy_version_threshold;
        let mut results = Vec::new();
        for version in &issue.fix_versions {
            match Self::major_version(version) {
                Some(major) if major < cutoff => {
                    results.push(
                        RuleResult::fail(
                            self.name(),
                            &issue.key,
                            self.severity(),
                            format!(
                                "Issue [{}] has legacy FixVersion {} (< {})",
                                issue.key, version, cutoff
                            ),
                        )
                        .with_suggestion("Consider updating to a current release version"),
                    );
                }
                Some(_) => {
                    results.push(RuleResult::pass(
                        self.name(),
                        &issue.key,
                        format!("FixVersion {} is current", version),
                    ));
                }
                None => {
                    results.push(RuleResult::pass(
                        self.name(),
                        &issue.key,
                        format!("FixVersion {} format could not be validated", version),
                    ));
                }
            }
        }
        Ok(results)
    }
}

/// Issues need a description, and not a token one.
pub struct MissingDescriptionRule;

impl Rule for MissingDescriptionRule {
    fn name(&self) -> &'static str {
        "MissingDescriptionRule"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has a meaningful description"
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let text = issue
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if text.is_empty() {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!("Issue [{}] has no description", issue.key),
            )
            .with_suggestion(
                "Add a clear description explaining the issue's purpose and acceptance criteria",
            )]);
        }
        let min = ctx.thresholds.min_description_length;
        if text.chars().count() < min {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "Issue [{}] has a very short description ({} chars)",
                    issue.key,
                    text.chars().count()
                ),
            )
            .with_suggestion(format!(
                "Expand description to at least {} characters with clear details",
                min
            ))]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("Has description ({} characters)", text.chars().count()),
        )])
    }
}
