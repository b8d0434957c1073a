//! Shared data models: severities, categories, rule results, and summaries.

pub mod issue;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Severity ranking of a finding. Ordering follows declaration order, so
/// `Critical` compares highest.
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Grouping tag for related rules.
pub enum Category {
    Assignment,
    Metadata,
    Workflow,
    Business,
    Content,
    Performance,
    Compliance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Assignment => "assignment",
            Category::Metadata => "metadata",
            Category::Workflow => "workflow",
            Category::Business => "business",
            Category::Content => "content",
            Category::Performance => "performance",
            Category::Compliance => "compliance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of one rule check against one issue. Created by rules, consumed
/// by printers, never mutated afterwards.
pub struct RuleResult {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub issue_key: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl RuleResult {
    /// A passing, informational result.
    pub fn pass(rule: &str, issue_key: &str, message: impl Into<String>) -> Self {
        RuleResult {
            rule: rule.to_string(),
            severity: Severity::Info,
            message: message.into(),
            issue_key: issue_key.to_string(),
            passed: true,
            suggestion: None,
            timestamp: Utc::now().naive_utc(),
        }
    }

    /// A failing result at the given severity.
    pub fn fail(
        rule: &str,
        issue_key: &str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        RuleResult {
            rule: rule.to_string(),
            severity,
            message: message.into(),
            issue_key: issue_key.to_string(),
            passed: false,
            suggestion: None,
            timestamp: Utc::now().naive_utc(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
/// Findings for one audited issue.
pub struct IssueReport {
    pub key: String,
    pub results: Vec<RuleResult>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregated audit counters used by printers and CI exits.
pub struct AuditSummary {
    pub issues: usize,
    pub checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub criticals: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
/// Audit results container: per-issue reports plus the run summary.
pub struct AuditResult {
    pub reports: Vec<IssueReport>,
    pub summary: AuditSummary,
}

impl AuditResult {
    pub fn new(reports: Vec<IssueReport>) -> Self {
        let summary = summarize(&reports);
        AuditResult { reports, summary }
    }
}

/// Compute run counters over all reports. Failing results are tallied per
/// severity; the pass rate is rounded to one decimal place.
pub fn summarize(reports: &[IssueReport]) -> AuditSummary {
    let mut s = AuditSummary {
        issues: reports.len(),
        ..AuditSummary::default()
    };
    for report in reports {
        for r in &report.results {
            s.checks += 1;
            if r.passed {
                s.passed += 1;
                continue;
            }
            s.failed += 1;
            match r.severity {
                Severity::Info => s.infos += 1,
                Severity::Warning => s.warnings += 1,
                Severity::Error => s.errors += 1,
                Severity::Critical => s.criticals += 1,
            }
        }
    }
    s.pass_rate = if s.checks > 0 {
        (s.passed as f64 * 1000.0 / s.checks as f64).round() / 10.0
    } else {
        0.0
    };
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_and_names() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::Warning.as_str(), "WARNING");
        assert_eq!(Category::Workflow.as_str(), "workflow");
    }

    #[test]
    fn test_summarize_counts_and_pass_rate() {
        let reports = vec![IssueReport {
            key: "AP-1".into(),
            results: vec![
                RuleResult::pass("A", "AP-1", "ok"),
                RuleResult::fail("B", "AP-1", Severity::Warning, "bad"),
                RuleResult::fail("C", "AP-1", Severity::Error, "worse"),
                RuleResult::pass("D", "AP-1", "ok"),
            ],
        }];
        let s = summarize(&reports);
        assert_eq!(s.issues, 1);
        assert_eq!(s.checks, 4);
        assert_eq!(s.passed, 2);
        assert_eq!(s.failed, 2);
        assert_eq!(s.warnings, 1);
        assert_eq!(s.errors, 1);
        assert_eq!(s.pass_rate, 50.0);
    }

    #[test]
    fn test_result_serializes_with_uppercase_severity() {
        let r = RuleResult::fail("X", "AP-9", Severity::Critical, "boom")
            .with_suggestion("fix it");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["severity"], "CRITICAL");
        assert_eq!(v["passed"], false);
        assert_eq!(v["suggestion"], "fix it");
    }
}
