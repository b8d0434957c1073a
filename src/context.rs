//! Read-only context shared by every rule during an audit run.
//!
//! Built once per batch and never mutated afterwards; rules only borrow it.
//! Thresholds live in a typed struct so names stay compiler-checked, and the
//! reference catalog is an explicit collaborator rather than a loose map key.

use crate::catalog::{EmptyCatalog, ReferenceCatalog};
use chrono::{NaiveDateTime, Utc};

/// Statuses treated as "actively being worked".
pub const ACTIVE_STATUSES: [&str; 4] = ["in progress", "in development", "in review", "testing"];

/// Priorities treated as high-urgency for business checks.
pub const HIGH_PRIORITIES: [&str; 4] = ["high", "highest", "critical", "blocker"];

/// Returns true when `status` names an active workflow state.
pub fn is_active_status(status: Option<&str>) -> bool {
    match status {
        Some(s) => ACTIVE_STATUSES.contains(&s.to_lowercase().as_str()),
        None => false,
    }
}

#[derive(Debug, Clone)]
/// Numeric limits consulted by rules. All fields have working defaults and
/// can be overridden from `[thresholds]` in the config file.
pub struct Thresholds {
    /// Days without update before an issue counts as stale.
    pub stale_days: i64,
    /// Days since creation before an in-progress issue counts as long-running.
    pub long_running_days: i64,
    /// Minimum acceptable description length in characters.
    pub min_description_length: usize,
    /// Major release number below which a fix version is legacy.
    pub legacy_version_threshold: f64,
    /// Days a high-priority issue may sit without an update.
    pub high_priority_stale_days: i64,
    /// Fallback in-progress limit for kinds without a dedicated entry.
    pub in_progress_default_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            stale_days: 180,
            long_running_days: 365,
            min_description_length: 10,
            legacy_version_threshold: 5.0,
            high_priority_stale_days: 7,
            in_progress_default_days: 30,
        }
    }
}

impl Thresholds {
    /// Kind-aware in-progress limit. Unknown kinds fall back to the default.
    pub fn in_progress_days(&self, kind: &str) -> i64 {
        match kind {
            "Epic" => 365,
            "Story" => 60,
            "Task" => 30,
            "Bug" => 14,
            "Sub-task" => 7,
            _ => self.in_progress_default_days,
        }
    }
}

/// Shared, read-only inputs for one audit batch.
pub struct AuditContext<'a> {
    /// Known-valid component names for suggestion matching.
    pub components: Vec<String>,
    pub thresholds: Thresholds,
    /// Logical record kind for kind-specific checks; "issue" when the
    /// batch has no declared kind.
    pub issue_kind: String,
    /// Evaluation instant, fixed for the whole batch so day arithmetic is
    /// reproducible.
    pub now: NaiveDateTime,
    pub catalog: &'a dyn ReferenceCatalog,
}

impl<'a> AuditContext<'a> {
    pub fn new(catalog: &'a dyn ReferenceCatalog) -> Self {
        AuditContext {
            components: Vec::new(),
            thresholds: Thresholds::default(),
            issue_kind: "issue".to_string(),
            now: Utc::now().naive_utc(),
            catalog,
        }
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = components;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_issue_kind(mut self, kind: impl Into<String>) -> Self {
        self.issue_kind = kind.into();
        self
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Kind used for kind-specific checks: the issue's own type wins,
    /// otherwise the batch-level kind.
    pub fn kind_for(&self, issue: &crate::models::issue::Issue) -> String {
        issue
            .issue_type
            .clone()
            .unwrap_or_else(|| self.issue_kind.clone())
    }
}

/// An `AuditContext` over the empty catalog, for callers without one.
pub fn detached_context() -> AuditContext<'static> {
    static EMPTY: EmptyCatalog = EmptyCatalog;
    AuditContext::new(&EMPTY)
}
