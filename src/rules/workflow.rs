//! Workflow and timeline rules: staleness, time-in-progress, relationships.

use crate::context::{is_active_status, AuditContext};
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};
use crate::rules::Rule;
use crate::utils::{date_prefix, days_since, parse_flexible_date};

const PARENT_LINK_TYPES: [&str; 3] = ["parent", "parent of", "subtask of"];
const CHILD_LINK_TYPES: [&str; 3] = ["subtask", "sub-task of", "child of"];

/// Issues not updated within the staleness window.
pub struct StaleIssueRule;

impl Rule for StaleIssueRule {
    fn name(&self) -> &'static str {
        "StaleIssueRule"
    }

    fn category(&self) -> Category {
        Category::Workflow
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has been updated recently"
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let kind = ctx.kind_for(issue);
        let updated = match issue.updated.as_deref() {
            Some(u) if !u.trim().is_empty() => u,
            _ => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    self.severity(),
                    format!("{} [{}] has no update timestamp", kind.to_uppercase(), issue.key),
                )
                .with_suggestion(format!(
                    "Verify {} status and update if necessary",
                    kind.to_lowercase()
                ))]);
            }
        };

        let stale_days = ctx.thresholds.stale_days;
        let updated_at = match parse_flexible_date(updated) {
            Some(dt) => dt,
            None => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    Severity::Warning,
                    format!(
                        "{} [{}] has invalid update date format: {}",
                        kind.to_uppercase(),
                        issue.key,
                        updated
                    ),
                )]);
            }
        };

        let days = days_since(ctx.now, updated_at);
        if days > stale_days {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "{} [{}] has not been updated in {} days (since {})",
                    kind.to_uppercase(),
                    issue.key,
                    days,
                    date_prefix(updated)
                ),
            )
            .with_suggestion(format!(
                "Review and update {} status - no activity for over {} days",
                kind.to_lowercase(),
                stale_days
            ))]);
        }

        let message = if days <= 0 {
            "Updated today".to_string()
        } else if days == 1 {
            "Updated 1 day ago".to_string()
        } else {
            format!("Updated {} days ago", days)
        };
        Ok(vec![RuleResult::pass(self.name(), &issue.key, message)])
    }
}

/// In-progress issues older than the long-running window.
pub struct LongRunningRule;

impl Rule for LongRunningRule {
    fn name(&self) -> &'static str {
        "LongRunningRule"
    }

    fn category(&self) -> Category {
        Category::Workflow
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has not been in progress for too long"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        issue
            .status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("in progress"))
            .unwrap_or(false)
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let kind = ctx.kind_for(issue);
        let created = match issue.created.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    self.severity(),
                    format!(
                        "{} [{}] has no creation timestamp",
                        kind.to_uppercase(),
                        issue.key
                    ),
                )]);
            }
        };

        let limit = ctx.thresholds.long_running_days;
        let created_at = match parse_flexible_date(created) {
            Some(dt) => dt,
            None => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    Severity::Warning,
                    format!(
                        "{} [{}] has invalid creation date format: {}",
                        kind.to_uppercase(),
                        issue.key,
                        created
                    ),
                )]);
            }
        };

        let days = days_since(ctx.now, created_at);
        if days > limit {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "{} [{}] has been 'In Progress' for {} days (created {})",
                    kind.to_uppercase(),
                    issue.key,
                    days,
                    date_prefix(created)
                ),
            )
            .with_suggestion(format!(
                "Review {} scope - in progress for over {} days. Consider breaking into smaller items.",
                kind.to_lowercase(),
                limit
            ))]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("In progress for {} days (reasonable timeframe)", days),
        )])
    }
}

/// Kind-aware in-progress limit over every active workflow state.
pub struct InProgressTooLongRule;

impl Rule for InProgressTooLongRule {
    fn name(&self) -> &'static str {
        "InProgressTooLongRule"
    }

    fn category(&self) -> Category {
        Category::Workflow
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has not been in progress too long for its kind"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        is_active_status(issue.status.as_deref())
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let kind = ctx.kind_for(issue);
        let created = match issue.created.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                return Ok(vec![RuleResult::pass(
                    self.name(),
                    &issue.key,
                    "No creation timestamp to evaluate",
                )]);
            }
        };

        let limit = ctx.thresholds.in_progress_days(&kind);
        let created_at = match parse_flexible_date(created) {
            Some(dt) => dt,
            None => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    Severity::Warning,
                    format!(
                        "Issue [{}] has invalid creation date format: {}",
                        issue.key, created
                    ),
                )]);
            }
        };

        let days = days_since(ctx.now, created_at);
        if days > limit {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "{} [{}] in progress for {} days (>{} day threshold)",
                    kind, issue.key, days, limit
                ),
            )
            .with_suggestion(format!(
                "Review {} scope and progress - consider breaking down or reassigning",
                kind.to_lowercase()
            ))]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("In progress for {} days (within {} day threshold)", days, limit),
        )])
    }
}

/// Parent/child relationship hygiene for Sub-tasks and Stories.
pub struct SubTaskOrphanRule;

impl SubTaskOrphanRule {
    fn has_link_of(issue: &Issue, kinds: &[&str]) -> bool {
        issue
            .links
            .iter()
            .any(|l| kinds.contains(&l.link_type.to_lowercase().as_str()))
    }
}

impl Rule for SubTaskOrphanRule {
    fn name(&self) -> &'static str {
        "SubTaskOrphanRule"
    }

    fn category(&self) -> Category {
        Category::Workflow
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Check parent-child relationships for sub-tasks and stories"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        matches!(issue.issue_type.as_deref(), Some("Sub-task") | Some("Story"))
    }

    fn check(&self, issue: &Issue, _ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let kind = issue.issue_type.as_deref().unwrap_or_default();

        if kind == "Sub-task" && !Self::has_link_of(issue, &PARENT_LINK_TYPES) {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!("Sub-task [{}] has no parent issue", issue.key),
            )
            .with_suggestion("Link this sub-task to its parent Story or Epic")]);
        }

        if kind == "Story" {
            let description_len = issue
                .description
                .as_deref()
                .map(|d| d.chars().count())
                .unwrap_or(0);
            let large = issue.components.len() > 2 || description_len > 500;
            if large && !Self::has_link_of(issue, &CHILD_LINK_TYPES) {
                // A suggestion, not a violation.
                return Ok(vec![RuleResult::pass(
                    self.name(),
                    &issue.key,
                    format!("Large Story [{}] might benefit from sub-tasks", issue.key),
                )
                .with_suggestion(
                    "Consider breaking this large story into smaller sub-tasks for better tracking",
                )]);
            }
        }

        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("{} relationships look good", kind),
        )])
    }
}

/// Epics should coordinate at least one linked work item.
pub struct NoLinkedIssuesRule;

impl Rule for NoLinkedIssuesRule {
    fn name(&self) -> &'static str {
        "NoLinkedIssuesRule"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that epics have linked issues or child items"
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let kind = ctx.kind_for(issue);
        if !kind.eq_ignore_ascii_case("epic") {
            return Ok(Vec::new());
        }
        if issue.links.is_empty() {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!("EPIC [{}] has no linked issues", issue.key),
            )
            .with_suggestion("Link related stories, tasks, or bugs to this epic")]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("Has {} linked issues", issue.links.len()),
        )])
    }
}
