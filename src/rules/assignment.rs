//! Assignment rules: who owns the issue, and whether they still can.

use crate::context::{is_active_status, AuditContext};
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};
use crate::rules::Rule;

/// Actively-worked issues must have an assignee.
pub struct UnassignedInProgressRule;

impl Rule for UnassignedInProgressRule {
    fn name(&self) -> &'static str {
        "UnassignedInProgressRule"
    }

    fn category(&self) -> Category {
        Category::Assignment
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that actively-worked issues are assigned to someone"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        is_active_status(issue.status.as_deref())
    }

    fn check(&self, issue: &Issue, _ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        match issue.effective_assignee() {
            None => Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!("Issue [{}] is in an active state but not assigned to anyone", issue.key),
            )
            .with_suggestion("Assign the issue to the team member responsible for its delivery")]),
            Some(assignee) => Ok(vec![RuleResult::pass(
                self.name(),
                &issue.key,
                format!("Assigned to: {}", assignee),
            )]),
        }
    }
}

/// The assignee must still be an active user in the source system.
pub struct InactiveAssigneeRule;

impl Rule for InactiveAssigneeRule {
    fn name(&self) -> &'static str {
        "InactiveAssigneeRule"
    }

    fn category(&self) -> Category {
        Category::Assignment
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Check that the assignee is an active user"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        issue.effective_assignee().is_some()
    }

    fn check(&self, issue: &Issue, _ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let assignee = issue.effective_assignee().unwrap_or_default();
        if !issue.assignee_active() {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "Issue [{}] is assigned to an inactive user: {}",
                    issue.key, assignee
                ),
            )
            .with_suggestion("Reassign to an active team member")]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("Assignee {} is active", assignee),
        )])
    }
}
