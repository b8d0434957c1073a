//! Business and planning rules: priority hygiene.

use crate::context::{AuditContext, HIGH_PRIORITIES};
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};
use crate::rules::Rule;
use crate::utils::{days_since, parse_flexible_date};

/// High-priority issues must show recent activity.
pub struct HighPriorityStaleRule;

impl Rule for HighPriorityStaleRule {
    fn name(&self) -> &'static str {
        "HighPriorityStaleRule"
    }

    fn category(&self) -> Category {
        Category::Business
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Check that high priority issues are not stale"
    }

    fn is_applicable(&self, issue: &Issue) -> bool {
        issue
            .priority
            .as_deref()
            .map(|p| HIGH_PRIORITIES.contains(&p.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        let updated = match issue.updated.as_deref() {
            Some(u) if !u.trim().is_empty() => u,
            _ => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    self.severity(),
                    format!(
                        "High priority issue [{}] has no update timestamp",
                        issue.key
                    ),
                )
                .with_suggestion("Verify issue status and update immediately")]);
            }
        };

        let updated_at = match parse_flexible_date(updated) {
            Some(dt) => dt,
            None => {
                return Ok(vec![RuleResult::fail(
                    self.name(),
                    &issue.key,
                    Severity::Warning,
                    format!(
                        "Issue [{}] has invalid update date format: {}",
                        issue.key, updated
                    ),
                )]);
            }
        };

        let limit = ctx.thresholds.high_priority_stale_days;
        let days = days_since(ctx.now, updated_at);
        if days > limit {
            return Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "High priority issue [{}] not updated in {} days",
                    issue.key, days
                ),
            )
            .with_suggestion(
                "High priority issues should be updated weekly - review and update status",
            )]);
        }
        Ok(vec![RuleResult::pass(
            self.name(),
            &issue.key,
            format!("High priority issue updated {} days ago (acceptable)", days),
        )])
    }
}

/// Every issue should declare a priority.
pub struct MissingPriorityRule;

impl Rule for MissingPriorityRule {
    fn name(&self) -> &'static str {
        "MissingPriorityRule"
    }

    fn category(&self) -> Category {
        Category::Business
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Check that the issue has a priority set"
    }

    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError> {
        match issue.priority.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(vec![RuleResult::pass(
                self.name(),
                &issue.key,
                format!("Priority: {}", p),
            )]),
            _ => Ok(vec![RuleResult::fail(
                self.name(),
                &issue.key,
                self.severity(),
                format!(
                    "{} [{}] has no priority set",
                    ctx.kind_for(issue),
                    issue.key
                ),
            )
            .with_suggestion(
                "Set appropriate priority to help with planning and resource allocation",
            )]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::detached_context;
    use crate::utils::parse_flexible_date;

    fn now() -> chrono::NaiveDateTime {
        parse_flexible_date("2024-06-30T12:00:00").unwrap()
    }

    fn issue() -> Issue {
        Issue {
            key: "AP-40".into(),
            ..Issue::default()
        }
    }

    #[test]
    fn test_high_priority_applicability() {
        let rule = HighPriorityStaleRule;
        let mut i = issue();
        assert!(!rule.is_applicable(&i));
        i.priority = Some("Medium".into());
        assert!(!rule.is_applicable(&i));
        for p in ["High", "highest", "Critical", "Blocker"] {
            i.priority = Some(p.into());
            assert!(rule.is_applicable(&i), "{}", p);
        }
    }

    #[test]
    fn test_high_priority_weekly_window() {
        let ctx = detached_context().with_now(now());
        let rule = HighPriorityStaleRule;
        let mut i = issue();
        i.priority = Some("High".into());

        i.updated = Some("2024-06-10".into()); // 20 days
        let results = rule.check(&i, &ctx).unwrap();
        assert!(!results[0].passed);
        assert_eq!(results[0].severity, Severity::Error);

        i.updated = Some("2024-06-27".into()); // 3 days
        let results = rule.check(&i, &ctx).unwrap();
        assert!(results[0].passed);
    }

    #[test]
    fn test_high_priority_missing_timestamp_fails() {
        let ctx = detached_context().with_now(now());
        let rule = HighPriorityStaleRule;
        let mut i = issue();
        i.priority = Some("Blocker".into());
        let results = rule.check(&i, &ctx).unwrap();
        assert!(!results[0].passed);
        assert!(results[0].message.contains("no update timestamp"));
    }

    #[test]
    fn test_missing_priority() {
        let ctx = detached_context().with_issue_kind("Epic");
        let rule = MissingPriorityRule;
        let results = rule.check(&issue(), &ctx).unwrap();
        assert!(!results[0].passed);
        assert!(results[0].message.contains("Epic [AP-40]"));

        let mut i = issue();
        i.priority = Some("Low".into());
        let results = rule.check(&i, &ctx).unwrap();
        assert!(results[0].passed);
        assert_eq!(results[0].message, "Priority: Low");
    }
}
