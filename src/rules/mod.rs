//! Rule capability trait and the static rule registry.
//!
//! Every data-quality check implements `Rule`. The registry is a compiled-in
//! list of constructors, so the active rule set is enumerable, deterministic,
//! and testable without any runtime discovery.

pub mod assignment;
pub mod business;
pub mod catalog;
pub mod metadata;
pub mod workflow;

use crate::context::AuditContext;
use crate::error::RuleError;
use crate::models::issue::Issue;
use crate::models::{Category, RuleResult, Severity};

/// One independent, named policy check over an issue.
///
/// Rules are stateless across invocations; a single instance is reused for
/// every record in a batch and must not retain per-record state. `check`
/// returns its findings or an explicit error; the engine converts errors
/// into synthetic ERROR results so one bad rule never aborts a batch.
pub trait Rule: Send + Sync {
    /// Stable identity, used in configuration and output.
    fn name(&self) -> &'static str;
    fn category(&self) -> Category;
    /// Default severity for this rule's violations.
    fn severity(&self) -> Severity;
    fn description(&self) -> &'static str;
    /// Whether this rule applies to the given issue at all.
    fn is_applicable(&self, _issue: &Issue) -> bool {
        true
    }
    fn check(&self, issue: &Issue, ctx: &AuditContext) -> Result<Vec<RuleResult>, RuleError>;
}

/// All known rules in their fixed execution order.
pub fn registry() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(assignment::UnassignedInProgressRule),
        Box::new(assignment::InactiveAssigneeRule),
        Box::new(metadata::MissingComponentsRule),
        Box::new(metadata::MissingFixVersionRule),
        Box::new(metadata::LegacyFixVersionRule),
        Box::new(metadata::MissingDescriptionRule),
        Box::new(workflow::StaleIssueRule),
        Box::new(workflow::LongRunningRule),
        Box::new(workflow::InProgressTooLongRule),
        Box::new(workflow::SubTaskOrphanRule),
        Box::new(workflow::NoLinkedIssuesRule),
        Box::new(business::HighPriorityStaleRule),
        Box::new(business::MissingPriorityRule),
        Box::new(catalog::ApiVersionRule),
        Box::new(catalog::ApiReferenceRule),
    ]
}
