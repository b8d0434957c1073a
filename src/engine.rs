//! Rule engine: loads the configured rule set and runs it against issues.
//!
//! Execution order is the registry order, so output is reproducible for a
//! fixed configuration. A rule returning an error is folded into a single
//! synthetic ERROR result; it never stops the remaining rules.

use crate::config::RulesConfig;
use crate::context::AuditContext;
use crate::models::issue::Issue;
use crate::models::{AuditResult, IssueReport, RuleResult, Severity};
use crate::rules::{registry, Rule};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Engine over a loaded, read-only rule list.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

#[derive(Debug, Clone, Serialize)]
/// Rule-catalog summary for diagnostic display.
pub struct EngineSummary {
    pub total_rules: usize,
    pub enabled_rules: usize,
    pub by_category: BTreeMap<String, Vec<String>>,
    pub loaded_rules: Vec<String>,
}

impl RuleEngine {
    /// Load every known rule whose name is not explicitly disabled.
    /// Unknown or missing config entries default to enabled.
    pub fn new(config: &RulesConfig) -> Self {
        let rules = registry()
            .into_iter()
            .filter(|r| config.is_enabled(r.name()))
            .collect();
        RuleEngine { rules }
    }

    /// Engine over an explicit rule list, mainly for tests.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        RuleEngine { rules }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all applicable rules against one issue.
    ///
    /// Rules run in load order; a failing rule contributes exactly one
    /// ERROR-severity result carrying its message and the issue key.
    pub fn run_rules(&self, issue: &Issue, ctx: &AuditContext) -> Vec<RuleResult> {
        let mut all = Vec::new();
        for rule in &self.rules {
            if !rule.is_applicable(issue) {
                continue;
            }
            match rule.check(issue, ctx) {
                Ok(mut results) => all.append(&mut results),
                Err(err) => {
                    all.push(RuleResult::fail(
                        rule.name(),
                        &issue.key,
                        Severity::Error,
                        format!("Rule execution failed: {}", err),
                    ));
                }
            }
        }
        all
    }

    /// Audit a batch of issues, one worker per issue. Rules share no
    /// writable state, so the fan-out needs no locking; report order
    /// matches input order.
    pub fn audit_batch(&self, issues: &[Issue], ctx: &AuditContext) -> AuditResult {
        let reports: Vec<IssueReport> = issues
            .par_iter()
            .map(|issue| IssueReport {
                key: issue.key.clone(),
                results: self.run_rules(issue, ctx),
            })
            .collect();
        AuditResult::new(reports)
    }

    /// Catalog summary: totals plus rule names grouped by category.
    pub fn summary(&self) -> EngineSummary {
        let mut by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for rule in &self.rules {
            by_category
                .entry(rule.category().as_str().to_string())
                .or_default()
                .push(rule.name().to_string());
        }
        EngineSummary {
            total_rules: registry().len(),
            enabled_rules: self.rules.len(),
            by_category,
            loaded_rules: self.rules.iter().map(|r| r.name().to_string()).collect(),
        }
    }
}
