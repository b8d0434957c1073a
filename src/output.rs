//! Output rendering for audit, rules, and jql commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-issue results and a top-level summary. The `compose_*` helpers are
//! pure so the JSON shapes can be snapshot-tested without I/O.

use crate::engine::EngineSummary;
use crate::jql::ValidationOutcome;
use crate::models::{AuditResult, RuleResult, Severity};
use owo_colors::OwoColorize;
use serde_json::{json, Value as JsonVal};

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn severity_tag(severity: Severity, color: bool) -> String {
    match severity {
        Severity::Critical => {
            if color {
                "⟦critical⟧".red().bold().to_string()
            } else {
                "⟦critical⟧".to_string()
            }
        }
        Severity::Error => {
            if color {
                "⟦error⟧".red().bold().to_string()
            } else {
                "⟦error⟧".to_string()
            }
        }
        Severity::Warning => {
            if color {
                "⟦warn⟧".yellow().bold().to_string()
            } else {
                "⟦warn⟧".to_string()
            }
        }
        Severity::Info => {
            if color {
                "⟦info⟧".blue().bold().to_string()
            } else {
                "⟦info⟧".to_string()
            }
        }
    }
}

fn severity_icon(severity: Severity, passed: bool, color: bool) -> String {
    if passed {
        return if color {
            "✔".green().to_string()
        } else {
            "✔".to_string()
        };
    }
    match severity {
        Severity::Critical | Severity::Error => {
            if color {
                "✖".red().to_string()
            } else {
                "✖".to_string()
            }
        }
        Severity::Warning => {
            if color {
                "▲".yellow().to_string()
            } else {
                "▲".to_string()
            }
        }
        Severity::Info => {
            if color {
                "◆".blue().to_string()
            } else {
                "◆".to_string()
            }
        }
    }
}

/// Print audit results in the requested format.
///
/// Human mode groups results per issue, failures first by descending
/// severity; passed checks are hidden unless `show_passed` is set.
pub fn print_audit(res: &AuditResult, output: &str, show_passed: bool) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_audit_json(res)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for report in &res.reports {
                let header = if color {
                    report.key.clone().bold().to_string()
                } else {
                    report.key.clone()
                };
                println!("◇ {}", header);
                for r in ordered_results(&report.results, show_passed) {
                    let tag = severity_tag(r.severity, color);
                    let icon = severity_icon(r.severity, r.passed, color);
                    println!("  {} {} ❲{}❳ — {}", icon, tag, r.rule, r.message);
                    if let Some(s) = &r.suggestion {
                        if !r.passed {
                            println!("      ↳ {}", s);
                        }
                    }
                }
            }
            let s = &res.summary;
            let summary = format!(
                "— Summary — issues={} checks={} passed={} failed={} (criticals={} errors={} warnings={} infos={}) pass_rate={}%",
                s.issues, s.checks, s.passed, s.failed, s.criticals, s.errors, s.warnings, s.infos, s.pass_rate
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Failures first, highest severity first; passed checks only on request.
fn ordered_results<'a>(results: &'a [RuleResult], show_passed: bool) -> Vec<&'a RuleResult> {
    let mut shown: Vec<&RuleResult> = results
        .iter()
        .filter(|r| show_passed || !r.passed)
        .collect();
    shown.sort_by(|a, b| {
        a.passed
            .cmp(&b.passed)
            .then(b.severity.cmp(&a.severity))
    });
    shown
}

/// Print the rule-catalog summary.
pub fn print_rules(summary: &EngineSummary, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_rules_json(summary)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            let head = format!(
                "{} rules loaded ({} known)",
                summary.enabled_rules, summary.total_rules
            );
            if color {
                println!("{}", head.bold());
            } else {
                println!("{}", head);
            }
            for (category, names) in &summary.by_category {
                println!("  {}: {}", category, names.join(", "));
            }
        }
    }
}

/// Print a query validation outcome.
pub fn print_outcome(outcome: &ValidationOutcome, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_outcome_json(outcome)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            let verdict = if color {
                "valid".green().bold().to_string()
            } else {
                "valid".to_string()
            };
            println!("{}: {}", verdict, outcome.sanitized_query);
            for w in &outcome.warnings {
                println!("  ▲ {}", w);
            }
            for w in &outcome.performance_warnings {
                println!("  ◷ {}", w);
            }
        }
    }
}

/// Compose audit JSON object (pure) for testing/snapshot purposes.
pub fn compose_audit_json(res: &AuditResult) -> JsonVal {
    serde_json::to_value(res).unwrap()
}

/// Compose rules JSON object (pure) for testing/snapshot purposes.
pub fn compose_rules_json(summary: &EngineSummary) -> JsonVal {
    serde_json::to_value(summary).unwrap()
}

/// Compose outcome JSON object (pure) for testing/snapshot purposes.
pub fn compose_outcome_json(outcome: &ValidationOutcome) -> JsonVal {
    json!({
        "original_query": outcome.original_query,
        "sanitized_query": outcome.sanitized_query,
        "warnings": outcome.warnings,
        "performance_warnings": outcome.performance_warnings,
        "is_valid": outcome.is_valid,
    })
}
