//! Tracklint CLI binary entry point.
//! Delegates to modules for audit/rules/jql and prints results.

mod catalog;
mod cli;
mod config;
mod context;
mod engine;
mod error;
mod jql;
mod models;
mod output;
mod rules;
mod utils;

use crate::catalog::{EmptyCatalog, JsonCatalog, ReferenceCatalog};
use crate::context::AuditContext;
use crate::engine::RuleEngine;
use crate::error::ValidationError;
use crate::jql::JqlValidator;
use crate::models::issue::Issue;
use crate::models::{AuditResult, IssueReport, RuleResult, Severity};
use clap::Parser;
use cli::{Cli, Commands, JqlCmd};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Audit {
            repo_root,
            patterns,
            kind,
            output,
            show_passed,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                output.as_deref(),
                &patterns,
                kind.as_deref(),
                None,
            );
            if config::load_config(&eff.repo_root).is_none() {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "No tracklint.toml found; using defaults."
                );
            }
            if eff.patterns.is_empty() {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    "No input patterns configured. Pass --pattern or add [audit].patterns to tracklint.toml."
                );
                std::process::exit(2);
            }

            // Reference catalog degrades to empty; rules then report
            // "not found" instead of aborting the run.
            let loaded_catalog = eff
                .catalog
                .as_deref()
                .map(|p| JsonCatalog::load(&eff.repo_root.join(p)));
            if matches!(&loaded_catalog, Some(c) if c.is_empty()) {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "Reference catalog is missing or empty; catalog lookups will report not found."
                );
            }
            let empty = EmptyCatalog;
            let catalog_ref: &dyn ReferenceCatalog = match &loaded_catalog {
                Some(c) => c,
                None => &empty,
            };

            let mut ctx = AuditContext::new(catalog_ref)
                .with_components(eff.components.clone())
                .with_thresholds(eff.thresholds.clone());
            if let Some(kind) = eff.issue_kind.as_deref() {
                ctx = ctx.with_issue_kind(kind);
            }

            let files = collect_files(&eff.repo_root, &eff.patterns);
            if files.is_empty() {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    format!("No issue files matched: [{}]", eff.patterns.join(", "))
                );
                std::process::exit(2);
            }
            if eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::info_prefix(),
                    format!("Auditing {} file(s)", files.len())
                );
            }

            let mut issues: Vec<Issue> = Vec::new();
            let mut load_reports: Vec<IssueReport> = Vec::new();
            for file in &files {
                let display = file.to_string_lossy().to_string();
                let data = match fs::read_to_string(file) {
                    Ok(s) => s,
                    Err(e) => {
                        load_reports.push(load_failure(&display, format!("Cannot read file: {}", e)));
                        continue;
                    }
                };
                match parse_issues(&data) {
                    Ok(mut batch) => issues.append(&mut batch),
                    Err(e) => {
                        load_reports
                            .push(load_failure(&display, format!("Invalid issue JSON: {}", e)));
                    }
                }
            }

            let engine = RuleEngine::new(&eff.rules);
            let audited = engine.audit_batch(&issues, &ctx);
            let mut reports = load_reports;
            reports.extend(audited.reports);
            let result = AuditResult::new(reports);

            output::print_audit(&result, &eff.output, show_passed);
            if result.summary.errors + result.summary.criticals > 0 {
                std::process::exit(1);
            }
        }
        Commands::Rules { repo_root, output } => {
            let eff = config::resolve_effective(repo_root.as_deref(), output.as_deref(), &[], None, None);
            let engine = RuleEngine::new(&eff.rules);
            output::print_rules(&engine.summary(), &eff.output);
        }
        Commands::Jql { cmd } => match cmd {
            JqlCmd::Validate {
                query,
                repo_root,
                no_strict,
                output,
            } => {
                let eff = config::resolve_effective(
                    repo_root.as_deref(),
                    output.as_deref(),
                    &[],
                    None,
                    if no_strict { Some(false) } else { None },
                );
                let validator = build_validator(&eff);
                match validator.validate(&query, eff.query.strict) {
                    Ok(outcome) => output::print_outcome(&outcome, &eff.output),
                    Err(err) => {
                        print_validation_error(&err, &eff.output);
                        std::process::exit(1);
                    }
                }
            }
            JqlCmd::Build {
                template,
                params,
                repo_root,
                output,
            } => {
                let eff = config::resolve_effective(repo_root.as_deref(), output.as_deref(), &[], None, None);
                let mut parsed = std::collections::BTreeMap::new();
                for raw in &params {
                    match raw.split_once('=') {
                        Some((name, value)) => {
                            parsed.insert(name.to_string(), value.to_string());
                        }
                        None => {
                            eprintln!(
                                "{} {}",
                                crate::utils::error_prefix(),
                                format!("Invalid --param '{}': expected name=value", raw)
                            );
                            std::process::exit(2);
                        }
                    }
                }
                let validator = build_validator(&eff);
                match validator.build_safe_jql(&template, &parsed) {
                    Ok(jql) => {
                        if eff.output == "json" {
                            println!(
                                "{}",
                                serde_json::to_string_pretty(&json!({ "query": jql })).unwrap()
                            );
                        } else {
                            println!("{}", jql);
                        }
                    }
                    Err(err) => {
                        print_validation_error(&err, &eff.output);
                        std::process::exit(1);
                    }
                }
            }
        },
    }
}

fn build_validator(eff: &config::Effective) -> JqlValidator {
    JqlValidator::new(eff.query.allowed_projects.clone())
        .with_fields(eff.query.allowed_fields.clone())
        .with_max_length(eff.query.max_query_length)
}

/// Expand globs relative to the repo root into a sorted, deduplicated list.
fn collect_files(repo_root: &std::path::Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pat in patterns {
        let abs_glob = repo_root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        match glob::glob(&pattern) {
            Ok(paths) => {
                for entry in paths.flatten() {
                    if entry.is_file() {
                        files.push(entry);
                    }
                }
            }
            Err(_) => {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    format!("Bad glob pattern: {}", pat)
                );
                std::process::exit(2);
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

/// One exported file holds either a single issue object or an array.
fn parse_issues(data: &str) -> Result<Vec<Issue>, serde_json::Error> {
    match serde_json::from_str::<Vec<Issue>>(data) {
        Ok(batch) => Ok(batch),
        Err(_) => serde_json::from_str::<Issue>(data).map(|issue| vec![issue]),
    }
}

fn load_failure(file: &str, message: String) -> IssueReport {
    IssueReport {
        key: file.to_string(),
        results: vec![RuleResult::fail("load-issue", file, Severity::Error, message)],
    }
}

fn print_validation_error(err: &ValidationError, output: &str) {
    if output == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "is_valid": false,
                "error": err.message,
                "field": err.field,
                "value": err.value,
            }))
            .unwrap()
        );
    } else {
        eprintln!("{} {}", crate::utils::error_prefix(), err);
        if let Some(field) = &err.field {
            eprintln!("  field: {}", field);
        }
        if let Some(value) = &err.value {
            eprintln!("  value: {}", value);
        }
    }
}
