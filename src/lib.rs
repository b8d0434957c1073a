//! Tracklint core library.
//!
//! This crate exposes programmatic APIs for auditing exported tracker
//! issues against data-quality rules and for validating query strings
//! before they reach the remote search API.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `context`: Read-only per-batch context (thresholds, components, kind).
//! - `catalog`: Reference catalog collaborator and JSON-backed lookup.
//! - `engine`: Rule loading, execution with fault isolation, summaries.
//! - `rules`: The rule trait, static registry, and concrete rule families.
//! - `jql`: Query safety validation and the safe query builder.
//! - `models`: Data models for issues, results, and summaries.
//! - `output`: Human/JSON printers for audit/rules/jql.
//! - `error`: Typed validation and rule errors.
//! - `utils`: Supporting helpers.
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod jql;
pub mod models;
pub mod output;
pub mod rules;
pub mod utils;
