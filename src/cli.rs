//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tracklint",
    version,
    about = "Tracklint (Rust)",
    long_about = "Tracklint — audit exported tracker issues against data-quality rules and guard query strings before they reach the remote search API.\n\nConfiguration precedence: CLI > tracklint.toml > defaults.",
    after_help = "Examples:\n  tracklint audit --pattern 'exports/*.json' --kind Epic\n  tracklint rules --output json\n  tracklint jql validate 'project = \"AP\" AND status = \"Open\"'\n  tracklint jql build --template 'project = {team_project}' --param team_project=AP",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for auditing and query validation.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current tracklint version.")]
    Version,
    /// Audit exported issues against the rule set
    #[command(
        about = "Run data-quality rules",
        long_about = "Audit exported issue JSON files matched by glob patterns. Error-severity violations contribute to CI exits.",
        after_help = "Examples:\n  tracklint audit --pattern 'exports/*.json'\n  tracklint audit --pattern 'epics/*.json' --kind Epic --show-passed\n  tracklint audit --output json"
    )]
    Audit {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long = "pattern", help = "Glob pattern for issue JSON files (repeatable)")]
        patterns: Vec<String>,
        #[arg(long, help = "Logical issue kind for the batch (e.g. Epic, Story)")]
        kind: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Also show passing checks")]
        show_passed: bool,
    },
    /// Show the loaded rule catalog
    #[command(
        about = "Show rule catalog",
        long_about = "Print the loaded rule set grouped by category, honoring [rules] toggles."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Query validation and safe building
    Jql {
        #[command(subcommand)]
        cmd: JqlCmd,
    },
}

#[derive(Subcommand)]
/// Subcommands for `tracklint jql`
pub enum JqlCmd {
    /// Validate a query string
    #[command(
        about = "Validate a query",
        long_about = "Run the full safety pipeline over a query string. Hard failures exit non-zero; warnings are printed on valid queries."
    )]
    Validate {
        #[arg(help = "Query string to validate")]
        query: String,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable strict project/field checks")]
        no_strict: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Build a query from a parameterized template
    #[command(
        about = "Build a safe query",
        long_about = "Substitute sanitized parameters into a {name} placeholder template and re-validate the result.",
        after_help = "Examples:\n  tracklint jql build --template 'project = {team_project} AND assignee = {owner_user}' \\\n      --param team_project=AP --param owner_user=jane.doe@example.com"
    )]
    Build {
        #[arg(long, help = "Template with {name} placeholders")]
        template: String,
        #[arg(long = "param", help = "Parameter as name=value (repeatable)")]
        params: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
