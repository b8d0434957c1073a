//! Query safety validation for the tracker's query language.
//!
//! A fixed pipeline of checks over a raw query string: length, security,
//! syntax, project access, field access, performance. The first four can
//! hard-fail with a typed `ValidationError`; field and performance findings
//! only accumulate as warnings on a still-valid outcome. A rejected query
//! must never reach the remote search endpoint.

pub mod builder;

use crate::error::ValidationError;
use regex::Regex;
use serde::Serialize;

/// Fields the validator recognizes out of the box. The remote system may
/// define more, which is why unknown fields only warn.
pub const DEFAULT_FIELDS: [&str; 16] = [
    "key",
    "summary",
    "status",
    "assignee",
    "created",
    "updated",
    "priority",
    "issuetype",
    "description",
    "component",
    "labels",
    "reporter",
    "resolution",
    "comment",
    "fixVersions",
    "project",
];

/// Patterns that indicate an injection attempt. Any match is a hard failure.
const DANGEROUS_PATTERNS: [&str; 6] = [
    r"(?i);\s*(DROP|DELETE|UPDATE|INSERT|CREATE|ALTER)\b",
    r"(?i)\b(UNION|EXEC|EXECUTE)\b",
    r"(?is)<script[^>]*>.*?</script>",
    r"(?i)javascript:",
    r"(?i)\b(eval|Function)\s*\(",
    r"(?s)<!--.*?-->",
];

#[derive(Debug, Clone, Serialize)]
/// Result of validating one query. Immutable once returned.
pub struct ValidationOutcome {
    pub original_query: String,
    pub sanitized_query: String,
    pub warnings: Vec<String>,
    pub performance_warnings: Vec<String>,
    pub is_valid: bool,
}

/// Validator configured with access constraints and limits.
///
/// Construction compiles every pattern once; `validate` is a pure function
/// of the query and is safe to call concurrently.
pub struct JqlValidator {
    allowed_projects: Vec<String>,
    allowed_fields: Vec<String>,
    max_query_length: usize,
    dangerous: Vec<Regex>,
    project_ref: Regex,
    project_wildcard: Regex,
    field_ref: Regex,
    adjacent_ops: Regex,
    broad_dates: Vec<Regex>,
    wildcard_text: Regex,
}

impl JqlValidator {
    pub fn new(allowed_projects: Vec<String>) -> Self {
        JqlValidator {
            allowed_projects,
            allowed_fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            max_query_length: 1000,
            dangerous: DANGEROUS_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("dangerous pattern"))
                .collect(),
            project_ref: Regex::new(r#"(?i)project\s*[=!~]+\s*["']?([A-Za-z][A-Za-z0-9]*)"#)
                .expect("project reference pattern"),
            project_wildcard: Regex::new(r#"(?i)project\s*[=!~]+\s*["']?\*"#)
                .expect("project wildcard pattern"),
            field_ref: Regex::new(r"([A-Za-z][A-Za-z0-9_]*)\s*[=!~<>]")
                .expect("field reference pattern"),
            adjacent_ops: Regex::new(r"(?i)\s(AND|OR)\s+(AND|OR)\s")
                .expect("adjacent operator pattern"),
            broad_dates: [
                r#"(?i)created\s*>=\s*["']?19\d\d"#,
                r#"(?i)updated\s*>=\s*["']?19\d\d"#,
                r#"(?i)created\s*>=\s*["']?-\d{3,}d"#,
            ]
            .iter()
            .map(|p| Regex::new(p).expect("broad date pattern"))
            .collect(),
            wildcard_text: Regex::new(r#"(?i)summary\s*~\s*["'][^"']*\*[^"']*\*"#)
                .expect("wildcard text pattern"),
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.allowed_fields = fields;
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_query_length = max;
        self
    }

    /// Validate a query. Hard failures surface as `ValidationError`; all
    /// other findings ride on the returned outcome.
    pub fn validate(&self, jql: &str, strict: bool) -> Result<ValidationOutcome, ValidationError> {
        let jql = jql.trim();
        if jql.is_empty() {
            return Err(ValidationError::new("query cannot be empty").with_field("jql"));
        }

        let mut outcome = ValidationOutcome {
            original_query: jql.to_string(),
            sanitized_query: jql.to_string(),
            warnings: Vec::new(),
            performance_warnings: Vec::new(),
            is_valid: true,
        };

        self.check_length(jql)?;
        self.check_security(jql, &mut outcome)?;
        self.check_syntax(jql, &mut outcome)?;
        if strict {
            self.check_project_access(jql)?;
            self.check_field_access(jql, &mut outcome);
        }
        self.check_performance(jql, &mut outcome);

        Ok(outcome)
    }

    fn check_length(&self, jql: &str) -> Result<(), ValidationError> {
        if jql.chars().count() > self.max_query_length {
            return Err(ValidationError::new(format!(
                "query too long: {} characters (max: {})",
                jql.chars().count(),
                self.max_query_length
            ))
            .with_field("jql")
            .with_value(jql.chars().take(50).collect::<String>()));
        }
        Ok(())
    }

    fn check_security(
        &self,
        jql: &str,
        outcome: &mut ValidationOutcome,
    ) -> Result<(), ValidationError> {
        for pattern in &self.dangerous {
            if pattern.is_match(jql) {
                return Err(ValidationError::new(format!(
                    "query contains dangerous pattern: {}",
                    pattern.as_str()
                ))
                .with_field("jql")
                .with_value(jql));
            }
        }

        let wildcards = jql.matches('*').count() + jql.matches('%').count();
        if wildcards > 3 {
            outcome
                .performance_warnings
                .push(format!("High wildcard usage: {}", wildcards));
        }

        for segment in quoted_segments(jql) {
            if segment.contains(';') || segment.contains("--") {
                return Err(ValidationError::new(
                    "query contains potentially malicious quoted content",
                )
                .with_field("jql")
                .with_value(segment));
            }
        }
        Ok(())
    }

    fn check_syntax(
        &self,
        jql: &str,
        outcome: &mut ValidationOutcome,
    ) -> Result<(), ValidationError> {
        let open = jql.matches('(').count();
        let close = jql.matches(')').count();
        if open != close {
            return Err(ValidationError::new("query has unbalanced parentheses")
                .with_field("jql")
                .with_value(jql));
        }

        if unescaped_count(jql, '"') % 2 != 0 {
            return Err(ValidationError::new("query has unbalanced double quotes").with_field("jql"));
        }
        if unescaped_count(jql, '\'') % 2 != 0 {
            return Err(ValidationError::new("query has unbalanced single quotes").with_field("jql"));
        }

        if self.adjacent_ops.is_match(jql) {
            outcome
                .warnings
                .push("Adjacent logical operators detected".to_string());
        }
        Ok(())
    }

    fn check_project_access(&self, jql: &str) -> Result<(), ValidationError> {
        if self.allowed_projects.is_empty() {
            return Ok(());
        }

        if self.project_wildcard.is_match(jql) {
            return Err(
                ValidationError::new("project wildcard queries are not allowed").with_field("jql")
            );
        }

        for caps in self.project_ref.captures_iter(jql) {
            let project = &caps[1];
            let allowed = self
                .allowed_projects
                .iter()
                .any(|p| p.eq_ignore_ascii_case(project));
            if !allowed {
                return Err(ValidationError::new(format!(
                    "access denied to project '{}'; allowed projects: {}",
                    project,
                    self.allowed_projects.join(", ")
                ))
                .with_field("project")
                .with_value(project));
            }
        }
        Ok(())
    }

    fn check_field_access(&self, jql: &str, outcome: &mut ValidationOutcome) {
        if self.allowed_fields.is_empty() {
            return;
        }
        // Unknown fields warn instead of failing: the remote system has
        // custom fields this validator cannot know about.
        for caps in self.field_ref.captures_iter(jql) {
            let field = &caps[1];
            let known = self
                .allowed_fields
                .iter()
                .any(|f| f.eq_ignore_ascii_case(field));
            if !known {
                outcome
                    .warnings
                    .push(format!("Field '{}' may not be accessible", field));
            }
        }
    }

    fn check_performance(&self, jql: &str, outcome: &mut ValidationOutcome) {
        let lower = jql.to_lowercase();
        if !lower.contains("order by") && (lower.contains("created") || lower.contains("updated")) {
            outcome
                .performance_warnings
                .push("Date queries without ORDER BY may be slow".to_string());
        }
        for pattern in &self.broad_dates {
            if pattern.is_match(jql) {
                outcome
                    .performance_warnings
                    .push("Very broad date range detected".to_string());
            }
        }
        if self.wildcard_text.is_match(jql) {
            outcome
                .performance_warnings
                .push("Inefficient text search pattern (multiple wildcards)".to_string());
        }
    }
}

/// Count occurrences of `quote` not preceded by a backslash.
fn unescaped_count(s: &str, quote: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == quote {
            count += 1;
        }
    }
    count
}

/// Inner content of quoted literals, honoring backslash escapes. An
/// unterminated final literal is returned as-is so it still gets scanned.
fn quoted_segments(s: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '"' && c != '\'' {
            continue;
        }
        let delim = c;
        let mut segment = String::new();
        let mut escaped = false;
        let mut closed = false;
        for c in chars.by_ref() {
            if escaped {
                segment.push(c);
                escaped = false;
                continue;
            }
            if c == '\\' {
                escaped = true;
            } else if c == delim {
                closed = true;
                break;
            } else {
                segment.push(c);
            }
        }
        segments.push(segment);
        if !closed {
            break;
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JqlValidator {
        JqlValidator::new(vec!["AP".to_string()])
    }

    #[test]
    fn test_safe_queries_pass() {
        let v = validator();
        let outcome = v
            .validate(r#"project = "AP" AND status = "Open""#, true)
            .unwrap();
        assert!(outcome.is_valid);
        assert!(outcome.warnings.is_empty());

        let outcome = v.validate("project = AP AND issuetype = Epic", true).unwrap();
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_empty_query_rejected() {
        let v = validator();
        let err = v.validate("   ", true).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("jql"));
    }

    #[test]
    fn test_length_limit() {
        let v = validator().with_max_length(30);
        let err = v.validate(&"x = 1 AND ".repeat(10), false).unwrap_err();
        assert!(err.message.contains("query too long"));
        assert!(err.value.is_some());
    }

    #[test]
    fn test_drop_table_rejected_regardless_of_context() {
        let v = validator();
        for q in [
            r#"project = "AP"; DROP TABLE users;"#,
            "project = AP; drop table users",
            r#"summary ~ "x" ; DELETE everything"#,
        ] {
            let err = v.validate(q, false).unwrap_err();
            assert!(err.message.contains("dangerous pattern"), "{}", q);
        }
    }

    #[test]
    fn test_injection_keywords_rejected() {
        let v = validator();
        assert!(v.validate("status = open UNION select", false).is_err());
        assert!(v.validate("<script>alert(1)</script>", false).is_err());
        assert!(v.validate("summary ~ javascript:void(0)", false).is_err());
        assert!(v.validate("eval (payload)", false).is_err());
        assert!(v.validate("x = 1 <!-- hidden -->", false).is_err());
    }

    #[test]
    fn test_malicious_quoted_content_rejected() {
        let v = validator();
        let err = v.validate(r#"summary ~ "a; b""#, false).unwrap_err();
        assert!(err.message.contains("quoted content"));
        let err = v.validate(r#"summary ~ "a -- b""#, false).unwrap_err();
        assert!(err.message.contains("quoted content"));
    }

    #[test]
    fn test_wildcard_count_warns_but_passes() {
        let v = validator();
        let outcome = v.validate("a = *x* AND b = *y*", false).unwrap();
        assert!(outcome.is_valid);
        assert!(outcome
            .performance_warnings
            .iter()
            .any(|w| w.contains("High wildcard usage: 4")));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let v = validator();
        let err = v.validate("(status = open AND (x = 1)", false).unwrap_err();
        assert!(err.message.contains("unbalanced parentheses"));
    }

    #[test]
    fn test_unbalanced_quotes() {
        let v = validator();
        let err = v
            .validate(r#"project = "AP AND status = "Open""#, false)
            .unwrap_err();
        assert!(err.message.contains("unbalanced double quotes"));

        let err = v.validate("summary ~ 'half open", false).unwrap_err();
        assert!(err.message.contains("unbalanced single quotes"));

        // Escaped quotes do not count.
        let outcome = v.validate(r#"summary ~ "say \"hi\"""#, false).unwrap();
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_adjacent_operators_warn() {
        let v = validator();
        let outcome = v.validate("a = 1 AND OR b = 2", false).unwrap();
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("Adjacent logical operators")));
    }

    #[test]
    fn test_project_allow_list_enforced_in_strict_mode() {
        let v = validator();
        let err = v.validate(r#"project = "SECRET""#, true).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("project"));
        assert_eq!(err.value.as_deref(), Some("SECRET"));

        assert!(v.validate(r#"project = "AP""#, true).unwrap().is_valid);
        assert!(v.validate(r#"project = "ap""#, true).unwrap().is_valid);
        // Strict mode off: no project enforcement.
        assert!(v.validate(r#"project = "SECRET""#, false).unwrap().is_valid);
    }

    #[test]
    fn test_project_wildcard_rejected() {
        let v = validator();
        let err = v.validate(r#"project != "*""#, true).unwrap_err();
        assert!(err.message.contains("wildcard"));
    }

    #[test]
    fn test_unknown_fields_warn_only() {
        let v = validator();
        let outcome = v
            .validate(r#"project = "AP" AND customfield_10001 = 5"#, true)
            .unwrap();
        assert!(outcome.is_valid);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("customfield_10001")));
    }

    #[test]
    fn test_performance_heuristics() {
        let v = validator();

        let outcome = v.validate("created >= 2024-01-01", false).unwrap();
        assert!(outcome
            .performance_warnings
            .iter()
            .any(|w| w.contains("without ORDER BY")));

        let outcome = v
            .validate("created >= 1999-01-01 ORDER BY created", false)
            .unwrap();
        assert!(outcome
            .performance_warnings
            .iter()
            .any(|w| w.contains("broad date range")));

        let outcome = v.validate("created >= -365d ORDER BY key", false).unwrap();
        assert!(outcome
            .performance_warnings
            .iter()
            .any(|w| w.contains("broad date range")));

        let outcome = v.validate(r#"summary ~ "*test*""#, false).unwrap();
        assert!(outcome
            .performance_warnings
            .iter()
            .any(|w| w.contains("multiple wildcards")));
    }

    #[test]
    fn test_quoted_segments_and_escape_handling() {
        assert_eq!(quoted_segments(r#"a "one" b 'two'"#), vec!["one", "two"]);
        assert_eq!(quoted_segments(r#""es\"caped""#), vec![r#"es"caped"#]);
        assert_eq!(quoted_segments(r#"tail "open"#), vec!["open"]);
        assert_eq!(unescaped_count(r#"a \" b""#, '"'), 1);
    }
}
