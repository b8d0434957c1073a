//! Parameterized query building with per-type sanitization.
//!
//! Parameter types follow a naming convention on the placeholder name:
//! `*_project`, `*_user`, `*_number`, anything else is a plain string. A
//! built query is never trusted as-is; it runs through the full validator
//! before being returned.

use crate::error::ValidationError;
use crate::jql::JqlValidator;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Sanitization class of one parameter.
pub enum ParamKind {
    Str,
    Project,
    Number,
    User,
}

/// Infer a parameter's kind from its placeholder name suffix.
pub fn kind_for_param(name: &str) -> ParamKind {
    if name.ends_with("_project") {
        ParamKind::Project
    } else if name.ends_with("_user") {
        ParamKind::User
    } else if name.ends_with("_number") {
        ParamKind::Number
    } else {
        ParamKind::Str
    }
}

fn project_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]*$").expect("project key pattern"))
}

fn user_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._@-]+$").expect("user pattern"))
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"))
}

/// Sanitize one parameter value for safe embedding.
///
/// Project, user, and number parameters are validated against strict
/// shapes and rejected on mismatch. String (and user) values are cleaned:
/// control characters, statement separators, backslashes, and carriage
/// control are stripped before embedded quotes are escaped.
pub fn sanitize_parameter(value: &str, kind: ParamKind) -> Result<String, ValidationError> {
    // Control characters never survive, whatever the kind.
    let value: String = value
        .chars()
        .filter(|c| {
            let n = *c as u32;
            !(n < 0x20 || (0x7f..=0x9f).contains(&n))
        })
        .collect();

    match kind {
        ParamKind::Project => {
            if !project_re().is_match(&value) {
                return Err(
                    ValidationError::new(format!("invalid project key format: {}", value))
                        .with_field("project")
                        .with_value(value),
                );
            }
            Ok(value)
        }
        ParamKind::Number => {
            if value.parse::<f64>().is_err() {
                return Err(ValidationError::new(format!("invalid number format: {}", value))
                    .with_field("number")
                    .with_value(value));
            }
            Ok(value)
        }
        ParamKind::User => {
            if !user_re().is_match(&value) {
                return Err(ValidationError::new(format!("invalid user format: {}", value))
                    .with_field("user")
                    .with_value(value));
            }
            Ok(value)
        }
        ParamKind::Str => {
            let cleaned: String = value
                .chars()
                .filter(|c| !matches!(c, ';' | '\\' | '\r' | '\n'))
                .collect();
            Ok(cleaned.replace('"', "\\\"").replace('\'', "\\'"))
        }
    }
}

impl JqlValidator {
    /// Build a query from a `{name}` placeholder template and named
    /// parameters, sanitizing each value by its inferred kind, then
    /// re-validating the assembled query in strict mode.
    pub fn build_safe_jql(
        &self,
        template: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<String, ValidationError> {
        let mut jql = template.to_string();
        for (name, value) in parameters {
            let kind = kind_for_param(name);
            let sanitized = sanitize_parameter(value, kind)?;
            let substitution = match kind {
                ParamKind::Number => sanitized,
                _ => format!("\"{}\"", sanitized),
            };
            jql = jql.replace(&format!("{{{}}}", name), &substitution);
        }

        if let Some(caps) = placeholder_re().captures(&jql) {
            return Err(
                ValidationError::new(format!("missing parameter in template: {}", &caps[1]))
                    .with_field("template")
                    .with_value(&caps[1]),
            );
        }

        let outcome = self.validate(&jql, true)?;
        Ok(outcome.sanitized_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_kind_inference() {
        assert_eq!(kind_for_param("team_project"), ParamKind::Project);
        assert_eq!(kind_for_param("owner_user"), ParamKind::User);
        assert_eq!(kind_for_param("limit_number"), ParamKind::Number);
        assert_eq!(kind_for_param("term"), ParamKind::Str);
    }

    #[test]
    fn test_project_sanitization_strict_shape() {
        assert_eq!(sanitize_parameter("AP", ParamKind::Project).unwrap(), "AP");
        assert_eq!(sanitize_parameter("AP2", ParamKind::Project).unwrap(), "AP2");
        for bad in ["ap", "2AP", "A P", "AP;DROP"] {
            let err = sanitize_parameter(bad, ParamKind::Project).unwrap_err();
            assert_eq!(err.field.as_deref(), Some("project"), "{}", bad);
        }
    }

    #[test]
    fn test_number_sanitization() {
        assert_eq!(sanitize_parameter("42", ParamKind::Number).unwrap(), "42");
        assert_eq!(sanitize_parameter("4.5", ParamKind::Number).unwrap(), "4.5");
        assert!(sanitize_parameter("4x", ParamKind::Number).is_err());
    }

    #[test]
    fn test_user_sanitization() {
        assert_eq!(
            sanitize_parameter("jane.doe@example.com", ParamKind::User).unwrap(),
            "jane.doe@example.com"
        );
        assert!(sanitize_parameter("jane doe", ParamKind::User).is_err());
        assert!(sanitize_parameter("jane\"; DROP", ParamKind::User).is_err());
    }

    #[test]
    fn test_string_sanitization_strips_then_escapes() {
        let out = sanitize_parameter("a;b\\c\r\nd \"quoted\"", ParamKind::Str).unwrap();
        assert_eq!(out, "abcd \\\"quoted\\\"");
        // Control characters are removed for every kind.
        let out = sanitize_parameter("a\x00b\x07c", ParamKind::Str).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_build_round_trips_through_validation() {
        let v = JqlValidator::new(vec!["AP".to_string()]);
        let jql = v
            .build_safe_jql(
                "project = {team_project} AND assignee = {owner_user}",
                &params(&[("team_project", "AP"), ("owner_user", "jane.doe@example.com")]),
            )
            .unwrap();
        assert_eq!(jql, r#"project = "AP" AND assignee = "jane.doe@example.com""#);
        // The built query revalidates as-is under the same validator.
        assert!(v.validate(&jql, true).unwrap().is_valid);
    }

    #[test]
    fn test_build_rejects_missing_parameter() {
        let v = JqlValidator::new(vec!["AP".to_string()]);
        let err = v
            .build_safe_jql("project = {team_project}", &params(&[]))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("template"));
        assert_eq!(err.value.as_deref(), Some("team_project"));
    }

    #[test]
    fn test_build_rejects_disallowed_project_value() {
        let v = JqlValidator::new(vec!["AP".to_string()]);
        // The value itself is a well-formed key, so sanitization passes;
        // re-validation catches the access violation.
        let err = v
            .build_safe_jql(
                "project = {team_project}",
                &params(&[("team_project", "SECRET")]),
            )
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("project"));
    }

    #[test]
    fn test_build_neutralizes_injection_attempt() {
        let v = JqlValidator::new(vec!["AP".to_string()]);
        // Separator and quotes are stripped/escaped out of string params.
        let jql = v
            .build_safe_jql(
                r#"project = "AP" AND summary ~ {term}"#,
                &params(&[("term", "x; DROP TABLE users")]),
            )
            .unwrap();
        assert!(jql.contains("x DROP TABLE users"));
    }

    #[test]
    fn test_build_substitutes_numbers_unquoted() {
        let v = JqlValidator::new(vec!["AP".to_string()]);
        let jql = v
            .build_safe_jql(
                r#"project = "AP" AND votes > {min_number}"#,
                &params(&[("min_number", "10")]),
            )
            .unwrap();
        assert_eq!(jql, r#"project = "AP" AND votes > 10"#);
    }
}
