//! Error types shared by the rule engine and the JQL validator.
//!
//! `ValidationError` is the hard-fail outcome of query validation and always
//! reaches the caller; warnings never travel through this type. `RuleError`
//! is the per-rule failure channel the engine folds into a synthetic result.

use thiserror::Error;

/// A query (or query parameter) failed a hard validation check.
///
/// Carries the offending field name and value when known so callers can
/// report precisely what was rejected.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
            field: None,
            value: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Failure of a single rule's check. The engine never propagates this;
/// it becomes one ERROR-severity result for the audited issue.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("catalog lookup failed: {0}")]
    Catalog(String),
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_and_fields() {
        let err = ValidationError::new("query too long")
            .with_field("jql")
            .with_value("project = ...");
        assert_eq!(err.to_string(), "query too long");
        assert_eq!(err.field.as_deref(), Some("jql"));
        assert_eq!(err.value.as_deref(), Some("project = ..."));
    }
}
