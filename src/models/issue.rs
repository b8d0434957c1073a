//! Normalized work-item record consumed by the rule engine.
//!
//! Exported issue JSON is a projection of the tracker's raw payload: the
//! fields rules care about are lifted to typed members, and everything else
//! rides along in `raw_fields` for checks that need unnormalized data.
//! Only `key` is mandatory; every other field may be absent and rules treat
//! absence as a checkable state, not an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// One normalized work item from the external tracker.
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default, rename = "fixVersions")]
    pub fix_versions: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub links: Vec<IssueLink>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Unnormalized source fields, passed through verbatim.
    #[serde(default)]
    pub raw_fields: Map<String, Json>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Outbound link to another record, tagged with the tracker's link type name.
pub struct IssueLink {
    pub key: String,
    #[serde(default, rename = "type")]
    pub link_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// A single issue comment.
pub struct Comment {
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
    #[serde(default)]
    pub created: Option<String>,
}

impl Issue {
    /// Assignee display name, treating the tracker's "Unassigned" sentinel
    /// and empty strings as absent.
    pub fn effective_assignee(&self) -> Option<&str> {
        match self.assignee.as_deref() {
            Some("") | Some("Unassigned") | None => None,
            Some(name) => Some(name),
        }
    }

    /// Whether the raw source data marks the assignee active. Defaults to
    /// true when the raw payload carries no verdict.
    pub fn assignee_active(&self) -> bool {
        self.raw_fields
            .get("assignee")
            .and_then(|a| a.get("active"))
            .and_then(Json::as_bool)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_issue_deserializes() {
        let issue: Issue = serde_json::from_str(r#"{"key": "AP-1"}"#).unwrap();
        assert_eq!(issue.key, "AP-1");
        assert!(issue.summary.is_none());
        assert!(issue.components.is_empty());
        assert!(issue.fix_versions.is_empty());
    }

    #[test]
    fn test_effective_assignee_sentinels() {
        let mut issue = Issue {
            key: "AP-2".into(),
            ..Issue::default()
        };
        assert!(issue.effective_assignee().is_none());
        issue.assignee = Some("Unassigned".into());
        assert!(issue.effective_assignee().is_none());
        issue.assignee = Some("dana.scully".into());
        assert_eq!(issue.effective_assignee(), Some("dana.scully"));
    }

    #[test]
    fn test_assignee_active_from_raw_fields() {
        let issue: Issue = serde_json::from_str(
            r#"{
                "key": "AP-3",
                "assignee": "f.mulder",
                "raw_fields": {"assignee": {"active": false, "emailAddress": "f@x.org"}}
            }"#,
        )
        .unwrap();
        assert!(!issue.assignee_active());
    }

    #[test]
    fn test_links_and_versions_shape() {
        let issue: Issue = serde_json::from_str(
            r#"{
                "key": "AP-4",
                "fixVersions": ["v5.1", "4.2"],
                "links": [{"key": "AP-1", "type": "Parent"}]
            }"#,
        )
        .unwrap();
        assert_eq!(issue.fix_versions, vec!["v5.1", "4.2"]);
        assert_eq!(issue.links[0].link_type, "Parent");
    }
}
