//! Reference catalog collaborator for API cross-check rules.
//!
//! The catalog maps `API ###` codes to their latest published version and
//! documentation URL. Rules consume it through the `ReferenceCatalog` trait;
//! the shipped implementation loads a JSON file and degrades to an empty
//! catalog when the file is missing or malformed, so affected rules report
//! "not found" instead of failing the run.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
/// One catalog entry for a referenced API.
pub struct ApiEntry {
    pub code: String,
    pub long_name: String,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Lookup interface rules depend on. Implementations must be cheap to call
/// per issue and safe to share across worker threads.
pub trait ReferenceCatalog: Send + Sync {
    /// Look up an entry by code. Accepts loose input ("646", "api 646",
    /// "API646") and normalizes before matching.
    fn lookup(&self, code: &str) -> Option<ApiEntry>;
}

/// Normalize loose catalog code input to the canonical `API` + 3-digit form.
/// Non-digit characters are dropped; remaining digits are zero-padded.
pub fn normalize_code(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    Some(format!("API{:0>3}", digits))
}

#[derive(Debug, Default)]
/// File-backed catalog keyed by normalized code.
pub struct JsonCatalog {
    entries: HashMap<String, ApiEntry>,
}

impl JsonCatalog {
    /// Load a catalog from a JSON array of entries. Missing or malformed
    /// files yield an empty catalog; the caller may warn but the audit
    /// still runs.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return JsonCatalog::default(),
        };
        let entries: Vec<ApiEntry> = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) => return JsonCatalog::default(),
        };
        JsonCatalog::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<ApiEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|e| normalize_code(&e.code).map(|code| (code, e)))
            .collect();
        JsonCatalog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReferenceCatalog for JsonCatalog {
    fn lookup(&self, code: &str) -> Option<ApiEntry> {
        let code = normalize_code(code)?;
        self.entries.get(&code).cloned()
    }
}

/// Catalog with no entries; every lookup misses.
#[derive(Debug, Default)]
pub struct EmptyCatalog;

impl ReferenceCatalog for EmptyCatalog {
    fn lookup(&self, _code: &str) -> Option<ApiEntry> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn sample() -> JsonCatalog {
        JsonCatalog::from_entries(vec![ApiEntry {
            code: "API646".into(),
            long_name: "Appointment Management".into(),
            latest_version: Some("v5".into()),
            url: Some("https://specs.example/api646".into()),
        }])
    }

    #[test]
    fn test_normalize_code_variants() {
        assert_eq!(normalize_code("API646").as_deref(), Some("API646"));
        assert_eq!(normalize_code("api 646").as_deref(), Some("API646"));
        assert_eq!(normalize_code("46").as_deref(), Some("API046"));
        assert_eq!(normalize_code("no digits"), None);
        assert_eq!(normalize_code("1234"), None);
    }

    #[test]
    fn test_lookup_accepts_loose_input() {
        let cat = sample();
        assert!(cat.lookup("646").is_some());
        assert!(cat.lookup("API 646").is_some());
        assert!(cat.lookup("API999").is_none());
    }

    #[test]
    fn test_load_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let missing = JsonCatalog::load(&dir.path().join("nope.json"));
        assert!(missing.is_empty());

        let bad = dir.path().join("bad.json");
        let mut f = fs::File::create(&bad).unwrap();
        writeln!(f, "not json at all").unwrap();
        assert!(JsonCatalog::load(&bad).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("catalog.json");
        fs::write(
            &p,
            r#"[{"code": "API622", "long_name": "Product Ordering", "latest_version": "v4"}]"#,
        )
        .unwrap();
        let cat = JsonCatalog::load(&p);
        assert_eq!(cat.len(), 1);
        let entry = cat.lookup("622").unwrap();
        assert_eq!(entry.latest_version.as_deref(), Some("v4"));
    }
}
