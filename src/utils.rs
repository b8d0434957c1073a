//! Supporting helpers: console prefixes and tolerant timestamp parsing.

use chrono::{NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for fatal CLI errors.
pub fn error_prefix() -> String {
    if colors_enabled() {
        "✖ error:".red().bold().to_string()
    } else {
        "✖ error:".to_string()
    }
}

/// Prefix for friendly notes.
pub fn note_prefix() -> String {
    if colors_enabled() {
        "ℹ note:".cyan().to_string()
    } else {
        "ℹ note:".to_string()
    }
}

/// Prefix for informational status lines.
pub fn info_prefix() -> String {
    if colors_enabled() {
        "ℹ".blue().bold().to_string()
    } else {
        "ℹ".to_string()
    }
}

/// Parse a tracker timestamp tolerantly.
///
/// Accepts the full form `2024-03-01T10:30:00` (with optional `.mmm+zzzz`
/// or `Z` suffix, which is stripped) and the date-only form `2024-03-01`.
/// Returns `None` for anything else; callers turn that into a WARNING
/// finding rather than an error.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Strip fractional seconds / zone suffixes like ".123+0000" or trailing Z.
    let cleaned = trimmed.trim_end_matches('Z');
    let cleaned = match cleaned.find('.') {
        Some(i) => &cleaned[..i],
        None => cleaned,
    };
    let cleaned = match cleaned.find('+') {
        Some(i) => &cleaned[..i],
        None => cleaned,
    };
    if cleaned.contains('T') {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(date_prefix(trimmed), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days elapsed between `then` and `now` (truncated, may be negative).
pub fn days_since(now: NaiveDateTime, then: NaiveDateTime) -> i64 {
    (now - then).num_days()
}

/// First ten characters of a raw timestamp, the `YYYY-MM-DD` part when the
/// input is well formed. Safe on short or non-ASCII input.
pub fn date_prefix(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_timestamp_with_zone() {
        let dt = parse_flexible_date("2024-03-01T10:30:00.123+0000").unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 10:30:00");
        let dt = parse_flexible_date("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 10:30:00");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_flexible_date("2024-03-01").unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 00:00:00");
        // Longer strings fall back to their date prefix.
        let dt = parse_flexible_date("2024-03-01 garbage").unwrap();
        assert_eq!(dt.date().to_string(), "2024-03-01");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_flexible_date("").is_none());
        assert!(parse_flexible_date("next tuesday").is_none());
        assert!(parse_flexible_date("2024-13-99").is_none());
    }

    #[test]
    fn test_days_since_truncates() {
        let now = parse_flexible_date("2024-03-01T12:00:00").unwrap();
        let then = parse_flexible_date("2024-02-28T13:00:00").unwrap();
        assert_eq!(days_since(now, then), 1);
    }
}
