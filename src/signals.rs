//! Rule-based business-signal detection.
//!
//! Scans raw page markup (pre-extraction, so attribute values and link
//! targets count) for six fixed keyword groups and emits at most one tag
//! per group. Matching is case-insensitive substring containment; the
//! result order follows the group table.

/// Keyword groups and the tag each one emits.
const SIGNAL_GROUPS: &[(&[&str], &str)] = &[
    (
        &["careers", "jobs", "we're hiring", "join us", "open positions"],
        "actively hiring",
    ),
    (&["blog", "news", "insights"], "active content marketing"),
    (
        &["changelog", "release notes", "what's new", "updates"],
        "frequent product updates",
    ),
    (&["pricing", "plans", "enterprise"], "clear pricing model"),
    (&["docs", "documentation", "api"], "developer-friendly"),
    (
        &["contact sales", "demo", "book a call"],
        "enterprise sales motion",
    ),
];

/// Detect heuristic signal tags in raw HTML.
pub fn detect_signals(html: &str) -> Vec<String> {
    let haystack = html.to_lowercase();
    SIGNAL_GROUPS
        .iter()
        .filter(|(terms, _)| terms.iter().any(|t| haystack.contains(t)))
        .map(|(_, tag)| tag.to_string())
        .collect()
}
