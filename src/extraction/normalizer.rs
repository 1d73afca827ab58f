use once_cell::sync::Lazy;
use regex::Regex;

// @const: Any run of Unicode whitespace
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Same as [`normalize_whitespace`], absent text normalizes to ""
pub fn normalize_optional(text: Option<&str>) -> String {
    text.map(normalize_whitespace).unwrap_or_default()
}
