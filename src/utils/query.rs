use std::sync::OnceLock;

use regex::Regex;

/// Minimum number of characters a sanitized medicine name must keep.
pub(crate) const MIN_QUERY_CHARS: usize = 2;

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Word characters are ASCII-only; whitespace follows Unicode.
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("valid regex"))
}

/// Strips everything except word characters, whitespace and hyphens, then trims.
///
/// The result is safe to splice into an openFDA search expression and is
/// idempotent: sanitizing an already sanitized value returns it unchanged.
pub(crate) fn sanitize_medicine_name(value: &str) -> String {
    disallowed_chars()
        .replace_all(value.trim(), "")
        .trim()
        .to_string()
}

pub(crate) fn has_min_chars(value: &str) -> bool {
    value.chars().count() >= MIN_QUERY_CHARS
}
