//! Text normalization helpers shared by the writer and the store.

/// Trim and collapse every internal whitespace run to a single space.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Return `true` when two captures are the same logical text.
///
/// Exact equality short-circuits; otherwise the whitespace-normalized forms
/// are compared so a trailing newline or re-indented copy does not count as new.
pub fn is_same_capture(left: &str, right: &str) -> bool {
    left == right || normalize_whitespace(left) == normalize_whitespace(right)
}

/// Trim an optional string and drop empty values.
pub fn normalize_optional_nonempty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// ASCII case-insensitive substring test, matching SQL `LIKE '%needle%'`.
///
/// Non-ASCII characters compare exactly.
pub fn contains_ascii_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.as_bytes();
    let hay = haystack.as_bytes();
    if needle.len() > hay.len() {
        return false;
    }
    hay.windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
