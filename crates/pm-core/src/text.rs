//! Name matching helpers.
//!
//! Both helpers work on UTF-8 bytes and fold ASCII letters only
//! (`'A'..='Z'` → `'a'..='z'`); every other byte is compared literally, so a
//! two-byte letter such as `Č` or `đ` counts as two symbols.

/// `true` if `needle` occurs in `haystack`, ignoring ASCII case.
///
/// An empty needle never matches.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.is_empty() || n.len() > h.len() {
        return false;
    }
    h.windows(n.len()).any(|w| w.eq_ignore_ascii_case(n))
}

/// Levenshtein edit distance with unit costs over bytes, ignoring ASCII case.
///
/// Replacing `Đ` (two bytes) with `D` costs two edits.  Memory is a single
/// row over the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a = a.to_ascii_lowercase().into_bytes();
    let b = b.to_ascii_lowercase().into_bytes();
    // strsim keeps one row sized to its second argument.
    if a.len() < b.len() {
        strsim::generic_levenshtein(&b, &a)
    } else {
        strsim::generic_levenshtein(&a, &b)
    }
}
