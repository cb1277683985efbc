//! Glob matching for store key scans.

/// Checks whether a key matches a glob pattern where `*` matches any
/// run of characters, including the empty one.
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((prefix, rest)) => {
            let Some(remaining) = key.strip_prefix(prefix) else {
                return false;
            };
            if rest.is_empty() {
                return true;
            }
            (0..=remaining.len())
                .filter(|i| remaining.is_char_boundary(*i))
                .any(|i| pattern_matches(rest, &remaining[i..]))
        }
    }
}
