/// Checks if a URL path matches an include-path pattern
///
/// This function supports two types of patterns:
/// 1. Prefix: "/docs" matches "/docs" and anything below it ("/docs/forms"),
///    but not a sibling that merely shares the prefix ("/docsearch")
/// 2. Wildcard: any `*` matches a run of zero or more characters, slashes
///    included, and the whole path must match ("/guides/*/setup")
///
/// The root pattern "/" matches every path.
///
/// # Examples
///
/// ```
/// use docsift::url::matches_path_pattern;
///
/// assert!(matches_path_pattern("/docs", "/docs/forms"));
/// assert!(!matches_path_pattern("/docs", "/docsearch"));
/// assert!(matches_path_pattern("/guides/*/setup", "/guides/mobile/setup"));
/// assert!(!matches_path_pattern("/guides/*/setup", "/guides/mobile"));
/// ```
pub fn matches_path_pattern(pattern: &str, path: &str) -> bool {
    if pattern.contains('*') {
        return matches_wildcard(pattern.as_bytes(), path.as_bytes());
    }

    if pattern == "/" {
        return true;
    }

    let prefix = pattern.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Iterative glob match where `*` is the only metacharacter
fn matches_wildcard(pattern: &[u8], candidate: &[u8]) -> bool {
    let (mut p, mut c) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while c < candidate.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, c));
            p += 1;
        } else if p < pattern.len() && pattern[p] == candidate[c] {
            p += 1;
            c += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            c = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}
