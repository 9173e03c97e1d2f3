//! Path matching: request path → declared route + bound path parameters.
//!
//! Patterns and request paths are split on `/` into non-empty segments.
//! A `:name` pattern segment binds whatever the request supplied at that
//! position; any other pattern segment must match the request segment
//! exactly. Segment-count mismatch is never a match. Routes are tried in
//! declaration order and the first match wins, so an exact literal route
//! declared before a `:name` route of the same shape always takes priority.
//! There is no cap on segment count or parameter count.

use std::collections::HashMap;

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Attempts to match `request_path` against `pattern`, returning the bound
/// `:name` parameters on success.
pub fn match_route<'a>(pattern: &str, request_path: &'a str) -> Option<HashMap<String, &'a str>> {
    let pattern_segments = split_segments(pattern);
    let request_segments = split_segments(request_path);
    if pattern_segments.len() != request_segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (p, r) in pattern_segments.iter().zip(request_segments.iter()) {
        if let Some(name) = p.strip_prefix(':') {
            params.insert(name.to_string(), *r);
        } else if p != r {
            return None;
        }
    }
    Some(params)
}

/// Finds the first declared route (in order) whose pattern matches
/// `request_path`, returning its index and the bound parameters.
pub fn find_route<'a>(
    patterns: &[&str],
    request_path: &'a str,
) -> Option<(usize, HashMap<String, &'a str>)> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(params) = match_route(pattern, request_path) {
            return Some((i, params));
        }
    }
    None
}
