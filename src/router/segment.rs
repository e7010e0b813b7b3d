/// Returns the leading path segment, up to but excluding the first `/`.
/// The whole string if there is no separator.
pub fn current_segment(path: &str) -> &str {
    match path.split_once('/') {
        Some((segment, _)) => segment,
        None => path,
    }
}

/// Returns everything after the first `/`, empty if there is none.
pub fn remainder(path: &str) -> &str {
    match path.split_once('/') {
        Some((_, rest)) => rest,
        None => "",
    }
}
