use std::collections::HashMap;

use crate::server::Handler;

use super::route::{merge, Route};

/// Builds the single-path tree for one pattern. Empty segments drop out,
/// so leading, trailing and doubled slashes are all accepted. A segment
/// starting with `:` captures the matching path segment under the name
/// after the colon.
pub fn single<'a>(pattern: &str, handler: &'a (dyn Handler + Sync)) -> Route<'a> {
    let mut route = Route::Action(handler);
    for segment in pattern.split('/').filter(|s| !s.is_empty()).rev() {
        route = match segment.strip_prefix(':') {
            Some(name) => Route::Capture {
                name: name.to_owned(),
                child: Box::new(route),
                fallback: Box::new(Route::NoRoute),
            },
            None => {
                let mut entries = HashMap::new();
                entries.insert(segment.to_owned(), route);
                Route::Dir {
                    entries,
                    fallback: Box::new(Route::NoRoute),
                }
            }
        };
    }
    route
}

/// Folds the pairs into one combined tree, in the given order. The order
/// decides which of two identical patterns wins (the later one) and which
/// capture at a shared level stays primary (the earlier one).
pub fn all<'a, 'p>(
    pairs: impl IntoIterator<Item = (&'p str, &'a (dyn Handler + Sync))>,
) -> Route<'a> {
    pairs
        .into_iter()
        .fold(Route::NoRoute, |tree, (pattern, handler)| {
            merge(tree, single(pattern, handler))
        })
}
