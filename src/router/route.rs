use std::collections::HashMap;

use crate::server::Handler;

/// One node of the routing tree.
///
/// `Capture` and `Dir` each own a fallback route that traversal moves to
/// when the node cannot consume the current segment. Fallbacks form a
/// chain ending in `NoRoute`, never a tree.
pub enum Route<'a> {
    NoRoute,
    Action(&'a (dyn Handler + Sync)),
    Capture {
        name: String,
        child: Box<Route<'a>>,
        fallback: Box<Route<'a>>,
    },
    Dir {
        entries: HashMap<String, Route<'a>>,
        fallback: Box<Route<'a>>,
    },
}

/// Combines two routing trees. Not commutative: on an exact collision the
/// right action replaces the left one, and the left tree's structure
/// otherwise takes precedence.
pub fn merge<'a>(left: Route<'a>, right: Route<'a>) -> Route<'a> {
    match (left, right) {
        (Route::NoRoute, right) => right,
        (left, Route::NoRoute) => left,
        // A capture absorbs whatever is merged into it through its child.
        // Its own fallback stays untouched.
        (
            Route::Capture {
                name,
                child,
                fallback,
            },
            right,
        ) => Route::Capture {
            name,
            child: Box::new(merge(*child, right)),
            fallback,
        },
        (Route::Action(_), Route::Action(handler)) => Route::Action(handler),
        (
            action @ Route::Action(_),
            Route::Capture {
                name,
                child,
                fallback,
            },
        ) => Route::Capture {
            name,
            child,
            fallback: Box::new(merge(*fallback, action)),
        },
        // An action meeting a directory moves to the fallback position of
        // an empty directory, then the two directories merge.
        (action @ Route::Action(_), dir @ Route::Dir { .. }) => merge(
            Route::Dir {
                entries: HashMap::new(),
                fallback: Box::new(action),
            },
            dir,
        ),
        (
            Route::Dir {
                mut entries,
                fallback,
            },
            Route::Dir {
                entries: other_entries,
                fallback: other_fallback,
            },
        ) => {
            for (segment, route) in other_entries {
                let combined = match entries.remove(&segment) {
                    Some(existing) => merge(existing, route),
                    None => route,
                };
                entries.insert(segment, combined);
            }
            Route::Dir {
                entries,
                fallback: Box::new(merge(*fallback, *other_fallback)),
            }
        }
        (Route::Dir { entries, fallback }, right) => Route::Dir {
            entries,
            fallback: Box::new(merge(*fallback, right)),
        },
    }
}
