use std::mem;

use tracing::info;

use crate::{request::Request, response_writer::ResponseWriter, server::Handler};

use super::{
    build,
    route::{merge, Route},
    segment,
};

/// Result of one dispatch. `NoMatch` means this dispatcher does not own
/// the path; the caller decides what to try next.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    Matched,
    NoMatch,
}

/// An immutable routing tree plus the traversal that runs requests
/// against it. Built once, then shared read-only across dispatches.
pub struct Dispatcher<'a> {
    root: Route<'a>,
}

struct Resolution<'a> {
    handler: &'a (dyn Handler + Sync),
    consumed: String,
    bindings: Vec<(String, String)>,
}

impl<'a> Dispatcher<'a> {
    pub fn new_empty() -> Self {
        Self {
            root: Route::NoRoute,
        }
    }

    #[allow(unused)]
    pub fn from_pairs<'p>(
        pairs: impl IntoIterator<Item = (&'p str, &'a (dyn Handler + Sync))>,
    ) -> Self {
        Self {
            root: build::all(pairs),
        }
    }

    /// Merges the pattern into the tree. Registration order matters: a
    /// later identical pattern replaces the earlier one, and the first
    /// capture registered at a level stays the reachable one.
    pub fn add_route(&mut self, pattern: &str, handler: &'a (dyn Handler + Sync)) {
        let root = mem::replace(&mut self.root, Route::NoRoute);
        self.root = merge(root, build::single(pattern, handler));
    }

    pub fn matches(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Runs the request's unmatched path against the tree. On a match the
    /// consumed prefix, the unmatched suffix and the capture bindings are
    /// published to the request before the handler runs; on `NoMatch` the
    /// request and writer are left untouched.
    pub fn dispatch(&self, w: &mut ResponseWriter, r: &mut Request) -> Outcome {
        let Some(resolution) = self.resolve(r.get_path_info()) else {
            return Outcome::NoMatch;
        };

        r.trim_path_info(resolution.consumed.len());
        r.extend_context_path(&resolution.consumed);
        // Bindings arrive in traversal order; prepending each one leaves
        // the deepest binding first for every name.
        for (name, value) in resolution.bindings {
            r.bind_param(name, value);
        }

        info!(
            context_path = r.get_context_path(),
            path_info = r.get_path_info(),
            "route match"
        );

        resolution.handler.handle(w, r);
        Outcome::Matched
    }

    fn resolve(&self, full_path: &str) -> Option<Resolution<'a>> {
        let mut node = &self.root;
        let mut path = full_path;
        let mut consumed = String::new();
        let mut bindings: Vec<(String, String)> = vec![];
        let mut fallbacks: Vec<&Route<'a>> = vec![];

        // Every turn of the loop consumes a segment, follows a finite
        // fallback chain or pops the stack, so the walk terminates.
        loop {
            match node {
                Route::Action(handler) => {
                    return Some(Resolution {
                        handler: *handler,
                        consumed,
                        bindings,
                    });
                }
                Route::Capture {
                    name,
                    child,
                    fallback,
                } => {
                    let seg = segment::current_segment(path);
                    if seg.is_empty() {
                        // Nothing to capture. The node's own fallback is
                        // next in line, without a stack push.
                        node = fallback;
                        continue;
                    }
                    bindings.push((name.clone(), seg.to_owned()));
                    let rest = segment::remainder(path);
                    consumed.push_str(&path[..path.len() - rest.len()]);
                    path = rest;
                    fallbacks.push(fallback);
                    node = child;
                }
                Route::Dir { entries, fallback } => {
                    let seg = segment::current_segment(path);
                    match entries.get(seg) {
                        Some(child) => {
                            let rest = segment::remainder(path);
                            consumed.push_str(&path[..path.len() - rest.len()]);
                            path = rest;
                            fallbacks.push(fallback);
                            node = child;
                        }
                        None => node = fallback,
                    }
                }
                Route::NoRoute => node = fallbacks.pop()?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        headers::Headers, request::Request, response_writer::ResponseWriter, server::Handler,
    };

    use super::{Dispatcher, Outcome};

    fn tagged(tag: &'static str) -> impl Handler {
        move |w: &mut ResponseWriter, _: &mut Request| {
            w.set_body_str(tag);
        }
    }

    fn new_request(path: &str) -> Request {
        let request_line = format!("GET /{} HTTP/1.1", path);
        Request::new(request_line, Headers::new_empty(), None)
    }

    fn dispatch(dispatcher: &Dispatcher, path: &str) -> (Outcome, ResponseWriter, Request) {
        let mut w = ResponseWriter::new_empty();
        let mut r = new_request(path);
        let outcome = dispatcher.dispatch(&mut w, &mut r);
        (outcome, w, r)
    }

    fn body_str(w: &ResponseWriter) -> &str {
        std::str::from_utf8(w.get_body()).unwrap()
    }

    #[test]
    fn test_specificity_ordering() {
        let h1 = tagged("h1");
        let h2 = tagged("h2");
        let h3 = tagged("h3");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("a", &h1);
        dispatcher.add_route("a/b", &h2);
        dispatcher.add_route("a/:x", &h3);

        let tests = [("a/b", "h2"), ("a/s", "h3"), ("a", "h1")];

        for (path, want) in tests {
            let (outcome, w, _) = dispatch(&dispatcher, path);
            assert_eq!(outcome, Outcome::Matched);
            assert_eq!(body_str(&w), want);
        }
    }

    #[test]
    fn test_later_duplicate_pattern_wins() {
        let h1 = tagged("h1");
        let h2 = tagged("h2");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("x", &h1);
        dispatcher.add_route("x", &h2);

        let (outcome, w, _) = dispatch(&dispatcher, "x");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(body_str(&w), "h2");
    }

    #[test]
    fn test_capture_binds_deepest_first() {
        let h = tagged("h");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route(":a/:a", &h);

        let (outcome, _, r) = dispatch(&dispatcher, "1/2");
        assert_eq!(outcome, Outcome::Matched);

        let values: Vec<_> = r.get_param_iter("a").unwrap().collect();
        assert_eq!(values, ["2", "1"]);
        assert_eq!(r.get_param("a"), Some("2"));
    }

    #[test]
    fn test_context_path_and_suffix_split() {
        let h = tagged("h");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("foo/bar/quux", &h);

        let (outcome, _, r) = dispatch(&dispatcher, "foo/bar/quux/extra");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(r.get_context_path(), "foo/bar/quux/");
        assert_eq!(r.get_path_info(), "extra");
    }

    #[test]
    fn test_exact_match_consumes_whole_path() {
        let h = tagged("h");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("foo/bar", &h);

        let (outcome, _, r) = dispatch(&dispatcher, "foo/bar");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(r.get_context_path(), "foo/bar");
        assert_eq!(r.get_path_info(), "");
    }

    #[test]
    fn test_empty_capture_segment_unwinds_to_stacked_action() {
        let h_bar = tagged("bar");
        let h_baz = tagged("baz");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("foo/:bar/quux", &h_bar);
        // Root-level action: the outer fallback for the whole foo branch.
        dispatcher.add_route("", &h_baz);

        let (outcome, w, r) = dispatch(&dispatcher, "foo/");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(body_str(&w), "baz");
        // What was consumed before the dead end stays consumed.
        assert_eq!(r.get_context_path(), "foo/");
    }

    #[test]
    fn test_unregistered_path_is_no_match() {
        let h1 = tagged("h1");
        let h2 = tagged("h2");
        let h3 = tagged("h3");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route("a", &h1);
        dispatcher.add_route("a/b", &h2);
        dispatcher.add_route("a/:x", &h3);

        let (outcome, w, r) = dispatch(&dispatcher, "zzz");
        assert_eq!(outcome, Outcome::NoMatch);
        assert!(w.get_status().is_none());
        assert!(w.get_body().is_empty());
        assert_eq!(r.get_context_path(), "");
        assert_eq!(r.get_path_info(), "zzz");
    }

    #[test]
    fn test_dispatches_own_their_state() {
        let h = tagged("h");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route(":x", &h);

        let (_, _, fst) = dispatch(&dispatcher, "one");
        let (_, _, snd) = dispatch(&dispatcher, "two");

        assert_eq!(fst.get_param("x"), Some("one"));
        assert_eq!(snd.get_param("x"), Some("two"));
        assert_eq!(fst.get_context_path(), "one");
        assert_eq!(snd.get_context_path(), "two");
    }

    #[test]
    fn test_first_registered_capture_shadows_second() {
        let h1 = tagged("h1");
        let h2 = tagged("h2");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route(":a/end", &h1);
        dispatcher.add_route(":b/end", &h2);

        // Any non-empty segment goes to the first-registered capture.
        let (outcome, w, r) = dispatch(&dispatcher, "v/end");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(body_str(&w), "h1");
        assert_eq!(r.get_param("a"), Some("v"));
        assert_eq!(r.get_param("b"), None);
    }

    #[test]
    fn test_bare_colon_binds_empty_name() {
        let h = tagged("h");

        let mut dispatcher = Dispatcher::new_empty();
        dispatcher.add_route(":", &h);

        let (outcome, _, r) = dispatch(&dispatcher, "val");
        assert_eq!(outcome, Outcome::Matched);
        assert_eq!(r.get_param(""), Some("val"));
    }

    #[test]
    fn test_from_pairs_matches_incremental_registration() {
        let h1 = tagged("h1");
        let h2 = tagged("h2");

        let dispatcher = Dispatcher::from_pairs([
            ("items", &h1 as &(dyn Handler + Sync)),
            ("items/:id", &h2),
        ]);

        let (_, w, _) = dispatch(&dispatcher, "items");
        assert_eq!(body_str(&w), "h1");

        let (_, w, r) = dispatch(&dispatcher, "items/7");
        assert_eq!(body_str(&w), "h2");
        assert_eq!(r.get_param("id"), Some("7"));
    }
}
