//! Route registry: ordered route definitions, ordered static-directory names,
//! and the matching/extraction queries dispatch runs per request.
//!
//! Matching is a linear scan in registration order over the live table —
//! there is no compiled tree and no caching. Pattern segments starting with
//! `:` bind a named variable; every other segment must match literally and
//! case-sensitively. When several patterns are ambiguous for a path, the one
//! registered **last** wins.
//!
//! None of the queries here fail. Absent or malformed input degrades to
//! `None` or an empty map.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The directory always searched first for static files.
const DEFAULT_STATIC_DIR: &str = "public";

// ── Route ────────────────────────────────────────────────────────────────────

/// One registered pattern/methods/handler entry. Immutable once added.
pub struct Route {
    pub(crate) pattern: String,
    methods: Vec<Method>,
    pub(crate) handler: BoxedHandler,
}

impl Route {
    pub fn new(pattern: impl Into<String>, methods: &[Method], handler: impl Handler) -> Self {
        Self {
            pattern: pattern.into(),
            methods: methods.to_vec(),
            handler: Arc::new(handler),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The methods declared at registration. Declarative only — see
    /// [`Router::resolve`].
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

/// The application route registry.
///
/// Build it once during setup, registration call by registration call (each
/// returns `self`, so they chain), then hand it to
/// [`Server::new`](crate::Server::new). Insertion order is load-bearing
/// twice over: it is the tie-break for ambiguous route matches and the
/// search order for static directories.
pub struct Router {
    routes: Vec<Route>,
    static_dirs: Vec<String>,
}

impl Router {
    /// An empty route table with the `"public"` static directory preinstalled.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            static_dirs: vec![DEFAULT_STATIC_DIR.to_owned()],
        }
    }

    /// Appends a route. Duplicate and overlapping patterns are allowed; the
    /// later registration shadows the earlier one for ambiguous paths.
    pub fn route(mut self, pattern: &str, methods: &[Method], handler: impl Handler) -> Self {
        self.routes.push(Route::new(pattern, methods, handler));
        self
    }

    /// Appends pre-built routes, preserving their relative order.
    pub fn extend(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(pattern, &[Method::Get], handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(pattern, &[Method::Post], handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(pattern, &[Method::Put], handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(pattern, &[Method::Delete], handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(pattern, &[Method::Patch], handler)
    }

    /// Appends a static directory after the ones already registered.
    pub fn static_dir(mut self, name: impl Into<String>) -> Self {
        self.static_dirs.push(name.into());
        self
    }

    /// Appends several static directories, preserving their relative order.
    pub fn static_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// The static-directory search order: `"public"` first, then every
    /// registered directory in registration order.
    pub fn static_dir_names(&self) -> &[String] {
        &self.static_dirs
    }

    /// Finds the route for a request path, or `None` when either input is
    /// absent or nothing matches.
    ///
    /// Pattern and path are split on `/` with empty segments discarded, so
    /// `/a//b/` and `/a/b` are equivalent. A route is a candidate when the
    /// segment counts are equal and each pattern segment is either a
    /// `:`-variable or a literal, case-sensitive match. The whole table is
    /// scanned; the last candidate in registration order is returned.
    ///
    /// The method argument is only checked for presence. A request whose
    /// method is not in the matched route's declared set still resolves to
    /// that route — method filtering is the handler's job. Faithful to the
    /// behavior applications already depend on; do not "fix" it here.
    pub fn resolve(&self, path: Option<&str>, method: Option<&str>) -> Option<&Route> {
        let (path, _method) = (path?, method?);
        let path_segments = segments(path);

        let mut matched = None;
        for route in &self.routes {
            let pattern_segments = segments(&route.pattern);
            if pattern_segments.len() != path_segments.len() {
                continue;
            }
            let candidate = pattern_segments
                .iter()
                .zip(&path_segments)
                .all(|(pattern, concrete)| pattern.starts_with(':') || pattern == concrete);
            if candidate {
                matched = Some(route);
            }
        }
        matched
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

// ── Extraction queries ───────────────────────────────────────────────────────

/// Binds each `:name` segment of `pattern` to the same-index segment of the
/// request path. The path's query-string portion (after `?`) is ignored.
/// Values are the raw segments — not percent-decoded. Empty when the path is
/// absent.
pub fn path_variables(path: Option<&str>, pattern: &str) -> HashMap<String, String> {
    let Some(path) = path else {
        return HashMap::new();
    };
    let before_query = path.split('?').next().unwrap_or_default();
    let path_segments = segments(before_query);

    let mut variables = HashMap::new();
    for (index, segment) in segments(pattern).iter().enumerate() {
        if let Some(name) = segment.strip_prefix(':') {
            if let Some(value) = path_segments.get(index) {
                variables.insert(name.to_owned(), (*value).to_owned());
            }
        }
    }
    variables
}

/// Splits everything after the first `?` on `&`, then each pair on its first
/// `=`. Keys and values are percent-decoded independently; a pair without
/// `=` binds the key to the empty string; a repeated key keeps the later
/// value. Empty when the url is absent or carries no `?`.
pub fn query_params(url: Option<&str>) -> HashMap<String, String> {
    let Some(url) = url else {
        return HashMap::new();
    };
    let Some((_, query)) = url.split_once('?') else {
        return HashMap::new();
    };

    let mut params = HashMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode(key), decode(value));
    }
    params
}

/// Percent-decodes one key or value. Undecodable input (an invalid UTF-8
/// escape) degrades to the raw text rather than an error.
fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), std::borrow::Cow::into_owned)
}

fn segments(s: &str) -> Vec<&str> {
    s.split('/').filter(|segment| !segment.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::request::Request;
    use crate::response::Response;

    async fn ok(_req: Request) -> Result<Response, Error> {
        Ok(Response::text("ok"))
    }

    #[test]
    fn resolves_a_literal_route() {
        let router = Router::new().get("/test", ok);
        let route = router.resolve(Some("/test"), Some("GET")).unwrap();
        assert_eq!(route.pattern(), "/test");
        assert_eq!(route.methods(), &[Method::Get]);
    }

    #[test]
    fn resolves_a_variable_route() {
        let router = Router::new().get("/test/:id", ok);
        let route = router.resolve(Some("/test/1"), Some("GET")).unwrap();
        assert_eq!(route.pattern(), "/test/:id");
    }

    #[test]
    fn returns_none_for_unknown_path() {
        let router = Router::new().get("/test", ok);
        assert!(router.resolve(Some("/non-existent"), Some("GET")).is_none());
    }

    #[test]
    fn returns_none_when_either_input_is_absent() {
        let router = Router::new().get("/test", ok);
        assert!(router.resolve(None, Some("GET")).is_none());
        assert!(router.resolve(Some("/test"), None).is_none());
    }

    #[test]
    fn segment_counts_must_match() {
        let router = Router::new().get("/a/:id", ok);
        assert!(router.resolve(Some("/a"), Some("GET")).is_none());
        assert!(router.resolve(Some("/a/1/2"), Some("GET")).is_none());
    }

    #[test]
    fn literal_match_is_case_sensitive() {
        let router = Router::new().get("/Users", ok);
        assert!(router.resolve(Some("/users"), Some("GET")).is_none());
        assert!(router.resolve(Some("/Users"), Some("GET")).is_some());
    }

    #[test]
    fn empty_segments_are_discarded() {
        let router = Router::new().get("/a/b", ok);
        assert!(router.resolve(Some("/a//b/"), Some("GET")).is_some());
    }

    #[test]
    fn last_registered_route_wins_ambiguous_matches() {
        let router = Router::new().get("/a/:id", ok).get("/a/:other", ok);
        let route = router.resolve(Some("/a/5"), Some("GET")).unwrap();
        assert_eq!(route.pattern(), "/a/:other");
    }

    #[test]
    fn method_set_is_not_consulted_during_resolution() {
        let router = Router::new().get("/orders", ok);
        // A POST against a GET-only route still resolves. Known, preserved.
        assert!(router.resolve(Some("/orders"), Some("POST")).is_some());
    }

    #[test]
    fn extend_preserves_relative_order() {
        let router = Router::new().extend(vec![
            Route::new("/x/:a", &[Method::Get], ok),
            Route::new("/x/:b", &[Method::Get], ok),
        ]);
        let route = router.resolve(Some("/x/1"), Some("GET")).unwrap();
        assert_eq!(route.pattern(), "/x/:b");
    }

    #[test]
    fn extracts_path_variables() {
        let vars = path_variables(Some("/test/123"), "/test/:id");
        assert_eq!(vars, HashMap::from([("id".to_owned(), "123".to_owned())]));
    }

    #[test]
    fn path_variables_ignore_the_query_string() {
        let vars = path_variables(Some("/test/123?x=1"), "/test/:id");
        assert_eq!(vars.get("id").map(String::as_str), Some("123"));
    }

    #[test]
    fn path_variable_values_stay_raw() {
        let vars = path_variables(Some("/name/a%20b"), "/name/:value");
        assert_eq!(vars.get("value").map(String::as_str), Some("a%20b"));
    }

    #[test]
    fn path_variables_empty_when_path_absent() {
        assert!(path_variables(None, "/test/:id").is_empty());
    }

    #[test]
    fn extracts_and_decodes_query_params() {
        let params = query_params(Some("/x?_fields=_all&_sort=createdIn%20DESC"));
        assert_eq!(params.get("_fields").map(String::as_str), Some("_all"));
        assert_eq!(params.get("_sort").map(String::as_str), Some("createdIn DESC"));
    }

    #[test]
    fn query_params_empty_without_question_mark_or_url() {
        assert!(query_params(Some("/plain/path")).is_empty());
        assert!(query_params(None).is_empty());
    }

    #[test]
    fn malformed_pair_binds_empty_string() {
        let params = query_params(Some("/x?flag&k=v"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert_eq!(params.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn duplicate_query_key_keeps_the_later_value() {
        let params = query_params(Some("/x?k=first&k=second"));
        assert_eq!(params.get("k").map(String::as_str), Some("second"));
    }

    #[test]
    fn undecodable_escape_degrades_to_raw_text() {
        // %FF is not valid UTF-8 once unescaped.
        let params = query_params(Some("/x?k=%FF"));
        assert_eq!(params.get("k").map(String::as_str), Some("%FF"));
    }

    #[test]
    fn static_dirs_start_with_public_and_keep_registration_order() {
        let router = Router::new().static_dirs(["a", "b"]);
        assert_eq!(router.static_dir_names(), &["public", "a", "b"]);
    }

    #[test]
    fn static_dir_listing_is_stable() {
        let router = Router::new().static_dir("assets");
        let first: Vec<String> = router.static_dir_names().to_vec();
        assert_eq!(router.static_dir_names(), first.as_slice());
    }
}
