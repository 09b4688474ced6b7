//! Incoming HTTP request type.
//!
//! One owned value per request, handed to the matched handler after the body
//! is fully accumulated. Folds together what dispatch extracted: the request
//! line, headers, the body text, path variables, and query parameters.

use std::collections::HashMap;

use http::HeaderMap;

/// An incoming HTTP request, ready for a handler.
pub struct Request {
    method: http::Method,
    path: String,
    headers: HeaderMap,
    body: String,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: http::Method,
        path: String,
        headers: HeaderMap,
        body: String,
        params: HashMap<String, String>,
        query: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params, query }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The request body, accumulated chunk by chunk in arrival order.
    ///
    /// Bodies are treated as text; chunks that are not valid UTF-8 are
    /// lossily converted. Binary-clean uploads are out of scope.
    pub fn body(&self) -> &str { &self.body }

    /// Header lookup by name (names are matched case-insensitively).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path variable.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`. Values are the raw path segments — not percent-decoded.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// All path variables for the matched route.
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Returns a query parameter, percent-decoded. Last occurrence wins when
    /// a key repeats.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// All query parameters.
    pub fn query_params(&self) -> &HashMap<String, String> { &self.query }
}
