//! Route matching module
//!
//! Matches a `(method, path)` pair against an ordered route table.

use hyper::Method;

use super::Endpoint;

/// Path condition of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Whole path must be equal
    Exact(&'static str),
    /// Path must start with the prefix; the rest is handed to the endpoint
    Prefix(&'static str),
}

impl PathMatch {
    /// Returns the unmatched remainder of `path`, or `None` if it does not match
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        match *self {
            Self::Exact(exact) => (path == exact).then_some(""),
            Self::Prefix(prefix) => path.strip_prefix(prefix),
        }
    }
}

/// One row of the dispatch table
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: PathMatch,
    pub endpoint: Endpoint,
}

/// Find the first route matching method and path, with the path remainder
pub fn match_route<'r, 'p>(
    method: &Method,
    path: &'p str,
    routes: &'r [Route],
) -> Option<(&'r Route, &'p str)> {
    routes
        .iter()
        .filter(|route| route.method == *method)
        .find_map(|route| route.path.strip(path).map(|rest| (route, rest)))
}
