//! Ordered route table and path matcher.
//!
//! A route is a (method, path pattern, handler) triple. Routes are tried in
//! the order they were added and the first match wins. Patterns are
//! `/`-separated; a `{name}` segment captures exactly one non-empty path
//! segment and `*` matches every path.

use crate::error::DispatchError;
use crate::http::{HttpMethod, HttpResponse};
use crate::repository::ItemRepository;

/// Segments captured by `{name}` placeholders.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Params<'p> {
    captures: Vec<(&'static str, &'p str)>,
}

impl<'p> Params<'p> {
    pub fn get(&self, name: &str) -> Option<&'p str> {
        self.captures
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

pub type Handler =
    fn(&mut ItemRepository, &Params<'_>, &[u8]) -> Result<HttpResponse, DispatchError>;

pub struct Route {
    pub method: HttpMethod,
    pub pattern: &'static str,
    pub handler: Handler,
}

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: HttpMethod, pattern: &'static str, handler: Handler) -> Self {
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route whose method and pattern both match.
    pub fn find<'p>(&self, method: &HttpMethod, path: &'p str) -> Option<(&Route, Params<'p>)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| match_path(route.pattern, path).map(|params| (route, params)))
    }
}

/// Match `path` against `pattern`, returning the captured segments.
pub fn match_path<'p>(pattern: &'static str, path: &'p str) -> Option<Params<'p>> {
    if pattern == "*" {
        return Some(Params::default());
    }

    let expected: Vec<&'static str> = pattern.split('/').collect();
    let actual: Vec<&'p str> = path.split('/').collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = Params::default();
    for (want, got) in expected.into_iter().zip(actual) {
        match want.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
            Some(_) if got.is_empty() => return None,
            Some(name) => params.captures.push((name, got)),
            None if want != got => return None,
            None => {}
        }
    }
    Some(params)
}
