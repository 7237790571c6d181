//! Route declarations.
//!
//! A route pairs a compiled path pattern with a method, a handler and a
//! response flavor. The flavor decides how dispatch errors are rendered
//! for requests that matched this route: HTML pages or JSON envelopes.

use std::fmt;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::gateway::RequestContext;
use crate::http::{Method, Payload};
use crate::routing::pattern::PathPattern;

/// Values captured from the path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArgs(Vec<String>);

impl PathArgs {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Terminal request handler installed on a route.
pub type Handler =
    Arc<dyn Fn(&mut RequestContext, &PathArgs) -> Result<Payload, DispatchError> + Send + Sync>;

/// How errors raised on a route are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// HTML error documents.
    #[default]
    Page,
    /// JSON error envelopes.
    Api,
}

/// A method plus pattern plus handler triple.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: PathPattern,
    flavor: Flavor,
    handler: Handler,
}

impl Route {
    pub fn new(method: Method, pattern: PathPattern, flavor: Flavor, handler: Handler) -> Self {
        Self {
            method,
            pattern,
            flavor,
            handler,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Captures for `path` when both method and pattern agree.
    pub fn matches(&self, method: Method, path: &str) -> Option<PathArgs> {
        if self.method != method {
            return None;
        }
        self.pattern.matches(path).map(PathArgs::new)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw())
            .field("flavor", &self.flavor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Arc::new(|_, _| Ok(Payload::Empty))
    }

    #[test]
    fn test_route_requires_method_agreement() {
        let route = Route::new(
            Method::Get,
            PathPattern::compile("/x/:id").unwrap(),
            Flavor::Page,
            noop(),
        );
        assert_eq!(
            route.matches(Method::Get, "/x/7"),
            Some(PathArgs::new(vec!["7".to_string()]))
        );
        assert_eq!(route.matches(Method::Post, "/x/7"), None);
    }

    #[test]
    fn test_path_args_indexing() {
        let args = PathArgs::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(args.get(0), Some("a"));
        assert_eq!(args.get(1), Some("b"));
        assert_eq!(args.get(2), None);
        assert_eq!(args.len(), 2);
        assert_eq!(args.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
