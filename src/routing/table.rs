//! Ordered route lookup.
//!
//! # Responsibilities
//! - Hold handler routes and static-file routes in registration order
//! - Resolve a method and path to the first entry that matches
//!
//! # Design Decisions
//! - Lookup is a linear scan. Registration order is the only precedence
//!   rule; a static-file prefix registered early shadows later handlers
//!   under it, and vice versa
//! - Compilation happens at registration, so a bad path surfaces at
//!   startup rather than on first request

use crate::http::Method;
use crate::routing::pattern::{PathPattern, PatternError};
use crate::routing::route::{Flavor, Handler, PathArgs, Route};
use crate::routing::static_files::StaticRoute;

#[derive(Debug, Clone)]
enum RouteEntry {
    Handler(Route),
    Static(StaticRoute),
}

/// Result of a table lookup, borrowing the matched entry.
#[derive(Debug)]
pub enum Lookup<'t> {
    /// A handler route matched; `args` are its path captures.
    Handler { route: &'t Route, args: PathArgs },
    /// A static-file route claimed the path; `remainder` is the part
    /// after its prefix.
    File {
        route: &'t StaticRoute,
        remainder: String,
    },
}

/// The dispatch table: every declared route, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler route. The path is compiled here; errors abort
    /// registration.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        flavor: Flavor,
        handler: Handler,
    ) -> Result<(), PatternError> {
        let pattern = PathPattern::compile(path)?;
        self.entries
            .push(RouteEntry::Handler(Route::new(method, pattern, flavor, handler)));
        Ok(())
    }

    /// Append a static-file route.
    pub fn register_static(&mut self, route: StaticRoute) {
        self.entries.push(RouteEntry::Static(route));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry matching `method` and `path`, scanning in
    /// registration order.
    pub fn find(&self, method: Method, path: &str) -> Option<Lookup<'_>> {
        for entry in &self.entries {
            match entry {
                RouteEntry::Handler(route) => {
                    if let Some(args) = route.matches(method, path) {
                        return Some(Lookup::Handler { route, args });
                    }
                }
                RouteEntry::Static(route) => {
                    if let Some(remainder) = route.matches(method, path) {
                        return Some(Lookup::File {
                            route,
                            remainder: remainder.to_string(),
                        });
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Payload;
    use std::sync::Arc;

    fn noop() -> Handler {
        Arc::new(|_, _| Ok(Payload::Empty))
    }

    fn matched_pattern(lookup: Lookup<'_>) -> String {
        match lookup {
            Lookup::Handler { route, .. } => route.pattern().raw().to_string(),
            Lookup::File { route, .. } => route.prefix().to_string(),
        }
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut table = RouteTable::new();
        table
            .register(Method::Get, "/item/:id", Flavor::Page, noop())
            .unwrap();
        table
            .register(Method::Get, "/item/special", Flavor::Page, noop())
            .unwrap();

        // the dynamic route was registered first, so it shadows the
        // static one even though both match
        let lookup = table.find(Method::Get, "/item/special").unwrap();
        assert_eq!(matched_pattern(lookup), "/item/:id");
    }

    #[test]
    fn test_static_route_precedence_is_positional() {
        let mut table = RouteTable::new();
        table
            .register(Method::Get, "/exact", Flavor::Page, noop())
            .unwrap();
        table
            .register(Method::Get, "/:anything", Flavor::Page, noop())
            .unwrap();

        let lookup = table.find(Method::Get, "/exact").unwrap();
        assert_eq!(matched_pattern(lookup), "/exact");
        let lookup = table.find(Method::Get, "/else").unwrap();
        assert_eq!(matched_pattern(lookup), "/:anything");
    }

    #[test]
    fn test_method_mismatch_continues_the_scan() {
        let mut table = RouteTable::new();
        table
            .register(Method::Post, "/thing", Flavor::Api, noop())
            .unwrap();
        table
            .register(Method::Get, "/thing", Flavor::Page, noop())
            .unwrap();

        match table.find(Method::Get, "/thing").unwrap() {
            Lookup::Handler { route, .. } => assert_eq!(route.flavor(), Flavor::Page),
            other => panic!("expected handler lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_no_match_is_none() {
        let mut table = RouteTable::new();
        table
            .register(Method::Get, "/only", Flavor::Page, noop())
            .unwrap();
        assert!(table.find(Method::Get, "/other").is_none());
        assert!(table.find(Method::Delete, "/only").is_none());
    }

    #[test]
    fn test_static_file_entry_scans_like_any_other() {
        let mut table = RouteTable::new();
        table.register_static(StaticRoute::new("/static/", "/tmp"));
        table
            .register(Method::Get, "/static/pinned", Flavor::Page, noop())
            .unwrap();

        // registered first, the file route claims everything under the
        // prefix including the handler path behind it
        match table.find(Method::Get, "/static/pinned").unwrap() {
            Lookup::File { remainder, .. } => assert_eq!(remainder, "pinned"),
            other => panic!("expected file lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_pattern_fails_registration() {
        let mut table = RouteTable::new();
        let err = table
            .register(Method::Get, "/:a/:a", Flavor::Page, noop())
            .unwrap_err();
        assert!(matches!(err, PatternError::DuplicateVariable(_)));
        assert!(table.is_empty());
    }
}
