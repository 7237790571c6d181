//! Gateway composition.
//!
//! # Responsibilities
//! - Collect route, interceptor, engine and resolver declarations
//! - Compile them into an immutable `Gateway` before serving starts
//!
//! # Design Decisions
//! - Declarations are checked at `build`, so a bad path pattern or
//!   interceptor pattern fails startup instead of the first request
//! - Registration order of routes and interceptors is preserved
//!   exactly; the builder adds no reordering of its own

use std::sync::Arc;

use thiserror::Error;

use crate::error::DispatchResult;
use crate::gateway::{Gateway, RequestContext};
use crate::http::{Method, Payload};
use crate::interceptor::{InterceptorChain, InterceptorError, Middleware};
use crate::routing::{Flavor, Handler, PathArgs, PatternError, RouteTable, StaticRoute};
use crate::session::PrincipalResolver;
use crate::template::{NoEngine, TemplateEngine};

/// A declaration the builder could not compile.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("route {path:?}: {source}")]
    Route {
        path: String,
        source: PatternError,
    },

    #[error("interceptor {pattern:?}: {source}")]
    Interceptor {
        pattern: String,
        source: InterceptorError,
    },
}

enum RouteDecl {
    Handler {
        method: Method,
        path: String,
        flavor: Flavor,
        handler: Handler,
    },
    Static(StaticRoute),
}

/// Collects declarations and compiles the gateway.
pub struct GatewayBuilder {
    routes: Vec<RouteDecl>,
    interceptors: Vec<(String, Arc<dyn Middleware>)>,
    engine: Arc<dyn TemplateEngine>,
    resolver: Option<Arc<dyn PrincipalResolver>>,
    debug: bool,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            interceptors: Vec::new(),
            engine: Arc::new(NoEngine),
            resolver: None,
            debug: false,
        }
    }
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a page route. Errors raised on it render as HTML.
    pub fn route<F>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&mut RequestContext, &PathArgs) -> DispatchResult<Payload> + Send + Sync + 'static,
    {
        self.handler_route(method, path, Flavor::Page, Arc::new(handler))
    }

    /// Declare an API route. Errors raised on it render as JSON
    /// envelopes.
    pub fn api_route<F>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&mut RequestContext, &PathArgs) -> DispatchResult<Payload> + Send + Sync + 'static,
    {
        self.handler_route(method, path, Flavor::Api, Arc::new(handler))
    }

    fn handler_route(
        mut self,
        method: Method,
        path: &str,
        flavor: Flavor,
        handler: Handler,
    ) -> Self {
        self.routes.push(RouteDecl::Handler {
            method,
            path: path.to_string(),
            flavor,
            handler,
        });
        self
    }

    /// Serve files under `root` for GET paths starting with `prefix`.
    /// Takes a table slot like any other route.
    pub fn static_files(mut self, prefix: &str, root: impl Into<std::path::PathBuf>) -> Self {
        self.routes
            .push(RouteDecl::Static(StaticRoute::new(prefix, root.into())));
        self
    }

    /// Register a middleware guarded by an interceptor pattern.
    pub fn interceptor(mut self, pattern: &str, middleware: Arc<dyn Middleware>) -> Self {
        self.interceptors.push((pattern.to_string(), middleware));
        self
    }

    pub fn template_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Resolver run once per dispatch, before the chain, to bind a
    /// principal into the context.
    pub fn principal_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Expose internal-failure detail in 500 bodies.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Compile every declaration. The first bad one aborts the build.
    pub fn build(self) -> Result<Gateway, ComposeError> {
        let mut table = RouteTable::new();
        for decl in self.routes {
            match decl {
                RouteDecl::Handler {
                    method,
                    path,
                    flavor,
                    handler,
                } => {
                    table
                        .register(method, &path, flavor, handler)
                        .map_err(|source| ComposeError::Route { path, source })?;
                }
                RouteDecl::Static(route) => table.register_static(route),
            }
        }

        let mut chain = InterceptorChain::new();
        for (pattern, middleware) in self.interceptors {
            chain
                .register(&pattern, middleware)
                .map_err(|source| ComposeError::Interceptor { pattern, source })?;
        }

        tracing::info!(
            routes = table.len(),
            interceptors = chain.len(),
            "Gateway composed"
        );
        Ok(Gateway::assemble(
            table,
            chain,
            self.engine,
            self.resolver,
            self.debug,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: &mut RequestContext, _: &PathArgs) -> DispatchResult<Payload> {
        Ok(Payload::Empty)
    }

    #[test]
    fn test_bad_route_path_fails_the_build() {
        let err = GatewayBuilder::new()
            .route(Method::Get, "/:x/:x", ok)
            .build()
            .unwrap_err();
        assert!(matches!(err, ComposeError::Route { ref path, .. } if path == "/:x/:x"));
    }

    #[test]
    fn test_bad_interceptor_pattern_fails_the_build() {
        fn pass(
            ctx: &mut RequestContext,
            next: crate::interceptor::Next<'_>,
        ) -> DispatchResult<Payload> {
            next.run(ctx)
        }
        let err = GatewayBuilder::new()
            .interceptor("/a/*/b", Arc::new(pass))
            .build()
            .unwrap_err();
        assert!(matches!(err, ComposeError::Interceptor { ref pattern, .. } if pattern == "/a/*/b"));
    }

    #[test]
    fn test_empty_builder_composes() {
        assert!(GatewayBuilder::new().build().is_ok());
    }
}
