//! Middleware composition.
//!
//! # Responsibilities
//! - Hold (predicate, middleware) pairs in registration order
//! - Compose them with a terminal handler into one dispatch, where the
//!   first-registered interceptor is the outermost layer
//!
//! # Design Decisions
//! - `Next` is consumed by value, so a middleware can run the rest of
//!   the chain at most once; dropping it unopened is the short-circuit
//! - Skipping a non-matching interceptor is a loop step inside
//!   `Next::run`, not a stack frame; chain depth is bounded by the
//!   number of interceptors that actually match
//! - The predicate sees the decoded path only; middleware that wants
//!   more inspects the context itself

use std::sync::Arc;

use crate::error::DispatchError;
use crate::gateway::RequestContext;
use crate::http::Payload;
use crate::interceptor::pattern::{InterceptorError, InterceptorPattern};

/// A chain participant. Implemented for free by closures and fn items
/// of the matching shape.
pub trait Middleware: Send + Sync {
    fn handle(
        &self,
        ctx: &mut RequestContext,
        next: Next<'_>,
    ) -> Result<Payload, DispatchError>;
}

impl<F> Middleware for F
where
    F: Fn(&mut RequestContext, Next<'_>) -> Result<Payload, DispatchError> + Send + Sync,
{
    fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Payload, DispatchError> {
        self(ctx, next)
    }
}

/// One registered (predicate, middleware) pair.
#[derive(Clone)]
pub struct Interceptor {
    pattern: InterceptorPattern,
    middleware: Arc<dyn Middleware>,
}

impl Interceptor {
    pub fn pattern(&self) -> &InterceptorPattern {
        &self.pattern
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// The innermost layer of a dispatch, usually a bound route handler.
pub type Terminal<'t> = dyn Fn(&mut RequestContext) -> Result<Payload, DispatchError> + 't;

/// The rest of the chain, from one middleware's point of view.
pub struct Next<'a> {
    remaining: &'a [Interceptor],
    terminal: &'a Terminal<'a>,
    path: &'a str,
}

impl<'a> Next<'a> {
    /// Run the remaining chain. Interceptors whose predicate rejects the
    /// path are passed over without any of their code executing; when
    /// none remain, the terminal runs.
    pub fn run(self, ctx: &mut RequestContext) -> Result<Payload, DispatchError> {
        let mut remaining = self.remaining;
        while let Some((head, rest)) = remaining.split_first() {
            if head.pattern.matches(self.path) {
                let next = Next {
                    remaining: rest,
                    terminal: self.terminal,
                    path: self.path,
                };
                return head.middleware.handle(ctx, next);
            }
            remaining = rest;
        }
        (self.terminal)(ctx)
    }
}

/// Ordered middleware list, built once at composition time and shared
/// read-only by every dispatch.
#[derive(Debug, Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Interceptor>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware guarded by `pattern`. Order of registration
    /// is order of wrapping: earlier means outermost.
    pub fn register(
        &mut self,
        pattern: &str,
        middleware: Arc<dyn Middleware>,
    ) -> Result<(), InterceptorError> {
        let pattern = InterceptorPattern::parse(pattern)?;
        self.interceptors.push(Interceptor {
            pattern,
            middleware,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// One full dispatch through the chain down to `terminal`.
    pub fn dispatch(
        &self,
        ctx: &mut RequestContext,
        terminal: &Terminal<'_>,
    ) -> Result<Payload, DispatchError> {
        let path = ctx.request().path().to_string();
        let next = Next {
            remaining: &self.interceptors,
            terminal,
            path: &path,
        };
        next.run(ctx)
    }
}
