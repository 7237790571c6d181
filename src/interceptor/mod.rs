//! Interceptor subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch (decoded path, RequestContext)
//!     → chain.rs (walk registered interceptors in order)
//!     → pattern.rs (prefix/suffix predicate per interceptor)
//!     → matching middleware wraps the rest of the chain via Next
//!     → terminal handler at the center
//!     → results and errors unwind back out through the layers
//! ```
//!
//! # Design Decisions
//! - First-registered interceptor is the outermost layer
//! - Predicates are evaluated per request; a rejected interceptor is
//!   invisible to that dispatch
//! - `Next` is a value, not a callback slot, so "call next at most
//!   once" holds by construction

pub mod chain;
pub mod pattern;

pub use chain::{Interceptor, InterceptorChain, Middleware, Next, Terminal};
pub use pattern::{InterceptorError, InterceptorPattern};
