//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, decoded path)
//!     → table.rs (linear scan, registration order)
//!     → pattern.rs (static equality or anchored regex)
//!     → Return: Lookup::Handler with captures, Lookup::File with
//!       remainder, or None
//!
//! Route Compilation (at registration):
//!     "/path/to/:file"
//!     → Escape literal runs, name each capture
//!     → ^/path/to/(?P<file>[^/]+)$
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at registration, immutable afterwards
//! - First match wins; registration order is the only precedence
//! - Static-file routes sit in the same table as handler routes, so
//!   their precedence is positional too

pub mod pattern;
pub mod route;
pub mod static_files;
pub mod table;

pub use pattern::{PathPattern, PatternError};
pub use route::{Flavor, Handler, PathArgs, Route};
pub use static_files::{FileChunks, StaticRoute};
pub use table::{Lookup, RouteTable};
