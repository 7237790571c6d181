//! HTTP wire model subsystem.
//!
//! # Data Flow
//! ```text
//! Transport input (RawRequest)
//!     → request.rs (snapshot, lazy header/cookie/form views)
//!     → [routing + interceptor layers run the handler]
//!     → response.rs (status, canonical headers, serialized cookies)
//!     → body.rs (payload realized to bytes or a chunk stream)
//!     → Back to the transport
//! ```
//!
//! # Design Decisions
//! - Requests are immutable snapshots; responses are per-dispatch mutable
//! - Everything here is transport-agnostic: no sockets, no framing

pub mod body;
pub mod cookie;
pub mod method;
pub mod multipart;
pub mod percent;
pub mod request;
pub mod response;
pub mod status;

pub use body::{Payload, ResponseBody};
pub use cookie::Cookie;
pub use method::Method;
pub use request::{FormData, FormValue, RawRequest, Request, UploadFile};
pub use response::Response;
pub use status::Status;
