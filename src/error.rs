//! Dispatch error taxonomy and control-flow signals.
//!
//! # Responsibilities
//! - Model every way a handler or interceptor terminates a dispatch early
//! - Carry enough structure for the gateway to render a deterministic wire
//!   response (status, headers, HTML or JSON body)
//! - Seed explicit HTTP errors with the implementation identity header
//!
//! # Design Decisions
//! - One enum covers the whole taxonomy; the gateway matches on it exactly
//!   once per dispatch
//! - Redirects are control flow, not failures, but travel the same channel
//!   so middleware can catch and transform them uniformly

use thiserror::Error;

use crate::http::status::{self, StatusError};

/// Identity header appended last to every externally visible header list.
pub const POWERED_BY: (&str, &str) = (
    "X-Powered-By",
    concat!("portico/", env!("CARGO_PKG_VERSION")),
);

pub(crate) fn powered_by_header() -> (String, String) {
    (POWERED_BY.0.to_string(), POWERED_BY.1.to_string())
}

/// Explicit HTTP failure carrying its own status and header list.
///
/// The header list starts with the identity header; error responses bypass
/// the normal Response headers, so they carry their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    code: u16,
    headers: Vec<(String, String)>,
}

impl HttpError {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            headers: vec![powered_by_header()],
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Status line, e.g. `404 Not Found`.
    pub fn status_line(&self) -> String {
        status::line_for(self.code)
    }

    /// Append an extra header to the error response.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.status_line())
    }
}

/// The status codes a redirect signal may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    MovedPermanently,
    Found,
    SeeOther,
}

impl RedirectKind {
    pub fn code(self) -> u16 {
        match self {
            RedirectKind::MovedPermanently => 301,
            RedirectKind::Found => 302,
            RedirectKind::SeeOther => 303,
        }
    }
}

/// Redirect control signal with its target location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub location: String,
}

/// Everything a handler or interceptor can surface.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Bad or missing input field.
    #[error("invalid value for field {field:?}: {message}")]
    Validation { field: String, message: String },

    /// Authenticated but not allowed.
    #[error("permission denied: {message}")]
    Permission { message: String },

    /// No matching route, resource, or static file.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Control-flow redirect (301/302/303).
    #[error("redirect {} to {}", .0.kind.code(), .0.location)]
    Redirect(Redirect),

    /// Explicit status escape hatch with its own headers.
    #[error("{0}")]
    Http(HttpError),

    /// Unexpected failure. Logged in full; clients see a generic message
    /// unless the debug flag is set.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request() -> Self {
        Self::Http(HttpError::new(400))
    }

    /// 401 Unauthorized.
    pub fn unauthorized() -> Self {
        Self::Http(HttpError::new(401))
    }

    /// 403 Forbidden.
    pub fn forbidden() -> Self {
        Self::Http(HttpError::new(403))
    }

    /// 409 Conflict.
    pub fn conflict() -> Self {
        Self::Http(HttpError::new(409))
    }

    /// 500 as an explicit status, without the internal-failure logging path.
    pub fn internal_error() -> Self {
        Self::Http(HttpError::new(500))
    }

    /// 301 Moved Permanently.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(Redirect {
            kind: RedirectKind::MovedPermanently,
            location: location.into(),
        })
    }

    /// 302 Found.
    pub fn found(location: impl Into<String>) -> Self {
        Self::Redirect(Redirect {
            kind: RedirectKind::Found,
            location: location.into(),
        })
    }

    /// 303 See Other.
    pub fn see_other(location: impl Into<String>) -> Self {
        Self::Redirect(Redirect {
            kind: RedirectKind::SeeOther,
            location: location.into(),
        })
    }

    /// Wire status this error renders as.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::Validation { .. } => 400,
            DispatchError::Permission { .. } => 403,
            DispatchError::NotFound { .. } => 404,
            DispatchError::Redirect(redirect) => redirect.kind.code(),
            DispatchError::Http(http) => http.code(),
            DispatchError::Internal(_) => 500,
        }
    }

    /// Machine-readable code for JSON error bodies.
    pub fn api_code(&self) -> String {
        match self {
            DispatchError::Validation { .. } => "value:invalid".to_string(),
            DispatchError::Permission { .. } => "permission:forbidden".to_string(),
            DispatchError::NotFound { .. } => "resource:notfound".to_string(),
            DispatchError::Redirect(redirect) => format!("http:{}", redirect.kind.code()),
            DispatchError::Http(http) => format!("http:{}", http.code()),
            DispatchError::Internal(_) => "internal:error".to_string(),
        }
    }

    /// The field or resource a JSON error body points at.
    pub fn api_data(&self) -> &str {
        match self {
            DispatchError::Validation { field, .. } => field,
            DispatchError::NotFound { resource, .. } => resource,
            _ => "",
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<std::io::Error> for DispatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<StatusError> for DispatchError {
    fn from(e: StatusError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_seeds_identity_header() {
        let err = HttpError::new(404);
        assert_eq!(err.headers().len(), 1);
        assert_eq!(err.headers()[0].0, "X-Powered-By");
        assert!(err.headers()[0].1.starts_with("portico/"));
    }

    #[test]
    fn test_http_error_status_line() {
        assert_eq!(HttpError::new(404).status_line(), "404 Not Found");
        assert_eq!(HttpError::new(299).status_line(), "299");
    }

    #[test]
    fn test_extra_headers_append_after_identity() {
        let mut err = HttpError::new(401);
        err.push_header("WWW-Authenticate", "Basic");
        assert_eq!(err.headers()[1], ("WWW-Authenticate".to_string(), "Basic".to_string()));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(DispatchError::validation("email", "bad").status_code(), 400);
        assert_eq!(DispatchError::permission("no").status_code(), 403);
        assert_eq!(DispatchError::not_found("blog").status_code(), 404);
        assert_eq!(DispatchError::see_other("/signin").status_code(), 303);
        assert_eq!(DispatchError::conflict().status_code(), 409);
        assert_eq!(DispatchError::Internal("boom".to_string()).status_code(), 500);
    }

    #[test]
    fn test_redirect_helpers() {
        match DispatchError::redirect("/a") {
            DispatchError::Redirect(r) => {
                assert_eq!(r.kind.code(), 301);
                assert_eq!(r.location, "/a");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
        assert_eq!(DispatchError::found("/b").status_code(), 302);
    }

    #[test]
    fn test_api_codes() {
        let err = DispatchError::validation("email", "missing");
        assert_eq!(err.api_code(), "value:invalid");
        assert_eq!(err.api_data(), "email");

        let err = DispatchError::not_found("blog");
        assert_eq!(err.api_code(), "resource:notfound");
        assert_eq!(err.api_data(), "blog");

        assert_eq!(DispatchError::forbidden().api_code(), "http:403");
        assert_eq!(DispatchError::Internal("x".to_string()).api_code(), "internal:error");
    }
}
