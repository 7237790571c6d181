//! Outbound response state.
//!
//! # Responsibilities
//! - Hold the mutable per-dispatch status, headers, and cookies
//! - Canonicalize well-known header names, case-insensitively
//! - Produce the externally visible header list in its fixed layout
//!
//! # Design Decisions
//! - Cookies serialize when set and are stored as finished strings
//! - Header storage is ordered (BTreeMap) so wire output is deterministic
//! - The identity header is appended at read time, always last

use std::collections::BTreeMap;

use crate::error::powered_by_header;
use crate::http::cookie::Cookie;
use crate::http::status::{Status, StatusError};

/// Canonical display casings for well-known response headers.
const KNOWN_HEADERS: &[&str] = &[
    "Accept-Ranges",
    "Age",
    "Allow",
    "Cache-Control",
    "Connection",
    "Content-Encoding",
    "Content-Language",
    "Content-Length",
    "Content-Location",
    "Content-MD5",
    "Content-Disposition",
    "Content-Range",
    "Content-Type",
    "Date",
    "ETag",
    "Expires",
    "Last-Modified",
    "Link",
    "Location",
    "P3P",
    "Pragma",
    "Proxy-Authenticate",
    "Refresh",
    "Retry-After",
    "Server",
    "Set-Cookie",
    "Strict-Transport-Security",
    "Trailer",
    "Transfer-Encoding",
    "Vary",
    "Via",
    "Warning",
    "WWW-Authenticate",
    "X-Frame-Options",
    "X-XSS-Protection",
    "X-Content-Type-Options",
    "X-Forwarded-For",
    "X-Powered-By",
    "X-UA-Compatible",
];

fn canonical(name: &str) -> Option<&'static str> {
    KNOWN_HEADERS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(name))
        .copied()
}

/// Mutable response state, one instance per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl Default for Response {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        Self {
            status: Status::default(),
            headers,
            cookies: BTreeMap::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Status line the transport writes, e.g. `200 OK`.
    pub fn status_line(&self) -> &str {
        self.status.line()
    }

    /// Set from a numeric code in [100, 900].
    pub fn set_status(&mut self, code: u16) -> Result<(), StatusError> {
        self.status = Status::from_code(code)?;
        Ok(())
    }

    /// Set from a preformatted `"NNN Phrase"` line.
    pub fn set_status_line(&mut self, line: &str) -> Result<(), StatusError> {
        self.status = Status::from_line(line)?;
        Ok(())
    }

    fn storage_key(name: &str) -> String {
        canonical(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }

    /// Set a header. Well-known names are case-insensitive and stored under
    /// their canonical casing; unknown names keep the caller's casing.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(Self::storage_key(name), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&Self::storage_key(name))
            .map(String::as_str)
    }

    pub fn unset_header(&mut self, name: &str) {
        self.headers.remove(&Self::storage_key(name));
    }

    /// The distinguished Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.set_header("Content-Type", value);
    }

    pub fn unset_content_type(&mut self) {
        self.unset_header("Content-Type");
    }

    pub fn set_content_length(&mut self, length: u64) {
        self.set_header("Content-Length", length.to_string());
    }

    /// Serialize and store a cookie; later reads of `headers()` include it.
    /// Setting the same name again replaces the earlier serialization.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies
            .insert(cookie.name().to_string(), cookie.serialize());
    }

    /// Tell the client to drop `name` (epoch expiry).
    pub fn delete_cookie(&mut self, name: &str) {
        self.set_cookie(Cookie::expired(name));
    }

    /// Forget a pending cookie without telling the client anything.
    pub fn unset_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Externally visible header list: ordinary headers, then one
    /// `Set-Cookie` per stored cookie, then the identity header last.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for serialized in self.cookies.values() {
            out.push(("Set-Cookie".to_string(), serialized.clone()));
        }
        out.push(powered_by_header());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::POWERED_BY;

    #[test]
    fn test_defaults() {
        let response = Response::new();
        assert_eq!(response.status_line(), "200 OK");
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_known_headers_are_case_insensitive() {
        let mut response = Response::new();
        response.set_header("CONTENT-type", "application/json");
        assert_eq!(response.header("content-TYPE"), Some("application/json"));
        // stored once, under the canonical casing
        let headers = response.headers();
        assert_eq!(
            headers
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
        assert!(headers
            .iter()
            .any(|(name, value)| name == "Content-Type" && value == "application/json"));
    }

    #[test]
    fn test_unknown_headers_keep_caller_casing() {
        let mut response = Response::new();
        response.set_header("X-Custom-Thing", "1");
        assert_eq!(response.header("X-Custom-Thing"), Some("1"));
        // unknown names are not case-folded
        assert_eq!(response.header("x-custom-thing"), None);
    }

    #[test]
    fn test_unset_header() {
        let mut response = Response::new();
        response.unset_content_type();
        assert_eq!(response.content_type(), None);
    }

    #[test]
    fn test_status_setters() {
        let mut response = Response::new();
        response.set_status(404).unwrap();
        assert_eq!(response.status_line(), "404 Not Found");
        response.set_status_line("503 Down For Lunch").unwrap();
        assert_eq!(response.status_line(), "503 Down For Lunch");
        assert!(response.set_status(99).is_err());
        assert!(response.set_status_line("nope").is_err());
    }

    #[test]
    fn test_header_list_layout() {
        let mut response = Response::new();
        response.set_cookie(Cookie::new("s1", "ok").max_age(3600));
        response.set_header("Location", "/next");
        let headers = response.headers();

        let set_cookie_at = headers
            .iter()
            .position(|(name, _)| name == "Set-Cookie")
            .unwrap();
        assert_eq!(
            headers[set_cookie_at].1,
            "s1=ok; Max-Age=3600; Path=/; HttpOnly"
        );
        // every ordinary header precedes the cookies
        assert!(headers[..set_cookie_at]
            .iter()
            .all(|(name, _)| name != "Set-Cookie" && name != "X-Powered-By"));
        // identity header is last
        let (last_name, last_value) = headers.last().unwrap();
        assert_eq!(last_name, POWERED_BY.0);
        assert_eq!(last_value, POWERED_BY.1);
    }

    #[test]
    fn test_cookie_replacement_and_delete() {
        let mut response = Response::new();
        response.set_cookie(Cookie::new("s1", "one"));
        response.set_cookie(Cookie::new("s1", "two"));
        let cookies: Vec<_> = response
            .headers()
            .into_iter()
            .filter(|(name, _)| name == "Set-Cookie")
            .collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].1.starts_with("s1=two"));

        response.delete_cookie("s1");
        assert!(response
            .cookie("s1")
            .unwrap()
            .contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));

        response.unset_cookie("s1");
        assert_eq!(response.cookie("s1"), None);
    }
}
