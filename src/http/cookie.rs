//! Set-Cookie serialization.
//!
//! # Responsibilities
//! - Hold one outgoing cookie with its attributes
//! - Serialize to the wire format in the fixed attribute order
//! - Provide the epoch-expired form used to delete a cookie client-side
//!
//! # Design Decisions
//! - Values are percent-encoded; `+` never stands for a space in cookies
//! - An absolute Expires takes precedence over Max-Age when both are set
//! - HttpOnly defaults on and must be disabled explicitly

use chrono::{DateTime, Utc};

use crate::http::percent;

/// One outgoing cookie. Built with the setter methods, serialized once when
/// handed to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    max_age: Option<i64>,
    expires: Option<DateTime<Utc>>,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            expires: None,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
        }
    }

    /// Cookie that expired at the UNIX epoch; setting it deletes `name` on
    /// the client.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "deleted").expires(DateTime::UNIX_EPOCH)
    }

    /// Relative lifetime in seconds. Ignored if an absolute expiry is set.
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Absolute expiry. Wins over `max_age` when both are given.
    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire form, attributes in fixed order: value, Max-Age or Expires,
    /// Path, Domain, Secure, HttpOnly.
    pub fn serialize(&self) -> String {
        let mut out = format!("{}={}", self.name, percent::quote(&self.value));
        if let Some(at) = self.expires {
            out.push_str(&format!("; Expires={}", format_gmt(at)));
        } else if let Some(seconds) = self.max_age {
            out.push_str(&format!("; Max-Age={seconds}"));
        }
        out.push_str(&format!("; Path={}", self.path));
        if let Some(domain) = &self.domain {
            out.push_str(&format!("; Domain={domain}"));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// RFC-1123 timestamp in GMT, the only zone cookies speak.
pub fn format_gmt(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
