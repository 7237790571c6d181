//! Response status values.
//!
//! # Responsibilities
//! - Map numeric codes to their canonical reason phrases
//! - Validate status input from handlers (numeric or preformatted line)
//! - Render the status line the transport writes

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Canonical reason phrase for a status code, if the registry knows it.
pub fn reason(code: u16) -> Option<&'static str> {
    let phrase = match code {
        // Informational
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        // Successful
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi Status",
        226 => "IM Used",
        // Redirection
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        // Client error
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        426 => "Upgrade Required",
        // Server error
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        507 => "Insufficient Storage",
        510 => "Not Extended",
        _ => return None,
    };
    Some(phrase)
}

/// Status line for a code: `404 Not Found`, or the bare number when the
/// registry has no phrase for it.
pub fn line_for(code: u16) -> String {
    match reason(code) {
        Some(phrase) => format!("{code} {phrase}"),
        None => code.to_string(),
    }
}

/// Rejected status input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusError {
    /// Numeric codes must lie in [100, 900].
    #[error("status code out of range: {0}")]
    OutOfRange(u16),

    /// Preformatted lines must look like `"NNN"` or `"NNN Reason Phrase"`.
    #[error("malformed status line: {0:?}")]
    Malformed(String),
}

// ASCII classes on purpose: the wire format is ASCII.
fn line_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{3}( [0-9A-Za-z_ ]+)?$").expect("literal regex"))
}

/// Validated status value rendered into the response status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: u16,
    line: String,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            code: 200,
            line: "200 OK".to_string(),
        }
    }
}

impl Status {
    /// Build from a numeric code in [100, 900].
    pub fn from_code(code: u16) -> Result<Self, StatusError> {
        if !(100..=900).contains(&code) {
            return Err(StatusError::OutOfRange(code));
        }
        Ok(Self {
            code,
            line: line_for(code),
        })
    }

    /// Accept a preformatted line, kept verbatim if its shape is valid.
    pub fn from_line(line: &str) -> Result<Self, StatusError> {
        if !line_shape().is_match(line) {
            return Err(StatusError::Malformed(line.to_string()));
        }
        let code = line[..3]
            .parse()
            .map_err(|_| StatusError::Malformed(line.to_string()))?;
        Ok(Self {
            code,
            line: line.to_string(),
        })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}
