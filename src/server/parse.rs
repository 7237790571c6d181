//! HTTP/1.x request reading.
//!
//! # Responsibilities
//! - Read one request line, header block and body from a buffered stream
//! - Enforce the configured size limits while reading, not after
//! - Classify failures so the transport can reject without dispatching
//!
//! # Design Decisions
//! - Bare-LF line endings are tolerated on input; output is always CRLF
//! - The body is read to completion here, exactly `Content-Length`
//!   bytes; chunked transfer encoding is rejected up front

use std::io::BufRead;

use thiserror::Error;

use crate::http::Method;

/// Read limits for one request.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_header_bytes: 16 * 1024,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Why a request never reached the gateway.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("request line and headers exceed {0} bytes")]
    HeadersTooLarge(usize),

    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("unsupported method {0:?}")]
    UnknownMethod(String),

    #[error("connection read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Status the transport rejects this failure with.
    pub fn status_code(&self) -> u16 {
        match self {
            ParseError::Malformed(_) | ParseError::Io(_) => 400,
            ParseError::HeadersTooLarge(_) | ParseError::BodyTooLarge(_) => 413,
            ParseError::UnknownMethod(_) => 501,
        }
    }
}

/// One request as read off the wire, ready for translation to the
/// gateway calling convention.
#[derive(Debug)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub query_string: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Read one full request. Limits are enforced while bytes arrive, so an
/// oversized client is cut off early.
pub fn read_request<R: BufRead>(
    reader: &mut R,
    limits: &Limits,
) -> Result<ParsedRequest, ParseError> {
    let mut consumed = 0usize;

    let request_line = read_line(reader, limits, &mut consumed)?
        .ok_or_else(|| ParseError::Malformed("connection closed before a request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::Malformed(format!(
            "bad request line {request_line:?}"
        )));
    };
    if parts.next().is_some() || !version.starts_with("HTTP/") {
        return Err(ParseError::Malformed(format!(
            "bad request line {request_line:?}"
        )));
    }
    if method.parse::<Method>().is_err() {
        return Err(ParseError::UnknownMethod(method.to_string()));
    }

    let (path, query_string) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target.to_string(), String::new()),
    };

    let mut headers: Vec<(String, String)> = Vec::new();
    loop {
        let line = read_line(reader, limits, &mut consumed)?.ok_or_else(|| {
            ParseError::Malformed("connection closed inside the header block".to_string())
        })?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::Malformed(format!("bad header line {line:?}")));
        };
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    if headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("transfer-encoding"))
    {
        return Err(ParseError::Malformed(
            "chunked transfer encoding is not supported".to_string(),
        ));
    }

    let content_length = match headers
        .iter()
        .rev()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
    {
        Some((_, value)) => value
            .parse::<usize>()
            .map_err(|_| ParseError::Malformed(format!("bad Content-Length {value:?}")))?,
        None => 0,
    };
    if content_length > limits.max_body_bytes {
        return Err(ParseError::BodyTooLarge(limits.max_body_bytes));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(ParsedRequest {
        method: method.to_string(),
        path,
        query_string,
        headers,
        body,
    })
}

/// One line without its terminator; `None` at clean EOF.
fn read_line<R: BufRead>(
    reader: &mut R,
    limits: &Limits,
    consumed: &mut usize,
) -> Result<Option<String>, ParseError> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw)?;
    if n == 0 {
        return Ok(None);
    }
    *consumed += n;
    if *consumed > limits.max_header_bytes {
        return Err(ParseError::HeadersTooLarge(limits.max_header_bytes));
    }
    while matches!(raw.last(), Some(b'\n') | Some(b'\r')) {
        raw.pop();
    }
    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| ParseError::Malformed("header bytes are not UTF-8".to_string()))
}
