//! Development transport subsystem.
//!
//! # Data Flow
//! ```text
//! TcpListener accept
//!     → one thread per connection
//!     → parse.rs (request line, headers, Content-Length body)
//!     → RawRequest + start-capture closure into Gateway::call
//!     → write status line, headers, Connection: close
//!     → stream body chunks, close the socket
//!
//! Parse failures never reach the gateway: 400 malformed, 413
//! oversized, 501 unknown method, each written directly.
//! ```
//!
//! # Design Decisions
//! - Synchronous, thread per connection, one request per connection;
//!   the engine is transport-agnostic and this is the smallest honest
//!   host for it
//! - `Content-Length` is added for in-memory bodies when the gateway
//!   did not set one; streamed bodies close the connection to mark the
//!   end instead

pub mod parse;

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::config::ServerConfig;
use crate::gateway::Gateway;
use crate::http::status;
use crate::http::{RawRequest, ResponseBody};

pub use parse::{read_request, Limits, ParseError, ParsedRequest};

/// Thread-per-connection development server around a composed gateway.
pub struct DevServer {
    gateway: Arc<Gateway>,
    limits: Limits,
}

impl DevServer {
    pub fn new(gateway: Gateway, config: &ServerConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            limits: Limits {
                max_header_bytes: config.max_header_bytes,
                max_body_bytes: config.max_body_bytes,
            },
        }
    }

    /// Bind and serve until the process exits.
    pub fn run(self, bind_address: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(bind_address)?;
        self.serve(listener)
    }

    /// Serve connections from an existing listener.
    pub fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Development server listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let gateway = Arc::clone(&self.gateway);
                    let limits = self.limits;
                    thread::spawn(move || handle_connection(gateway, stream, limits));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                }
            }
        }
        Ok(())
    }
}

fn handle_connection(gateway: Arc<Gateway>, stream: TcpStream, limits: Limits) {
    let peer = stream.peer_addr().ok();
    let reader_half = match stream.try_clone() {
        Ok(clone) => clone,
        Err(e) => {
            tracing::warn!(error = %e, "Connection setup failed");
            return;
        }
    };
    let mut reader = BufReader::new(reader_half);
    let mut writer = stream;

    let parsed = match read_request(&mut reader, &limits) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting connection");
            let _ = write_reject(&mut writer, e.status_code());
            return;
        }
    };

    let raw = RawRequest {
        method: parsed.method,
        path: parsed.path,
        query_string: parsed.query_string,
        headers: parsed.headers,
        body: Box::new(std::io::Cursor::new(parsed.body)),
        remote_addr: peer.map(|p| p.ip().to_string()),
        document_root: None,
    };

    let mut started: Option<(String, Vec<(String, String)>)> = None;
    let body = gateway.call(raw, &mut |line: &str, headers: &[(String, String)]| {
        started = Some((line.to_string(), headers.to_vec()));
    });

    let Some((line, headers)) = started else {
        tracing::error!("Gateway returned without starting the response");
        return;
    };
    if let Err(e) = write_response(&mut writer, &line, &headers, body) {
        tracing::debug!(error = %e, "Client went away mid-response");
    }
}

fn write_response(
    stream: &mut TcpStream,
    line: &str,
    headers: &[(String, String)],
    body: ResponseBody,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(stream);
    write!(out, "HTTP/1.1 {line}\r\n")?;
    for (name, value) in headers {
        write!(out, "{name}: {value}\r\n")?;
    }
    let has_length = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-length"));
    if !has_length {
        if let Some(len) = body.len() {
            write!(out, "Content-Length: {len}\r\n")?;
        }
    }
    write!(out, "Connection: close\r\n\r\n")?;

    for chunk in body {
        out.write_all(&chunk?)?;
    }
    out.flush()
}

fn write_reject(stream: &mut TcpStream, code: u16) -> std::io::Result<()> {
    let line = status::line_for(code);
    let body = format!("<html><body><h1>{line}</h1></body></html>");
    let mut out = BufWriter::new(stream);
    write!(out, "HTTP/1.1 {line}\r\n")?;
    write!(out, "Content-Type: text/html; charset=utf-8\r\n")?;
    write!(out, "Content-Length: {}\r\n", body.len())?;
    write!(out, "Connection: close\r\n\r\n")?;
    out.write_all(body.as_bytes())?;
    out.flush()
}
