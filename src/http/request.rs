//! Inbound request snapshot.
//!
//! # Responsibilities
//! - Freeze the transport's description of one request
//! - Derive views on first use and cache them for the dispatch: header map,
//!   cookie map, body bytes, parsed form data
//!
//! # Design Decisions
//! - The snapshot is immutable from the handler's point of view; caching
//!   uses interior mutability, so a Request stays on its dispatch thread
//! - Form sources follow the classic CGI split: query string for GET/HEAD,
//!   urlencoded or multipart body for everything else; blank values kept
//! - Cookie values are percent-decoded only; `+` survives verbatim

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::DispatchError;
use crate::http::method::{Method, UnknownMethod};
use crate::http::multipart;
use crate::http::percent;

/// Raw transport description of one inbound request, per the gateway
/// calling convention.
pub struct RawRequest {
    pub method: String,
    /// Still percent-encoded.
    pub path: String,
    pub query_string: String,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
    pub remote_addr: Option<String>,
    pub document_root: Option<PathBuf>,
}

impl Default for RawRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            path: "/".to_string(),
            query_string: String::new(),
            headers: Vec::new(),
            body: Box::new(io::empty()),
            remote_addr: None,
            document_root: None,
        }
    }
}

/// One decoded form value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(UploadFile),
}

/// Uploaded file part: the client-supplied filename plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Ordered multi-map of parsed form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub(crate) fn push(&mut self, name: impl Into<String>, value: FormValue) {
        self.entries.push((name.into(), value));
    }

    /// First value registered under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// First text value for `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|(entry, value)| match value {
            FormValue::Text(text) if entry == name => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every text value for `name`, in arrival order.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(entry, value)| match value {
                FormValue::Text(text) if entry == name => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First uploaded file for `name`.
    pub fn file(&self, name: &str) -> Option<&UploadFile> {
        self.entries.iter().find_map(|(entry, value)| match value {
            FormValue::File(file) if entry == name => Some(file),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FormValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable snapshot of one inbound request, with lazily cached views.
pub struct Request {
    method: Method,
    path: String,
    query_string: String,
    raw_headers: Vec<(String, String)>,
    remote_addr: String,
    document_root: Option<PathBuf>,
    body_source: RefCell<Option<Box<dyn Read + Send>>>,
    body: OnceCell<io::Result<Vec<u8>>>,
    header_map: OnceCell<HashMap<String, String>>,
    cookies: OnceCell<HashMap<String, String>>,
    form: OnceCell<Result<FormData, DispatchError>>,
}

impl Request {
    /// Build the snapshot from transport input. Fails on method tokens the
    /// engine does not dispatch.
    pub fn from_raw(raw: RawRequest) -> Result<Self, UnknownMethod> {
        let method = raw.method.parse()?;
        Ok(Self {
            method,
            path: percent::unquote(&raw.path),
            query_string: raw.query_string,
            raw_headers: raw.headers,
            remote_addr: raw.remote_addr.unwrap_or_else(|| "0.0.0.0".to_string()),
            document_root: raw.document_root,
            body_source: RefCell::new(Some(raw.body)),
            body: OnceCell::new(),
            header_map: OnceCell::new(),
            cookies: OnceCell::new(),
            form: OnceCell::new(),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Percent-decoded request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, undecoded.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Peer address; `0.0.0.0` when the transport supplied none.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub fn document_root(&self) -> Option<&PathBuf> {
        self.document_root.as_ref()
    }

    /// Header lookup, case-insensitive. Later duplicates win.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_map()
            .get(&name.to_uppercase())
            .map(String::as_str)
    }

    /// Raw header list in transport order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.raw_headers
    }

    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Decoded cookie map from the Cookie header.
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| {
            let mut map = HashMap::new();
            if let Some(raw) = self.header("Cookie") {
                for piece in raw.split(';') {
                    if let Some(at) = piece.find('=') {
                        let name = piece[..at].trim();
                        if !name.is_empty() {
                            map.insert(name.to_string(), percent::unquote(&piece[at + 1..]));
                        }
                    }
                }
            }
            map
        })
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name).map(String::as_str)
    }

    /// Raw body bytes, read from the transport on first access and cached.
    pub fn body(&self) -> Result<&[u8], DispatchError> {
        let cached = self.body.get_or_init(|| {
            let mut source = match self.body_source.borrow_mut().take() {
                Some(source) => source,
                None => return Ok(Vec::new()),
            };
            let mut buffer = Vec::new();
            source.read_to_end(&mut buffer).map(|_| buffer)
        });
        match cached {
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(DispatchError::Internal(format!(
                "request body read failed: {e}"
            ))),
        }
    }

    /// Parsed form inputs, per the source rules in the module docs.
    pub fn form(&self) -> Result<&FormData, DispatchError> {
        match self.form.get_or_init(|| self.parse_form()) {
            Ok(form) => Ok(form),
            Err(e) => Err(e.clone()),
        }
    }

    fn header_map(&self) -> &HashMap<String, String> {
        self.header_map.get_or_init(|| {
            let mut map = HashMap::new();
            for (name, value) in &self.raw_headers {
                map.insert(name.to_uppercase(), value.clone());
            }
            map
        })
    }

    fn parse_form(&self) -> Result<FormData, DispatchError> {
        if matches!(self.method, Method::Get | Method::Head) {
            return Ok(parse_urlencoded(self.query_string.as_bytes()));
        }
        let content_type = self.content_type().unwrap_or("").to_string();
        let base = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if base == "multipart/form-data" {
            let boundary = multipart::boundary(&content_type).ok_or_else(|| {
                DispatchError::validation("body", "multipart body without a boundary")
            })?;
            return multipart::parse(self.body()?, &boundary);
        }
        if base.is_empty() || base == "application/x-www-form-urlencoded" {
            return Ok(parse_urlencoded(self.body()?));
        }
        // Unparsed media type: no form fields, body stays available raw.
        Ok(FormData::default())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_string", &self.query_string)
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

fn parse_urlencoded(bytes: &[u8]) -> FormData {
    let mut form = FormData::default();
    for (name, value) in url::form_urlencoded::parse(bytes) {
        form.push(name.into_owned(), FormValue::Text(value.into_owned()));
    }
    form
}
