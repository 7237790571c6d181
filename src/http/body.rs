//! Handler payloads and wire bodies.

use std::fmt;
use std::io;

use crate::template::Template;

/// Lazily produced body chunks; errors surface mid-stream.
pub type ByteStream = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send>;

/// What a handler produces. The gateway realizes this into a wire body
/// before the response starts.
pub enum Payload {
    /// No body (redirect targets, 204s).
    Empty,
    /// UTF-8 text sent as-is.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Serialized as JSON; the response content type becomes
    /// `application/json`.
    Json(serde_json::Value),
    /// Rendered through the configured template engine.
    Template(Template),
    /// Streamed chunks (static files).
    Stream(ByteStream),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => f.write_str("Payload::Empty"),
            Payload::Text(text) => f.debug_tuple("Payload::Text").field(text).finish(),
            Payload::Bytes(bytes) => write!(f, "Payload::Bytes({} bytes)", bytes.len()),
            Payload::Json(value) => f.debug_tuple("Payload::Json").field(value).finish(),
            Payload::Template(template) => {
                f.debug_tuple("Payload::Template").field(template).finish()
            }
            Payload::Stream(_) => f.write_str("Payload::Stream(..)"),
        }
    }
}

/// Concrete body handed back to the transport.
pub enum ResponseBody {
    Empty,
    Bytes(Vec<u8>),
    Stream(ByteStream),
}

impl ResponseBody {
    /// Size known up front; `None` for streams.
    pub fn len(&self) -> Option<usize> {
        match self {
            ResponseBody::Empty => Some(0),
            ResponseBody::Bytes(bytes) => Some(bytes.len()),
            ResponseBody::Stream(_) => None,
        }
    }
}

impl IntoIterator for ResponseBody {
    type Item = io::Result<Vec<u8>>;
    type IntoIter = ByteStream;

    fn into_iter(self) -> ByteStream {
        match self {
            ResponseBody::Empty => Box::new(std::iter::empty()),
            ResponseBody::Bytes(bytes) => Box::new(std::iter::once(Ok(bytes))),
            ResponseBody::Stream(stream) => stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(body: ResponseBody) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in body {
            out.extend(chunk.unwrap());
        }
        out
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(ResponseBody::Empty.len(), Some(0));
        assert!(collect(ResponseBody::Empty).is_empty());
    }

    #[test]
    fn test_bytes_body() {
        let body = ResponseBody::Bytes(b"hello".to_vec());
        assert_eq!(body.len(), Some(5));
        assert_eq!(collect(body), b"hello");
    }

    #[test]
    fn test_stream_body_concatenates_chunks() {
        let chunks: Vec<io::Result<Vec<u8>>> = vec![Ok(b"ab".to_vec()), Ok(b"cd".to_vec())];
        let body = ResponseBody::Stream(Box::new(chunks.into_iter()));
        assert_eq!(body.len(), None);
        assert_eq!(collect(body), b"abcd");
    }
}
