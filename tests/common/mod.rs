//! Shared fixtures for gateway integration tests.

use std::io::Cursor;

use portico::gateway::Gateway;
use portico::http::RawRequest;

/// Everything one dispatch pushed across the transport boundary.
pub struct Exchange {
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub starts: usize,
}

impl Exchange {
    pub fn code(&self) -> u16 {
        self.status[..3].parse().expect("status line starts with a code")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(header, _)| header.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("body is UTF-8")
    }
}

/// Runs one request through the gateway with a capturing start callback.
pub fn dispatch(gateway: &Gateway, raw: RawRequest) -> Exchange {
    let mut status = None;
    let mut headers = Vec::new();
    let mut starts = 0;
    let body = {
        let mut start = |line: &str, sent: &[(String, String)]| {
            starts += 1;
            status = Some(line.to_string());
            headers = sent.to_vec();
        };
        gateway.call(raw, &mut start)
    };

    let mut bytes = Vec::new();
    for chunk in body {
        bytes.extend_from_slice(&chunk.expect("body chunk read"));
    }
    Exchange {
        status: status.expect("start callback never invoked"),
        headers,
        body: bytes,
        starts,
    }
}

pub fn request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> RawRequest {
    RawRequest {
        method: method.to_string(),
        path: path.to_string(),
        query_string: query.to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        body: Box::new(Cursor::new(body.to_vec())),
        ..RawRequest::default()
    }
}

pub fn get(path: &str) -> RawRequest {
    request("GET", path, "", &[], b"")
}

#[allow(dead_code)]
pub fn form_post(path: &str, body: &str) -> RawRequest {
    request(
        "POST",
        path,
        "",
        &[
            ("Content-Type", "application/x-www-form-urlencoded"),
            ("Content-Length", &body.len().to_string()),
        ],
        body.as_bytes(),
    )
}
