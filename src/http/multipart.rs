//! multipart/form-data parsing.
//!
//! # Responsibilities
//! - Extract the boundary token from a Content-Type header value
//! - Split a fully buffered body into parts at boundary delimiters
//! - Decode per-part headers (Content-Disposition name/filename, type)
//! - Produce text values or uploaded-file handles in arrival order

use crate::error::DispatchError;
use crate::http::request::{FormData, FormValue, UploadFile};

/// Pull `boundary=...` out of a `multipart/form-data` Content-Type value.
pub fn boundary(content_type: &str) -> Option<String> {
    let mut pieces = content_type.split(';');
    let base = pieces.next()?.trim();
    if !base.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    for piece in pieces {
        if let Some(value) = piece.trim().strip_prefix("boundary=") {
            let value = value.trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse a complete multipart body against its boundary.
pub fn parse(body: &[u8], boundary: &str) -> Result<FormData, DispatchError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut closer = b"\r\n".to_vec();
    closer.extend_from_slice(&delimiter);

    let mut form = FormData::default();
    let mut pos = match find(body, &delimiter, 0) {
        Some(at) => at + delimiter.len(),
        None => return Err(malformed("missing opening boundary")),
    };

    loop {
        if body[pos..].starts_with(b"--") {
            // closing delimiter
            break;
        }
        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        } else {
            return Err(malformed("expected CRLF after boundary"));
        }

        let headers_end =
            find(body, b"\r\n\r\n", pos).ok_or_else(|| malformed("unterminated part headers"))?;
        let part = parse_part_headers(&body[pos..headers_end])?;

        let data_start = headers_end + 4;
        let data_end =
            find(body, &closer, data_start).ok_or_else(|| malformed("unterminated part"))?;
        let data = body[data_start..data_end].to_vec();

        match part.filename {
            Some(filename) => form.push(
                part.name,
                FormValue::File(UploadFile {
                    filename,
                    content_type: part.content_type,
                    data,
                }),
            ),
            None => {
                let text = String::from_utf8(data)
                    .map_err(|_| malformed("text part is not valid UTF-8"))?;
                form.push(part.name, FormValue::Text(text));
            }
        }
        pos = data_end + closer.len();
    }
    Ok(form)
}

struct PartHeaders {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
}

fn parse_part_headers(block: &[u8]) -> Result<PartHeaders, DispatchError> {
    let text =
        std::str::from_utf8(block).map_err(|_| malformed("part headers are not valid UTF-8"))?;
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in text.split("\r\n") {
        let (header, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => continue,
        };
        let header = header.trim().to_ascii_lowercase();
        let value = value.trim();
        if header == "content-disposition" {
            for param in value.split(';') {
                let param = param.trim();
                if let Some(v) = param.strip_prefix("name=") {
                    name = Some(v.trim_matches('"').to_string());
                } else if let Some(v) = param.strip_prefix("filename=") {
                    filename = Some(v.trim_matches('"').to_string());
                }
            }
        } else if header == "content-type" {
            content_type = Some(value.to_string());
        }
    }

    let name = name.ok_or_else(|| malformed("part missing a field name"))?;
    Ok(PartHeaders {
        name,
        filename,
        content_type,
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| at + from)
}

fn malformed(detail: &str) -> DispatchError {
    DispatchError::validation("body", format!("malformed multipart body: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----portico42";

    fn body_of(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, filename, data) in parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            out.extend_from_slice(data.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }

    #[test]
    fn test_boundary_extraction() {
        assert_eq!(
            boundary("multipart/form-data; boundary=----x12"),
            Some("----x12".to_string())
        );
        assert_eq!(
            boundary("multipart/form-data; charset=utf-8; boundary=\"quoted\""),
            Some("quoted".to_string())
        );
        assert_eq!(boundary("application/x-www-form-urlencoded"), None);
        assert_eq!(boundary("multipart/form-data"), None);
    }

    #[test]
    fn test_parse_text_fields_in_order() {
        let body = body_of(&[("a", None, "1"), ("b", None, "two"), ("a", None, "3")]);
        let form = parse(&body, BOUNDARY).unwrap();
        assert_eq!(form.text("a"), Some("1"));
        assert_eq!(form.texts("a"), vec!["1", "3"]);
        assert_eq!(form.text("b"), Some("two"));
    }

    #[test]
    fn test_parse_file_part() {
        let body = body_of(&[("avatar", Some("me.png"), "PNGDATA")]);
        let form = parse(&body, BOUNDARY).unwrap();
        let file = form.file("avatar").unwrap();
        assert_eq!(file.filename, "me.png");
        assert_eq!(file.content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(file.data, b"PNGDATA");
    }

    #[test]
    fn test_data_may_contain_crlf() {
        let body = body_of(&[("note", None, "line one\r\nline two")]);
        let form = parse(&body, BOUNDARY).unwrap();
        assert_eq!(form.text("note"), Some("line one\r\nline two"));
    }

    #[test]
    fn test_missing_opening_boundary() {
        assert!(parse(b"no delimiters here", BOUNDARY).is_err());
    }

    #[test]
    fn test_unterminated_part() {
        let mut body = body_of(&[("a", None, "1")]);
        body.truncate(body.len() - 10);
        assert!(parse(&body, BOUNDARY).is_err());
    }

    #[test]
    fn test_part_without_name_is_rejected() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
        );
        assert!(parse(body.as_bytes(), BOUNDARY).is_err());
    }
}
