//! Percent encoding for paths and cookie values.
//!
//! Form fields go through `url::form_urlencoded` instead; these helpers are
//! for positions where `+` must survive untouched (decoded paths, cookie
//! values).

/// Percent-encode `input`. Unreserved characters and `/` pass through.
pub fn quote(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Decode `%XX` escapes. `+` is not treated as a space. Malformed escapes
/// pass through verbatim.
pub fn unquote(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_keeps_unreserved() {
        assert_eq!(quote("abc_XYZ-0.9~/"), "abc_XYZ-0.9~/");
    }

    #[test]
    fn test_quote_escapes_space_and_punctuation() {
        assert_eq!(quote("M M"), "M%20M");
        assert_eq!(quote("a=b&c"), "a%3Db%26c");
    }

    #[test]
    fn test_unquote_basic() {
        assert_eq!(unquote("M%20M"), "M M");
        assert_eq!(unquote("%2Fpath%2F"), "/path/");
    }

    #[test]
    fn test_unquote_preserves_plus() {
        assert_eq!(unquote("a+b%20c"), "a+b c");
    }

    #[test]
    fn test_unquote_malformed_escape_passes_through() {
        assert_eq!(unquote("100%"), "100%");
        assert_eq!(unquote("%zz"), "%zz");
        assert_eq!(unquote("%4"), "%4");
    }

    #[test]
    fn test_unquote_utf8() {
        assert_eq!(unquote("caf%C3%A9"), "café");
    }

    #[test]
    fn test_round_trip() {
        let original = "name=value; special/chars?";
        assert_eq!(unquote(&quote(original)), original);
    }
}
