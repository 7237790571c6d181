//! HTTP request methods.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Request methods the engine understands.
///
/// Method tokens are case-sensitive on the wire, so parsing only accepts
/// the canonical uppercase spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Head,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method token the engine does not dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported HTTP method: {0:?}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "HEAD" => Ok(Method::Head),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "PATCH" => Ok(Method::Patch),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_methods() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("POST".parse::<Method>(), Ok(Method::Post));
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("get".parse::<Method>().is_err());
        assert!("Get".parse::<Method>().is_err());
    }

    #[test]
    fn test_parse_unknown_method() {
        let err = "BREW".parse::<Method>().unwrap_err();
        assert_eq!(err, UnknownMethod("BREW".to_string()));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(Method::Options.to_string().parse::<Method>(), Ok(Method::Options));
    }
}
