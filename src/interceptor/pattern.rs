//! Interceptor path predicates.
//!
//! A predicate is compiled from a small pattern language: a trailing `*`
//! (or no wildcard at all) makes a prefix test, a leading `*` makes a
//! suffix test. Wildcards anywhere else are rejected at registration so
//! a typo never silently matches nothing.

use thiserror::Error;

/// Rejected interceptor patterns.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterceptorError {
    /// `*` somewhere other than the first or last character.
    #[error("interceptor pattern {0:?} has an embedded wildcard")]
    EmbeddedWildcard(String),

    /// `?` is not part of the pattern language.
    #[error("interceptor pattern {0:?} uses unsupported wildcard `?`")]
    UnsupportedWildcard(String),
}

/// A compiled prefix or suffix test over the decoded request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorPattern {
    Prefix(String),
    Suffix(String),
}

impl InterceptorPattern {
    pub fn parse(pattern: &str) -> Result<Self, InterceptorError> {
        if pattern.contains('?') {
            return Err(InterceptorError::UnsupportedWildcard(pattern.to_string()));
        }
        let (compiled, stem) = if let Some(stem) = pattern.strip_suffix('*') {
            (Self::Prefix(stem.to_string()), stem)
        } else if let Some(stem) = pattern.strip_prefix('*') {
            (Self::Suffix(stem.to_string()), stem)
        } else {
            (Self::Prefix(pattern.to_string()), pattern)
        };
        if stem.contains('*') {
            return Err(InterceptorError::EmbeddedWildcard(pattern.to_string()));
        }
        Ok(compiled)
    }

    /// Evaluate the predicate for one request path.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(stem) => path.starts_with(stem.as_str()),
            Self::Suffix(stem) => path.ends_with(stem.as_str()),
        }
    }
}
