//! Path-pattern compilation.
//!
//! # Responsibilities
//! - Classify a declared path as static (no `:name` tokens) or dynamic
//! - Compile dynamic paths into anchored regexes with named captures
//! - Yield captured values in declaration order on match
//!
//! # Design Decisions
//! - Static patterns match by plain string equality, no regex involved
//! - Literal runs are escaped, so punctuation in a path is never syntax
//! - A capture matches one or more non-`/` characters; crossing segments
//!   is impossible

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

// `:identifier` token: leading ASCII letter or underscore, then word
// characters. A bare `:` or `:9x` is a literal, not a capture.
fn variable_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":[A-Za-z_][0-9A-Za-z_]*").expect("literal regex"))
}

/// Rejected route-path declarations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    /// Two captures share a name inside one pattern.
    #[error("duplicate variable {0:?} in route path")]
    DuplicateVariable(String),

    /// The generated expression failed to compile.
    #[error("route path did not compile: {0}")]
    Compile(String),
}

/// A compiled route path: exact string for static declarations, an anchored
/// named-capture regex for dynamic ones.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Static,
    Dynamic {
        regex: Regex,
        variables: Vec<String>,
    },
}

impl PathPattern {
    pub fn compile(path: &str) -> Result<Self, PatternError> {
        let mut variables: Vec<String> = Vec::new();
        let mut expression = String::from("^");
        let mut literal_from = 0;

        for token in variable_token().find_iter(path) {
            let name = &path[token.start() + 1..token.end()];
            if variables.iter().any(|v| v == name) {
                return Err(PatternError::DuplicateVariable(name.to_string()));
            }
            expression.push_str(&regex::escape(&path[literal_from..token.start()]));
            expression.push_str(&format!("(?P<{name}>[^/]+)"));
            variables.push(name.to_string());
            literal_from = token.end();
        }

        if variables.is_empty() {
            return Ok(Self {
                raw: path.to_string(),
                kind: Kind::Static,
            });
        }

        expression.push_str(&regex::escape(&path[literal_from..]));
        expression.push('$');
        let regex =
            Regex::new(&expression).map_err(|e| PatternError::Compile(e.to_string()))?;
        Ok(Self {
            raw: path.to_string(),
            kind: Kind::Dynamic { regex, variables },
        })
    }

    /// The path as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, Kind::Static)
    }

    /// Capture names in declaration order; empty for static patterns.
    pub fn variables(&self) -> &[String] {
        match &self.kind {
            Kind::Static => &[],
            Kind::Dynamic { variables, .. } => variables,
        }
    }

    /// Match a concrete path. Captured values align with `variables()`.
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        match &self.kind {
            Kind::Static => {
                if self.raw == path {
                    Some(Vec::new())
                } else {
                    None
                }
            }
            Kind::Dynamic { regex, variables } => {
                let captures = regex.captures(path)?;
                let mut values = Vec::with_capacity(variables.len());
                for name in variables {
                    values.push(captures.name(name)?.as_str().to_string());
                }
                Some(values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_pattern_is_exact() {
        let pattern = PathPattern::compile("/blog/post").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.variables().is_empty());
        assert_eq!(pattern.matches("/blog/post"), Some(vec![]));
        assert_eq!(pattern.matches("/blog/post/"), None);
        assert_eq!(pattern.matches("/blog"), None);
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_path() {
        let pattern = PathPattern::compile("").unwrap();
        assert!(pattern.is_static());
        assert_eq!(pattern.matches(""), Some(vec![]));
        assert_eq!(pattern.matches("/"), None);
    }

    #[test]
    fn test_single_capture() {
        let pattern = PathPattern::compile("/path/to/:file").unwrap();
        assert!(!pattern.is_static());
        assert_eq!(pattern.variables(), ["file"]);
        assert_eq!(
            pattern.matches("/path/to/x.png"),
            Some(vec!["x.png".to_string()])
        );
        assert_eq!(pattern.matches("/path/to/"), None);
        assert_eq!(pattern.matches("/path/to/a/b"), None);
    }

    #[test]
    fn test_adjacent_captures_with_literal_separators() {
        let pattern = PathPattern::compile(":id-:pid/:w").unwrap();
        assert_eq!(pattern.variables(), ["id", "pid", "w"]);
        assert_eq!(
            pattern.matches("10-98/world"),
            Some(vec!["10".to_string(), "98".to_string(), "world".to_string()])
        );
        assert_eq!(pattern.matches("10/98/world"), None);
    }

    #[test]
    fn test_literal_punctuation_is_escaped() {
        let pattern = PathPattern::compile("/file.txt/:rest").unwrap();
        assert!(pattern.matches("/file.txt/a").is_some());
        // the dot must not behave as a wildcard
        assert_eq!(pattern.matches("/fileQtxt/a"), None);
    }

    #[test]
    fn test_colon_without_identifier_is_literal() {
        let pattern = PathPattern::compile("/a/:9bad").unwrap();
        assert!(pattern.is_static());
        assert_eq!(pattern.matches("/a/:9bad"), Some(vec![]));
    }

    #[test]
    fn test_identifier_may_start_with_underscore() {
        let pattern = PathPattern::compile("/x/:_v").unwrap();
        assert_eq!(pattern.variables(), ["_v"]);
        assert_eq!(pattern.matches("/x/ok"), Some(vec!["ok".to_string()]));
    }

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let err = PathPattern::compile("/:a/:a").unwrap_err();
        assert_eq!(err, PatternError::DuplicateVariable("a".to_string()));
    }

    #[test]
    fn test_capture_never_crosses_a_segment() {
        let pattern = PathPattern::compile("/u/:name").unwrap();
        assert_eq!(pattern.matches("/u/a%2Fb"), Some(vec!["a%2Fb".to_string()]));
        assert_eq!(pattern.matches("/u/a/b"), None);
    }
}
