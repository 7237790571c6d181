//! Template collaborator seam.
//!
//! # Responsibilities
//! - Define the render contract handlers program against: template name
//!   plus key/value model in, bytes out
//! - Ship a minimal file-backed engine for development and tests, and a
//!   null engine for gateways that never render
//!
//! # Design Decisions
//! - The model is a JSON object, so anything serializable can be handed
//!   to a real engine without a second conversion layer
//! - `DirEngine` understands exactly one construct, `{{ name }}`
//!   markers with single spaces; real template languages plug in behind
//!   the same trait

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::error::DispatchError;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template by this name.
    #[error("template {0:?} not found")]
    NotFound(String),

    /// The template source could not be read.
    #[error("template read failed: {0}")]
    Io(#[from] io::Error),

    /// A handler asked for rendering but the gateway has no engine.
    #[error("no template engine configured")]
    NotConfigured,
}

impl From<TemplateError> for DispatchError {
    fn from(err: TemplateError) -> Self {
        DispatchError::Internal(err.to_string())
    }
}

/// A named template plus its render model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    model: serde_json::Map<String, Value>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: serde_json::Map::new(),
        }
    }

    /// Add one model entry. Later entries win on name collision.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &serde_json::Map<String, Value> {
        &self.model
    }
}

/// The render contract.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &Template) -> Result<Vec<u8>, TemplateError>;
}

/// Engine for gateways that never render; every call is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEngine;

impl TemplateEngine for NoEngine {
    fn render(&self, _template: &Template) -> Result<Vec<u8>, TemplateError> {
        Err(TemplateError::NotConfigured)
    }
}

/// File-per-template engine over a directory. Substitutes `{{ key }}`
/// markers from the model; unknown markers are left as-is.
#[derive(Debug, Clone)]
pub struct DirEngine {
    root: PathBuf,
}

impl DirEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateEngine for DirEngine {
    fn render(&self, template: &Template) -> Result<Vec<u8>, TemplateError> {
        let path = self.root.join(template.name());
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(template.name().to_string()));
            }
            Err(e) => return Err(TemplateError::Io(e)),
        };

        let mut rendered = source;
        for (key, value) in template.model() {
            let marker = format!("{{{{ {key} }}}}");
            rendered = rendered.replace(&marker, &text_of(value));
        }
        Ok(rendered.into_bytes())
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn engine_with(name: &str, contents: &str) -> (tempfile::TempDir, DirEngine) {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let engine = DirEngine::new(dir.path());
        (dir, engine)
    }

    #[test]
    fn test_markers_substitute_from_the_model() {
        let (_dir, engine) = engine_with("hello.html", "<h1>Hello {{ name }}!</h1>");
        let template = Template::new("hello.html").with("name", "world");
        let rendered = engine.render(&template).unwrap();
        assert_eq!(rendered, b"<h1>Hello world!</h1>");
    }

    #[test]
    fn test_non_string_values_render_as_json() {
        let (_dir, engine) = engine_with("count.html", "{{ n }} items, open={{ open }}");
        let template = Template::new("count.html").with("n", 3).with("open", true);
        let rendered = engine.render(&template).unwrap();
        assert_eq!(rendered, b"3 items, open=true");
    }

    #[test]
    fn test_unknown_marker_survives() {
        let (_dir, engine) = engine_with("page.html", "{{ missing }}");
        let rendered = engine.render(&Template::new("page.html")).unwrap();
        assert_eq!(rendered, b"{{ missing }}");
    }

    #[test]
    fn test_missing_template_is_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = DirEngine::new(dir.path());
        let err = engine.render(&Template::new("ghost.html")).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(ref n) if n == "ghost.html"));
    }

    #[test]
    fn test_no_engine_refuses() {
        let err = NoEngine.render(&Template::new("x")).unwrap_err();
        assert!(matches!(err, TemplateError::NotConfigured));
    }

    #[test]
    fn test_later_model_entries_win() {
        let (_dir, engine) = engine_with("t.html", "{{ v }}");
        let template = Template::new("t.html").with("v", "a").with("v", "b");
        let rendered = engine.render(&template).unwrap();
        assert_eq!(rendered, b"b");
    }
}
