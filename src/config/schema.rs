//! Configuration schema.
//!
//! The complete configuration structure for the engine and its
//! development transport. Every section and field has a default, so an
//! empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatch engine and its development
/// transport.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Development server settings (bind address, read limits).
    pub server: ServerConfig,

    /// Static file serving.
    pub static_files: StaticFilesConfig,

    /// Template rendering.
    pub templates: TemplatesConfig,

    /// Signed-cookie sessions.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Expose internal-failure detail in 500 bodies.
    pub debug: bool,
}

/// Development server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:9000").
    pub bind_address: String,

    /// Maximum bytes accepted for the request line plus headers.
    pub max_header_bytes: usize,

    /// Maximum bytes accepted for the request body.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9000".to_string(),
            max_header_bytes: 16 * 1024,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Register the static route at all.
    pub enabled: bool,

    /// URL prefix the static route claims.
    pub prefix: String,

    /// Directory files are served from.
    pub root: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/static/".to_string(),
            root: "static".to_string(),
        }
    }
}

/// Template rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Install the file-backed development engine.
    pub enabled: bool,

    /// Directory templates are read from.
    pub root: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "templates".to_string(),
        }
    }
}

/// Signed-cookie session configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie name the session travels under.
    pub cookie_name: String,

    /// Server-side signing secret.
    pub secret: String,

    /// Seconds a freshly issued session stays valid.
    pub ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "portico_session".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
            ttl_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.session.ttl_secs, 86_400);
        assert!(!config.debug);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            debug = true

            [server]
            bind_address = "0.0.0.0:8000"

            [session]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
        assert_eq!(config.server.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.session.secret, "s3cret");
        assert_eq!(config.session.cookie_name, "portico_session");
    }
}
