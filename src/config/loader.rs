//! Configuration loading from disk.
//!
//! Serde covers the syntactic checks; `validate_config` adds the
//! semantic ones and reports every problem it finds, not just the
//! first.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EngineConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a config file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {problem}")]
pub struct ValidationError {
    pub field: String,
    pub problem: String,
}

impl ValidationError {
    fn new(field: &str, problem: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            problem: problem.into(),
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Semantic validation over an already-deserialized config.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("{:?} is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.max_header_bytes == 0 {
        errors.push(ValidationError::new(
            "server.max_header_bytes",
            "must be positive",
        ));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "server.max_body_bytes",
            "must be positive",
        ));
    }

    if config.static_files.enabled {
        if !config.static_files.prefix.starts_with('/')
            || !config.static_files.prefix.ends_with('/')
        {
            errors.push(ValidationError::new(
                "static_files.prefix",
                "must start and end with '/'",
            ));
        }
        if config.static_files.root.is_empty() {
            errors.push(ValidationError::new("static_files.root", "must be set"));
        }
    }

    if config.templates.enabled && config.templates.root.is_empty() {
        errors.push(ValidationError::new("templates.root", "must be set"));
    }

    if config.session.cookie_name.is_empty() {
        errors.push(ValidationError::new("session.cookie_name", "must be set"));
    }
    if config.session.ttl_secs <= 0 {
        errors.push(ValidationError::new("session.ttl_secs", "must be positive"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "{:?} is not one of {LOG_LEVELS:?}",
                config.observability.log_level
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_every_problem_is_reported() {
        let mut config = EngineConfig::default();
        config.server.bind_address = "not an address".to_string();
        config.session.ttl_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "server.bind_address",
                "session.ttl_secs",
                "observability.log_level"
            ]
        );
    }

    #[test]
    fn test_static_prefix_shape_is_checked() {
        let mut config = EngineConfig::default();
        config.static_files.prefix = "static".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "static_files.prefix");

        config.static_files.enabled = false;
        // a disabled section is not validated
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "debug = true\n\n[server]\nbind_address = \"127.0.0.1:0\"").unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.debug);
        assert_eq!(config.server.bind_address, "127.0.0.1:0");
    }

    #[test]
    fn test_load_config_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.toml");
        fs::write(&path, "debug = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_surfaces_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.toml");
        fs::write(&path, "[session]\nttl_secs = -5\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }
}
