//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → consumed once at startup to compose the gateway and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config, ConfigError, ValidationError};
pub use schema::{
    EngineConfig, ObservabilityConfig, ServerConfig, SessionConfig, StaticFilesConfig,
    TemplatesConfig,
};
