//! Vela configuration system
//!
//! Provides configuration discovery and merging for the language-service
//! integration core:
//! - Project configuration (`vela.toml`): module-resolution path-mapping
//!   and transpiler registration order.
//! - Global user configuration (`~/.vela/config.toml`): LSP server
//!   initialization options.
//!
//! # Configuration hierarchy
//!
//! 1. Global config (`~/.vela/config.toml`)
//! 2. Project config (`./vela.toml`), found by walking up from the
//!    workspace root
//!
//! # Example
//!
//! ```no_run
//! use vela_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    ValidationError(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{PathMapping, ProjectConfig, ResolutionConfig, TranspilerConfig};
