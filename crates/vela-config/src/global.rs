//! Global configuration (`~/.vela/config.toml`)
//!
//! Handles user-level configuration. Scoped to LSP server initialization
//! options; project identity, formatting, and permissions have no
//! counterpart here and were dropped with the teacher's package-manager
//! concern.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.vela/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// LSP server settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsp: Option<LspConfig>,
}

/// LSP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LspConfig {
    /// Enable diagnostics publishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<bool>,

    /// Enable hover information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<bool>,

    /// Enable code completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from a file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        Ok(config)
    }

    /// The global config file path (~/.vela/config.toml).
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".vela").join("config.toml"))
    }

    /// Merge another global config into this one; `other` takes precedence.
    pub fn merge(&mut self, other: &GlobalConfig) {
        if other.lsp.is_some() {
            self.lsp = other.lsp.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_global_config() {
        let toml = "";
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert!(config.lsp.is_none());
    }

    #[test]
    fn parse_full_global_config() {
        let toml = r#"
[lsp]
diagnostics = true
hover = true
completion = false
"#;
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        let lsp = config.lsp.unwrap();
        assert_eq!(lsp.diagnostics, Some(true));
        assert_eq!(lsp.completion, Some(false));
    }

    #[test]
    fn merge_configs() {
        let mut base = GlobalConfig::default();
        let override_config = GlobalConfig {
            lsp: Some(LspConfig {
                diagnostics: Some(false),
                hover: None,
                completion: None,
            }),
        };

        base.merge(&override_config);
        assert_eq!(base.lsp.unwrap().diagnostics, Some(false));
    }
}
