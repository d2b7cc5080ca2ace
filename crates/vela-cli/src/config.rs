//! CLI configuration via environment variables
//!
//! Vela uses environment variables for optional configuration.
//! This keeps the CLI simple while allowing customization.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Default to JSON diagnostic output (VELA_DIAGNOSTICS=json)
    pub default_json: bool,
    /// Disable colored output (VELA_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_json: env::var("VELA_DIAGNOSTICS")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            no_color: env::var("VELA_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_defaults() {
        env::remove_var("VELA_DIAGNOSTICS");
        env::remove_var("VELA_NO_COLOR");
        env::remove_var("NO_COLOR");

        let config = Config::from_env();
        assert!(!config.default_json);
        assert!(!config.no_color);
    }

    #[test]
    fn test_config_json_diagnostics() {
        env::set_var("VELA_DIAGNOSTICS", "json");
        let config = Config::from_env();
        assert!(config.default_json);
        env::remove_var("VELA_DIAGNOSTICS");
    }

    #[test]
    fn test_config_no_color() {
        env::set_var("VELA_NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("VELA_NO_COLOR");

        env::set_var("NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("NO_COLOR");
    }
}
