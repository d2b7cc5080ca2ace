//! Project configuration (`vela.toml`)
//!
//! Handles project-level configuration stored in `vela.toml` at the project
//! root: the module resolver's path-mapping table and the transpiler
//! registration order consulted for directory index lookups.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from vela.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Module resolution settings (path-mapping, baseUrl)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionConfig>,

    /// Transpilers, in registration order (first match wins for directory
    /// index scans).
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transpilers: Vec<TranspilerConfig>,
}

/// Module resolution settings consulted for absolute (non-relative) import
/// specifiers that a transpiler's own resolver didn't resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Fallback base directory for absolute specifiers with no matching
    /// path-mapping entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<PathBuf>,

    /// Base directory path-mapping replacements are resolved against, if
    /// different from `base_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths_base_path: Option<PathBuf>,

    /// Path-mapping table: pattern (optionally ending in `*`) to an ordered
    /// list of replacement templates.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathMapping>,
}

/// One `pattern -> replacements[]` entry of the path-mapping table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PathMapping {
    pub pattern: String,
    pub replacements: Vec<String>,
}

/// One registered transpiler: the SRC extension it claims and the TGT
/// extension its mirror documents carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TranspilerConfig {
    pub source_ext: String,
    pub target_ext: String,
}

impl ProjectConfig {
    /// Load project configuration from a file.
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

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(resolution) = &self.resolution {
            for mapping in &resolution.paths {
                if mapping.pattern.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "resolution.paths".to_string(),
                        reason: "pattern cannot be empty".to_string(),
                    });
                }
                if mapping.replacements.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("resolution.paths[{}]", mapping.pattern),
                        reason: "must have at least one replacement".to_string(),
                    });
                }
            }
        }

        for transpiler in &self.transpilers {
            if transpiler.source_ext.is_empty() || transpiler.target_ext.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "transpilers".to_string(),
                    reason: "source_ext and target_ext cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Merge another project config into this one; `other` takes precedence
    /// for non-empty values.
    pub fn merge(&mut self, other: &ProjectConfig) {
        if other.resolution.is_some() {
            self.resolution = other.resolution.clone();
        }
        if !other.transpilers.is_empty() {
            self.transpilers = other.transpilers.clone();
        }
    }
}

impl ResolutionConfig {
    /// Find the path mapping matching `specifier`, tie-broken by longest
    /// matched prefix/pattern, returning the mapping and the substituted
    /// wildcard tail (`None` for an exact-pattern match).
    pub fn match_path_mapping<'a>(&'a self, specifier: &str) -> Option<(&'a PathMapping, Option<&'a str>)> {
        let mut best: Option<(&PathMapping, Option<&str>, usize)> = None;
        for mapping in &self.paths {
            let candidate = if let Some(prefix) = mapping.pattern.strip_suffix('*') {
                specifier.strip_prefix(prefix).map(|tail| (Some(tail), prefix.len()))
            } else if mapping.pattern == specifier {
                Some((None, mapping.pattern.len()))
            } else {
                None
            };

            if let Some((tail, score)) = candidate {
                if best.as_ref().map_or(true, |&(_, _, best_score)| score > best_score) {
                    best = Some((mapping, tail, score));
                }
            }
        }
        best.map(|(mapping, tail, _)| (mapping, tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_project_config() {
        let toml = "";
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.resolution.is_none());
        assert!(config.transpilers.is_empty());
    }

    #[test]
    fn parse_full_project_config() {
        let toml = r#"
[resolution]
base_url = "src"

[[resolution.paths]]
pattern = "@app/*"
replacements = ["components/*"]

[[transpilers]]
source_ext = ".vela"
target_ext = ".ts"
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        let resolution = config.resolution.as_ref().unwrap();
        assert_eq!(resolution.paths.len(), 1);
        assert_eq!(config.transpilers[0].source_ext, ".vela");
    }

    #[test]
    fn reject_empty_pattern() {
        let config = ProjectConfig {
            resolution: Some(ResolutionConfig {
                paths: vec![PathMapping {
                    pattern: String::new(),
                    replacements: vec!["x".to_string()],
                }],
                ..Default::default()
            }),
            transpilers: Vec::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_configs() {
        let mut base = ProjectConfig::default();
        let override_config = ProjectConfig {
            resolution: Some(ResolutionConfig {
                base_url: Some(PathBuf::from("src")),
                ..Default::default()
            }),
            transpilers: vec![TranspilerConfig {
                source_ext: ".vela".to_string(),
                target_ext: ".ts".to_string(),
            }],
        };

        base.merge(&override_config);
        assert_eq!(
            base.resolution.unwrap().base_url,
            Some(PathBuf::from("src"))
        );
        assert_eq!(base.transpilers.len(), 1);
    }

    #[test]
    fn longest_prefix_wins() {
        let resolution = ResolutionConfig {
            paths: vec![
                PathMapping {
                    pattern: "@app/*".to_string(),
                    replacements: vec!["generic/*".to_string()],
                },
                PathMapping {
                    pattern: "@app/widgets/*".to_string(),
                    replacements: vec!["widgets/*".to_string()],
                },
            ],
            ..Default::default()
        };

        let (mapping, tail) = resolution
            .match_path_mapping("@app/widgets/button")
            .unwrap();
        assert_eq!(mapping.pattern, "@app/widgets/*");
        assert_eq!(tail, Some("button"));
    }

    #[test]
    fn exact_pattern_match() {
        let resolution = ResolutionConfig {
            paths: vec![PathMapping {
                pattern: "shims".to_string(),
                replacements: vec!["vendor/shims".to_string()],
            }],
            ..Default::default()
        };

        let (mapping, tail) = resolution.match_path_mapping("shims").unwrap();
        assert_eq!(mapping.pattern, "shims");
        assert_eq!(tail, None);
    }
}
