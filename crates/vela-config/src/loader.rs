//! Configuration loader
//!
//! Loads project configuration (`vela.toml`, discovered by walking up from
//! a starting directory) and merges it over optional global user
//! configuration (`~/.vela/config.toml`).

use crate::global::GlobalConfig;
use crate::project::ProjectConfig;
use crate::ConfigResult;
use std::path::{Path, PathBuf};

/// Configuration loader.
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result.
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    /// Directory containing the discovered vela.toml, if any.
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Walk up from `start_dir` looking for `vela.toml`, then merge in
    /// optional global config.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config().unwrap_or_default();

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file.
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join("vela.toml");

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            self.global_config_path = Some(GlobalConfig::global_config_path()?);
        }

        let path = self.global_config_path.as_ref().unwrap();
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// The effective module-resolution config, if the project declares one.
    pub fn resolution(&self) -> Option<&crate::project::ResolutionConfig> {
        self.project.resolution.as_ref()
    }

    /// The effective LSP settings (global, since vela.toml carries none).
    pub fn lsp(&self) -> Option<&crate::global::LspConfig> {
        self.global.lsp.as_ref()
    }
}
