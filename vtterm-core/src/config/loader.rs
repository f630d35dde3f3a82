use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::paths;
use super::{CommandsConfig, HistoryConfig, TruncationConfig, UiConfig};

/// Main configuration structure for VTTerm
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VTTermConfig {
    #[serde(default)]
    pub truncation: TruncationConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub commands: CommandsConfig,
}

impl VTTermConfig {
    /// Write the default configuration to `output`
    pub fn create_sample_config<P: AsRef<Path>>(output: P) -> Result<()> {
        let output = output.as_ref();
        let content = toml::to_string_pretty(&VTTermConfig::default())
            .context("Failed to serialize default configuration")?;
        fs::write(output, content)
            .with_context(|| format!("Failed to write config file: {}", output.display()))?;
        Ok(())
    }
}

/// Configuration manager for locating and loading `vtterm.toml`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: VTTermConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration for the current directory
    pub fn load() -> Result<Self> {
        Self::load_from_workspace(std::env::current_dir()?)
    }

    /// Search the workspace, its dot directory, then the home dot directory
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        let workspace = workspace.as_ref();
        let mut candidates = vec![
            workspace.join(paths::CONFIG_FILE_NAME),
            workspace.join(paths::DOT_DIR_NAME).join(paths::CONFIG_FILE_NAME),
        ];
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(paths::DOT_DIR_NAME).join(paths::CONFIG_FILE_NAME));
        }

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_file(&candidate);
            }
        }

        tracing::debug!(workspace = %workspace.display(), "no config file found; using defaults");
        Ok(Self {
            config: VTTermConfig::default(),
            config_path: None,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: VTTermConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    pub fn config(&self) -> &VTTermConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VTTermConfig {
        &mut self.config
    }

    pub fn into_config(self) -> VTTermConfig {
        self.config
    }

    /// Path the configuration was loaded from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
