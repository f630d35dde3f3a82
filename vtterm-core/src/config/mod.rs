//! VTTerm Configuration Module
//!
//! Loads `vtterm.toml` and exposes typed sections for truncation, history,
//! prompt/UI and command safety. Every field has a default so partial files
//! are valid.

pub mod constants;
pub mod loader;

pub use loader::{ConfigManager, VTTermConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::truncation::TruncationPolicy;
use crate::ui::renderer::ColorMode;
use constants::{defaults, paths};

/// Tool output truncation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TruncationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lines kept from the start of long output
    #[serde(default = "default_head_lines")]
    pub head_lines: usize,

    /// Lines kept from the end of long output
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            head_lines: default_head_lines(),
            tail_lines: default_tail_lines(),
        }
    }
}

impl TruncationConfig {
    pub fn policy(&self) -> TruncationPolicy {
        TruncationPolicy {
            head_lines: self.head_lines,
            tail_lines: self.tail_lines,
            enabled: self.enabled,
        }
    }
}

/// Command history settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// History file; defaults to `~/.vtterm/history`
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Maximum entries kept; 0 selects the default
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            file: None,
            max_entries: default_max_entries(),
        }
    }
}

impl HistoryConfig {
    /// Backing file to use, or `None` when persistence is off
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.file.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(paths::DOT_DIR_NAME).join(paths::HISTORY_FILE_NAME))
        })
    }
}

/// Prompt and display settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_prompt_prefix")]
    pub prompt_prefix: String,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            prompt_prefix: default_prompt_prefix(),
            color: ColorMode::default(),
        }
    }
}

/// Command safety settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandsConfig {
    /// Substrings that mark a command as dangerous before confirmation
    #[serde(default = "default_dangerous_patterns")]
    pub dangerous_patterns: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            dangerous_patterns: default_dangerous_patterns(),
        }
    }
}

impl CommandsConfig {
    /// First configured pattern contained in `command`
    pub fn danger_match(&self, command: &str) -> Option<&str> {
        self.dangerous_patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| !pattern.is_empty() && command.contains(pattern))
    }
}

fn default_true() -> bool {
    true
}
fn default_head_lines() -> usize {
    defaults::DEFAULT_TRUNCATION_HEAD_LINES
}
fn default_tail_lines() -> usize {
    defaults::DEFAULT_TRUNCATION_TAIL_LINES
}
fn default_max_entries() -> usize {
    defaults::DEFAULT_MAX_HISTORY_ENTRIES
}
fn default_prompt_prefix() -> String {
    defaults::DEFAULT_PROMPT_PREFIX.to_string()
}
fn default_dangerous_patterns() -> Vec<String> {
    vec![
        "rm -rf".to_string(),
        "rm -fr".to_string(),
        "sudo ".to_string(),
        "mkfs".to_string(),
        "dd if=".to_string(),
        "shutdown".to_string(),
        "reboot".to_string(),
        "git push --force".to_string(),
        "git reset --hard".to_string(),
        "chmod -R".to_string(),
        "> /dev/".to_string(),
    ]
}
