//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;
use vtterm_core::config::VTTermConfig;

/// Main CLI structure for vtterm
#[derive(Parser, Debug)]
#[command(
    name = "vtterm",
    version,
    about = "Run shell commands behind a confirmation gate with persistent history and truncated output"
)]
pub struct Cli {
    /// Workspace root directory; defaults to current directory
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// History file; overrides `[history].file`
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long)]
    pub no_history: bool,

    /// Maximum history entries kept
    #[arg(long, value_name = "N")]
    pub max_history: Option<usize>,

    /// Lines kept from the start of long command output
    #[arg(long, value_name = "N")]
    pub head_lines: Option<usize>,

    /// Lines kept from the end of long command output
    #[arg(long, value_name = "N")]
    pub tail_lines: Option<usize>,

    /// Show command output in full
    #[arg(long)]
    pub no_truncate: bool,

    /// Session identifier shown in the prompt
    #[arg(long)]
    pub session_id: Option<String>,

    /// Start in plan mode: commands are shown but never executed
    #[arg(long)]
    pub plan: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply flag values on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut VTTermConfig) {
        if let Some(path) = &self.history_file {
            config.history.file = Some(path.clone());
        }
        if self.no_history {
            config.history.enabled = false;
        }
        if let Some(max) = self.max_history {
            config.history.max_entries = max;
        }
        if let Some(head) = self.head_lines {
            config.truncation.head_lines = head;
        }
        if let Some(tail) = self.tail_lines {
            config.truncation.tail_lines = tail;
        }
        if self.no_truncate {
            config.truncation.enabled = false;
        }
    }
}
