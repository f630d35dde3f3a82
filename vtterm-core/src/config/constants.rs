/// Default values shared by the config layer and the core components
pub mod defaults {
    pub const DEFAULT_TRUNCATION_HEAD_LINES: usize = 20;
    pub const DEFAULT_TRUNCATION_TAIL_LINES: usize = 10;
    pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 1000;
    pub const DEFAULT_PROMPT_PREFIX: &str = "> ";
}

/// File and directory names
pub mod paths {
    pub const CONFIG_FILE_NAME: &str = "vtterm.toml";
    pub const DOT_DIR_NAME: &str = ".vtterm";
    pub const HISTORY_FILE_NAME: &str = "history";
}

/// Fixed prompt and banner text
pub mod prompts {
    pub const PLAN_MODE_PREFIX: &str = "[PLAN MODE] ";
    pub const CONFIRM_PROMPT: &str = "Execute? [y/N]: ";
    pub const DANGER_BANNER: &str = "DANGEROUS COMMAND";
    pub const COMMAND_BANNER: &str = "Command to execute";
}

/// Line editor tuning
pub mod editor {
    /// Interval at which a blocked read re-checks its close handle
    pub const CLOSE_POLL_INTERVAL_MS: u64 = 50;
}
