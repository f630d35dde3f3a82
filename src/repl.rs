//! Confirmation-gated shell REPL

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vtterm_core::config::{CommandsConfig, VTTermConfig};
use vtterm_core::history::HistoryLog;
use vtterm_core::input::InputController;
use vtterm_core::truncation::{StructuredToolRecord, TruncationPolicy};
use vtterm_core::ui::{ConfirmationRequest, MessageStyle, Renderer, ToolOutputView, render_confirmation};

const TRUNCATE_USAGE: &str = "Usage: /truncate <head> <tail> | /truncate off";

const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("help", "Show this list"),
    ("history", "List recorded commands, oldest first"),
    ("clear-history", "Forget every recorded command"),
    ("plan", "Toggle plan mode (also Shift+Tab)"),
    ("truncate <head> <tail> | off", "Change how command output is shortened"),
    ("exit", "Leave vtterm"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    History,
    ClearHistory,
    Plan,
    Truncate(TruncationPolicy),
    Exit,
    Unknown(String),
    Usage(&'static str),
}

/// Parse a `/command`; returns `None` for anything that is not a slash command
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("").to_lowercase();
    let command = match name.as_str() {
        "" | "help" => SlashCommand::Help,
        "history" => SlashCommand::History,
        "clear-history" => SlashCommand::ClearHistory,
        "plan" => SlashCommand::Plan,
        "exit" | "quit" => SlashCommand::Exit,
        "truncate" => parse_truncate(&parts.collect::<Vec<_>>()),
        other => SlashCommand::Unknown(other.to_string()),
    };
    Some(command)
}

fn parse_truncate(args: &[&str]) -> SlashCommand {
    match args {
        [flag] if flag.eq_ignore_ascii_case("off") => SlashCommand::Truncate(TruncationPolicy::disabled()),
        [head, tail] => match (head.parse(), tail.parse()) {
            (Ok(head), Ok(tail)) => SlashCommand::Truncate(TruncationPolicy::new(head, tail)),
            _ => SlashCommand::Usage(TRUNCATE_USAGE),
        },
        _ => SlashCommand::Usage(TRUNCATE_USAGE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Cancels its token on SIGINT until dropped.
///
/// Only armed for terminal sessions: once installed the handler stays for the
/// process, and a plain blocking read could not be interrupted anyway.
struct InterruptWatch {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl InterruptWatch {
    fn arm(enabled: bool) -> Self {
        let token = CancellationToken::new();
        let task = enabled.then(|| {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("interrupt received; cancelling pending input");
                    token.cancel();
                }
            })
        });
        Self { token, task }
    }
}

impl Drop for InterruptWatch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct Repl {
    controller: InputController,
    view: ToolOutputView,
    commands: CommandsConfig,
    workspace: PathBuf,
}

impl Repl {
    pub fn new(config: &VTTermConfig, workspace: PathBuf) -> Self {
        let history = HistoryLog::new(config.history.resolved_path(), config.history.max_entries);
        let controller =
            InputController::from_stdin(history).with_renderer(Renderer::stdout(config.ui.color));
        Self::with_controller(controller, config, workspace)
    }

    pub fn with_controller(controller: InputController, config: &VTTermConfig, workspace: PathBuf) -> Self {
        controller.set_prompt_prefix(config.ui.prompt_prefix.clone());
        let state = controller.prompt_state().downgrade();
        controller.set_mode_toggle_callback(move || {
            if let Some(state) = state.upgrade() {
                let enabled = state.toggle_plan_mode();
                tracing::debug!(enabled, "plan mode toggled");
            }
        });

        Self {
            controller,
            view: ToolOutputView::new(config.truncation.policy()),
            commands: config.commands.clone(),
            workspace,
        }
    }

    pub fn controller(&self) -> &InputController {
        &self.controller
    }

    pub async fn run(&self) -> Result<()> {
        self.say(MessageStyle::Info, "vtterm ready. Type /help for commands, /exit to quit.")?;

        loop {
            let line = {
                let watch = InterruptWatch::arm(self.controller.is_interactive());
                self.controller.get_user_input(&watch.token).await
            };
            let Some(line) = line else {
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if let Some(command) = parse_slash_command(input) {
                if self.handle_slash_command(command)? == Flow::Exit {
                    break;
                }
                continue;
            }

            if let Err(err) = self.run_shell_command(input).await {
                self.say(MessageStyle::Error, &format!("{err:#}"))?;
            }
        }

        tracing::debug!("input finished; leaving repl");
        Ok(())
    }

    fn handle_slash_command(&self, command: SlashCommand) -> Result<Flow> {
        match command {
            SlashCommand::Help => {
                self.say(MessageStyle::Info, "Available commands:")?;
                for (name, description) in SLASH_COMMANDS {
                    self.say(MessageStyle::Info, &format!("  /{name} - {description}"))?;
                }
                self.say(MessageStyle::Info, "Anything else runs through `sh -c` after confirmation.")?;
            }
            SlashCommand::History => {
                let entries = self.controller.history();
                if entries.is_empty() {
                    self.say(MessageStyle::Info, "No history recorded.")?;
                }
                for (index, entry) in entries.iter().enumerate() {
                    self.say(MessageStyle::Output, &format!("{:>4}  {entry}", index + 1))?;
                }
            }
            SlashCommand::ClearHistory => {
                self.controller.clear_history();
                self.say(MessageStyle::Info, "History cleared.")?;
            }
            SlashCommand::Plan => {
                let enabled = self.controller.prompt_state().toggle_plan_mode();
                let label = if enabled { "on" } else { "off" };
                self.say(MessageStyle::Info, &format!("Plan mode {label}."))?;
            }
            SlashCommand::Truncate(policy) => {
                self.view.set_policy(policy);
                let message = if policy.enabled {
                    format!(
                        "Showing the first {} and last {} lines of long output.",
                        policy.head_lines, policy.tail_lines
                    )
                } else {
                    "Showing command output in full.".to_string()
                };
                self.say(MessageStyle::Info, &message)?;
            }
            SlashCommand::Exit => return Ok(Flow::Exit),
            SlashCommand::Unknown(name) => {
                self.say(MessageStyle::Error, &format!("Unknown command '/{name}'. Try /help."))?;
            }
            SlashCommand::Usage(usage) => {
                self.say(MessageStyle::Error, usage)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn run_shell_command(&self, command: &str) -> Result<()> {
        let mut request = ConfirmationRequest::new(command);
        if let Some(pattern) = self.commands.danger_match(command) {
            request = request.dangerous(format!("matches '{pattern}'"));
        }

        if self.controller.prompt_state().plan_mode() {
            let request = request.with_description("Plan mode: not executed");
            render_confirmation(&mut self.controller.renderer().lock(), &request)?;
            return Ok(());
        }

        let approved = {
            let watch = InterruptWatch::arm(self.controller.is_interactive());
            self.controller.confirm(&request, &watch.token).await
        };
        if !approved {
            self.say(MessageStyle::Warning, "Command not executed.")?;
            return Ok(());
        }

        let record = execute_shell(command, &self.workspace).await?;
        let payload = record
            .to_json()
            .context("Failed to encode command result")?;
        self.view
            .render(&mut self.controller.renderer().lock(), "sh", &payload)?;
        Ok(())
    }

    fn say(&self, style: MessageStyle, text: &str) -> Result<()> {
        self.controller.renderer().lock().line(style, text)?;
        Ok(())
    }
}

/// Run `command` through `sh -c` and capture it as a tool record
async fn execute_shell(command: &str, workspace: &Path) -> Result<StructuredToolRecord> {
    tracing::debug!(command, workspace = %workspace.display(), "executing shell command");
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to run shell command: {command}"))?;

    // Killed by a signal: no exit code.
    let exit_code = output.status.code().map(i64::from).unwrap_or(-1);
    Ok(StructuredToolRecord {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn scripted_repl(input: &str, workspace: &Path) -> (Repl, SharedBuffer) {
        let output = SharedBuffer::default();
        let controller = InputController::non_interactive(
            Cursor::new(input.as_bytes().to_vec()),
            HistoryLog::in_memory(10),
        )
        .with_renderer(Renderer::with_writer(output.clone()));
        let repl = Repl::with_controller(controller, &VTTermConfig::default(), workspace.to_path_buf());
        (repl, output)
    }

    #[test]
    fn parses_slash_commands() {
        assert_eq!(parse_slash_command("ls -la"), None);
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("  /HISTORY "), Some(SlashCommand::History));
        assert_eq!(parse_slash_command("/clear-history"), Some(SlashCommand::ClearHistory));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Exit));
        assert_eq!(
            parse_slash_command("/truncate 5 2"),
            Some(SlashCommand::Truncate(TruncationPolicy::new(5, 2)))
        );
        assert_eq!(
            parse_slash_command("/truncate off"),
            Some(SlashCommand::Truncate(TruncationPolicy::disabled()))
        );
        assert_eq!(
            parse_slash_command("/truncate 5"),
            Some(SlashCommand::Usage(TRUNCATE_USAGE))
        );
        assert_eq!(
            parse_slash_command("/truncate five 2"),
            Some(SlashCommand::Usage(TRUNCATE_USAGE))
        );
        assert_eq!(
            parse_slash_command("/deploy now"),
            Some(SlashCommand::Unknown("deploy".to_string()))
        );
    }

    #[tokio::test]
    async fn confirmed_command_output_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let (repl, output) = scripted_repl(
            "/truncate 1 1\nprintf 'a\\nb\\nc\\n'\ny\n/exit\necho after\ny\n",
            dir.path(),
        );
        repl.run().await.unwrap();

        let output = output.contents();
        assert!(output.contains("Command to execute:\n  printf 'a\\nb\\nc\\n'\n"));
        assert!(output.contains("Execute? [y/N]: "));
        assert!(output.contains("[sh] exit 0\na\n[... 1 lines truncated ...]\nc\n"));
        assert!(!output.contains("  echo after"));
    }

    #[tokio::test]
    async fn declined_dangerous_command_is_not_run() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        std::fs::write(&marker, "keep").unwrap();

        let (repl, output) = scripted_repl("rm -rf marker\n\n", dir.path());
        repl.run().await.unwrap();

        let output = output.contents();
        assert!(output.contains("⚠ DANGEROUS COMMAND: matches 'rm -rf'"));
        assert!(output.contains("Command not executed."));
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn plan_mode_shows_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let (repl, output) = scripted_repl("touch created\n", dir.path());
        repl.controller().set_plan_mode(true);
        repl.run().await.unwrap();

        let output = output.contents();
        assert!(output.contains("Plan mode: not executed"));
        assert!(!output.contains("Execute? [y/N]: "));
        assert!(!dir.path().join("created").exists());
    }

    #[tokio::test]
    async fn plan_command_toggles_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let (repl, output) = scripted_repl("/plan\n", dir.path());
        repl.run().await.unwrap();

        assert!(repl.controller().prompt_state().plan_mode());
        assert!(output.contents().contains("Plan mode on."));
        assert_eq!(repl.controller().get_prompt(), "[PLAN MODE] > ");
    }
}
