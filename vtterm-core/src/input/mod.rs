//! Interactive input controller
//!
//! Chooses between a plain buffered line reader (pipes, files, tests) and a
//! line-editing session on a real terminal. The line-editing read blocks, so
//! it runs on the blocking pool and is raced against the caller's
//! cancellation token; on cancellation the session is closed and rebuilt on
//! the next read. A plain read cannot be interrupted once it has started.

pub mod editor;
pub mod session;
pub mod source;
pub mod state;

pub use editor::TerminalLineSession;
pub use session::{CloseHandle, LineSession, ReadRequest, SessionError, SessionFactory};
pub use source::InputSource;
pub use state::{ModeToggleCallback, PromptState, WeakPromptState};

use crossterm::event::KeyEvent;
use parking_lot::{Mutex, RwLock};
use std::io::BufRead;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::constants::prompts;
use crate::history::{HistoryError, HistoryLog};
use crate::ui::confirmation::{ConfirmationRequest, is_affirmative, render_confirmation};
use crate::ui::renderer::{ColorMode, MessageStyle, Renderer};

/// Input strategy in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    NonInteractive,
    Interactive,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input controller is not interactive")]
    NotInteractive,

    #[error(transparent)]
    History(#[from] HistoryError),
}

type SharedReader = Arc<Mutex<Box<dyn BufRead + Send>>>;

pub struct InputController {
    mode: RwLock<InputMode>,
    state: PromptState,
    history: Arc<HistoryLog>,
    reader: SharedReader,
    session: Mutex<Option<Box<dyn LineSession>>>,
    factory: SessionFactory,
    renderer: Arc<Mutex<Renderer>>,
}

impl InputController {
    /// Pick the strategy from `source`: line editing for a terminal, plain reads otherwise.
    ///
    /// Falls back to plain reads when the line-editing session cannot be created.
    /// `source` is only read in the plain strategy; line editing always uses the
    /// controlling terminal.
    pub fn new(source: InputSource, history: HistoryLog) -> Self {
        let state = PromptState::new();
        let factory = TerminalLineSession::factory();

        let mut mode = InputMode::NonInteractive;
        let mut session = None;
        if source.is_terminal() {
            match factory(&state) {
                Ok(created) => {
                    session = Some(created);
                    mode = InputMode::Interactive;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "line editing unavailable; using plain line input");
                }
            }
        }
        tracing::debug!(?mode, source = ?source, "input controller initialized");

        Self {
            mode: RwLock::new(mode),
            state,
            history: Arc::new(history),
            reader: Arc::new(Mutex::new(source.into_line_reader())),
            session: Mutex::new(session),
            factory,
            renderer: Arc::new(Mutex::new(Renderer::stdout(ColorMode::Auto))),
        }
    }

    pub fn from_stdin(history: HistoryLog) -> Self {
        Self::new(InputSource::Stdin, history)
    }

    /// Always reads plain lines from `reader`
    pub fn non_interactive(reader: impl BufRead + Send + 'static, history: HistoryLog) -> Self {
        Self {
            mode: RwLock::new(InputMode::NonInteractive),
            state: PromptState::new(),
            history: Arc::new(history),
            reader: Arc::new(Mutex::new(Box::new(reader))),
            session: Mutex::new(None),
            factory: TerminalLineSession::factory(),
            renderer: Arc::new(Mutex::new(Renderer::stdout(ColorMode::Auto))),
        }
    }

    /// Always reads through sessions built by `factory`
    pub fn interactive(factory: SessionFactory, history: HistoryLog) -> Self {
        Self {
            mode: RwLock::new(InputMode::Interactive),
            state: PromptState::new(),
            history: Arc::new(history),
            reader: Arc::new(Mutex::new(InputSource::Absent.into_line_reader())),
            session: Mutex::new(None),
            factory,
            renderer: Arc::new(Mutex::new(Renderer::stdout(ColorMode::Auto))),
        }
    }

    /// Replace the display sink used for prompts and confirmation banners
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Arc::new(Mutex::new(renderer));
        self
    }

    pub fn renderer(&self) -> Arc<Mutex<Renderer>> {
        self.renderer.clone()
    }

    pub fn mode(&self) -> InputMode {
        *self.mode.read()
    }

    pub fn is_interactive(&self) -> bool {
        self.mode() == InputMode::Interactive
    }

    /// Override the detected strategy
    pub fn set_mode(&self, mode: InputMode) {
        let mut current = self.mode.write();
        if *current == mode {
            return;
        }
        if mode == InputMode::NonInteractive {
            self.session.lock().take();
        }
        tracing::debug!(from = ?*current, to = ?mode, "input mode overridden");
        *current = mode;
    }

    /// Read one line from the operator.
    ///
    /// Returns `None` on end of input, on cancellation, or when the token was
    /// already cancelled. In interactive mode a non-empty line is also recorded
    /// in history; rejected entries are not reported.
    pub async fn get_user_input(&self, cancel: &CancellationToken) -> Option<String> {
        if cancel.is_cancelled() {
            return None;
        }

        let prompt = self.state.prompt();
        match self.mode() {
            InputMode::NonInteractive => self.read_plain(&prompt).await,
            InputMode::Interactive => {
                let request = ReadRequest {
                    prompt,
                    history: self.history.entries(),
                    live_prompt: true,
                };
                let line = self.read_interactive(request, cancel).await?;
                if !line.trim().is_empty() {
                    if let Err(err) = self.history.add(&line) {
                        tracing::debug!(error = %err, "input not recorded in history");
                    }
                }
                Some(line)
            }
        }
    }

    /// Ask the operator to approve a command. Anything but `y`/`yes` is a refusal.
    pub async fn confirm(&self, request: &ConfirmationRequest, cancel: &CancellationToken) -> bool {
        let rendered = render_confirmation(&mut self.renderer.lock(), request);
        if let Err(err) = rendered {
            tracing::warn!(error = %err, "failed to render confirmation prompt");
            return false;
        }

        let answer = if cancel.is_cancelled() {
            None
        } else {
            match self.mode() {
                InputMode::NonInteractive => self.read_plain(prompts::CONFIRM_PROMPT).await,
                InputMode::Interactive => {
                    let request = ReadRequest {
                        prompt: prompts::CONFIRM_PROMPT.to_string(),
                        history: Vec::new(),
                        live_prompt: false,
                    };
                    self.read_interactive(request, cancel).await
                }
            }
        };

        let approved = answer.as_deref().is_some_and(is_affirmative);
        tracing::debug!(
            command = %request.command,
            dangerous = request.is_dangerous,
            approved,
            "confirmation answered"
        );
        approved
    }

    /// Record an entry explicitly. Only valid in interactive mode.
    pub fn add_to_history(&self, entry: &str) -> Result<(), InputError> {
        if !self.is_interactive() {
            return Err(InputError::NotInteractive);
        }
        self.history.add(entry)?;
        Ok(())
    }

    pub fn history(&self) -> Vec<String> {
        self.history.entries()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn history_log(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Cloneable handle to the shared prompt state
    pub fn prompt_state(&self) -> PromptState {
        self.state.clone()
    }

    pub fn set_prompt_prefix(&self, prefix: impl Into<String>) {
        self.state.set_prompt_prefix(prefix);
    }

    pub fn set_plan_mode(&self, enabled: bool) {
        self.state.set_plan_mode(enabled);
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        self.state.set_session_id(session_id);
    }

    pub fn set_mode_toggle_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.state.set_mode_toggle_callback(callback);
    }

    pub fn get_prompt(&self) -> String {
        self.state.prompt()
    }

    pub fn handle_key_press(&self, key: &KeyEvent) -> bool {
        self.state.handle_key_press(key)
    }

    async fn read_plain(&self, prompt: &str) -> Option<String> {
        if !prompt.is_empty() {
            if let Err(err) = self.renderer.lock().inline(MessageStyle::Prompt, prompt) {
                tracing::debug!(error = %err, "failed to write prompt");
            }
        }

        let reader = self.reader.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let mut line = String::new();
            reader.lock().read_line(&mut line).map(|read| (read, line))
        })
        .await;

        match joined {
            Ok(Ok((0, _))) => None,
            Ok(Ok((_, mut line))) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "plain line read failed");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "plain line read task failed");
                None
            }
        }
    }

    fn take_session(&self) -> Result<Box<dyn LineSession>, SessionError> {
        if let Some(session) = self.session.lock().take() {
            return Ok(session);
        }
        (self.factory)(&self.state)
    }

    async fn read_interactive(
        &self,
        request: ReadRequest,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let mut session = match self.take_session() {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "failed to start line editing session");
                return None;
            }
        };
        let closer = session.close_handle();
        let mut task = tokio::task::spawn_blocking(move || {
            let result = session.read_line(&request);
            (session, result)
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                closer.close();
                // The read must be finished before the next one touches the terminal.
                if let Err(err) = (&mut task).await {
                    tracing::warn!(error = %err, "cancelled line editing task failed");
                }
                tracing::debug!("input cancelled; line editing session closed");
                None
            }
            joined = &mut task => match joined {
                Ok((session, result)) => {
                    if !session.close_handle().is_closed() {
                        *self.session.lock() = Some(session);
                    }
                    match result {
                        Ok(line) => Some(line),
                        Err(SessionError::Eof | SessionError::Interrupted | SessionError::Closed) => {
                            None
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "line editing read failed");
                            None
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "line editing task failed");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn plain(input: &str) -> InputController {
        InputController::non_interactive(Cursor::new(input.as_bytes().to_vec()), HistoryLog::in_memory(10))
            .with_renderer(Renderer::with_writer(std::io::sink()))
    }

    #[tokio::test]
    async fn plain_reads_strip_line_endings() {
        let controller = plain("first\r\nsecond\nlast");
        let cancel = CancellationToken::new();
        assert_eq!(controller.get_user_input(&cancel).await.as_deref(), Some("first"));
        assert_eq!(controller.get_user_input(&cancel).await.as_deref(), Some("second"));
        assert_eq!(controller.get_user_input(&cancel).await.as_deref(), Some("last"));
        assert_eq!(controller.get_user_input(&cancel).await, None);
    }

    #[tokio::test]
    async fn plain_reads_do_not_touch_history() {
        let controller = plain("ls\n");
        let cancel = CancellationToken::new();
        controller.get_user_input(&cancel).await;
        assert!(controller.history().is_empty());
        assert!(matches!(controller.add_to_history("ls"), Err(InputError::NotInteractive)));
    }

    #[tokio::test]
    async fn mode_override_is_explicit() {
        let controller = plain("");
        assert_eq!(controller.mode(), InputMode::NonInteractive);
        controller.set_mode(InputMode::Interactive);
        assert!(controller.is_interactive());
        controller.add_to_history("pwd").unwrap();
        assert_eq!(controller.history(), vec!["pwd"]);
    }
}
