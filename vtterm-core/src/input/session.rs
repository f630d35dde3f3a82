//! Line-editing session interface
//!
//! A session performs one blocking line read at a time. It cannot be
//! cancelled from inside; the only way to unblock a pending read is to close
//! it through its [`CloseHandle`], after which the read fails with
//! [`SessionError::Closed`] and the session is unusable.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::state::PromptState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("end of input")]
    Eof,

    #[error("input interrupted")]
    Interrupted,

    #[error("line editing session was closed")]
    Closed,

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line editing unavailable: {0}")]
    Unavailable(String),
}

/// Shared flag used to tear a session down from another task
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Arc<AtomicBool>);

impl CloseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a single read needs
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Prompt used when the read started; sessions with live redraw may re-query [`PromptState`]
    pub prompt: String,
    /// Oldest-first history for Up/Down navigation
    pub history: Vec<String>,
    /// Whether the prompt should track plan-mode and session changes while reading
    pub live_prompt: bool,
}

pub trait LineSession: Send {
    /// Block until a line is submitted, input ends, or the session is closed
    fn read_line(&mut self, request: &ReadRequest) -> Result<String, SessionError>;

    fn close_handle(&self) -> CloseHandle;
}

/// Builds sessions on demand; receives the controller's shared prompt state
pub type SessionFactory =
    Arc<dyn Fn(&PromptState) -> Result<Box<dyn LineSession>, SessionError> + Send + Sync>;
