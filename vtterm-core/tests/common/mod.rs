#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vtterm_core::input::{
    CloseHandle, LineSession, PromptState, ReadRequest, SessionError, SessionFactory,
};

/// Cloneable in-memory writer for asserting rendered output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What a scripted session does on its next read
#[derive(Debug, Clone)]
pub enum Step {
    Line(String),
    Eof,
    /// Block until the session is closed
    Block,
}

/// Shared script driving every session a factory builds
#[derive(Default)]
pub struct Script {
    steps: Mutex<VecDeque<Step>>,
    prompts: Mutex<Vec<String>>,
    builds: AtomicUsize,
    closes_observed: AtomicUsize,
}

impl Script {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn lines(lines: &[&str]) -> Arc<Self> {
        Self::new(lines.iter().map(|line| Step::Line(line.to_string())))
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn closes_observed(&self) -> usize {
        self.closes_observed.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn factory(self: &Arc<Self>) -> SessionFactory {
        let script = Arc::clone(self);
        Arc::new(
            move |_state: &PromptState| -> Result<Box<dyn LineSession>, SessionError> {
                script.builds.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ScriptedSession {
                    script: Arc::clone(&script),
                    close: CloseHandle::new(),
                }))
            },
        )
    }
}

struct ScriptedSession {
    script: Arc<Script>,
    close: CloseHandle,
}

impl LineSession for ScriptedSession {
    fn read_line(&mut self, request: &ReadRequest) -> Result<String, SessionError> {
        if self.close.is_closed() {
            return Err(SessionError::Closed);
        }
        self.script.prompts.lock().push(request.prompt.clone());
        let step = self.script.steps.lock().pop_front();
        match step {
            Some(Step::Line(line)) => Ok(line),
            Some(Step::Eof) | None => Err(SessionError::Eof),
            Some(Step::Block) => loop {
                if self.close.is_closed() {
                    self.script.closes_observed.fetch_add(1, Ordering::SeqCst);
                    return Err(SessionError::Closed);
                }
                std::thread::sleep(Duration::from_millis(5));
            },
        }
    }

    fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }
}
