//! Raw-mode line editor backed by crossterm

use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use super::session::{CloseHandle, LineSession, ReadRequest, SessionError, SessionFactory};
use super::state::PromptState;
use crate::config::constants::editor;

/// Line-editing session on the controlling terminal
pub struct TerminalLineSession {
    state: PromptState,
    close: CloseHandle,
    poll_interval: Duration,
}

impl TerminalLineSession {
    /// Fails when the terminal cannot be switched into raw mode
    pub fn new(state: PromptState) -> Result<Self, SessionError> {
        terminal::enable_raw_mode()
            .and_then(|_| terminal::disable_raw_mode())
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        Ok(Self {
            state,
            close: CloseHandle::new(),
            poll_interval: Duration::from_millis(editor::CLOSE_POLL_INTERVAL_MS),
        })
    }

    pub fn factory() -> SessionFactory {
        Arc::new(
            |state: &PromptState| -> Result<Box<dyn LineSession>, SessionError> {
                Ok(Box::new(Self::new(state.clone())?))
            },
        )
    }

    fn redraw(&self, out: &mut impl Write, prompt: &str, line: &LineBuffer) -> io::Result<()> {
        let column = UnicodeWidthStr::width(prompt) + line.width_before_cursor();
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(prompt),
            Print(line.value()),
            MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)),
        )?;
        out.flush()
    }
}

impl LineSession for TerminalLineSession {
    fn read_line(&mut self, request: &ReadRequest) -> Result<String, SessionError> {
        if self.close.is_closed() {
            return Err(SessionError::Closed);
        }

        let _guard = RawModeGuard::new()?;
        let mut out = io::stdout();
        let mut prompt = request.prompt.clone();
        let mut line = LineBuffer::default();
        let mut history = HistoryCursor::new(&request.history);
        self.redraw(&mut out, &prompt, &line)?;

        loop {
            if self.close.is_closed() {
                queue!(out, Print("\r\n"))?;
                out.flush()?;
                return Err(SessionError::Closed);
            }
            if !event::poll(self.poll_interval)? {
                continue;
            }

            let key = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => key,
                Event::Paste(text) => {
                    line.insert_str(&text.replace(['\r', '\n'], " "));
                    self.redraw(&mut out, &prompt, &line)?;
                    continue;
                }
                Event::Resize(_, _) => {
                    self.redraw(&mut out, &prompt, &line)?;
                    continue;
                }
                _ => continue,
            };

            if self.state.handle_key_press(&key) {
                if request.live_prompt {
                    prompt = self.state.prompt();
                }
                self.redraw(&mut out, &prompt, &line)?;
                continue;
            }

            match apply_key(&key, &mut line, &mut history) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => {
                    queue!(out, Print("\r\n"))?;
                    out.flush()?;
                    return Ok(line.take());
                }
                KeyOutcome::Interrupt => {
                    queue!(out, Print("^C\r\n"))?;
                    out.flush()?;
                    return Err(SessionError::Interrupted);
                }
                KeyOutcome::Eof => {
                    queue!(out, Print("\r\n"))?;
                    out.flush()?;
                    return Err(SessionError::Eof);
                }
            }
            self.redraw(&mut out, &prompt, &line)?;
        }
    }

    fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Interrupt,
    Eof,
}

fn apply_key(key: &KeyEvent, line: &mut LineBuffer, history: &mut HistoryCursor<'_>) -> KeyOutcome {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => return KeyOutcome::Submit,
        KeyCode::Char('c') if control => return KeyOutcome::Interrupt,
        KeyCode::Char('d') if control => {
            if line.value().is_empty() {
                return KeyOutcome::Eof;
            }
            line.delete();
        }
        KeyCode::Char('u') if control => line.clear(),
        KeyCode::Char('a') if control => line.move_home(),
        KeyCode::Char('e') if control => line.move_end(),
        KeyCode::Up => {
            if let Some(entry) = history.previous(line.value()) {
                line.replace(entry);
            }
        }
        KeyCode::Down => {
            if let Some(entry) = history.next() {
                line.replace(entry);
            }
        }
        KeyCode::Backspace => line.backspace(),
        KeyCode::Delete => line.delete(),
        KeyCode::Left => line.move_left(),
        KeyCode::Right => line.move_right(),
        KeyCode::Home => line.move_home(),
        KeyCode::End => line.move_end(),
        KeyCode::Char(ch) => {
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                line.insert(ch);
            }
        }
        _ => {}
    }
    KeyOutcome::Continue
}

#[derive(Debug, Default)]
struct LineBuffer {
    value: String,
    cursor: usize,
}

impl LineBuffer {
    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn replace(&mut self, value: String) {
        self.value = value;
        self.cursor = self.value.len();
    }

    fn insert(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn insert_str(&mut self, text: &str) {
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let new_cursor = self.previous_boundary();
        self.value.replace_range(new_cursor..self.cursor, "");
        self.cursor = new_cursor;
    }

    fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let end = self.next_boundary();
        self.value.replace_range(self.cursor..end, "");
    }

    fn move_left(&mut self) {
        self.cursor = self.previous_boundary();
    }

    fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn previous_boundary(&self) -> usize {
        self.value[..self.cursor]
            .chars()
            .next_back()
            .map(|ch| self.cursor - ch.len_utf8())
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
            .unwrap_or(self.value.len())
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        mem::take(&mut self.value)
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn width_before_cursor(&self) -> usize {
        UnicodeWidthStr::width(&self.value[..self.cursor])
    }
}

/// Up/Down navigation over a history snapshot, remembering the unsent draft
struct HistoryCursor<'a> {
    entries: &'a [String],
    position: Option<usize>,
    draft: String,
}

impl<'a> HistoryCursor<'a> {
    fn new(entries: &'a [String]) -> Self {
        Self {
            entries,
            position: None,
            draft: String::new(),
        }
    }

    fn previous(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.position {
            None => {
                self.draft = current.to_string();
                self.entries.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };
        self.position = Some(next);
        Some(self.entries[next].clone())
    }

    fn next(&mut self) -> Option<String> {
        let index = self.position?;
        if index + 1 < self.entries.len() {
            self.position = Some(index + 1);
            Some(self.entries[index + 1].clone())
        } else {
            self.position = None;
            Some(mem::take(&mut self.draft))
        }
    }
}
