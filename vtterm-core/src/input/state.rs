use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::config::constants::{defaults, prompts};

/// Callback fired when the operator presses the mode-toggle key (Shift+Tab)
pub type ModeToggleCallback = Arc<dyn Fn() + Send + Sync>;

struct InteractionState {
    prompt_prefix: String,
    plan_mode: bool,
    session_id: String,
    mode_toggle: Option<ModeToggleCallback>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            prompt_prefix: defaults::DEFAULT_PROMPT_PREFIX.to_string(),
            plan_mode: false,
            session_id: String::new(),
            mode_toggle: None,
        }
    }
}

/// Shared prompt, plan-mode and session state.
///
/// All four fields sit behind one lock so a composed prompt never mixes
/// values from different updates. Clones share the same state.
#[derive(Clone, Default)]
pub struct PromptState {
    inner: Arc<Mutex<InteractionState>>,
}

impl PromptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_prompt_prefix(&self, prefix: impl Into<String>) {
        self.inner.lock().prompt_prefix = prefix.into();
    }

    pub fn set_plan_mode(&self, enabled: bool) {
        self.inner.lock().plan_mode = enabled;
    }

    pub fn plan_mode(&self) -> bool {
        self.inner.lock().plan_mode
    }

    /// Flip plan mode and return the new value
    pub fn toggle_plan_mode(&self) -> bool {
        let mut state = self.inner.lock();
        state.plan_mode = !state.plan_mode;
        state.plan_mode
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        self.inner.lock().session_id = session_id.into();
    }

    pub fn session_id(&self) -> String {
        self.inner.lock().session_id.clone()
    }

    pub fn set_mode_toggle_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().mode_toggle = Some(Arc::new(callback));
    }

    pub fn clear_mode_toggle_callback(&self) {
        self.inner.lock().mode_toggle = None;
    }

    /// Handle that does not keep the state alive, for callbacks stored in it
    pub fn downgrade(&self) -> WeakPromptState {
        WeakPromptState(Arc::downgrade(&self.inner))
    }

    /// `[PLAN MODE] ` + prefix + ` [<session id>]`, each part optional except the prefix
    pub fn prompt(&self) -> String {
        let state = self.inner.lock();
        let mut prompt = String::new();
        if state.plan_mode {
            prompt.push_str(prompts::PLAN_MODE_PREFIX);
        }
        prompt.push_str(&state.prompt_prefix);
        if !state.session_id.is_empty() {
            prompt.push_str(&format!(" [{}]", state.session_id));
        }
        prompt
    }

    /// Run the mode-toggle callback for Shift+Tab. Returns whether a callback ran.
    pub fn handle_key_press(&self, key: &KeyEvent) -> bool {
        if !is_mode_toggle_key(key) {
            return false;
        }
        // Cloned out so the callback may update this state without deadlocking.
        let callback = self.inner.lock().mode_toggle.clone();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PromptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("PromptState")
            .field("prompt_prefix", &state.prompt_prefix)
            .field("plan_mode", &state.plan_mode)
            .field("session_id", &state.session_id)
            .field("has_mode_toggle", &state.mode_toggle.is_some())
            .finish()
    }
}

fn is_mode_toggle_key(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release && key.code == KeyCode::BackTab
}

#[derive(Clone)]
pub struct WeakPromptState(Weak<Mutex<InteractionState>>);

impl WeakPromptState {
    pub fn upgrade(&self) -> Option<PromptState> {
        self.0.upgrade().map(|inner| PromptState { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn prompt_composes_in_fixed_order() {
        let state = PromptState::new();
        assert_eq!(state.prompt(), "> ");

        state.set_session_id("abc123");
        assert_eq!(state.prompt(), ">  [abc123]");

        state.set_plan_mode(true);
        state.set_prompt_prefix("vt> ");
        assert_eq!(state.prompt(), "[PLAN MODE] vt>  [abc123]");
    }

    #[test]
    fn key_press_without_callback_is_noop() {
        let state = PromptState::new();
        let key = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(!state.handle_key_press(&key));
    }

    #[test]
    fn only_shift_tab_fires_callback() {
        let state = PromptState::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        state.set_mode_toggle_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!state.handle_key_press(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(!state.handle_key_press(&KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL)));
        assert!(state.handle_key_press(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_mutate_state() {
        let state = PromptState::new();
        let handle = state.clone();
        state.set_mode_toggle_callback(move || {
            handle.toggle_plan_mode();
        });

        state.handle_key_press(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert!(state.plan_mode());
        assert!(state.prompt().starts_with("[PLAN MODE] "));
    }

    #[test]
    fn concurrent_updates_keep_prompt_consistent() {
        let state = PromptState::new();
        let writers: Vec<_> = (0..4)
            .map(|n| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        state.set_plan_mode(i % 2 == 0);
                        state.set_session_id(format!("s{n}"));
                    }
                })
            })
            .collect();
        for _ in 0..200 {
            let prompt = state.prompt();
            assert!(prompt == "> " || prompt.contains("> "), "unexpected prompt {prompt:?}");
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }

    #[test]
    fn weak_handle_toggles_without_keeping_state_alive() {
        let state = PromptState::new();
        let weak = state.downgrade();
        state.set_mode_toggle_callback(move || {
            if let Some(state) = weak.upgrade() {
                state.toggle_plan_mode();
            }
        });

        let key = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(state.handle_key_press(&key));
        assert!(state.plan_mode());

        let weak = state.downgrade();
        drop(state);
        assert!(weak.upgrade().is_none());
    }
}
