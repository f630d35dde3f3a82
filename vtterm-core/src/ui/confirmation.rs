//! Default-deny confirmation for command execution
//!
//! Only an explicit `y`/`yes` authorizes a command. Anything else, including
//! empty input, end of input and cancellation, is a refusal.

use std::io;

use super::renderer::{MessageStyle, Renderer};
use crate::config::constants::prompts;

/// What the operator is asked to approve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub command: String,
    pub is_dangerous: bool,
    pub danger_reason: String,
    pub description: String,
}

impl ConfirmationRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Mark the command dangerous with the reason shown in the banner
    pub fn dangerous(mut self, reason: impl Into<String>) -> Self {
        self.is_dangerous = true;
        self.danger_reason = reason.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Render the banner, description and command that precede the prompt
pub fn render_confirmation(renderer: &mut Renderer, request: &ConfirmationRequest) -> io::Result<()> {
    if request.is_dangerous {
        let reason = request.danger_reason.trim();
        let banner = if reason.is_empty() {
            format!("⚠ {}", prompts::DANGER_BANNER)
        } else {
            format!("⚠ {}: {reason}", prompts::DANGER_BANNER)
        };
        renderer.line(MessageStyle::Danger, &banner)?;
    } else {
        renderer.line(MessageStyle::Tool, &format!("{}:", prompts::COMMAND_BANNER))?;
    }

    if !request.description.is_empty() {
        renderer.line(MessageStyle::Info, &request.description)?;
    }
    renderer.line(MessageStyle::Output, &format!("  {}", request.command))
}

/// Returns true only for `y` or `yes`, ignoring case and surrounding whitespace
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
