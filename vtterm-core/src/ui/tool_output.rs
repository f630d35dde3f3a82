use parking_lot::RwLock;
use std::io;

use super::renderer::{MessageStyle, Renderer};
use crate::truncation::{
    StructuredToolRecord, TruncationPolicy, is_truncation_indicator, truncate_structured_output,
};

/// Truncates tool results with the current policy before they reach the display
#[derive(Debug, Default)]
pub struct ToolOutputView {
    policy: RwLock<TruncationPolicy>,
}

impl ToolOutputView {
    pub fn new(policy: TruncationPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
        }
    }

    pub fn policy(&self) -> TruncationPolicy {
        *self.policy.read()
    }

    /// Replace the whole policy
    pub fn set_policy(&self, policy: TruncationPolicy) {
        *self.policy.write() = policy;
    }

    /// Truncate `raw` without rendering it
    pub fn prepare(&self, raw: &str) -> (String, usize) {
        let policy = self.policy();
        truncate_structured_output(raw, &policy).into_owned()
    }

    /// Render a tool result under a `[label]` header and return the number of elided lines.
    ///
    /// Structured records are shown as their exit code followed by each stream.
    pub fn render(&self, renderer: &mut Renderer, label: &str, raw: &str) -> io::Result<usize> {
        let (text, removed) = self.prepare(raw);
        match StructuredToolRecord::parse(&text) {
            Some(record) => {
                renderer.line(
                    MessageStyle::Tool,
                    &format!("[{label}] exit {}", record.exit_code),
                )?;
                write_stream(renderer, &record.stdout, MessageStyle::Output)?;
                write_stream(renderer, &record.stderr, MessageStyle::Error)?;
            }
            None => {
                renderer.line(MessageStyle::Tool, &format!("[{label}]"))?;
                write_stream(renderer, &text, MessageStyle::Output)?;
            }
        }
        if removed > 0 {
            tracing::debug!(label, removed, "tool output truncated for display");
        }
        Ok(removed)
    }
}

fn write_stream(renderer: &mut Renderer, text: &str, style: MessageStyle) -> io::Result<()> {
    for line in text.lines() {
        let style = if is_truncation_indicator(line) {
            MessageStyle::Info
        } else {
            style
        };
        renderer.line(style, line)?;
    }
    Ok(())
}
