//! Head/tail truncation for tool output
//!
//! Long command output is reduced to its first and last lines with a single
//! indicator line standing in for the elided middle. Only line boundaries are
//! interpreted; everything inside a line (unicode, ANSI escapes, control
//! bytes) passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::config::constants::defaults;

const INDICATOR_PREFIX: &str = "[... ";
const INDICATOR_SUFFIX: &str = " lines truncated ...]";

/// How much of a long block to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationPolicy {
    pub head_lines: usize,
    pub tail_lines: usize,
    pub enabled: bool,
}

impl TruncationPolicy {
    pub fn new(head_lines: usize, tail_lines: usize) -> Self {
        Self {
            head_lines,
            tail_lines,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Number of lines a block may have before anything is removed
    pub fn threshold(&self) -> usize {
        self.head_lines.saturating_add(self.tail_lines)
    }
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_TRUNCATION_HEAD_LINES,
            defaults::DEFAULT_TRUNCATION_TAIL_LINES,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSeparator {
    Lf,
    CrLf,
}

impl LineSeparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// A block of text with its line layout resolved once
#[derive(Debug, Clone, Copy)]
pub struct TextBlock<'a> {
    text: &'a str,
    separator: LineSeparator,
    trailing_separator: bool,
}

impl<'a> TextBlock<'a> {
    pub fn analyze(text: &'a str) -> Self {
        let separator = if text.contains("\r\n") {
            LineSeparator::CrLf
        } else {
            LineSeparator::Lf
        };
        let trailing_separator = text.ends_with(separator.as_str());
        Self {
            text,
            separator,
            trailing_separator,
        }
    }

    pub fn separator(&self) -> LineSeparator {
        self.separator
    }

    pub fn has_trailing_separator(&self) -> bool {
        self.trailing_separator
    }

    /// Lines of the block; a trailing separator does not produce an extra empty line
    pub fn lines(&self) -> Vec<&'a str> {
        let mut lines: Vec<&'a str> = self.text.split(self.separator.as_str()).collect();
        if self.trailing_separator {
            lines.pop();
        }
        lines
    }
}

/// Result of a truncation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationOutcome<'a> {
    pub text: Cow<'a, str>,
    pub removed_lines: usize,
}

impl<'a> TruncationOutcome<'a> {
    fn unchanged(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            removed_lines: 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.removed_lines > 0
    }

    pub fn into_owned(self) -> (String, usize) {
        (self.text.into_owned(), self.removed_lines)
    }
}

/// Indicator line that replaces `removed` elided lines
pub fn truncation_indicator(removed: usize) -> String {
    format!("{INDICATOR_PREFIX}{removed}{INDICATOR_SUFFIX}")
}

/// Returns true when `line` is exactly an indicator produced by [`truncation_indicator`]
pub fn is_truncation_indicator(line: &str) -> bool {
    line.strip_prefix(INDICATOR_PREFIX)
        .and_then(|rest| rest.strip_suffix(INDICATOR_SUFFIX))
        .is_some_and(|count| !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()))
}

/// Keep the first `head_lines` and last `tail_lines` lines of `text`.
///
/// Text at or under the threshold is returned untouched.
pub fn truncate<'a>(text: &'a str, policy: &TruncationPolicy) -> TruncationOutcome<'a> {
    if !policy.enabled || text.is_empty() {
        return TruncationOutcome::unchanged(text);
    }

    let block = TextBlock::analyze(text);
    let lines = block.lines();
    let threshold = policy.threshold();
    if lines.len() <= threshold {
        return TruncationOutcome::unchanged(text);
    }

    let removed = lines.len() - threshold;
    let indicator = truncation_indicator(removed);
    let tail_start = lines.len() - policy.tail_lines;

    let mut kept: Vec<&str> = Vec::with_capacity(threshold + 1);
    kept.extend_from_slice(&lines[..policy.head_lines]);
    kept.push(indicator.as_str());
    kept.extend_from_slice(&lines[tail_start..]);

    let separator = block.separator().as_str();
    let mut result = kept.join(separator);
    if block.has_trailing_separator() {
        result.push_str(separator);
    }

    TruncationOutcome {
        text: Cow::Owned(result),
        removed_lines: removed,
    }
}

/// The `{stdout, stderr, exit_code}` shape produced by shell command execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredToolRecord {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

impl StructuredToolRecord {
    /// Parse `text` as a record. Only a JSON object with exactly the three keys qualifies.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Truncate a structured tool record field by field, or plain text otherwise.
///
/// When nothing is removed the original text is returned byte for byte.
pub fn truncate_structured_output<'a>(
    text: &'a str,
    policy: &TruncationPolicy,
) -> TruncationOutcome<'a> {
    let Some(record) = StructuredToolRecord::parse(text) else {
        return truncate(text, policy);
    };

    let stdout = truncate(&record.stdout, policy);
    let stderr = truncate(&record.stderr, policy);
    let removed = stdout.removed_lines + stderr.removed_lines;
    if removed == 0 {
        return TruncationOutcome::unchanged(text);
    }

    let truncated = StructuredToolRecord {
        stdout: stdout.text.into_owned(),
        stderr: stderr.text.into_owned(),
        exit_code: record.exit_code,
    };
    match truncated.to_json() {
        Ok(encoded) => TruncationOutcome {
            text: Cow::Owned(encoded),
            removed_lines: removed,
        },
        Err(err) => {
            tracing::warn!(error = %err, "failed to re-encode truncated tool record");
            truncate(text, policy)
        }
    }
}
