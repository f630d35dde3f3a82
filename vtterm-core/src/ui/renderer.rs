use anstyle::{AnsiColor, Color, Effects, Reset, Style};
use anstyle_query::{clicolor, clicolor_force, no_color, term_supports_color};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Styles available for rendering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    Info,
    Output,
    Error,
    Tool,
    Warning,
    Danger,
    Prompt,
}

impl MessageStyle {
    fn style(self) -> Style {
        let fg = |color: AnsiColor| Style::new().fg_color(Some(Color::Ansi(color)));
        match self {
            Self::Info => fg(AnsiColor::Cyan),
            Self::Output => Style::new(),
            Self::Error => fg(AnsiColor::Red),
            Self::Tool => fg(AnsiColor::Blue).effects(Effects::BOLD),
            Self::Warning => fg(AnsiColor::Yellow),
            Self::Danger => fg(AnsiColor::BrightRed).effects(Effects::BOLD),
            Self::Prompt => fg(AnsiColor::Green).effects(Effects::BOLD),
        }
    }
}

/// When to emit ANSI styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn resolve(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                clicolor_force() || (!no_color() && clicolor().unwrap_or_else(term_supports_color))
            }
        }
    }
}

/// Message-display sink used by the confirmation gate and tool output view
pub struct Renderer {
    writer: Box<dyn Write + Send>,
    color: bool,
}

impl Renderer {
    /// Create a renderer for stdout
    pub fn stdout(mode: ColorMode) -> Self {
        Self {
            writer: Box::new(io::stdout()),
            color: mode.resolve(),
        }
    }

    /// Create an uncolored renderer over any writer
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            color: false,
        }
    }

    pub fn uses_color(&self) -> bool {
        self.color
    }

    /// Write a single styled line
    pub fn line(&mut self, style: MessageStyle, text: &str) -> io::Result<()> {
        if self.color {
            let style = style.style();
            writeln!(self.writer, "{style}{text}{Reset}")?;
        } else {
            writeln!(self.writer, "{text}")?;
        }
        self.writer.flush()
    }

    /// Write styled text without a newline and flush, for prompts
    pub fn inline(&mut self, style: MessageStyle, text: &str) -> io::Result<()> {
        if self.color {
            let style = style.style();
            write!(self.writer, "{style}{text}{Reset}")?;
        } else {
            write!(self.writer, "{text}")?;
        }
        self.writer.flush()
    }
}
