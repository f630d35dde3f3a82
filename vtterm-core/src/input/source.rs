//! Where operator input comes from, and whether it is a real terminal

use is_terminal::IsTerminal;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// An input handle the controller can read lines from
pub enum InputSource {
    /// The process's standard input
    Stdin,
    /// An opened file or device, e.g. `/dev/tty`.
    ///
    /// A terminal device only selects line editing; the editor itself reads the
    /// process's controlling terminal. Any other file is read line by line.
    File(File),
    /// Any other reader: pipes, buffers, wrapped streams
    Reader(Box<dyn BufRead + Send>),
    /// No input available; every read is end-of-input
    Absent,
}

impl InputSource {
    pub fn reader(reader: impl BufRead + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// True only for a directly addressable terminal device
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdin => io::stdin().is_terminal(),
            Self::File(file) => file.is_terminal(),
            Self::Reader(_) | Self::Absent => false,
        }
    }

    /// Convert into the buffered reader used by the non-interactive strategy
    pub fn into_line_reader(self) -> Box<dyn BufRead + Send> {
        match self {
            Self::Stdin => Box::new(BufReader::new(io::stdin())),
            Self::File(file) => Box::new(BufReader::new(file)),
            Self::Reader(reader) => reader,
            Self::Absent => Box::new(io::empty()),
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("Stdin"),
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Absent => f.write_str("Absent"),
        }
    }
}
