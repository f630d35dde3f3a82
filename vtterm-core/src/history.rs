//! Bounded, file-backed command history
//!
//! Entries live in memory oldest-first and are mirrored to a plain text file,
//! one entry per line. The in-memory log is authoritative for the running
//! process: a failed write to the backing file is logged and otherwise ignored.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::constants::defaults;

/// Reasons an entry is rejected by [`HistoryLog::add`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("history entry is empty")]
    EmptyEntry,

    #[error("history entry contains an embedded newline")]
    EmbeddedNewline,

    #[error("history entry duplicates the previous entry")]
    ConsecutiveDuplicate,
}

#[derive(Debug)]
struct HistoryInner {
    entries: VecDeque<String>,
}

/// Ordered log of past inputs bounded by `max_entries`
#[derive(Debug)]
pub struct HistoryLog {
    inner: Mutex<HistoryInner>,
    path: Option<PathBuf>,
    max_entries: usize,
}

impl HistoryLog {
    /// Create a log, loading the backing file when it exists.
    ///
    /// `max_entries == 0` selects the default cap.
    pub fn new(path: Option<PathBuf>, max_entries: usize) -> Self {
        let max_entries = if max_entries == 0 {
            defaults::DEFAULT_MAX_HISTORY_ENTRIES
        } else {
            max_entries
        };
        let path = path.filter(|path| !path.as_os_str().is_empty());

        let mut entries = VecDeque::new();
        if let Some(path) = path.as_deref() {
            match load_entries(path) {
                Ok(loaded) => entries = loaded,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to load history file; starting empty"
                    );
                }
            }
        }
        while entries.len() > max_entries {
            entries.pop_front();
        }

        Self {
            inner: Mutex::new(HistoryInner { entries }),
            path,
            max_entries,
        }
    }

    /// A log with no backing file
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(None, max_entries)
    }

    /// Validate and append an entry, evicting the oldest entry when full
    pub fn add(&self, entry: &str) -> Result<(), HistoryError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(HistoryError::EmptyEntry);
        }
        if entry.contains(['\n', '\r']) {
            return Err(HistoryError::EmbeddedNewline);
        }

        let mut inner = self.inner.lock();
        if inner.entries.back().is_some_and(|last| last == entry) {
            return Err(HistoryError::ConsecutiveDuplicate);
        }

        inner.entries.push_back(entry.to_string());
        while inner.entries.len() > self.max_entries {
            inner.entries.pop_front();
        }

        // Written under the lock so memory and file see the same order.
        if let Some(path) = self.path.as_deref() {
            if let Err(err) = append_entry(path, entry) {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to persist history entry"
                );
            }
        }
        Ok(())
    }

    /// Drop every entry and truncate the backing file
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        if let Some(path) = self.path.as_deref() {
            if let Err(err) = truncate_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to truncate history file"
                );
            }
        }
    }

    /// Oldest-first snapshot
    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<String> {
        self.inner.lock().entries.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn load_entries(path: &Path) -> io::Result<VecDeque<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn append_entry(path: &Path, entry: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{entry}")
}

fn truncate_file(path: &Path) -> io::Result<()> {
    match OpenOptions::new().write(true).truncate(true).open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
