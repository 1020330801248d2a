//! Narrative Memory
//!
//! Three plain-text documents give the agent continuity between cycles and
//! sessions:
//!
//! - **Memory**: episodic log of the agent's own actions. Entries look like
//!   `[2026-01-31 14:05] Posted to m/ai: ...`.
//! - **Soul**: identity directives authored by the operator. Read-only.
//! - **History**: coarse operational log (session start, checkpoints,
//!   cycle errors). Entries look like `**2026-01-31 14:05** - ...`.
//!
//! Appends are written through to disk immediately. A failed write is
//! logged and the in-memory copy still advances, so the running process
//! keeps fresh context even when storage is unavailable. The durable copy
//! may then lag behind the in-memory one.

mod journal;

pub use journal::Journal;

use chrono::Local;
use sdk::errors::AgentError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Returned by [`NarrativeMemory::recent_memory_excerpt`] when nothing has
/// been remembered yet
pub const NO_PRIOR_SESSION: &str = "First session";

/// Marker that starts every History entry line
const HISTORY_ENTRY_MARKER: &str = "**";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Word and entry counts across the three documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub memory_words: usize,
    pub soul_words: usize,
    pub history_entries: usize,
}

#[derive(Debug)]
pub struct NarrativeMemory {
    memory: Journal,
    soul: String,
    history: Journal,
    history_entries: usize,
}

impl NarrativeMemory {
    /// Load all three documents; missing files start empty
    pub fn load(
        memory_path: &Path,
        soul_path: &Path,
        history_path: &Path,
    ) -> Result<Self, AgentError> {
        let memory = Journal::load(memory_path)
            .map_err(|e| journal_error("memory", memory_path, e))?;
        let history = Journal::load(history_path)
            .map_err(|e| journal_error("history", history_path, e))?;

        let soul = match fs::read_to_string(soul_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("No soul document at {}", soul_path.display());
                String::new()
            }
            Err(e) => return Err(journal_error("soul", soul_path, e)),
        };

        let history_entries = history
            .text()
            .lines()
            .filter(|line| line.starts_with(HISTORY_ENTRY_MARKER))
            .count();

        Ok(Self {
            memory,
            soul,
            history,
            history_entries,
        })
    }

    /// The most recent `max_chars` characters of Memory
    ///
    /// Never empty: an empty Memory yields [`NO_PRIOR_SESSION`].
    pub fn recent_memory_excerpt(&self, max_chars: usize) -> String {
        let text = self.memory.text();
        if text.is_empty() {
            return NO_PRIOR_SESSION.to_string();
        }

        char_suffix(text, max_chars).to_string()
    }

    /// The first `max_chars` characters of the Soul document
    pub fn soul_excerpt(&self, max_chars: usize) -> String {
        char_prefix(&self.soul, max_chars).to_string()
    }

    /// Append a timestamped entry to Memory; never fails
    pub fn append_memory(&mut self, entry: &str) {
        let line = format!("\n[{}] {}", timestamp(), entry);
        if let Err(e) = self.memory.append(&line) {
            tracing::warn!(
                "Could not persist memory entry to {}: {}",
                self.memory.path().display(),
                e
            );
        }
    }

    /// Append a timestamped entry to History; never fails
    pub fn append_history(&mut self, entry: &str) {
        let line = format!(
            "\n{marker}{}{marker} - {}",
            timestamp(),
            entry,
            marker = HISTORY_ENTRY_MARKER
        );
        if let Err(e) = self.history.append(&line) {
            tracing::warn!(
                "Could not persist history entry to {}: {}",
                self.history.path().display(),
                e
            );
        }
        self.history_entries += 1;
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            memory_words: self.memory.text().split_whitespace().count(),
            soul_words: self.soul.split_whitespace().count(),
            history_entries: self.history_entries,
        }
    }

    pub fn memory_text(&self) -> &str {
        self.memory.text()
    }

    pub fn history_text(&self) -> &str {
        self.history.text()
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn journal_error(kind: &str, path: &Path, err: io::Error) -> AgentError {
    AgentError::Journal(format!("Failed to read {} at {}: {}", kind, path.display(), err))
}

/// First `n` characters of `text`
pub(crate) fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Last `n` characters of `text`
pub(crate) fn char_suffix(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
