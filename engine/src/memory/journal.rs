//! Append-only text journal backed by a file

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// In-memory copy of a journal file plus its location on disk
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
    text: String,
}

impl Journal {
    /// Read the journal at `path`; a missing file starts empty
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        Ok(Self { path, text })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append `chunk` to disk, then to the in-memory copy
    ///
    /// The in-memory copy is extended even when the write fails; the write
    /// error is handed back so the caller can report it.
    pub fn append(&mut self, chunk: &str) -> io::Result<()> {
        let written = Self::write_chunk(&self.path, chunk);
        self.text.push_str(chunk);
        written
    }

    fn write_chunk(path: &Path, chunk: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(chunk.as_bytes())?;
        file.flush()
    }
}
