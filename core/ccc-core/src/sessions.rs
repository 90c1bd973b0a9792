//! Session file scanning.
//!
//! Claude Code writes one JSONL file per session inside a project's storage
//! directory. Each line is a JSON object; the first line carrying a non-empty
//! `cwd` tells us which working directory the session belonged to.
//!
//! ```text
//! {"type":"summary","summary":"..."}
//! {"sessionId":"550e...","cwd":"/Users/pete/Code/app","timestamp":"2025-01-01T00:00:00Z",...}
//! ```

use crate::error::{CccError, Result};
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Metadata extracted from one session file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Session id; may be empty when the line lacked one.
    pub id: String,
    pub cwd: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub file_path: PathBuf,
    pub size: u64,
    /// Zero-byte file; no parse was attempted.
    pub is_empty: bool,
}

#[derive(Debug, Deserialize)]
struct SessionLine {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Non-blank lines of a session file, numbered from 1.
///
/// Each call to [`SessionLines::iter`] reopens the file and starts over.
#[derive(Debug, Clone)]
pub struct SessionLines {
    path: PathBuf,
}

impl SessionLines {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iter(&self) -> Result<SessionLineIter> {
        let file = fs::File::open(&self.path)
            .map_err(|e| CccError::io("opening session file", e))?;
        Ok(SessionLineIter {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

pub struct SessionLineIter {
    lines: Lines<BufReader<fs::File>>,
    line_no: usize,
}

impl Iterator for SessionLineIter {
    /// `(line number, line)`
    type Item = std::io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok((self.line_no, line))),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Reads a session file and extracts its metadata.
///
/// - zero bytes: returns an empty record without parsing
/// - a malformed line: [`CccError::SessionParse`], scanning stops there
/// - no line with a `cwd`: [`CccError::NoWorkingDirectory`]
pub fn parse_session_file(path: &Path) -> Result<SessionRecord> {
    let metadata = fs::metadata(path).map_err(|e| CccError::io("reading session metadata", e))?;

    let mut record = SessionRecord {
        id: String::new(),
        cwd: String::new(),
        timestamp: None,
        file_path: path.to_path_buf(),
        size: metadata.len(),
        is_empty: false,
    };

    if metadata.len() == 0 {
        record.is_empty = true;
        return Ok(record);
    }

    for line in SessionLines::new(path).iter()? {
        let (line_no, text) = line.map_err(|e| CccError::io("reading session file", e))?;

        let parsed: SessionLine =
            serde_json::from_str(&text).map_err(|source| CccError::SessionParse {
                path: path.to_path_buf(),
                line: line_no,
                source,
            })?;

        let cwd = parsed.cwd.unwrap_or_default();
        if !cwd.is_empty() {
            record.id = parsed.session_id.unwrap_or_default();
            record.cwd = cwd;
            record.timestamp = parsed.timestamp;
            return Ok(record);
        }
    }

    Err(CccError::NoWorkingDirectory(path.to_path_buf()))
}
