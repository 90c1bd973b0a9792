//! Append-only audit trail of every mutation ccc performs.
//!
//! ```text
//! 2025-12-06T16:00:00Z DELETE /Users/pete/Code/old-app (48.0 MB)
//! 2025-12-06T16:00:01Z MODIFY /Users/pete/Code/app/.claude/settings.local.json: removed allow: Bash(git:*)
//! ```
//!
//! Entries are written only after the filesystem action succeeded. The file
//! is never truncated or rewritten here.

use super::preview::{format_size, Action};
use crate::error::{CccError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use fs_err as fs;
use std::io::Write;
use std::path::Path;

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// How an entry is annotated after its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditNote {
    /// ` (<human size>)`
    Size(u64),
    /// `: <details>`
    Details(String),
}

pub struct AuditLogger {
    file: Option<fs::File>,
    now: Clock,
}

impl AuditLogger {
    /// Opens `path` for appending, creating it and its parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir)?;
        }

        let file = open_append(path)?;
        Ok(Self {
            file: Some(file),
            now: Box::new(Utc::now),
        })
    }

    /// Replaces the clock. Used by tests for stable timestamps.
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.now = Box::new(now);
        self
    }

    /// `<timestamp> <ACTION> <path> (<size>)` or
    /// `<timestamp> <ACTION> <path>: <details>`, flushed before returning.
    pub fn record(&mut self, action: Action, path: &Path, note: &AuditNote) -> Result<()> {
        let timestamp = (self.now)().to_rfc3339_opts(SecondsFormat::Secs, true);
        let file = self.file.as_mut().ok_or(CccError::AuditLogClosed)?;

        let entry = match note {
            AuditNote::Size(size) => format!(
                "{} {} {} ({})\n",
                timestamp,
                action,
                path.display(),
                format_size(*size)
            ),
            AuditNote::Details(details) => {
                format!("{} {} {}: {}\n", timestamp, action, path.display(), details)
            }
        };

        file.write_all(entry.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CccError::io("writing audit log", e))
    }

    /// Closes the log. Later writes fail with [`CccError::AuditLogClosed`].
    pub fn close(&mut self) {
        self.file = None;
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
        .map_err(|e| CccError::io(format!("creating {}", dir.display()), e))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CccError::io("creating audit log directory", e))
}

fn open_append(path: &Path) -> Result<fs::File> {
    let mut options = std::fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(path)
        .map_err(|e| CccError::io(format!("opening {}", path.display()), e))?;
    Ok(fs::File::from_parts(file, path))
}
