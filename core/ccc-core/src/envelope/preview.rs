//! Change previews.
//!
//! A `Preview` is a pure projection of what a cleanup would do. Building or
//! displaying one never touches the filesystem.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Delete,
    Modify,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Delete => "DELETE",
            Action::Modify => "MODIFY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed action.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub action: Action,
    pub path: PathBuf,
    pub description: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    pub title: String,
    pub changes: Vec<Change>,
    /// Items deliberately left alone, shown for context.
    pub kept: Vec<Change>,
}

impl Preview {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn total_size(&self) -> u64 {
        self.changes.iter().map(|c| c.size).sum()
    }

    /// Writes the formatted preview.
    pub fn display(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "=== {} ===\n", self.title)?;

        if !self.changes.is_empty() {
            writeln!(w, "Changes:")?;
            for (i, c) in self.changes.iter().enumerate() {
                writeln!(w, "  {}. [{}] {}", i + 1, c.action, c.path.display())?;
                if !c.description.is_empty() {
                    writeln!(w, "     {}", c.description)?;
                }
                writeln!(w, "     Size: {}", format_size(c.size))?;
            }
            writeln!(w)?;
        }

        if !self.kept.is_empty() {
            writeln!(w, "Kept (no changes):")?;
            for (i, c) in self.kept.iter().enumerate() {
                writeln!(w, "  {}. {}", i + 1, c.path.display())?;
                if !c.description.is_empty() {
                    writeln!(w, "     {}", c.description)?;
                }
            }
            writeln!(w)?;
        }

        writeln!(w, "Total: {}", format_size(self.total_size()))
    }
}

/// Formats a byte count, e.g. `512 B`, `1.5 KB`, `14.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}
