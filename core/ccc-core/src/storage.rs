//! Path discovery for the Claude Code data tree.
//!
//! `ClaudePaths` centralizes every location ccc reads from or writes to, so
//! detectors never build paths on their own.
//!
//! ## Design Principles
//!
//! - **Single source of truth**: All path decisions centralized here
//! - **Testable**: `ClaudePaths::with_root()` enables test injection

use crate::error::{CccError, Result};
use std::path::{Path, PathBuf};

const AUDIT_LOG_FILE: &str = "cccc-audit.log";

/// Locations inside a Claude Code root directory (default: `~/.claude`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudePaths {
    root: PathBuf,
}

impl ClaudePaths {
    /// Resolves the Claude root. `None` falls back to `~/.claude`.
    pub fn discover(claude_home: Option<&Path>) -> Result<Self> {
        match claude_home {
            Some(root) => Ok(Self::with_root(root.to_path_buf())),
            None => {
                let home = dirs::home_dir().ok_or(CccError::HomeDirNotFound)?;
                Ok(Self::with_root(home.join(".claude")))
            }
        }
    }

    /// Creates paths rooted at a custom directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sub-trees scanned by the detectors
    // ─────────────────────────────────────────────────────────────────────────────

    /// One subdirectory per project, each holding `*.jsonl` session files.
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Task-tracking files named `{sessionId}-agent-{agentId}.json`.
    pub fn todos_dir(&self) -> PathBuf {
        self.root.join("todos")
    }

    /// One subdirectory per session id.
    pub fn file_history_dir(&self) -> PathBuf {
        self.root.join("file-history")
    }

    pub fn session_env_dir(&self) -> PathBuf {
        self.root.join("session-env")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Global permission settings.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// `<root>/settings.local.json`. When the home directory is itself a
    /// project this would look like a project-local config; it is not one.
    pub fn home_local_settings_file(&self) -> PathBuf {
        self.root.join("settings.local.json")
    }

    pub fn audit_log_file(&self) -> PathBuf {
        self.root.join(AUDIT_LOG_FILE)
    }

    /// Storage directory for one project, by encoded name.
    pub fn project_storage_dir(&self, encoded_name: &str) -> PathBuf {
        self.projects_dir().join(encoded_name)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Path Encoding
    // ─────────────────────────────────────────────────────────────────────────────

    /// Encodes a filesystem path the way Claude Code names project directories.
    /// Example: `/Users/pete/Code/my-project` -> `-Users-pete-Code-my-project`
    pub fn encode_path(path: &str) -> String {
        path.replace('/', "-")
    }
}

/// Lexically normalizes a path (drops `.` components, resolves `..`) without
/// touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ClaudePaths {
        ClaudePaths::with_root(PathBuf::from("/tmp/claude"))
    }

    #[test]
    fn test_discover_with_explicit_root() {
        let p = ClaudePaths::discover(Some(Path::new("/tmp/custom"))).unwrap();
        assert_eq!(p.root(), Path::new("/tmp/custom"));
    }

    #[test]
    fn test_discover_default_ends_with_claude() {
        if let Ok(p) = ClaudePaths::discover(None) {
            assert!(p.root().ends_with(".claude"));
        }
    }

    #[test]
    fn test_sub_tree_paths() {
        let p = paths();
        assert_eq!(p.projects_dir(), PathBuf::from("/tmp/claude/projects"));
        assert_eq!(p.todos_dir(), PathBuf::from("/tmp/claude/todos"));
        assert_eq!(
            p.file_history_dir(),
            PathBuf::from("/tmp/claude/file-history")
        );
        assert_eq!(p.session_env_dir(), PathBuf::from("/tmp/claude/session-env"));
    }

    #[test]
    fn test_file_paths() {
        let p = paths();
        assert_eq!(p.settings_file(), PathBuf::from("/tmp/claude/settings.json"));
        assert_eq!(
            p.home_local_settings_file(),
            PathBuf::from("/tmp/claude/settings.local.json")
        );
        assert_eq!(
            p.audit_log_file(),
            PathBuf::from("/tmp/claude/cccc-audit.log")
        );
    }

    #[test]
    fn test_project_storage_dir() {
        assert_eq!(
            paths().project_storage_dir("-Users-pete-Code-app"),
            PathBuf::from("/tmp/claude/projects/-Users-pete-Code-app")
        );
    }

    #[test]
    fn test_encode_path_replaces_slashes() {
        assert_eq!(
            ClaudePaths::encode_path("/Users/pete/Code/my-project"),
            "-Users-pete-Code-my-project"
        );
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c/settings.json")),
            PathBuf::from("/a/c/settings.json")
        );
        assert_eq!(
            normalize_lexically(Path::new("/a/b/")),
            PathBuf::from("/a/b")
        );
    }
}
