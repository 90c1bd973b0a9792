//! Error types for ccc-core operations.

use std::path::PathBuf;

/// All errors that can occur in ccc-core operations.
///
/// Parse failures and the "no working directory" condition are kept apart so
/// that aggregate scans can skip a single bad session file without treating
/// it as fatal.
#[derive(Debug, thiserror::Error)]
pub enum CccError {
    // ─────────────────────────────────────────────────────────────────────
    // Discovery Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    /// No `projects/` under the Claude root. Without a registry there is no
    /// way to tell live session data from orphans.
    #[error("Projects directory not found: {0}")]
    ProjectsDirMissing(PathBuf),

    // ─────────────────────────────────────────────────────────────────────
    // Parse Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Session file malformed: {path}:{line}: {source}")]
    SessionParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings file malformed: {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every line parsed, but none carried a working directory.
    #[error("No cwd field found in session file: {0}")]
    NoWorkingDirectory(PathBuf),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Audit Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Audit logger is closed")]
    AuditLogClosed,
}

impl CccError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CccError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for conditions that mean "unknown" rather than "broken".
    pub fn is_not_found_condition(&self) -> bool {
        matches!(
            self,
            CccError::NoWorkingDirectory(_) | CccError::ProjectsDirMissing(_)
        )
    }
}

/// Convenience type alias for Results using CccError.
pub type Result<T> = std::result::Result<T, CccError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_working_directory_is_not_found_condition() {
        let err = CccError::NoWorkingDirectory(PathBuf::from("/tmp/a.jsonl"));
        assert!(err.is_not_found_condition());
        assert!(err.to_string().contains("/tmp/a.jsonl"));
    }

    #[test]
    fn test_projects_dir_missing_is_not_found_condition() {
        let err = CccError::ProjectsDirMissing(PathBuf::from("/tmp/.claude/projects"));
        assert!(err.is_not_found_condition());
        assert_eq!(
            err.to_string(),
            "Projects directory not found: /tmp/.claude/projects"
        );
    }

    #[test]
    fn test_io_error_is_not_not_found_condition() {
        let err = CccError::io(
            "reading",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found_condition());
        assert!(err.to_string().starts_with("I/O error: reading"));
    }
}
