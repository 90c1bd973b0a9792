//! Compiled patterns and fixed names for Claude Code files.
//!
//! Update these when Claude Code changes its on-disk naming.

use once_cell::sync::Lazy;
use regex::Regex;

/// Extension of session files inside a project storage directory.
pub const SESSION_FILE_EXTENSION: &str = "jsonl";

/// Name of a project-local settings file, relative to `<project>/.claude/`.
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.json";

// ═══════════════════════════════════════════════════════════════════════════════
// Task-tracking file names
// ═══════════════════════════════════════════════════════════════════════════════

/// `{sessionId}-agent-{agentId}.json`. The session id is everything before the
/// first `-agent-`.
pub static RE_TODO_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)-agent-(.*)\.json$").unwrap());

/// Extracts the embedded session id from a task-tracking file name.
/// Returns `None` for names that don't follow the composite pattern or that
/// embed an empty session id.
pub fn session_id_from_todo_filename(filename: &str) -> Option<&str> {
    RE_TODO_FILENAME
        .captures(filename)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}
