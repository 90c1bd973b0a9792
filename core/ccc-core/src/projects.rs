//! Project registry: one record per storage directory under `~/.claude/projects`.
//!
//! Records are rebuilt on every scan; nothing is cached between runs.

use crate::error::{CccError, Result};
use crate::fs_utils::{is_dir_entry, read_dir_sorted};
use crate::patterns::SESSION_FILE_EXTENSION;
use crate::sessions::parse_session_file;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;

/// A set of session ids with O(1) membership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdSet {
    ids: HashSet<String>,
}

impl SessionIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an id. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// O(1) average.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn extend_from(&mut self, other: &SessionIdSet) {
        self.ids.extend(other.ids.iter().cloned());
    }
}

impl<S: Into<String>> FromIterator<S> for SessionIdSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Aggregated view of one project's session storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    /// Storage directory name, e.g. `-Users-pete-Code-app`.
    pub encoded_name: String,
    /// Working directory from the first session file that names one.
    /// Empty if no session file did.
    pub actual_path: String,
    pub session_ids: SessionIdSet,
    /// Bytes across all session files, empty ones included.
    pub total_size: u64,
    pub file_count: usize,
    pub last_used: Option<DateTime<Utc>>,
}

impl ProjectRecord {
    pub fn new(encoded_name: impl Into<String>) -> Self {
        Self {
            encoded_name: encoded_name.into(),
            actual_path: String::new(),
            session_ids: SessionIdSet::new(),
            total_size: 0,
            file_count: 0,
            last_used: None,
        }
    }

    /// Whether the project's working directory is on disk right now.
    ///
    /// Always checked live. An unknown path never counts as present.
    pub fn exists(&self) -> bool {
        !self.actual_path.is_empty() && Path::new(&self.actual_path).exists()
    }

    /// Actual path for display, or a placeholder when unknown.
    pub fn display_path(&self) -> &str {
        if self.actual_path.is_empty() {
            "(unknown path)"
        } else {
            &self.actual_path
        }
    }
}

/// Scans a projects directory and returns one record per subdirectory.
///
/// A missing projects directory is [`CccError::ProjectsDirMissing`], not an
/// empty registry. Session files that can't be read or parsed are skipped and
/// their bytes left out.
pub fn scan_projects(projects_dir: &Path) -> Result<Vec<ProjectRecord>> {
    let entries = read_dir_sorted(projects_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            CccError::ProjectsDirMissing(projects_dir.to_path_buf())
        }
        _ => CccError::io("scanning projects directory", e),
    })?;

    let mut projects = Vec::new();
    for entry in entries {
        if !is_dir_entry(&entry) {
            continue;
        }

        let encoded_name = entry.file_name().to_string_lossy().to_string();
        match scan_project_dir(&entry.path(), encoded_name) {
            Ok(project) => projects.push(project),
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable project directory");
            }
        }
    }

    Ok(projects)
}

fn scan_project_dir(project_dir: &Path, encoded_name: String) -> Result<ProjectRecord> {
    let mut project = ProjectRecord::new(encoded_name);

    let entries = read_dir_sorted(project_dir)
        .map_err(|e| CccError::io("scanning project directory", e))?;

    for entry in entries {
        if is_dir_entry(&entry) {
            continue;
        }
        let path = entry.path();
        if !is_session_file(&path) {
            continue;
        }

        let info = match parse_session_file(&path) {
            Ok(info) => info,
            Err(e) if e.is_not_found_condition() => {
                tracing::debug!(path = %path.display(), "Session file has no cwd, skipping");
                continue;
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping session file");
                continue;
            }
        };

        project.file_count += 1;
        project.total_size += info.size;

        if info.is_empty {
            continue;
        }
        if project.actual_path.is_empty() {
            project.actual_path = info.cwd;
        }
        if !info.id.is_empty() {
            project.session_ids.insert(info.id);
        }
        if let Some(ts) = info.timestamp {
            if project.last_used.map_or(true, |last| ts > last) {
                project.last_used = Some(ts);
            }
        }
    }

    Ok(project)
}

pub(crate) fn is_session_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == SESSION_FILE_EXTENSION)
}

/// Union of every project's session ids.
pub fn valid_session_ids(projects: &[ProjectRecord]) -> SessionIdSet {
    let mut ids = SessionIdSet::new();
    for project in projects {
        ids.extend_from(&project.session_ids);
    }
    ids
}
