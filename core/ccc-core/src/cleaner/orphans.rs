//! Orphan detection: derelict data that no live session refers to.
//!
//! Four sub-trees are scanned independently. A missing sub-tree contributes
//! nothing; an entry that can't be inspected is left alone.

use crate::envelope::{
    Action, ApplyOutcome, AppliedChange, AuditNote, Change, CleanupItem, Preview,
};
use crate::error::{CccError, Result};
use crate::fs_utils::{dir_size, is_dir_empty, is_dir_entry, read_dir_if_exists};
use crate::patterns::session_id_from_todo_filename;
use crate::projects::{is_session_file, SessionIdSet};
use crate::storage::ClaudePaths;
use fs_err as fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const ORPHAN_PREVIEW_TITLE: &str = "Orphan Cleanup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrphanCategory {
    /// Zero-byte session file in any project.
    EmptySessionFile,
    /// Task file whose session id is not valid.
    UnreferencedTaskFile,
    /// File-history directory whose session id is not valid.
    UnreferencedHistoryDir,
    /// Session-environment directory with no entries.
    EmptyEnvironmentDir,
}

impl OrphanCategory {
    pub fn description(self) -> &'static str {
        match self {
            OrphanCategory::EmptySessionFile => "Empty session file",
            OrphanCategory::UnreferencedTaskFile => "Orphan todo",
            OrphanCategory::UnreferencedHistoryDir => "Orphan file history",
            OrphanCategory::EmptyEnvironmentDir => "Empty session env",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanItem {
    pub category: OrphanCategory,
    pub path: PathBuf,
    /// Bytes reclaimed by removing `path`.
    pub size: u64,
}

/// Finds orphans across all four sub-trees of `paths`.
///
/// `valid_ids` is usually [`crate::projects::valid_session_ids`] over a
/// fresh registry scan.
pub fn find_orphans(paths: &ClaudePaths, valid_ids: &SessionIdSet) -> Result<Vec<OrphanItem>> {
    let mut orphans = find_empty_session_files(&paths.projects_dir())?;
    orphans.extend(find_unreferenced_task_files(&paths.todos_dir(), valid_ids)?);
    orphans.extend(find_unreferenced_history_dirs(
        &paths.file_history_dir(),
        valid_ids,
    )?);
    orphans.extend(find_empty_environment_dirs(&paths.session_env_dir())?);

    tracing::debug!(count = orphans.len(), "Orphan scan complete");
    Ok(orphans)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sub-tree scans
// ─────────────────────────────────────────────────────────────────────────────

fn find_empty_session_files(projects_dir: &Path) -> Result<Vec<OrphanItem>> {
    let projects = read_dir_if_exists(projects_dir)
        .map_err(|e| CccError::io("scanning projects directory", e))?;

    let mut orphans = Vec::new();
    for project in projects.iter().filter(|e| is_dir_entry(e)) {
        let sessions = match read_dir_if_exists(&project.path()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(path = %project.path().display(), error = %e, "Skipping unreadable project");
                continue;
            }
        };

        for entry in sessions {
            let path = entry.path();
            if is_dir_entry(&entry) || !is_session_file(&path) {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if meta.len() == 0 {
                orphans.push(OrphanItem {
                    category: OrphanCategory::EmptySessionFile,
                    path,
                    size: 0,
                });
            }
        }
    }
    Ok(orphans)
}

fn find_unreferenced_task_files(
    todos_dir: &Path,
    valid_ids: &SessionIdSet,
) -> Result<Vec<OrphanItem>> {
    let entries =
        read_dir_if_exists(todos_dir).map_err(|e| CccError::io("scanning todos directory", e))?;

    let mut orphans = Vec::new();
    for entry in entries {
        if is_dir_entry(&entry) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some(session_id) = session_id_from_todo_filename(&file_name) else {
            continue;
        };
        if valid_ids.contains(session_id) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        orphans.push(OrphanItem {
            category: OrphanCategory::UnreferencedTaskFile,
            path: entry.path(),
            size: meta.len(),
        });
    }
    Ok(orphans)
}

fn find_unreferenced_history_dirs(
    history_dir: &Path,
    valid_ids: &SessionIdSet,
) -> Result<Vec<OrphanItem>> {
    let entries = read_dir_if_exists(history_dir)
        .map_err(|e| CccError::io("scanning file-history directory", e))?;

    let mut orphans = Vec::new();
    for entry in entries.iter().filter(|e| is_dir_entry(e)) {
        let session_id = entry.file_name().to_string_lossy().to_string();
        if valid_ids.contains(&session_id) {
            continue;
        }
        let path = entry.path();
        match dir_size(&path) {
            Ok(size) => orphans.push(OrphanItem {
                category: OrphanCategory::UnreferencedHistoryDir,
                path,
                size,
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unmeasurable history dir");
            }
        }
    }
    Ok(orphans)
}

fn find_empty_environment_dirs(env_dir: &Path) -> Result<Vec<OrphanItem>> {
    let entries = read_dir_if_exists(env_dir)
        .map_err(|e| CccError::io("scanning session-env directory", e))?;

    let mut orphans = Vec::new();
    for entry in entries.iter().filter(|e| is_dir_entry(e)) {
        let path = entry.path();
        if let Ok(true) = is_dir_empty(&path) {
            orphans.push(OrphanItem {
                category: OrphanCategory::EmptyEnvironmentDir,
                path,
                size: 0,
            });
        }
    }
    Ok(orphans)
}

// ─────────────────────────────────────────────────────────────────────────────
// Removal
// ─────────────────────────────────────────────────────────────────────────────

/// Removes one orphan and returns the bytes reclaimed.
///
/// A path that's already gone reclaims nothing. Directories are removed
/// recursively.
pub fn clean_orphan(item: &OrphanItem, dry_run: bool) -> Result<u64> {
    if dry_run {
        return Ok(item.size);
    }

    let meta = match fs::symlink_metadata(&item.path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(CccError::io("inspecting orphan", e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(&item.path).map_err(|e| CccError::io("removing orphan directory", e))?;
    } else {
        fs::remove_file(&item.path).map_err(|e| CccError::io("removing orphan file", e))?;
    }
    Ok(item.size)
}

/// Whether an empty-ness orphan picked up content since it was detected.
fn gained_content(item: &OrphanItem) -> bool {
    match item.category {
        OrphanCategory::EmptySessionFile => fs::metadata(&item.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false),
        OrphanCategory::EmptyEnvironmentDir => {
            matches!(is_dir_empty(&item.path), Ok(false))
        }
        _ => false,
    }
}

impl CleanupItem for OrphanItem {
    fn target(&self) -> &Path {
        &self.path
    }

    fn apply(&self) -> Result<ApplyOutcome> {
        if gained_content(self) {
            return Ok(ApplyOutcome::Skipped {
                reason: "no longer empty".to_string(),
            });
        }

        let size_saved = clean_orphan(self, false)?;
        Ok(ApplyOutcome::Applied(AppliedChange {
            action: Action::Delete,
            path: self.path.clone(),
            note: AuditNote::Size(size_saved),
            size_saved,
        }))
    }
}

pub fn build_orphan_preview(orphans: &[OrphanItem]) -> Preview {
    let mut preview = Preview::new(ORPHAN_PREVIEW_TITLE);
    preview.changes = orphans
        .iter()
        .map(|o| Change {
            action: Action::Delete,
            path: o.path.clone(),
            description: o.category.description().to_string(),
            size: o.size,
        })
        .collect();
    preview
}
