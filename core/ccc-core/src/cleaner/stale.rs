//! Stale project detection and removal.
//!
//! A project is stale when the working directory its sessions ran in is gone.
//! Staleness is rechecked right before removal, so a directory that came back
//! after the preview is never deleted.

use crate::envelope::{
    Action, ApplyOutcome, AppliedChange, AuditNote, Change, CleanupItem, Preview,
};
use crate::error::{CccError, Result};
use crate::projects::ProjectRecord;
use crate::storage::ClaudePaths;
use fs_err as fs;
use std::path::{Path, PathBuf};

pub const STALE_PREVIEW_TITLE: &str = "Stale Project Cleanup";

/// Projects whose working directory doesn't exist right now.
pub fn find_stale_projects(projects: &[ProjectRecord]) -> Vec<ProjectRecord> {
    projects.iter().filter(|p| !p.exists()).cloned().collect()
}

/// Splits projects into `(stale, kept)` with one existence check each.
pub fn partition_stale(projects: &[ProjectRecord]) -> (Vec<ProjectRecord>, Vec<ProjectRecord>) {
    projects.iter().cloned().partition(|p| !p.exists())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleOutcome {
    /// Storage directory removed, or would be in a dry run.
    Removed { size_saved: u64, files_removed: usize },
    /// Storage directory was already gone.
    AlreadyGone,
    /// The working directory exists again.
    NoLongerStale,
}

/// Removes a stale project's storage directory.
///
/// With `dry_run` the outcome is computed but nothing is deleted.
pub fn clean_stale_project(
    paths: &ClaudePaths,
    project: &ProjectRecord,
    dry_run: bool,
) -> Result<StaleOutcome> {
    if project.exists() {
        return Ok(StaleOutcome::NoLongerStale);
    }

    let storage_dir = paths.project_storage_dir(&project.encoded_name);
    if fs::symlink_metadata(&storage_dir).is_err() {
        return Ok(StaleOutcome::AlreadyGone);
    }

    if !dry_run {
        fs::remove_dir_all(&storage_dir)
            .map_err(|e| CccError::io("removing project directory", e))?;
    }

    Ok(StaleOutcome::Removed {
        size_saved: project.total_size,
        files_removed: project.file_count,
    })
}

/// A stale project queued for removal.
#[derive(Debug, Clone)]
pub struct StaleCandidate {
    pub project: ProjectRecord,
    paths: ClaudePaths,
    storage_dir: PathBuf,
}

impl StaleCandidate {
    pub fn new(paths: &ClaudePaths, project: ProjectRecord) -> Self {
        let storage_dir = paths.project_storage_dir(&project.encoded_name);
        Self {
            project,
            paths: paths.clone(),
            storage_dir,
        }
    }

    /// The project's actual path, or its storage directory when unknown.
    pub fn display_path(&self) -> &Path {
        if self.project.actual_path.is_empty() {
            &self.storage_dir
        } else {
            Path::new(&self.project.actual_path)
        }
    }

    fn deleted(&self, size_saved: u64) -> ApplyOutcome {
        ApplyOutcome::Applied(AppliedChange {
            action: Action::Delete,
            path: self.display_path().to_path_buf(),
            note: AuditNote::Size(size_saved),
            size_saved,
        })
    }
}

impl CleanupItem for StaleCandidate {
    fn target(&self) -> &Path {
        self.display_path()
    }

    fn apply(&self) -> Result<ApplyOutcome> {
        match clean_stale_project(&self.paths, &self.project, false)? {
            StaleOutcome::Removed { size_saved, .. } => Ok(self.deleted(size_saved)),
            StaleOutcome::AlreadyGone => Ok(self.deleted(0)),
            StaleOutcome::NoLongerStale => Ok(ApplyOutcome::Skipped {
                reason: "working directory exists again".to_string(),
            }),
        }
    }
}

pub fn build_stale_preview(stale: &[StaleCandidate], kept: &[ProjectRecord]) -> Preview {
    let mut preview = Preview::new(STALE_PREVIEW_TITLE);

    for candidate in stale {
        let p = &candidate.project;
        let description = if p.actual_path.is_empty() {
            format!("{} files (no cwd found)", p.file_count)
        } else {
            match p.last_used {
                Some(ts) => format!("{} files, last used: {}", p.file_count, ts.format("%Y-%m-%d")),
                None => format!("{} files", p.file_count),
            }
        };

        preview.changes.push(Change {
            action: Action::Delete,
            path: candidate.display_path().to_path_buf(),
            description,
            size: p.total_size,
        });
    }

    for p in kept {
        preview.kept.push(Change {
            action: Action::Delete,
            path: PathBuf::from(&p.actual_path),
            description: format!("{} files", p.file_count),
            size: p.total_size,
        });
    }

    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn project(name: &str, actual: &str, size: u64) -> ProjectRecord {
        let mut p = ProjectRecord::new(name);
        p.actual_path = actual.to_string();
        p.total_size = size;
        p.file_count = 2;
        p
    }

    fn setup() -> (TempDir, ClaudePaths) {
        let temp = TempDir::new().unwrap();
        let paths = ClaudePaths::with_root(temp.path().join(".claude"));
        fs::create_dir_all(paths.projects_dir()).unwrap();
        (temp, paths)
    }

    #[test]
    fn test_find_stale_all_missing() {
        let projects = vec![
            project("-gone-a", "/definitely/not/here/a", 1),
            project("-gone-b", "/definitely/not/here/b", 1),
        ];
        assert_eq!(find_stale_projects(&projects).len(), 2);
    }

    #[test]
    fn test_find_stale_mixed_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let live = temp.path().to_string_lossy().to_string();
        let projects = vec![
            project("-live", &live, 1),
            project("-gone", "/definitely/not/here", 1),
            project("-unknown", "", 1),
        ];

        let first = find_stale_projects(&projects);
        let second = find_stale_projects(&projects);
        let names: Vec<_> = first.iter().map(|p| p.encoded_name.as_str()).collect();
        assert_eq!(names, ["-gone", "-unknown"]);
        assert_eq!(first, second);

        let (stale, kept) = partition_stale(&projects);
        assert_eq!(stale, first);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].encoded_name, "-live");
    }

    #[test]
    fn test_clean_removes_storage_dir() {
        let (_temp, paths) = setup();
        let p = project("-gone", "/definitely/not/here", 42);
        let dir = paths.project_storage_dir(&p.encoded_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("s.jsonl"), "x").unwrap();

        let outcome = clean_stale_project(&paths, &p, false).unwrap();
        assert_eq!(
            outcome,
            StaleOutcome::Removed {
                size_saved: 42,
                files_removed: 2
            }
        );
        assert!(!dir.exists());
    }

    #[test]
    fn test_clean_dry_run_keeps_dir() {
        let (_temp, paths) = setup();
        let p = project("-gone", "/definitely/not/here", 42);
        let dir = paths.project_storage_dir(&p.encoded_name);
        fs::create_dir_all(&dir).unwrap();

        let dry = clean_stale_project(&paths, &p, true).unwrap();
        assert!(dir.exists());
        let real = clean_stale_project(&paths, &p, false).unwrap();
        assert_eq!(dry, real);
    }

    #[test]
    fn test_clean_already_gone() {
        let (_temp, paths) = setup();
        let p = project("-never-created", "/definitely/not/here", 42);
        assert_eq!(
            clean_stale_project(&paths, &p, false).unwrap(),
            StaleOutcome::AlreadyGone
        );
    }

    #[test]
    fn test_candidate_already_gone_saves_nothing() {
        let (_temp, paths) = setup();
        let candidate = StaleCandidate::new(&paths, project("-gone", "/definitely/not/here", 42));
        let ApplyOutcome::Applied(change) = candidate.apply().unwrap() else {
            panic!("expected applied outcome");
        };
        assert_eq!(change.size_saved, 0);
    }

    #[test]
    fn test_clean_refuses_when_path_reappeared() {
        let (temp, paths) = setup();
        let live = temp.path().join("work");
        fs::create_dir_all(&live).unwrap();
        let p = project("-work", &live.to_string_lossy(), 42);
        let dir = paths.project_storage_dir(&p.encoded_name);
        fs::create_dir_all(&dir).unwrap();

        let candidate = StaleCandidate::new(&paths, p);
        let outcome = candidate.apply().unwrap();
        assert!(matches!(outcome, ApplyOutcome::Skipped { .. }));
        assert!(dir.exists());
    }

    #[test]
    fn test_candidate_audits_actual_path_or_storage_dir() {
        let (_temp, paths) = setup();
        let known = StaleCandidate::new(&paths, project("-gone", "/gone/app", 1));
        assert_eq!(known.display_path(), Path::new("/gone/app"));

        let unknown = StaleCandidate::new(&paths, project("-mystery", "", 1));
        assert_eq!(
            unknown.display_path(),
            paths.project_storage_dir("-mystery")
        );
    }

    #[test]
    fn test_build_stale_preview() {
        let (_temp, paths) = setup();
        let mut gone = project("-gone", "/gone/app", 100);
        gone.last_used = Some(chrono::Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap());
        let unknown = project("-mystery", "", 5);
        let stale = vec![
            StaleCandidate::new(&paths, gone),
            StaleCandidate::new(&paths, unknown),
        ];
        let kept = vec![project("-live", "/live/app", 7)];

        let preview = build_stale_preview(&stale, &kept);
        assert_eq!(preview.title, STALE_PREVIEW_TITLE);
        assert_eq!(preview.changes.len(), 2);
        assert_eq!(preview.changes[0].path, PathBuf::from("/gone/app"));
        assert_eq!(preview.changes[0].description, "2 files, last used: 2025-01-15");
        assert_eq!(preview.changes[1].description, "2 files (no cwd found)");
        assert_eq!(preview.kept.len(), 1);
        assert_eq!(preview.total_size(), 105);
    }

    #[test]
    fn test_build_stale_preview_empty() {
        let preview = build_stale_preview(&[], &[]);
        assert!(preview.changes.is_empty());
        assert_eq!(preview.total_size(), 0);
    }
}
