//! Config deduplication: permission entries in a project-local settings file
//! that the global settings file already grants.
//!
//! Entries are compared by exact string equality, category by category.

use crate::envelope::{
    Action, ApplyOutcome, AppliedChange, AuditNote, Change, CleanupItem, Preview,
};
use crate::error::{CccError, Result};
use crate::patterns::LOCAL_SETTINGS_FILE;
use crate::settings::{diff_entries, PermissionCategory, Settings};
use crate::storage::normalize_lexically;
use fs_err as fs;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEDUP_PREVIEW_TITLE: &str = "Config Deduplication";

const DELETED_DETAILS: &str = "deleted (all entries were duplicates)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupResult {
    pub local_path: PathBuf,
    pub duplicate_allow: Vec<String>,
    pub duplicate_deny: Vec<String>,
    pub duplicate_ask: Vec<String>,
    /// No local permission entry survives deduplication.
    pub should_delete: bool,
    /// The local file holds settings other than the permission lists.
    pub keeps_other_settings: bool,
}

impl DedupResult {
    pub fn duplicates(&self, category: PermissionCategory) -> &[String] {
        match category {
            PermissionCategory::Allow => &self.duplicate_allow,
            PermissionCategory::Deny => &self.duplicate_deny,
            PermissionCategory::Ask => &self.duplicate_ask,
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.total_duplicates() > 0
    }

    pub fn total_duplicates(&self) -> usize {
        PermissionCategory::ALL
            .iter()
            .map(|c| self.duplicates(*c).len())
            .sum()
    }

    /// Whether applying removes the file rather than rewriting it.
    ///
    /// A file that still carries other settings is rewritten with empty
    /// permission lists instead.
    pub fn will_delete(&self) -> bool {
        self.should_delete && !self.keeps_other_settings
    }

    /// Worth showing: something would change on disk.
    pub fn is_actionable(&self) -> bool {
        self.has_duplicates() || self.will_delete()
    }

    /// Audit detail text, e.g. `removed allow: a, b; deny: c`.
    pub fn format_audit_details(&self) -> String {
        if self.will_delete() {
            return DELETED_DETAILS.to_string();
        }
        if !self.has_duplicates() {
            return "no changes".to_string();
        }

        let parts: Vec<String> = PermissionCategory::ALL
            .iter()
            .filter(|c| !self.duplicates(**c).is_empty())
            .map(|c| format!("{}: {}", c.as_str(), self.duplicates(*c).join(", ")))
            .collect();
        format!("removed {}", parts.join("; "))
    }
}

/// Compares `local` (loaded from `local_path`) against `global`.
pub fn deduplicate_config(local_path: &Path, global: &Settings, local: &Settings) -> DedupResult {
    let mut result = DedupResult {
        local_path: local_path.to_path_buf(),
        keeps_other_settings: !local.other.is_empty() || !local.permissions.other.is_empty(),
        ..DedupResult::default()
    };

    let mut all_unique_empty = true;
    for category in PermissionCategory::ALL {
        let local_list = local.permissions.list(category);
        let global_list = global.permissions.list(category);

        let duplicates = find_duplicates(local_list, global_list);
        match category {
            PermissionCategory::Allow => result.duplicate_allow = duplicates,
            PermissionCategory::Deny => result.duplicate_deny = duplicates,
            PermissionCategory::Ask => result.duplicate_ask = duplicates,
        }

        if !diff_entries(local_list, global_list).is_empty() {
            all_unique_empty = false;
        }
    }
    result.should_delete = all_unique_empty;

    result
}

/// Entries of `local` present in `global`, in `local` order.
fn find_duplicates(local: &[String], global: &[String]) -> Vec<String> {
    if local.is_empty() || global.is_empty() {
        return Vec::new();
    }
    let global: HashSet<&str> = global.iter().map(String::as_str).collect();
    local
        .iter()
        .filter(|v| global.contains(v.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    Deleted,
    Rewritten,
    /// The local file disappeared before it could be changed.
    AlreadyGone,
}

/// Applies a dedup decision to its local file.
///
/// A rewrite re-reads the file first so edits made since detection survive,
/// then strips the duplicates and saves atomically.
pub fn apply_dedup(result: &DedupResult, dry_run: bool) -> Result<DedupOutcome> {
    let planned = if result.will_delete() {
        DedupOutcome::Deleted
    } else {
        DedupOutcome::Rewritten
    };
    if dry_run {
        return Ok(planned);
    }

    let path = &result.local_path;
    if result.will_delete() {
        return match fs::remove_file(path) {
            Ok(()) => Ok(DedupOutcome::Deleted),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DedupOutcome::AlreadyGone),
            Err(e) => Err(CccError::io("removing local settings", e)),
        };
    }

    if !path.exists() {
        return Ok(DedupOutcome::AlreadyGone);
    }

    let mut settings = Settings::load(path)?;
    for category in PermissionCategory::ALL {
        let remove = result.duplicates(category);
        if remove.is_empty() {
            continue;
        }
        let list = settings.permissions.list_mut(category);
        *list = diff_entries(list, remove);
    }
    settings.save(path)?;

    Ok(DedupOutcome::Rewritten)
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// Local settings files under each project's `.claude/` directory.
///
/// Paths are checked for existence, deduplicated, and `exclude` (the root's
/// own `settings.local.json`) is skipped after lexical normalisation.
pub fn find_local_configs<'a>(
    project_paths: impl IntoIterator<Item = &'a str>,
    exclude: &Path,
) -> Vec<PathBuf> {
    let exclude = normalize_lexically(exclude);
    let mut seen = HashSet::new();
    let mut configs = Vec::new();

    for project_path in project_paths {
        if project_path.is_empty() {
            continue;
        }
        let candidate = Path::new(project_path)
            .join(".claude")
            .join(LOCAL_SETTINGS_FILE);
        let normalized = normalize_lexically(&candidate);
        if normalized == exclude || !seen.insert(normalized) {
            continue;
        }
        if candidate.exists() {
            configs.push(candidate);
        }
    }

    configs
}

/// Results worth acting on, plus local files that failed to load.
#[derive(Debug, Default)]
pub struct DedupScan {
    pub results: Vec<DedupResult>,
    pub failures: Vec<(PathBuf, CccError)>,
}

/// Loads every local config and compares it with `global`.
pub fn scan_local_configs(local_paths: &[PathBuf], global: &Settings) -> DedupScan {
    let mut scan = DedupScan::default();
    for path in local_paths {
        match Settings::load(path) {
            Ok(local) => {
                let result = deduplicate_config(path, global, &local);
                if result.is_actionable() {
                    scan.results.push(result);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable local settings");
                scan.failures.push((path.clone(), e));
            }
        }
    }
    scan
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope integration
// ─────────────────────────────────────────────────────────────────────────────

impl CleanupItem for DedupResult {
    fn target(&self) -> &Path {
        &self.local_path
    }

    fn apply(&self) -> Result<ApplyOutcome> {
        let (action, details) = match apply_dedup(self, false)? {
            DedupOutcome::Deleted => (Action::Delete, DELETED_DETAILS.to_string()),
            DedupOutcome::Rewritten => (Action::Modify, self.format_audit_details()),
            DedupOutcome::AlreadyGone => {
                return Ok(ApplyOutcome::Skipped {
                    reason: "file no longer exists".to_string(),
                })
            }
        };

        Ok(ApplyOutcome::Applied(AppliedChange {
            action,
            path: self.local_path.clone(),
            note: AuditNote::Details(details),
            size_saved: 0,
        }))
    }
}

/// Preview of every dedup result. `verbose` lists the duplicated entries
/// against `global_path`.
pub fn build_dedup_preview(results: &[DedupResult], verbose: bool, global_path: &Path) -> Preview {
    let mut preview = Preview::new(DEDUP_PREVIEW_TITLE);

    for r in results {
        let action = if r.will_delete() {
            Action::Delete
        } else {
            Action::Modify
        };
        let description = if verbose {
            verbose_description(r, global_path)
        } else if r.will_delete() {
            "Empty after deduplication, will be deleted".to_string()
        } else {
            match r.total_duplicates() {
                1 => "1 duplicate entry to remove".to_string(),
                n => format!("{} duplicate entries to remove", n),
            }
        };

        preview.changes.push(Change {
            action,
            path: r.local_path.clone(),
            description,
            size: 0,
        });
    }

    preview
}

fn verbose_description(r: &DedupResult, global_path: &Path) -> String {
    let mut text = format!("Duplicates of {}:\n", global_path.display());
    for category in PermissionCategory::ALL {
        let dups = r.duplicates(category);
        if !dups.is_empty() {
            text.push_str(&format!("     {}: {}\n", category.as_str(), dups.join(", ")));
        }
    }
    if r.will_delete() {
        text.push_str("     File will be deleted (no unique entries remain)");
    }
    text.trim_end_matches('\n').to_string()
}
