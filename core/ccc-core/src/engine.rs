//! CleanupEngine - entry point for the `ccc` commands.
//!
//! Every call rescans the tree. Nothing detected by one call is reused by
//! the next, so a plan always reflects what is on disk now.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use ccc_core::CleanupEngine;
//!
//! let engine = CleanupEngine::new(None)?;
//! let plan = engine.stale_plan()?;
//! plan.preview.display(&mut std::io::stdout())?;
//! ```

use crate::cleaner::{
    build_dedup_preview, build_orphan_preview, build_stale_preview, find_local_configs,
    find_orphans, partition_stale, scan_local_configs, DedupResult, OrphanItem, StaleCandidate,
};
use crate::envelope::Plan;
use crate::error::{CccError, Result};
use crate::projects::{scan_projects, valid_session_ids, ProjectRecord};
use crate::settings::Settings;
use crate::storage::ClaudePaths;
use std::path::{Path, PathBuf};

pub const NO_STALE_PROJECTS: &str = "No stale projects found.";
pub const NO_ORPHANS: &str = "No orphaned data found.";
pub const NO_LOCAL_CONFIGS: &str = "No local configs found.";
pub const NO_DUPLICATE_CONFIGS: &str = "No duplicate configs found.";

/// A dedup plan plus local configs that could not be read.
pub struct DedupPlan {
    pub plan: Plan<DedupResult>,
    pub failures: Vec<(PathBuf, CccError)>,
}

pub struct CleanupEngine {
    paths: ClaudePaths,
}

impl CleanupEngine {
    /// Resolves the Claude root (`~/.claude` unless overridden).
    pub fn new(claude_dir: Option<&Path>) -> Result<Self> {
        Ok(Self::with_paths(ClaudePaths::discover(claude_dir)?))
    }

    /// Used for testing with temp directories.
    pub fn with_paths(paths: ClaudePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ClaudePaths {
        &self.paths
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.paths.audit_log_file()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn scan_projects(&self) -> Result<Vec<ProjectRecord>> {
        scan_projects(&self.paths.projects_dir())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Plans
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stale projects to remove, with live projects listed as kept.
    pub fn stale_plan(&self) -> Result<Plan<StaleCandidate>> {
        let projects = self.scan_projects()?;
        let (stale, kept) = partition_stale(&projects);
        let items: Vec<StaleCandidate> = stale
            .into_iter()
            .map(|p| StaleCandidate::new(&self.paths, p))
            .collect();

        Ok(Plan {
            preview: build_stale_preview(&items, &kept),
            items,
            empty_message: NO_STALE_PROJECTS.to_string(),
        })
    }

    /// Orphans relative to the session ids of a fresh registry scan.
    pub fn orphan_plan(&self) -> Result<Plan<OrphanItem>> {
        let projects = self.scan_projects()?;
        let valid_ids = valid_session_ids(&projects);
        let items = find_orphans(&self.paths, &valid_ids)?;

        Ok(Plan {
            preview: build_orphan_preview(&items),
            items,
            empty_message: NO_ORPHANS.to_string(),
        })
    }

    /// Local configs with entries the global settings already grant.
    ///
    /// A malformed global settings file fails the whole plan. A malformed
    /// local file is only reported.
    pub fn dedup_plan(&self, verbose: bool) -> Result<DedupPlan> {
        let global_path = self.paths.settings_file();
        let global = Settings::load(&global_path)?;

        let projects = self.scan_projects()?;
        let local_paths = find_local_configs(
            projects.iter().map(|p| p.actual_path.as_str()),
            &self.paths.home_local_settings_file(),
        );
        tracing::debug!(count = local_paths.len(), "Found local configs");

        let empty_message = if local_paths.is_empty() {
            NO_LOCAL_CONFIGS
        } else {
            NO_DUPLICATE_CONFIGS
        };

        let scan = scan_local_configs(&local_paths, &global);
        Ok(DedupPlan {
            plan: Plan {
                preview: build_dedup_preview(&scan.results, verbose, &global_path),
                items: scan.results,
                empty_message: empty_message.to_string(),
            },
            failures: scan.failures,
        })
    }
}
