//! # ccc-core
//!
//! Detection and cleanup engines for the Claude Code data tree
//! (`~/.claude`): stale projects, orphaned session data, and project-local
//! permission entries the global settings already grant.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime, no threads. Everything runs in order.
//! - **Detect freely, mutate once**: Detectors never touch the filesystem
//!   beyond reading. Only [`envelope::run`] applies changes, after preview
//!   and confirmation.
//! - **Graceful degradation**: Missing directories and files mean "nothing
//!   found", not errors. One corrupt session file never aborts a scan.
//! - **Live safety checks**: Whether a project's working directory exists is
//!   checked at the moment it matters, never cached.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ccc_core::{envelope, CleanupEngine, EnvelopeOptions, Terminal};
//!
//! let engine = CleanupEngine::new(None)?;
//! let plan = engine.orphan_plan()?;
//! let outcome = envelope::run(plan, EnvelopeOptions::default(), &engine.audit_log_path(), &mut term)?;
//! ```

pub mod cleaner;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod patterns;
pub mod projects;
pub mod sessions;
pub mod settings;
pub mod storage;

mod fs_utils;

// Re-export commonly used items at crate root
pub use cleaner::*;
pub use engine::{CleanupEngine, DedupPlan};
pub use envelope::{
    format_size, Action, ApplyReport, AuditLogger, Change, EnvelopeOptions, Outcome, Plan,
    Preview, Terminal,
};
pub use error::{CccError, Result};
pub use projects::{scan_projects, valid_session_ids, ProjectRecord, SessionIdSet};
pub use sessions::{parse_session_file, SessionLines, SessionRecord};
pub use settings::{PermissionCategory, Permissions, Settings};
pub use storage::ClaudePaths;
