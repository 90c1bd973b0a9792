//! Preview, confirmation and audit around every destructive command.
//!
//! ## State Machine
//!
//! ```text
//! Detect  → no candidates          → NothingToDo
//! Preview → dry run                → DryRun (nothing applied)
//! Gate    → declined / read error  → Aborted
//! Apply   → each item independently, failures reported and skipped
//! Audit   → one line per item, written after the item succeeded
//! ```
//!
//! This is the only place cleanup candidates are applied to the filesystem.

pub mod audit;
pub mod confirm;
pub mod preview;

pub use audit::{AuditLogger, AuditNote};
pub use confirm::{confirm, parse_confirmation, ConfirmResult};
pub use preview::{format_size, Action, Change, Preview};

use crate::error::{CccError, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const CONFIRM_PROMPT: &str = "\nProceed? [y/N]: ";

/// A mutation that has been carried out.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChange {
    pub action: Action,
    /// Path written to the audit log.
    pub path: PathBuf,
    pub note: AuditNote,
    pub size_saved: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied(AppliedChange),
    /// Conditions changed since detection; nothing was touched.
    Skipped { reason: String },
}

/// A detected candidate that knows how to apply itself.
pub trait CleanupItem {
    /// Path shown when applying this item fails.
    fn target(&self) -> &Path;

    fn apply(&self) -> Result<ApplyOutcome>;
}

/// Candidates plus their rendered preview.
#[derive(Debug)]
pub struct Plan<I> {
    pub preview: Preview,
    pub items: Vec<I>,
    /// Printed when there are no candidates.
    pub empty_message: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeOptions {
    pub dry_run: bool,
    /// Accept without prompting.
    pub assume_yes: bool,
}

/// Where the envelope reads confirmation from and reports to.
pub struct Terminal<'a> {
    pub input: &'a mut dyn BufRead,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub applied: Vec<AppliedChange>,
    pub skipped: Vec<(PathBuf, String)>,
    pub failed: Vec<(PathBuf, String)>,
    /// False if the audit log could not be opened.
    pub audited: bool,
}

impl ApplyReport {
    pub fn total_saved(&self) -> u64 {
        self.applied.iter().map(|c| c.size_saved).sum()
    }
}

#[derive(Debug)]
pub enum Outcome {
    NothingToDo,
    DryRun { would_save: u64 },
    Aborted,
    Applied(ApplyReport),
}

/// Runs one destructive command through detect → preview → gate → apply.
pub fn run<I: CleanupItem>(
    plan: Plan<I>,
    options: EnvelopeOptions,
    audit_log_path: &Path,
    term: &mut Terminal<'_>,
) -> Result<Outcome> {
    if plan.items.is_empty() {
        writeln!(term.out, "{}", plan.empty_message).map_err(write_err)?;
        return Ok(Outcome::NothingToDo);
    }

    if options.dry_run {
        writeln!(term.out, "[DRY RUN]").map_err(write_err)?;
        plan.preview.display(term.out).map_err(write_err)?;
        return Ok(Outcome::DryRun {
            would_save: plan.preview.total_size(),
        });
    }

    plan.preview.display(term.out).map_err(write_err)?;

    if !options.assume_yes {
        let answer = confirm(CONFIRM_PROMPT, term.input, term.out);
        if !answer.is_confirmed() {
            writeln!(term.out, "Aborted. No changes made.").map_err(write_err)?;
            return Ok(Outcome::Aborted);
        }
    }

    let mut audit = match AuditLogger::open(audit_log_path) {
        Ok(logger) => Some(logger),
        Err(e) => {
            tracing::warn!(path = %audit_log_path.display(), error = %e, "Audit log unavailable");
            writeln!(term.err, "Warning: could not create audit log: {}", e).map_err(write_err)?;
            None
        }
    };

    let report = apply_all(&plan.items, audit.as_mut(), term.err)?;

    if let Some(logger) = audit.as_mut() {
        logger.close();
    }

    Ok(Outcome::Applied(report))
}

/// Applies every item in order. One item failing doesn't stop the rest.
pub fn apply_all<I: CleanupItem>(
    items: &[I],
    mut audit: Option<&mut AuditLogger>,
    err: &mut dyn Write,
) -> Result<ApplyReport> {
    let mut report = ApplyReport {
        audited: audit.is_some(),
        ..ApplyReport::default()
    };

    for item in items {
        match item.apply() {
            Ok(ApplyOutcome::Applied(change)) => {
                tracing::info!(action = %change.action, path = %change.path.display(), "Applied change");
                if let Some(logger) = audit.as_deref_mut() {
                    if let Err(e) = logger.record(change.action, &change.path, &change.note) {
                        tracing::warn!(error = %e, "Failed to write audit entry");
                        writeln!(err, "Warning: could not write audit entry: {}", e)
                            .map_err(write_err)?;
                    }
                }
                report.applied.push(change);
            }
            Ok(ApplyOutcome::Skipped { reason }) => {
                tracing::info!(path = %item.target().display(), %reason, "Skipped change");
                writeln!(err, "Skipped {}: {}", item.target().display(), reason)
                    .map_err(write_err)?;
                report.skipped.push((item.target().to_path_buf(), reason));
            }
            Err(e) => {
                tracing::warn!(path = %item.target().display(), error = %e, "Failed to apply change");
                writeln!(err, "Error cleaning {}: {}", item.target().display(), e)
                    .map_err(write_err)?;
                report
                    .failed
                    .push((item.target().to_path_buf(), e.to_string()));
            }
        }
    }

    Ok(report)
}

fn write_err(e: std::io::Error) -> CccError {
    CccError::io("writing output", e)
}
