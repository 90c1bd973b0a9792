//! Command handlers. Each returns the process exit code.
//!
//! Detection or load failures exit 1. Declining, finding nothing, and
//! per-item failures during apply all exit 0.

use crate::Target;
use ccc_core::envelope::{self, ApplyReport, CleanupItem, EnvelopeOptions, Outcome, Plan};
use ccc_core::{format_size, CccError, CleanupEngine, Terminal};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub dry_run: bool,
    pub yes: bool,
    pub verbose: bool,
    pub stale_only: bool,
}

impl Flags {
    fn envelope(&self) -> EnvelopeOptions {
        EnvelopeOptions {
            dry_run: self.dry_run,
            assume_yes: self.yes,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// clean
// ─────────────────────────────────────────────────────────────────────────────

pub fn clean(
    engine: &CleanupEngine,
    target: Option<Target>,
    flags: &Flags,
    term: &mut Terminal<'_>,
) -> i32 {
    match target {
        Some(Target::Projects) => clean_projects(engine, flags, term),
        Some(Target::Orphans) => clean_orphans(engine, flags, term),
        Some(Target::Config) => clean_config(engine, flags, term),
        None => {
            let code = clean_projects(engine, flags, term);
            if code != 0 {
                return code;
            }
            let code = clean_orphans(engine, flags, term);
            if code != 0 {
                return code;
            }
            clean_config(engine, flags, term)
        }
    }
}

fn clean_projects(engine: &CleanupEngine, flags: &Flags, term: &mut Terminal<'_>) -> i32 {
    let plan = match engine.stale_plan() {
        Ok(plan) => plan,
        Err(e) => return fail(term.err, "Error scanning projects", &e),
    };
    apply(engine, plan, flags, term, |report| {
        format!(
            "Cleaned {} stale projects, freed {}",
            report.applied.len(),
            format_size(report.total_saved())
        )
    })
}

fn clean_orphans(engine: &CleanupEngine, flags: &Flags, term: &mut Terminal<'_>) -> i32 {
    let plan = match engine.orphan_plan() {
        Ok(plan) => plan,
        Err(e) => return fail(term.err, "Error finding orphans", &e),
    };
    apply(engine, plan, flags, term, |report| {
        format!(
            "Cleaned {} orphaned items, freed {}",
            report.applied.len(),
            format_size(report.total_saved())
        )
    })
}

fn clean_config(engine: &CleanupEngine, flags: &Flags, term: &mut Terminal<'_>) -> i32 {
    let dedup = match engine.dedup_plan(flags.verbose) {
        Ok(dedup) => dedup,
        Err(e) => return fail(term.err, "Error loading settings", &e),
    };
    warn_unreadable(term.err, &dedup.failures);
    apply(engine, dedup.plan, flags, term, |report| {
        format!("Deduplicated {} config files", report.applied.len())
    })
}

fn apply<I: CleanupItem>(
    engine: &CleanupEngine,
    plan: Plan<I>,
    flags: &Flags,
    term: &mut Terminal<'_>,
    summary: impl Fn(&ApplyReport) -> String,
) -> i32 {
    match envelope::run(plan, flags.envelope(), &engine.audit_log_path(), term) {
        Ok(Outcome::Applied(report)) => {
            let _ = writeln!(term.out, "{}", summary(&report));
            0
        }
        Ok(_) => 0,
        Err(e) => fail(term.err, "Error", &e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// list
// ─────────────────────────────────────────────────────────────────────────────

pub fn list(
    engine: &CleanupEngine,
    target: Option<Target>,
    flags: &Flags,
    term: &mut Terminal<'_>,
) -> i32 {
    match target.unwrap_or(Target::Projects) {
        Target::Projects => list_projects(engine, flags, term.out, term.err),
        Target::Orphans => match engine.orphan_plan() {
            Ok(plan) => show(plan, term.out),
            Err(e) => fail(term.err, "Error finding orphans", &e),
        },
        Target::Config => match engine.dedup_plan(flags.verbose) {
            Ok(dedup) => {
                warn_unreadable(term.err, &dedup.failures);
                show(dedup.plan, term.out)
            }
            Err(e) => fail(term.err, "Error loading settings", &e),
        },
    }
}

fn list_projects(
    engine: &CleanupEngine,
    flags: &Flags,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let projects = match engine.scan_projects() {
        Ok(projects) => projects,
        Err(e) if e.is_not_found_condition() => Vec::new(),
        Err(e) => return fail(err, "Error scanning projects", &e),
    };

    if projects.is_empty() {
        let _ = writeln!(out, "No projects found.");
        return 0;
    }

    let mut stale_count = 0;
    let _ = writeln!(out, "Projects:");
    for project in &projects {
        let stale = !project.exists();
        if stale {
            stale_count += 1;
        } else if flags.stale_only {
            continue;
        }

        let last_used = project
            .last_used
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());
        let _ = writeln!(
            out,
            "  [{}] {}",
            if stale { "STALE" } else { "OK" },
            project.display_path()
        );
        let _ = writeln!(
            out,
            "        {} files, {}, last used: {}",
            project.file_count,
            format_size(project.total_size),
            last_used
        );
    }

    let _ = writeln!(
        out,
        "\nTotal: {} projects ({} stale)",
        projects.len(),
        stale_count
    );
    0
}

fn show<I>(plan: Plan<I>, out: &mut dyn Write) -> i32 {
    let _ = if plan.items.is_empty() {
        writeln!(out, "{}", plan.empty_message)
    } else {
        plan.preview.display(out)
    };
    0
}

// ─────────────────────────────────────────────────────────────────────────────
// Reporting
// ─────────────────────────────────────────────────────────────────────────────

fn fail(err: &mut dyn Write, context: &str, e: &CccError) -> i32 {
    tracing::error!(error = %e, "{}", context);
    let _ = writeln!(err, "{}: {}", context, e);
    1
}

fn warn_unreadable(err: &mut dyn Write, failures: &[(PathBuf, CccError)]) {
    for (path, e) in failures {
        let _ = writeln!(err, "Warning: could not load {}: {}", path.display(), e);
    }
}
