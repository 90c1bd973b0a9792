//! ccc: clean stale, orphaned and redundant Claude Code data.
//!
//! ## Commands
//!
//! - `clean [projects|orphans|config]`: preview, confirm, apply, audit.
//!   Without a target all three run in that order.
//! - `list [projects|orphans|config]`: show what exists or would be cleaned.
//!
//! [`run_cli`] takes its streams as arguments so tests can drive it end to end.

mod commands;

use ccc_core::{CleanupEngine, Terminal};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub use commands::Flags;

#[derive(Parser, Debug)]
#[command(name = "ccc")]
#[command(about = "Clean up stale, orphaned and duplicated Claude Code data")]
#[command(version)]
pub struct Cli {
    /// Claude data directory (default: ~/.claude)
    #[arg(long, global = true, env = "CCC_CLAUDE_DIR", value_name = "PATH")]
    claude_dir: Option<PathBuf>,

    /// Show what would be cleaned without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Show detailed output (e.g. list duplicate entries)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show only stale projects (with `list`)
    #[arg(long, global = true)]
    stale_only: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Remove stale projects, orphaned data and duplicated config entries
    Clean {
        #[arg(value_enum)]
        target: Option<Target>,
    },

    /// List projects, orphaned data or duplicated config entries
    List {
        #[arg(value_enum)]
        target: Option<Target>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Session data of projects whose directory no longer exists
    Projects,
    /// Empty sessions, unreferenced todos and file history, empty session envs
    Orphans,
    /// Local permission entries already granted globally
    Config,
}

impl Cli {
    fn flags(&self) -> Flags {
        Flags {
            dry_run: self.dry_run,
            yes: self.yes,
            verbose: self.verbose,
            stale_only: self.stale_only,
        }
    }
}

/// Parses `args` (program name first) and runs the command. Returns the
/// process exit code.
pub fn run_cli<I, T>(
    args: I,
    stdin: &mut dyn BufRead,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let sink: &mut dyn Write = if e.use_stderr() { stderr } else { stdout };
            let _ = write!(sink, "{}", e.render());
            return e.exit_code();
        }
    };

    let Some(command) = cli.command else {
        let _ = writeln!(stdout, "{}", Cli::command().render_help());
        return 0;
    };

    let engine = match CleanupEngine::new(cli.claude_dir.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "Path discovery failed");
            let _ = writeln!(stderr, "Error discovering Claude paths: {}", e);
            return 1;
        }
    };
    tracing::debug!(root = %engine.paths().root().display(), "Using Claude directory");

    let flags = cli.flags();
    let mut term = Terminal {
        input: stdin,
        out: stdout,
        err: stderr,
    };

    match command {
        Commands::Clean { target } => commands::clean(&engine, target, &flags, &mut term),
        Commands::List { target } => commands::list(&engine, target, &flags, &mut term),
    }
}
