//! Command-line interface module for tidydesk.
//!
//! This module handles:
//! - Argument parsing (`clap`)
//! - Resolving the configuration file and the source directory
//! - Dispatching to organize, dry-run, undo or the scheduled loop
//! - Saving and restoring the batch snapshot that makes `--undo` work across runs

use crate::config::Config;
use crate::history::BatchHistory;
use crate::organizer::{OrganizeResult, Organizer, PassReport};
use crate::output::{OutputFormatter, plural};
use crate::schedule::Scheduler;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueHint};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Snapshot file name, stored inside the target directory.
pub const HISTORY_FILE: &str = ".tidydesk_history.json";

/// Interval used by `--schedule` when neither the flag nor the config gives one.
const DEFAULT_INTERVAL_MINUTES: u64 = 60;

/// Sort the files of a directory into category folders.
#[derive(Parser, Debug, Clone)]
#[command(name = "tidydesk", author, version, about)]
pub struct Args {
    /// Configuration file (created with defaults if missing).
    #[arg(long, short = 'c', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory to organize. Defaults to the desktop directory.
    #[arg(long, short = 's', value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Undo the last organization.
    #[arg(long, conflicts_with_all = ["dry_run", "schedule"])]
    pub undo: bool,

    /// Show what would be moved without changing anything.
    #[arg(long, conflicts_with = "schedule")]
    pub dry_run: bool,

    /// Organize every MINUTES minutes until interrupted.
    #[arg(
        long,
        value_name = "MINUTES",
        num_args = 0..=1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub schedule: Option<Option<u64>>,

    /// Also append log events to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Log debug events.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Run one pass.
    Organize {
        /// If true, only print the plan.
        dry_run: bool,
    },
    /// Undo the previous pass.
    Undo,
    /// Repeat passes on a fixed interval. `None` falls back to the config.
    Schedule { minutes: Option<u64> },
}

impl Args {
    pub fn command(&self) -> OrganizeCommand {
        if self.undo {
            OrganizeCommand::Undo
        } else if let Some(minutes) = self.schedule {
            OrganizeCommand::Schedule { minutes }
        } else {
            OrganizeCommand::Organize {
                dry_run: self.dry_run,
            }
        }
    }
}

/// Resolves the directory to organize: the explicit one, or the desktop.
pub fn resolve_source(explicit: Option<&Path>) -> Result<PathBuf> {
    let source = match explicit {
        Some(path) => path.to_path_buf(),
        None => dirs::desktop_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
            .context("could not determine the desktop directory; pass --source")?,
    };

    if !source.is_dir() {
        bail!("source directory {} does not exist", source.display());
    }
    Ok(source)
}

/// Runs the CLI with parsed arguments.
pub fn run(args: &Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;
    let source = resolve_source(args.source.as_deref())?;

    run_command(args.command(), &config, &source)
}

/// Executes `command` against `source` with an already-loaded configuration.
pub fn run_command(command: OrganizeCommand, config: &Config, source: &Path) -> Result<()> {
    let mut organizer = config.organizer(source);
    let history_path = history_path(&organizer);

    match command {
        OrganizeCommand::Organize { dry_run: true } => dry_run(&organizer),
        OrganizeCommand::Organize { dry_run: false } => {
            // An Err means the pass never started and the old snapshot still applies
            let report = organizer.organize()?;
            persist_history(&organizer, &history_path);
            print_pass(&report);
            match report.aborted {
                Some(e) => Err(anyhow::Error::new(e).context("organization stopped early")),
                None => Ok(()),
            }
        }
        OrganizeCommand::Undo => {
            organizer
                .load_history(&history_path)
                .context("loading previous organization")?;
            undo(&mut organizer, &history_path)
        }
        OrganizeCommand::Schedule { minutes } => {
            let minutes = minutes
                .or(config.interval_minutes)
                .unwrap_or(DEFAULT_INTERVAL_MINUTES);
            if minutes == 0 {
                bail!("schedule interval must be at least one minute");
            }
            schedule(&mut organizer, &history_path, minutes)
        }
    }
}

/// Snapshot location for an organizer.
pub fn history_path(organizer: &Organizer) -> PathBuf {
    organizer.target_dir().join(HISTORY_FILE)
}

fn persist_history(organizer: &Organizer, history_path: &Path) {
    if let Err(e) = organizer.save_history(history_path) {
        OutputFormatter::warning(&format!("Could not save history, undo is unavailable: {}", e));
    }
}

fn dry_run(organizer: &Organizer) -> Result<()> {
    OutputFormatter::dry_run_notice(&format!(
        "Analyzing contents of: {}",
        organizer.source().display()
    ));

    let planned = organizer.plan()?;
    if planned.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return Ok(());
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in &planned {
        OutputFormatter::plain(&format!(
            " - {} → {}",
            item.source.display(),
            item.destination.display()
        ));
        *counts.entry(item.category.clone()).or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&counts, planned.len());
    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(())
}

fn print_pass(report: &PassReport) {
    if report.moved_count() > 0 {
        OutputFormatter::summary_table(&report.category_counts(), report.moved_count());
    }
    OutputFormatter::path_list("Failed", &report.failed);
    match &report.aborted {
        Some(e) => {
            OutputFormatter::error(&format!("Stopped early: {}", e));
            OutputFormatter::warning(&format!(
                "Organized {} {} before stopping; use --undo to revert them",
                report.moved_count(),
                plural(report.moved_count())
            ));
        }
        None => OutputFormatter::success(&format!(
            "Organized {} {}",
            report.moved_count(),
            plural(report.moved_count())
        )),
    }
}

fn undo(organizer: &mut Organizer, history_path: &Path) -> Result<()> {
    let report = organizer.undo();
    BatchHistory::delete_snapshot(history_path)?;

    OutputFormatter::path_list("Skipped", &report.skipped_files);
    OutputFormatter::path_list("Failed", &report.failed_restores);
    OutputFormatter::success(&format!(
        "Restored {} {} to their original locations",
        report.restored_files,
        plural(report.restored_files)
    ));
    Ok(())
}

fn schedule(organizer: &mut Organizer, history_path: &Path, minutes: u64) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .context("failed to install interrupt handler")?;
    }

    OutputFormatter::info(&format!(
        "Organizing every {} minutes. Press Ctrl+C to stop.",
        minutes
    ));

    let on_pass = |organizer: &Organizer, result: &OrganizeResult<PassReport>| match result {
        Ok(report) => {
            persist_history(organizer, history_path);
            print_pass(report);
        }
        Err(e) => OutputFormatter::error(&e.to_string()),
    };
    let passes = Scheduler::every_minutes(minutes).run(organizer, &stop, on_pass);

    OutputFormatter::info(&format!(
        "Scheduled organization stopped after {} passes",
        passes
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_selection() {
        let args = Args::parse_from(["tidydesk"]);
        assert_eq!(args.command(), OrganizeCommand::Organize { dry_run: false });

        let args = Args::parse_from(["tidydesk", "--dry-run"]);
        assert_eq!(args.command(), OrganizeCommand::Organize { dry_run: true });

        let args = Args::parse_from(["tidydesk", "--undo"]);
        assert_eq!(args.command(), OrganizeCommand::Undo);

        let args = Args::parse_from(["tidydesk", "--schedule", "15"]);
        assert_eq!(
            args.command(),
            OrganizeCommand::Schedule { minutes: Some(15) }
        );

        let args = Args::parse_from(["tidydesk", "--schedule"]);
        assert_eq!(args.command(), OrganizeCommand::Schedule { minutes: None });
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Args::try_parse_from(["tidydesk", "--undo", "--dry-run"]).is_err());
        assert!(Args::try_parse_from(["tidydesk", "--dry-run", "--schedule", "5"]).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Args::try_parse_from(["tidydesk", "--schedule", "0"]).is_err());
    }

    #[test]
    fn test_resolve_source_rejects_missing_dir() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");
        assert!(resolve_source(Some(&missing)).is_err());
        assert_eq!(
            resolve_source(Some(temp_dir.path())).unwrap(),
            temp_dir.path()
        );
    }
}
