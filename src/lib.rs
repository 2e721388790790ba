//! tidydesk - sort the files of a directory into category folders
//!
//! This library classifies files by extension, moves them into
//! `<target>/<category>/` folders under the source directory, and keeps the
//! most recent batch of moves so it can be undone in one step.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod fs_ops;
pub mod history;
pub mod logging;
pub mod organizer;
pub mod output;
pub mod schedule;
pub mod undo;

pub use classifier::{Category, CategoryRules, OTHER_CATEGORY, classify};
pub use config::{CategoryConfig, Config, ConfigError};
pub use history::{BatchHistory, MoveRecord};
pub use organizer::{
    ExclusionSet, MovedFile, OrganizeError, OrganizeResult, Organizer, PassReport, PlannedMove,
};
pub use schedule::Scheduler;
pub use undo::UndoReport;

pub use cli::{OrganizeCommand, run_command};
