/// The relocation engine.
///
/// An [`Organizer`] owns its rules, exclusions and target directory, and the
/// history of the most recent pass. [`Organizer::organize`] moves every
/// top-level file of the source directory into
/// `<source>/<target>/<category>/` and records each move so that
/// [`Organizer::undo`] can put them back.
use crate::classifier::CategoryRules;
use crate::fs_ops;
use crate::history::{BatchHistory, MoveRecord};
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that abort an organizer operation.
///
/// Per-file failures are not errors: they are reported in [`PassReport::failed`].
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory could not be listed.
    #[error("Cannot read source directory {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The target directory or a category folder could not be created.
    #[error("Cannot create destination directory {}: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to write or delete a batch snapshot.
    #[error("Failed to write history file {}: {source}", path.display())]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to read a batch snapshot.
    #[error("Failed to read history file {}: {source}", path.display())]
    HistoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A batch snapshot could not be encoded or decoded.
    #[error("Invalid history file {}: {source}", path.display())]
    HistoryFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Names that are never moved. Matching is exact, not pattern based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    files: HashSet<String>,
    folders: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<F, D, S, T>(files: F, folders: D) -> Self
    where
        F: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            folders: folders.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is an excluded file name or an excluded folder name.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.files.contains(name) || self.folders.contains(name)
    }
}

/// A file moved during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub name: String,
    pub category: String,
}

/// Outcome of one organization pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Files moved, in the order they were moved.
    pub moved: Vec<MovedFile>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Set when a category folder could not be created and the remaining
    /// files were left in place. `moved` and `failed` cover what ran before.
    pub aborted: Option<OrganizeError>,
}

impl PassReport {
    /// Number of files moved; equal to the history length after the pass.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Returns true if the pass ran to the end and no file failed to move.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_none()
    }

    /// Number of moved files per category, sorted by category name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.moved {
            *counts.entry(file.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// A move the next pass would perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
}

/// A top-level file of the source directory eligible for organization.
struct Candidate {
    path: PathBuf,
    /// Exact name, used to build the destination.
    file_name: OsString,
    /// Lossy UTF-8 form for classification, exclusions and logs.
    name: String,
}

/// Sorts the files of one directory into category folders and can undo the last pass.
#[derive(Debug, Clone)]
pub struct Organizer {
    source: PathBuf,
    target: PathBuf,
    rules: CategoryRules,
    exclusions: ExclusionSet,
    pub(crate) history: BatchHistory,
}

impl Organizer {
    /// Creates an organizer for `source`.
    ///
    /// `target` is relative to `source`; category folders are created beneath it.
    pub fn new(
        source: impl Into<PathBuf>,
        rules: CategoryRules,
        exclusions: ExclusionSet,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rules,
            exclusions,
            history: BatchHistory::new(),
        }
    }

    /// The directory being organized.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute path of the target directory.
    pub fn target_dir(&self) -> PathBuf {
        self.source.join(&self.target)
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Number of moves the next [`Organizer::undo`] would try to reverse.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Runs one organization pass.
    ///
    /// The previous batch history is discarded once the target directory is
    /// in place and the source has been listed; if either step fails the
    /// previous history is kept and an error is returned. A file that fails
    /// to move is reported and skipped. A category folder that cannot be
    /// created stops the pass: the report comes back with `aborted` set, and
    /// the moves made before it stay recorded and can still be undone.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidydesk::classifier::CategoryRules;
    /// use tidydesk::organizer::{ExclusionSet, Organizer};
    ///
    /// let rules = CategoryRules::new().with_category("Documents", [".pdf"]);
    /// let exclusions = ExclusionSet::new([".DS_Store"], ["Organized_Files"]);
    /// let mut organizer = Organizer::new("/home/me/Desktop", rules, exclusions, "Organized_Files");
    ///
    /// let report = organizer.organize().expect("pass failed");
    /// println!("Moved {} files", report.moved_count());
    /// ```
    pub fn organize(&mut self) -> OrganizeResult<PassReport> {
        info!(source = %self.source.display(), "Starting organization");

        let target_dir = self.target_dir();
        fs_ops::ensure_dir(&target_dir).map_err(|e| {
            error!(path = %target_dir.display(), error = %e, "Cannot create target directory");
            OrganizeError::DestinationUnavailable {
                path: target_dir.clone(),
                source: e,
            }
        })?;

        let candidates = self.candidates()?;
        self.history = BatchHistory::new();
        let mut report = PassReport::default();

        for candidate in candidates {
            let category = self.rules.classify(&candidate.name).to_string();
            let category_dir = target_dir.join(&category);

            if let Err(e) = fs_ops::ensure_dir(&category_dir) {
                error!(path = %category_dir.display(), error = %e, "Cannot create category folder");
                report.aborted = Some(OrganizeError::DestinationUnavailable {
                    path: category_dir,
                    source: e,
                });
                break;
            }

            let destination = category_dir.join(&candidate.file_name);
            match fs_ops::move_file(&candidate.path, &destination) {
                Ok(()) => {
                    info!(file = %candidate.name, %category, "Moved file");
                    self.history.push(MoveRecord {
                        original_path: candidate.path,
                        destination_path: destination,
                    });
                    report.moved.push(MovedFile {
                        name: candidate.name,
                        category,
                    });
                }
                Err(e) => {
                    warn!(file = %candidate.name, error = %e, "Error moving file");
                    report.failed.push((candidate.path, e.to_string()));
                }
            }
        }

        info!(
            moved = report.moved_count(),
            failed = report.failed.len(),
            aborted = report.aborted.is_some(),
            "Organization completed"
        );
        Ok(report)
    }

    /// Lists what [`Organizer::organize`] would do, without touching the filesystem.
    pub fn plan(&self) -> OrganizeResult<Vec<PlannedMove>> {
        let target_dir = self.target_dir();
        let planned = self
            .candidates()?
            .into_iter()
            .map(|candidate| {
                let category = self.rules.classify(&candidate.name).to_string();
                PlannedMove {
                    destination: target_dir.join(&category).join(&candidate.file_name),
                    source: candidate.path,
                    category,
                }
            })
            .collect();
        Ok(planned)
    }

    /// Writes the current batch history to `path` as JSON.
    pub fn save_history(&self, path: &Path) -> OrganizeResult<()> {
        self.history.save(path)
    }

    /// Replaces the in-memory batch history with the snapshot at `path`.
    ///
    /// A missing snapshot leaves an empty history.
    pub fn load_history(&mut self, path: &Path) -> OrganizeResult<()> {
        self.history = BatchHistory::load(path)?;
        Ok(())
    }

    /// Top-level, non-excluded, non-directory entries in listing order.
    fn candidates(&self) -> OrganizeResult<Vec<Candidate>> {
        let entries =
            fs::read_dir(&self.source).map_err(|e| OrganizeError::SourceUnavailable {
                path: self.source.clone(),
                source: e,
            })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(source = %self.source.display(), error = %e, "Unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().into_owned();

            if path.is_dir() {
                debug!(%name, "Skipping directory");
                continue;
            }
            if self.exclusions.is_excluded(&name) {
                debug!(%name, "Skipping excluded name");
                continue;
            }

            candidates.push(Candidate {
                path,
                file_name,
                name,
            });
        }
        Ok(candidates)
    }
}
