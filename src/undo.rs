/// Undo functionality for reverting the most recent organization pass.
///
/// Files are moved back in reverse order of the pass. Files that are no
/// longer where the pass put them are skipped. The batch history is cleared
/// afterwards whatever the outcome, so a stale batch is never replayed.
use crate::fs_ops;
use crate::history::MoveRecord;
use crate::organizer::Organizer;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files whose move back failed, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files no longer at their organized location.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Returns the total number of records processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every recorded file was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Why a single record was not restored.
enum RestoreOutcome {
    Skipped(String),
    Failed(String),
}

impl Organizer {
    /// Reverses the most recent pass.
    ///
    /// With an empty history this returns an empty report and performs no
    /// filesystem operation. Calling it twice in a row therefore restores
    /// nothing the second time.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidydesk::classifier::CategoryRules;
    /// use tidydesk::organizer::{ExclusionSet, Organizer};
    ///
    /// let mut organizer = Organizer::new(
    ///     "/home/me/Desktop",
    ///     CategoryRules::new(),
    ///     ExclusionSet::default(),
    ///     "Organized_Files",
    /// );
    /// organizer.organize().expect("pass failed");
    ///
    /// let report = organizer.undo();
    /// println!("Restored {} files", report.restored_files);
    /// ```
    pub fn undo(&mut self) -> UndoReport {
        let records = self.history.take();
        let mut report = UndoReport::default();

        if records.is_empty() {
            info!("No files to restore");
            return report;
        }

        // LIFO: last moved, first restored
        for record in records.iter().rev() {
            match restore_file(record) {
                Ok(()) => {
                    info!(file = %record.original_path.display(), "Restored file to original location");
                    report.restored_files += 1;
                }
                Err(RestoreOutcome::Skipped(reason)) => {
                    warn!(file = %record.destination_path.display(), %reason, "Skipping restore");
                    report
                        .skipped_files
                        .push((record.destination_path.clone(), reason));
                }
                Err(RestoreOutcome::Failed(reason)) => {
                    warn!(file = %record.destination_path.display(), %reason, "Error restoring file");
                    report
                        .failed_restores
                        .push((record.destination_path.clone(), reason));
                }
            }
        }

        info!(
            restored = report.restored_files,
            skipped = report.skipped_files.len(),
            failed = report.failed_restores.len(),
            "Undo completed"
        );
        report
    }
}

/// Moves one file back to where it came from.
fn restore_file(record: &MoveRecord) -> Result<(), RestoreOutcome> {
    if fs::symlink_metadata(&record.destination_path).is_err() {
        return Err(RestoreOutcome::Skipped(
            "File not found at expected location".to_string(),
        ));
    }

    fs_ops::move_file(&record.destination_path, &record.original_path)
        .map_err(|e| RestoreOutcome::Failed(format!("Failed to restore file: {}", e)))
}

#[cfg(test)]
mod tests {
    use crate::classifier::CategoryRules;
    use crate::history::MoveRecord;
    use crate::organizer::{ExclusionSet, Organizer};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn organizer_for(base: &Path) -> Organizer {
        let rules = CategoryRules::new()
            .with_category("Documents", [".txt", ".pdf"])
            .with_category("Images", [".png"]);
        Organizer::new(base, rules, ExclusionSet::default(), "Organized_Files")
    }

    #[test]
    fn test_undo_empty_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut organizer = organizer_for(temp_dir.path());

        let report = organizer.undo();
        assert_eq!(report.restored_files, 0);
        assert_eq!(report.total_processed(), 0);
        // Nothing was created
        assert!(!temp_dir.path().join("Organized_Files").exists());
    }

    #[test]
    fn test_undo_single_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let file_path = base.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let mut organizer = organizer_for(base);
        organizer.organize().expect("Failed to organize");
        let moved_file = base.join("Organized_Files/Documents/test.txt");
        assert!(moved_file.exists());

        let report = organizer.undo();
        assert_eq!(report.restored_files, 1);
        assert!(report.is_complete_success());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
        assert!(!moved_file.exists());
        assert_eq!(organizer.history_len(), 0);
    }

    #[test]
    fn test_undo_twice_restores_nothing_second_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").unwrap();
        fs::write(base.join("b.png"), "b").unwrap();

        let mut organizer = organizer_for(base);
        assert_eq!(organizer.organize().unwrap().moved_count(), 2);
        assert_eq!(organizer.undo().restored_files, 2);
        assert_eq!(organizer.undo().restored_files, 0);
    }

    #[test]
    fn test_undo_with_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("keep.txt"), "keep").unwrap();
        fs::write(base.join("gone.pdf"), "gone").unwrap();

        let mut organizer = organizer_for(base);
        organizer.organize().expect("Failed to organize");
        fs::remove_file(base.join("Organized_Files/Documents/gone.pdf")).unwrap();

        let report = organizer.undo();
        assert_eq!(report.restored_files, 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.failed_restores.is_empty());
        assert!(base.join("keep.txt").is_file());
        assert!(!base.join("gone.pdf").exists());
        // Cleared even though one record was skipped
        assert_eq!(organizer.history_len(), 0);
    }

    #[test]
    fn test_undo_runs_in_reverse_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        // Two records for the same original path: the earlier one must be
        // replayed last so its content ends up in place.
        let staged = base.join("staged");
        fs::create_dir(&staged).unwrap();
        fs::write(staged.join("first"), "first").unwrap();
        fs::write(staged.join("second"), "second").unwrap();

        let mut organizer = organizer_for(base);
        organizer.history.push(MoveRecord {
            original_path: base.join("doc.txt"),
            destination_path: staged.join("first"),
        });
        organizer.history.push(MoveRecord {
            original_path: base.join("doc.txt"),
            destination_path: staged.join("second"),
        });

        let report = organizer.undo();
        assert_eq!(report.restored_files, 2);
        assert_eq!(fs::read_to_string(base.join("doc.txt")).unwrap(), "first");
    }
}
