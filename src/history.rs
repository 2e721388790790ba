/// Batch history: the reversible record of the most recent organization pass.
///
/// The organizer keeps exactly one batch in memory. A snapshot of it can be
/// written to disk as JSON so that a later process can still undo the batch.
use crate::organizer::{OrganizeError, OrganizeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One file relocation: where it was and where it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Path of the file before the pass.
    pub original_path: PathBuf,
    /// Path of the file after the pass.
    pub destination_path: PathBuf,
}

/// Ordered move records of a single pass, in the order the moves happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHistory {
    records: Vec<MoveRecord>,
}

/// On-disk form of a batch.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    timestamp: DateTime<Utc>,
    records: Vec<MoveRecord>,
}

impl BatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes and returns every record, leaving the history empty.
    pub(crate) fn take(&mut self) -> Vec<MoveRecord> {
        std::mem::take(&mut self.records)
    }

    /// Writes this batch to `path` as pretty-printed JSON, replacing any previous snapshot.
    pub(crate) fn save(&self, path: &Path) -> OrganizeResult<()> {
        let snapshot = Snapshot {
            timestamp: Utc::now(),
            records: self.records.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            OrganizeError::HistoryFormat {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        if let Some(parent) = path.parent() {
            crate::fs_ops::ensure_dir(parent).map_err(|e| OrganizeError::HistoryWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, json).map_err(|e| OrganizeError::HistoryWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Reads a snapshot from `path`. A missing file is an empty history.
    pub(crate) fn load(path: &Path) -> OrganizeResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let json = fs::read_to_string(path).map_err(|e| OrganizeError::HistoryRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&json).map_err(|e| OrganizeError::HistoryFormat {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(
            path = %path.display(),
            recorded_at = %snapshot.timestamp.to_rfc3339(),
            records = snapshot.records.len(),
            "loaded batch snapshot"
        );

        Ok(Self {
            records: snapshot.records,
        })
    }

    /// Deletes the snapshot at `path` if there is one.
    pub fn delete_snapshot(path: &Path) -> OrganizeResult<()> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| OrganizeError::HistoryWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}
