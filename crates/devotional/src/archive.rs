//! Durable archive of past devotionals plus the latest snapshot.
//!
//! Layout under the data directory:
//!
//! - `devotionals.json`: array of [`Devotional`]s, newest first, unique by `date`,
//!   at most `capacity` entries.
//! - `latest.json`: the record written by the most recent successful run.
//!
//! The archive is read, modified and rewritten whole. At most one run may use a
//! given data directory at a time; concurrent runs lose updates (last writer wins).

use crate::config::Config;
use crate::types::Devotional;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const ARCHIVE_FILE: &str = "devotionals.json";
pub const LATEST_FILE: &str = "latest.json";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize devotionals: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New date, prepended. `dropped` entries fell off the tail.
    Inserted { dropped: usize },
    /// Known date, replaced in place at `index`.
    Updated { index: usize },
}

/// One element of `devotionals.json`.
///
/// Elements that do not decode as a [`Devotional`] (older or hand-edited
/// entries) are carried through untouched and still match on their `date` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchiveEntry {
    Record(Devotional),
    Foreign(Value),
}

impl ArchiveEntry {
    pub fn date(&self) -> Option<&str> {
        match self {
            ArchiveEntry::Record(d) => Some(&d.date),
            ArchiveEntry::Foreign(v) => v.get("date").and_then(Value::as_str),
        }
    }

    pub fn as_record(&self) -> Option<&Devotional> {
        match self {
            ArchiveEntry::Record(d) => Some(d),
            ArchiveEntry::Foreign(_) => None,
        }
    }
}

impl From<Devotional> for ArchiveEntry {
    fn from(devotional: Devotional) -> Self {
        ArchiveEntry::Record(devotional)
    }
}

/// Inserts `record` as the newest entry, or replaces the entry sharing its date.
///
/// Only insertion truncates to `capacity`; a replacement never grows the archive.
pub fn merge(archive: &mut Vec<ArchiveEntry>, record: Devotional, capacity: usize) -> MergeOutcome {
    match archive
        .iter()
        .position(|e| e.date() == Some(record.date.as_str()))
    {
        Some(index) => {
            archive[index] = record.into();
            MergeOutcome::Updated { index }
        }
        None => {
            archive.insert(0, record.into());
            let dropped = archive.len().saturating_sub(capacity);
            archive.truncate(capacity);
            MergeOutcome::Inserted { dropped }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
    capacity: usize,
}

impl ArchiveStore {
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            capacity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir, config.capacity)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    /// Reads the archive. A missing file is an empty archive, and so is one
    /// that is not a JSON array (logged and discarded).
    pub fn load(&self) -> Result<Vec<ArchiveEntry>, PersistenceError> {
        let path = self.archive_path();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };

        let entries: Vec<ArchiveEntry> = match serde_json::from_slice(&content) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Error loading existing devotionals: {}", e);
                return Ok(Vec::new());
            }
        };

        let foreign = entries.iter().filter(|e| e.as_record().is_none()).count();
        if foreign > 0 {
            log::warn!(
                "Keeping {} archived entries that are not well-formed devotionals",
                foreign
            );
        }

        Ok(entries)
    }

    /// Merges `record` into the archive and rewrites both files.
    ///
    /// The archive is committed before the latest snapshot, so `latest.json`
    /// never reflects a record the archive does not hold.
    pub fn merge_and_persist(&self, record: &Devotional) -> Result<MergeOutcome, PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let mut devotionals = self.load()?;
        let outcome = merge(&mut devotionals, record.clone(), self.capacity);

        match outcome {
            MergeOutcome::Inserted { dropped } => {
                log::info!("Added new devotional: {}", record.date);
                if dropped > 0 {
                    log::debug!("Dropped {} oldest devotional(s) over capacity", dropped);
                }
            }
            MergeOutcome::Updated { .. } => {
                log::info!("Updated existing devotional: {}", record.date)
            }
        }

        let archive_path = self.archive_path();
        let latest_path = self.latest_path();
        write_atomic(&archive_path, &serde_json::to_string_pretty(&devotionals)?)?;
        write_atomic(&latest_path, &serde_json::to_string_pretty(record)?)?;

        log::info!(
            "Saved devotional data to {} and {}",
            archive_path.display(),
            latest_path.display()
        );

        Ok(outcome)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), PersistenceError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, content).map_err(|e| PersistenceError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        PersistenceError::io(path, e)
    })
}
