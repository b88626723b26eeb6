use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Decision {
    Confirmed,
    Skipped,
    Malformed,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    file: String,
    row: usize,
    decision: Decision,
}

/// The decisions taken for the records of a source, so that a review
/// can be resumed after an interrupt.
pub(crate) struct ReviewLog {
    path: PathBuf,
    decisions: HashMap<(String, usize), Decision>,
    writer: Option<csv::Writer<File>>,
}

impl ReviewLog {
    const HEADER: [&'static str; 3] = ["file", "row", "decision"];

    /// Loads the review log at `path`; a missing log is empty.
    pub(crate) fn load<P: AsRef<Path>>(
        path: P,
    ) -> ClaimsetResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut decisions = HashMap::new();

        if path.is_file() {
            let mut reader = csv::Reader::from_path(&path)?;
            for entry in reader.deserialize::<Entry>() {
                match entry {
                    Ok(entry) => {
                        decisions.insert(
                            (entry.file, entry.row),
                            entry.decision,
                        );
                    }
                    Err(e) => {
                        log::warn!(
                            "ignoring invalid review log entry \
                             in {}: {e}",
                            path.display()
                        );
                    }
                }
            }
        }

        Ok(Self {
            path,
            decisions,
            writer: None,
        })
    }

    /// Discards all decisions, on disk and in memory.
    pub(crate) fn clear(&mut self) -> ClaimsetResult<()> {
        self.writer = None;
        self.decisions.clear();

        if self.path.is_file() {
            let path = &self.path;
            fs::remove_file(path)
                .map_err(|e| ClaimsetError::write_failure(path, e))?;
        }

        Ok(())
    }

    #[inline]
    pub(crate) fn get(
        &self,
        file: &str,
        row: usize,
    ) -> Option<Decision> {
        self.decisions.get(&(file.to_string(), row)).copied()
    }

    #[inline]
    pub(crate) fn contains(&self, file: &str, row: usize) -> bool {
        self.get(file, row).is_some()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Counts the decisions of one kind.
    pub(crate) fn count(&self, decision: Decision) -> usize {
        self.decisions.values().filter(|d| **d == decision).count()
    }

    /// Appends a decision to the log and flushes it.
    pub(crate) fn record(
        &mut self,
        file: &str,
        row: usize,
        decision: Decision,
    ) -> ClaimsetResult<()> {
        let path = &self.path;
        let fail =
            |e: csv::Error| ClaimsetError::write_failure(path, e);

        if self.writer.is_none() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    ClaimsetError::write_failure(path, e)
                })?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ClaimsetError::write_failure(path, e))?;
            let is_empty = file
                .metadata()
                .map_err(|e| ClaimsetError::write_failure(path, e))?
                .len()
                == 0;

            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            if is_empty {
                writer.write_record(Self::HEADER).map_err(fail)?;
            }

            self.writer = Some(writer);
        }

        if let Some(ref mut writer) = self.writer {
            writer
                .serialize(Entry {
                    file: file.to_string(),
                    row,
                    decision,
                })
                .map_err(fail)?;
            writer
                .flush()
                .map_err(|e| ClaimsetError::write_failure(path, e))?;
        }

        self.decisions.insert((file.to_string(), row), decision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn record_and_reload() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state").join("liar.csv");

        let mut log = ReviewLog::load(&path)?;
        assert_eq!(log.len(), 0);

        log.record("train.tsv", 1, Decision::Confirmed)?;
        log.record("train.tsv", 2, Decision::Skipped)?;
        log.record("test.tsv", 1, Decision::Malformed)?;
        drop(log);

        assert_eq!(
            fs::read_to_string(&path)?,
            "file,row,decision\ntrain.tsv,1,confirmed\n\
            train.tsv,2,skipped\ntest.tsv,1,malformed\n"
        );

        let mut log = ReviewLog::load(&path)?;
        assert_eq!(log.len(), 3);
        assert!(log.contains("train.tsv", 2));
        assert!(!log.contains("train.tsv", 3));
        assert_eq!(log.get("test.tsv", 1), Some(Decision::Malformed));
        assert_eq!(log.count(Decision::Confirmed), 1);

        log.record("train.tsv", 3, Decision::Confirmed)?;
        drop(log);

        let log = ReviewLog::load(&path)?;
        assert_eq!(log.count(Decision::Confirmed), 2);
        Ok(())
    }

    #[test]
    fn clear() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("liar.csv");

        let mut log = ReviewLog::load(&path)?;
        log.record("a.csv", 1, Decision::Skipped)?;
        log.clear()?;

        assert_eq!(log.len(), 0);
        assert!(!path.exists());

        log.record("a.csv", 2, Decision::Confirmed)?;
        assert_eq!(
            fs::read_to_string(&path)?,
            "file,row,decision\na.csv,2,confirmed\n"
        );
        Ok(())
    }
}
