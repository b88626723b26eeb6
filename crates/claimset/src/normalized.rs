use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::label::{Label, LabelVocab};
use crate::prelude::*;

pub(crate) const HEADER: [&str; 2] = ["claim", "label"];
pub(crate) const DELIMITER: u8 = b';';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NormalizedRecord {
    pub(crate) claim: String,
    pub(crate) label: Label,
}

impl NormalizedRecord {
    pub(crate) fn new<S: Into<String>>(claim: S, label: Label) -> Self {
        Self {
            claim: claim.into(),
            label,
        }
    }
}

/// How to treat an existing normalized file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    Append,
    Truncate,
}

/// Writes confirmed records to a normalized file. Every record is
/// flushed right away; an interrupted session leaves all confirmed
/// records on disk.
pub(crate) struct NormalizedWriter {
    path: PathBuf,
    vocab: LabelVocab,
    inner: csv::Writer<File>,
    written: usize,
}

impl NormalizedWriter {
    pub(crate) fn open<P: AsRef<Path>>(
        path: P,
        vocab: &LabelVocab,
        mode: WriteMode,
    ) -> ClaimsetResult<Self> {
        let path = path.as_ref().to_path_buf();
        let fail =
            |e: std::io::Error| ClaimsetError::write_failure(&path, e);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(fail)?;
        }

        let file = match mode {
            WriteMode::Truncate => File::create(&path),
            WriteMode::Append => {
                OpenOptions::new().create(true).append(true).open(&path)
            }
        }
        .map_err(fail)?;

        let needs_header = file.metadata().map_err(fail)?.len() == 0;
        let mut inner = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            inner
                .write_record(HEADER)
                .map_err(|e| ClaimsetError::write_failure(&path, e))?;
            inner.flush().map_err(fail)?;
        }

        Ok(Self {
            path,
            vocab: vocab.clone(),
            inner,
            written: 0,
        })
    }

    pub(crate) fn write(
        &mut self,
        record: &NormalizedRecord,
    ) -> ClaimsetResult<()> {
        let label = self.vocab.encode(record.label);
        self.inner
            .write_record([record.claim.as_str(), label])
            .map_err(|e| ClaimsetError::write_failure(&self.path, e))?;
        self.inner
            .flush()
            .map_err(|e| ClaimsetError::write_failure(&self.path, e))?;

        self.written += 1;
        Ok(())
    }

    /// The number of records written by this writer.
    #[inline]
    pub(crate) fn written(&self) -> usize {
        self.written
    }

    #[inline]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

/// The valid content of a normalized file.
#[derive(Debug, Default)]
pub(crate) struct NormalizedFile {
    pub(crate) records: Vec<NormalizedRecord>,

    /// The number of rows dropped because of an empty claim.
    pub(crate) dropped: usize,
}

impl NormalizedFile {
    /// Reads a normalized file. The file is rejected as a whole if the
    /// header isn't `claim;label`, a row doesn't have exactly two
    /// fields or a label is not part of the vocabulary.
    pub(crate) fn from_reader<R: Read>(
        reader: R,
        vocab: &LabelVocab,
    ) -> ClaimsetResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        if header != HEADER {
            bail!(
                "expected header 'claim;label', found '{}'",
                header.join(";")
            );
        }

        let mut result = Self::default();
        for (idx, row) in reader.records().enumerate() {
            let row_no = idx + 1;
            let row =
                row.map_err(|e| ClaimsetError::malformed(row_no, e))?;

            if row.len() != 2 {
                return Err(ClaimsetError::malformed(
                    row_no,
                    format!("expected 2 fields, found {}", row.len()),
                ));
            }

            let Some(label) = vocab.decode(&row[1]) else {
                return Err(ClaimsetError::malformed(
                    row_no,
                    format!("unknown label '{}'", &row[1]),
                ));
            };

            let claim = row[0].trim();
            if claim.is_empty() {
                result.dropped += 1;
                continue;
            }

            result.records.push(NormalizedRecord::new(claim, label));
        }

        Ok(result)
    }

    pub(crate) fn from_path<P: AsRef<Path>>(
        path: P,
        vocab: &LabelVocab,
    ) -> ClaimsetResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClaimsetError::InputNotFound(path.into()));
        }

        Self::from_reader(File::open(path)?, vocab)
    }
}
