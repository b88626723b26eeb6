use std::fs::{self, File};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use polars::prelude::*;

use crate::config::CombineOptions;
use crate::label::LabelVocab;
use crate::normalized::NormalizedFile;
use crate::prelude::*;

/// A normalized file that made it into the combined dataset.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Included {
    pub(crate) name: String,
    pub(crate) rows: usize,
    pub(crate) dropped: usize,
}

/// A normalized file that was left out, together with the reason.
#[derive(Debug)]
pub(crate) struct Excluded {
    pub(crate) name: String,
    pub(crate) reason: String,
}

#[derive(Debug)]
pub(crate) struct Combined {
    /// The combined records (columns `claim`, `label` and `source`).
    pub(crate) frame: DataFrame,
    pub(crate) included: Vec<Included>,
    pub(crate) excluded: Vec<Excluded>,
}

impl Combined {
    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.frame.height()
    }

    /// The number of rows per label value, ordered by label.
    pub(crate) fn rows_per_label(
        &self,
    ) -> ClaimsetResult<Vec<(String, u64)>> {
        counts(&self.frame, "label")
    }

    /// The number of rows per source, ordered by source.
    pub(crate) fn rows_per_source(
        &self,
    ) -> ClaimsetResult<Vec<(String, u64)>> {
        counts(&self.frame, "source")
    }
}

fn counts(
    frame: &DataFrame,
    by: &str,
) -> ClaimsetResult<Vec<(String, u64)>> {
    let df = frame
        .clone()
        .lazy()
        .group_by([col(by)])
        .agg([col("claim").count().alias("rows")])
        .select([col(by), col("rows").cast(DataType::UInt64)])
        .sort([by], Default::default())
        .collect()?;

    let keys = df.column(by)?.str()?;
    let rows = df.column("rows")?.u64()?;

    Ok((0..df.height())
        .map(|idx| {
            (
                keys.get(idx).unwrap_or_default().to_string(),
                rows.get(idx).unwrap_or_default(),
            )
        })
        .collect())
}

/// Returns the normalized files (`*.csv`) of `dir` in lexicographic
/// order of their file names.
pub(crate) fn normalized_files<P: AsRef<Path>>(
    dir: P,
) -> ClaimsetResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ClaimsetError::InputNotFound(dir.into()));
    }

    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name(path))
}

/// Reads and concatenates the normalized `files`.
///
/// Invalid files are excluded with a warning. It's an error if files
/// were given but none of them is valid.
pub(crate) fn combine(
    files: &[PathBuf],
    vocab: &LabelVocab,
    options: &CombineOptions,
    pbar: &ProgressBar,
) -> ClaimsetResult<Combined> {
    let mut claims: Vec<String> = vec![];
    let mut labels: Vec<String> = vec![];
    let mut sources: Vec<String> = vec![];
    let mut included = vec![];
    let mut excluded = vec![];

    for path in files {
        let name = file_name(path);
        pbar.set_message(name.clone());

        match NormalizedFile::from_path(path, vocab) {
            Err(e) => {
                log::warn!("excluding {name}: {e}");
                excluded.push(Excluded {
                    name,
                    reason: e.to_string(),
                });
            }
            Ok(file) => {
                if file.dropped > 0 {
                    log::warn!(
                        "{name}: dropped {} row(s) with an empty claim",
                        file.dropped
                    );
                }

                let source = file_stem(path);
                for record in file.records.iter() {
                    claims.push(if options.lowercase {
                        record.claim.to_lowercase()
                    } else {
                        record.claim.clone()
                    });
                    labels.push(vocab.encode(record.label).to_string());
                    sources.push(source.clone());
                }

                included.push(Included {
                    name,
                    rows: file.records.len(),
                    dropped: file.dropped,
                });
            }
        }

        pbar.inc(1);
    }

    pbar.finish_and_clear();

    if !files.is_empty() && included.is_empty() {
        bail!(
            "none of the {} normalized file(s) is valid",
            files.len()
        );
    }

    let mut frame = DataFrame::new(vec![
        Series::new("claim", claims),
        Series::new("label", labels),
        Series::new("source", sources),
    ])?;

    if options.unique {
        frame = frame
            .lazy()
            .unique_stable(
                Some(vec!["claim".into(), "label".into()]),
                UniqueKeepStrategy::First,
            )
            .collect()?;
    }

    Ok(Combined {
        frame,
        included,
        excluded,
    })
}

/// Writes the `claim` and `label` columns of the combined dataset as
/// comma-separated values, replacing any previous file.
pub(crate) fn write<P: AsRef<Path>>(
    combined: &Combined,
    path: P,
) -> ClaimsetResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| ClaimsetError::write_failure(path, e))?;
        }
    }

    let mut out = combined.frame.select(["claim", "label"])?;
    let file = File::create(path)
        .map_err(|e| ClaimsetError::write_failure(path, e))?;

    CsvWriter::new(file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut out)
        .map_err(|e| {
            ClaimsetError::write_failure(
                path,
                std::io::Error::other(e.to_string()),
            )
        })?;

    Ok(())
}
