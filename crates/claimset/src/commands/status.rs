use std::collections::BTreeMap;

use clap::Parser;
use comfy_table::{presets, Row, Table};

use crate::combiner::normalized_files;
use crate::normalized::NormalizedFile;
use crate::normalizer::collect_sources;
use crate::prelude::*;
use crate::review_log::{Decision, ReviewLog};

/// Show the normalization status of all sources.
#[derive(Debug, Default, Parser)]
pub(crate) struct Status {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; only list sources without a normalized file.
    /// This option conflicts with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Default)]
struct SourceStatus {
    raw_files: usize,
    rows: Option<Result<usize, String>>,
}

impl Status {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let project = Project::discover()?;
        let vocab = &project.config().labels;
        let raw_dir = project.raw_dir();
        let normalized_dir = project.normalized_dir();

        let mut sources: BTreeMap<String, SourceStatus> =
            BTreeMap::new();

        if raw_dir.is_dir() {
            let raw = collect_sources(&raw_dir, &[raw_dir.clone()])?;
            for (source, files) in raw {
                let status = sources.entry(source).or_default();
                status.raw_files = files.len();
            }
        } else if self.verbose {
            eprintln!("raw directory {} not found", raw_dir.display());
        }

        if normalized_dir.is_dir() {
            for path in normalized_files(&normalized_dir)? {
                let Some(source) = path.file_stem() else {
                    continue;
                };

                let rows = NormalizedFile::from_path(&path, vocab)
                    .map(|file| file.records.len())
                    .map_err(|e| e.to_string());

                sources
                    .entry(source.to_string_lossy().to_string())
                    .or_default()
                    .rows = Some(rows);
            }
        }

        if sources.is_empty() {
            log::warn!("no sources found in {}", raw_dir.display());
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_header(Row::from(vec![
            "source",
            "raw files",
            "normalized rows",
            "reviewed",
            "skipped",
            "malformed",
        ]));

        let mut orphans = vec![];

        for (source, status) in sources.iter() {
            if self.quiet && status.rows.is_some() {
                continue;
            }

            if status.raw_files == 0 {
                orphans.push(source.as_str());
            }

            let reviews = ReviewLog::load(project.state_path(source))?;
            let rows = match status.rows {
                None => "-".to_string(),
                Some(Ok(rows)) => rows.to_string(),
                Some(Err(ref e)) => {
                    if self.verbose {
                        eprintln!("{source}: {e}");
                    }

                    "invalid".to_string()
                }
            };

            table.add_row(vec![
                source.clone(),
                status.raw_files.to_string(),
                rows,
                reviews.len().to_string(),
                reviews.count(Decision::Skipped).to_string(),
                reviews.count(Decision::Malformed).to_string(),
            ]);
        }

        println!("{table}");

        for source in orphans {
            log::warn!("{source}: normalized file without raw source");
        }

        Ok(())
    }
}
