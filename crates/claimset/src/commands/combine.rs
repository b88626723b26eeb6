use std::path::PathBuf;

use clap::Parser;
use comfy_table::{presets, Row, Table};

use crate::combiner::{self, Combined};
use crate::prelude::*;

const PBAR_COMBINE: &str = "Combining files: {pos:.yellow}/{len} | \
                            {msg} | elapsed: {elapsed_precise}";

/// Combine all normalized files into a single dataset.
#[derive(Debug, Parser)]
pub(crate) struct Combine {
    /// The directory of the normalized files. By default the
    /// `paths.normalized` directory of the project is used.
    #[arg(
        short,
        long,
        env = "CLAIMSET_NORMALIZED_DIR",
        hide_env_values = true
    )]
    input: Option<PathBuf>,

    /// Write the combined dataset to `filename`. By default the
    /// `paths.combined` file of the project is used.
    #[arg(
        short,
        long,
        value_name = "filename",
        env = "CLAIMSET_COMBINED",
        hide_env_values = true
    )]
    output: Option<PathBuf>,

    /// Drop duplicate `(claim, label)` rows, keeping the first one.
    #[arg(long)]
    unique: bool,

    /// Lowercase all claims.
    #[arg(long)]
    lowercase: bool,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show progress nor metrics. This option
    /// conflicts with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn metrics(combined: &Combined) -> ClaimsetResult<Table> {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(Row::from(vec!["metric", "value"]));

    table.add_row(vec![
        "files processed".to_string(),
        combined.included.len().to_string(),
    ]);
    table.add_row(vec![
        "files excluded".to_string(),
        combined.excluded.len().to_string(),
    ]);
    table.add_row(vec![
        "total rows".to_string(),
        combined.height().to_string(),
    ]);

    for (label, rows) in combined.rows_per_label()? {
        table.add_row(vec![
            format!("rows (label = {label})"),
            rows.to_string(),
        ]);
    }

    for (source, rows) in combined.rows_per_source()? {
        table.add_row(vec![
            format!("rows ({source})"),
            rows.to_string(),
        ]);
    }

    Ok(table)
}

impl Combine {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let project = Project::discover()?;
        let config = project.config();

        let input =
            self.input.unwrap_or_else(|| project.normalized_dir());
        let output =
            self.output.unwrap_or_else(|| project.combined_path());

        let mut options = config.combine.clone();
        options.unique |= self.unique;
        options.lowercase |= self.lowercase;

        let files = combiner::normalized_files(&input)?;
        if files.is_empty() {
            log::warn!(
                "no normalized files found in {}",
                input.display()
            );
            return Ok(());
        }

        if self.verbose {
            eprintln!(
                "Combine {} file(s) from {} \
                 (unique = {}, lowercase = {})",
                files.len(),
                input.display(),
                options.unique,
                options.lowercase
            );
        }

        let pbar = ProgressBarBuilder::new(PBAR_COMBINE, self.quiet)
            .len(files.len() as u64)
            .build();

        let combined =
            combiner::combine(&files, &config.labels, &options, &pbar)?;
        combiner::write(&combined, &output)?;

        if !self.quiet {
            println!("{}", metrics(&combined)?);
        }

        if self.verbose {
            for file in combined.included.iter() {
                eprintln!(
                    "{}: {} row(s), {} dropped",
                    file.name, file.rows, file.dropped
                );
            }

            eprintln!(
                "Wrote {} row(s) to {}",
                combined.height(),
                output.display()
            );
        }

        Ok(())
    }
}
