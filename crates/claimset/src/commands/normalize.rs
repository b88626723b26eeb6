use std::path::PathBuf;

use clap::Parser;

use crate::normalizer::{ExistingMode, Normalizer, NormalizerOptions};
use crate::prelude::*;
use crate::prompt::TerminalPrompt;

/// Interactively normalize raw source files into `claim;label` files.
#[derive(Debug, Parser)]
pub(crate) struct Normalize {
    /// The directory of the raw source files. By default the
    /// `paths.raw` directory of the project is used.
    #[arg(long, env = "CLAIMSET_RAW_DIR", hide_env_values = true)]
    raw_dir: Option<PathBuf>,

    /// Never prompt. Labelled candidates are confirmed, unlabelled
    /// candidates are skipped and existing normalized files are
    /// resumed (if a review log exists) or skipped.
    #[arg(short, long)]
    yes: bool,

    /// What to do with sources, which already have a normalized file.
    #[arg(long, value_name = "mode")]
    existing: Option<ExistingMode>,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show summaries. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Raw files or directories to normalize. By default all files of
    /// the raw directory are normalized.
    paths: Vec<PathBuf>,
}

/// The paths to normalize; the raw directory is only required if no
/// path is given.
fn input_paths(
    raw_dir: PathBuf,
    paths: Vec<PathBuf>,
) -> ClaimsetResult<Vec<PathBuf>> {
    if !paths.is_empty() {
        return Ok(paths);
    }

    if !raw_dir.is_dir() {
        return Err(ClaimsetError::InputNotFound(raw_dir));
    }

    Ok(vec![raw_dir])
}

impl Normalize {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let mut project = Project::discover()?;
        if let Some(raw_dir) = self.raw_dir {
            project.config_mut().paths.raw = raw_dir;
        }

        let paths = input_paths(project.raw_dir(), self.paths)?;

        if self.verbose {
            eprintln!(
                "Normalize {} path(s) of project {}",
                paths.len(),
                project.base_dir().display()
            );
        }

        let options = NormalizerOptions {
            unattended: self.yes,
            existing: self.existing,
            quiet: self.quiet,
        };

        let mut prompt = TerminalPrompt::default();
        Normalizer::new(&mut project, &mut prompt, options).run(&paths)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn explicit_paths_without_raw_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        let raw_dir = dir.path().join("raw");
        let file = dir.path().join("x.csv");

        let paths = input_paths(raw_dir.clone(), vec![file.clone()])?;
        assert_eq!(paths, vec![file]);

        assert!(matches!(
            input_paths(raw_dir.clone(), vec![]),
            Err(ClaimsetError::InputNotFound(_))
        ));

        fs::create_dir_all(&raw_dir)?;
        let paths = input_paths(raw_dir.clone(), vec![])?;
        assert_eq!(paths, vec![raw_dir]);
        Ok(())
    }
}
