use std::ffi::OsStr;
use std::path::PathBuf;
use std::{env, fs};

use clap::Parser;

use crate::prelude::*;

const GITIGNORE: &str = "# claimset\n/.claimset/\n";

/// Initialize a new or re-initialize an existing claimset project.
#[derive(Debug, Parser)]
pub(crate) struct Init {
    /// The name of the dataset. By default the name of the project
    /// directory is used.
    #[arg(short, long)]
    name: Option<String>,

    /// A short blurb about the dataset.
    #[arg(short, long)]
    description: Option<String>,

    /// Whether to overwrite an existing config with default values or
    /// not.
    #[arg(short, long)]
    force: bool,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// The location of the project.
    #[arg(default_value = ".")]
    path: PathBuf,
}

impl Init {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let root_dir = env::current_dir()?.join(self.path);
        let config_path = root_dir.join(Config::FILENAME);

        if !root_dir.exists() {
            fs::create_dir_all(&root_dir).map_err(|e| {
                ClaimsetError::write_failure(&root_dir, e)
            })?;

            if self.verbose {
                eprintln!(
                    "Initialize new project in {}",
                    root_dir.display()
                );
            }
        } else if self.verbose {
            eprintln!(
                "Re-Initialize existing project in {}",
                root_dir.display()
            );
        }

        if !config_path.is_file() || self.force {
            let mut config = Config::create(&config_path)?;
            config.metadata.description = self.description;
            config.metadata.name = self.name.unwrap_or(
                root_dir
                    .file_name()
                    .and_then(OsStr::to_str)
                    .unwrap_or_default()
                    .to_string(),
            );

            config.save()?;
        } else if !self.quiet {
            log::warn!(
                "{} already exists; use --force to overwrite it",
                config_path.display()
            );
        }

        let project = Project::open(&root_dir)?;
        let combined_dir = project
            .combined_path()
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| root_dir.clone());

        let dirs =
            [project.raw_dir(), project.normalized_dir(), combined_dir];
        for dir in dirs {
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| {
                    ClaimsetError::write_failure(&dir, e)
                })?;
            }
        }

        let gitignore = root_dir.join(".gitignore");
        if !gitignore.is_file() {
            fs::write(&gitignore, GITIGNORE).map_err(|e| {
                ClaimsetError::write_failure(&gitignore, e)
            })?;
        }

        Ok(())
    }
}
