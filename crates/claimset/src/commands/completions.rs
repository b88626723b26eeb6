use std::fs::File;
use std::io::{Write, stdout};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Args;
use crate::prelude::*;

/// Generate shell completion scripts for claimset.
#[derive(Debug, clap::Parser)]
pub(crate) struct Completions {
    /// Write output to `filename` instead of `stdout`.
    #[arg(long, short, value_name = "filename")]
    output: Option<PathBuf>,

    /// Shell for which a completion script is to be generated.
    #[arg(value_name = "shell")]
    shell: Shell,
}

impl Completions {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let mut cmd = Args::command();
        let mut wtr: Box<dyn Write> = match self.output {
            Some(ref path) => Box::new(File::create(path).map_err(
                |e| ClaimsetError::write_failure(path, e),
            )?),
            None => Box::new(stdout().lock()),
        };

        generate(self.shell, &mut cmd, "claimset", &mut wtr);
        wtr.flush()?;
        Ok(())
    }
}
