use clap::{Parser, ValueEnum};
use semver::Version as SemVer;

use crate::prelude::*;

#[derive(Debug, Clone, ValueEnum)]
enum Bump {
    Major,
    Minor,
    Patch,
}

/// Get or set the version of the dataset.
#[derive(Debug, Parser)]
pub(crate) struct Version {
    /// Whether to overwrite the current version or not.
    #[arg(short, long)]
    force: bool,

    /// Run verbosely. Print the new version to the standard error
    /// stream.
    #[arg(short, long)]
    verbose: bool,

    /// Increment one part of the current version.
    #[arg(short, long, conflicts_with = "version")]
    bump: Option<Bump>,

    /// The new version of the dataset. Unless the `--force`/`-f`
    /// option is set, the new version must be greater than the
    /// current version. A dataset version consists of three
    /// separated integers, which must conform to the semantic
    /// versioning standard; invalid version strings are rejected.
    #[arg(conflicts_with = "bump")]
    version: Option<SemVer>,
}

impl Version {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let mut project = Project::discover()?;
        let config = project.config_mut();

        let changes = self.version.is_some() || self.bump.is_some();
        if !config.exists() && changes {
            bail!(
                "no {} found; run `claimset init` first",
                Config::FILENAME
            );
        }

        if let Some(version) = self.version {
            if !self.force && version <= config.metadata.version {
                let current = config.metadata.version.to_string();
                bail!("{version} must be greater than {current}");
            }

            config.metadata.version = version;
            config.save()?;
        } else if let Some(bump) = self.bump {
            let major = config.metadata.version.major;
            let minor = config.metadata.version.minor;
            let patch = config.metadata.version.patch;

            let version = match bump {
                Bump::Patch => SemVer::new(major, minor, patch + 1),
                Bump::Minor => SemVer::new(major, minor + 1, 0),
                Bump::Major => SemVer::new(major + 1, 0, 0),
            };

            if self.verbose {
                eprintln!("Bumped version to {version}.");
            }

            config.metadata.version = version;
            config.save()?;
        } else {
            println!("{}", config.metadata.version);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let parse = |args: &[&str]| {
            Version::try_parse_from(
                std::iter::once("version").chain(args.iter().copied()),
            )
        };

        let cmd = parse(&["-v", "--bump", "minor"]);
        assert!(cmd.is_ok_and(|cmd| cmd.verbose && cmd.bump.is_some()));

        assert!(parse(&["--quiet"]).is_err());
        assert!(parse(&["-b", "patch", "1.0.0"]).is_err());
    }
}
