use std::path::PathBuf;

use clap::Parser;

use crate::config::Paths;
use crate::label::LabelVocab;
use crate::prelude::*;

const KEYS: [&str; 7] = [
    "labels.true",
    "labels.fake",
    "paths.raw",
    "paths.normalized",
    "paths.combined",
    "combine.unique",
    "combine.lowercase",
];

/// Get and set claimset config options.
#[derive(Debug, Parser)]
pub(crate) struct Config {
    /// Get the value for the given key.
    #[arg(long, conflicts_with_all = ["value", "unset", "set"])]
    get: bool,

    /// Reset the key to its default value.
    #[arg(long, conflicts_with_all = ["value", "get", "set"])]
    unset: bool,

    /// Set the value for the given key.
    #[arg(
        long,
        requires = "value",
        conflicts_with_all = ["get", "unset"]
    )]
    set: bool,

    /// The name of the config option.
    name: String,

    /// The (new) value of the config option.
    #[arg(conflicts_with_all = ["get", "unset"])]
    value: Option<String>,
}

fn parse_bool(value: &str) -> ClaimsetResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => bail!("invalid value `{value}`"),
    }
}

impl Config {
    pub(crate) fn execute(self) -> ClaimsetResult<()> {
        let mut project = Project::discover()?;
        let name = match self.name.as_str() {
            name if KEYS.contains(&name) => name,
            name => {
                bail!("unknown config option `{name}`");
            }
        };

        let config = project.config_mut();
        if !config.exists() && (self.unset || self.value.is_some()) {
            bail!(
                "no {} found; run `claimset init` first",
                crate::config::Config::FILENAME
            );
        }

        if let Some(value) = self.value {
            match name {
                "labels.true" => config.labels.truthful = value,
                "labels.fake" => config.labels.fake = value,
                "paths.raw" => config.paths.raw = PathBuf::from(value),
                "paths.normalized" => {
                    config.paths.normalized = PathBuf::from(value)
                }
                "paths.combined" => {
                    config.paths.combined = PathBuf::from(value)
                }
                "combine.unique" => {
                    config.combine.unique = parse_bool(&value)?
                }
                "combine.lowercase" => {
                    config.combine.lowercase = parse_bool(&value)?
                }
                _ => unreachable!(),
            }

            config.labels.validate()?;
            config.save()?;
        } else if self.unset {
            let labels = LabelVocab::default();
            let paths = Paths::default();

            match name {
                "labels.true" => {
                    config.labels.truthful = labels.truthful
                }
                "labels.fake" => config.labels.fake = labels.fake,
                "paths.raw" => config.paths.raw = paths.raw,
                "paths.normalized" => {
                    config.paths.normalized = paths.normalized
                }
                "paths.combined" => {
                    config.paths.combined = paths.combined
                }
                "combine.unique" => config.combine.unique = false,
                "combine.lowercase" => config.combine.lowercase = false,
                _ => unreachable!(),
            }

            config.labels.validate()?;
            config.save()?;
        } else if self.get || (!self.unset && !self.set) {
            let value = match name {
                "labels.true" => config.labels.truthful.clone(),
                "labels.fake" => config.labels.fake.clone(),
                "paths.raw" => config.paths.raw.display().to_string(),
                "paths.normalized" => {
                    config.paths.normalized.display().to_string()
                }
                "paths.combined" => {
                    config.paths.combined.display().to_string()
                }
                "combine.unique" => config.combine.unique.to_string(),
                "combine.lowercase" => {
                    config.combine.lowercase.to_string()
                }
                _ => unreachable!(),
            };

            println!("{name} = {value}");
        } else {
            unreachable!()
        }

        Ok(())
    }
}
