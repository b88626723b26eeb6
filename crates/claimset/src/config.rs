use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::label::{Label, LabelVocab};
use crate::prelude::*;

/// Project config (`claimset.toml`).
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The path of the config.
    #[serde(skip)]
    path: PathBuf,

    /// Dataset metadata.
    pub(crate) metadata: Metadata,

    /// Directory layout, relative to the project root.
    #[serde(default)]
    pub(crate) paths: Paths,

    /// The label vocabulary of normalized files and the combined
    /// dataset.
    #[serde(default)]
    pub(crate) labels: LabelVocab,

    /// Defaults of the `combine` command.
    #[serde(default)]
    pub(crate) combine: CombineOptions,

    /// Extraction rules, keyed by source name or `<source>/<file>`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub(crate) sources: BTreeMap<String, SourceSpec>,

    /// This structure should always be constructed using a public
    /// constructor or using the update syntax:
    ///
    /// ```ignore
    /// use crate::config::Config;
    ///
    /// let config = Config {
    ///     ..Default::default()
    /// };
    /// ```
    #[doc(hidden)]
    #[serde(skip)]
    __non_exhaustive: (),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Metadata {
    /// The name of the dataset.
    pub(crate) name: String,

    /// The version of the dataset.
    pub(crate) version: Version,

    /// A short blurb about the dataset.
    pub(crate) description: Option<String>,

    /// A list of people or organizations, which are considered as the
    /// authors of the dataset.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub(crate) authors: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: "".into(),
            version: Version::new(0, 1, 0),
            description: None,
            authors: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Paths {
    pub(crate) raw: PathBuf,
    pub(crate) normalized: PathBuf,
    pub(crate) combined: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            raw: "raw".into(),
            normalized: "normalized".into(),
            combined: PathBuf::from("combined").join("dataset.csv"),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct CombineOptions {
    /// Drop duplicate `(claim, label)` rows.
    #[serde(default)]
    pub(crate) unique: bool,

    /// Lowercase all claims.
    #[serde(default)]
    pub(crate) lowercase: bool,
}

/// How to turn the records of a raw file into candidates.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SourceSpec {
    /// The column(s) holding the claim text; multiple columns are
    /// joined with a space.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub(crate) claim: Vec<String>,

    /// The column holding the raw label.
    pub(crate) label: Option<String>,

    /// A label shared by every record of the file.
    pub(crate) fixed_label: Option<Label>,

    /// The table to read from SQLite files.
    pub(crate) table: Option<String>,

    /// The field delimiter of delimited text files.
    pub(crate) delimiter: Option<char>,

    /// Raw label value to label mapping.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub(crate) labels: BTreeMap<String, Label>,
}

impl Config {
    pub(crate) const FILENAME: &'static str = "claimset.toml";

    /// Creates a new default config and sets the file location.
    pub(crate) fn create<P>(path: P) -> ClaimsetResult<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self {
            path: path.as_ref().into(),
            ..Default::default()
        })
    }

    /// Loads an existing config from a path.
    pub(crate) fn from_path<P>(path: P) -> ClaimsetResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().into();
        let content = fs::read_to_string(&path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.labels.validate()?;
        config.path = path;

        Ok(config)
    }

    /// Whether the config is backed by a file on disk.
    #[inline]
    pub(crate) fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Saves the config.
    pub(crate) fn save(&self) -> ClaimsetResult<()> {
        let content =
            toml::to_string(self).map_err(ClaimsetError::other)?;
        let mut out = File::create(&self.path)
            .map_err(|e| ClaimsetError::write_failure(&self.path, e))?;
        out.write_all(content.as_bytes())
            .map_err(|e| ClaimsetError::write_failure(&self.path, e))?;
        Ok(())
    }

    /// Returns the extraction rule of a raw file. A rule for the file
    /// (`<source>/<file>`) takes precedence over the source rule.
    pub(crate) fn source_spec(
        &self,
        source: &str,
        file_name: &str,
    ) -> Option<&SourceSpec> {
        self.sources
            .get(&format!("{source}/{file_name}"))
            .or_else(|| self.sources.get(source))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn config_roundtrip_defaults() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(Config::FILENAME);

        let mut config = Config::create(&path)?;
        config.metadata.name = "misinfo".into();
        config.save()?;

        let config = Config::from_path(&path)?;
        assert!(config.exists());
        assert_eq!(config.metadata.name, "misinfo");
        assert_eq!(config.metadata.version, Version::new(0, 1, 0));
        assert_eq!(config.paths, Paths::default());
        assert_eq!(config.labels, LabelVocab::default());
        Ok(())
    }

    #[test]
    fn config_sources() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(Config::FILENAME);
        fs::write(
            &path,
            r#"
            [metadata]
            name = "misinfo"
            version = "0.2.0"

            [labels]
            true = "real"
            fake = "fake"

            [sources.liar]
            claim = ["statement"]
            label = "verdict"
            delimiter = "\t"

            [sources.liar.labels]
            pants-fire = "fake"
            mostly-true = "true"

            [sources."isot/Fake.csv"]
            claim = ["title", "text"]
            fixed-label = "fake"
            "#,
        )?;

        let config = Config::from_path(&path)?;
        assert_eq!(config.labels.truthful, "real");

        let spec = config.source_spec("liar", "train.tsv").unwrap();
        assert_eq!(spec.claim, vec!["statement"]);
        assert_eq!(spec.label.as_deref(), Some("verdict"));
        assert_eq!(spec.delimiter, Some('\t'));
        assert_eq!(spec.labels.get("pants-fire"), Some(&Label::Fake));

        let spec = config.source_spec("isot", "Fake.csv").unwrap();
        assert_eq!(spec.fixed_label, Some(Label::from_str("fake")?));
        assert!(config.source_spec("isot", "True.csv").is_none());
        Ok(())
    }

    #[test]
    fn config_invalid_vocab() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(Config::FILENAME);
        fs::write(
            &path,
            "[metadata]\nname = \"x\"\nversion = \"0.1.0\"\n\n\
            [labels]\ntrue = \"1\"\nfake = \"1\"\n",
        )?;

        assert!(Config::from_path(&path).is_err());
        Ok(())
    }

    #[test]
    fn config_partial_tables() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(Config::FILENAME);
        fs::write(
            &path,
            "[metadata]\nname = \"x\"\nversion = \"0.1.0\"\n\n\
            [paths]\nraw = \"downloads\"\n\n\
            [labels]\nfake = \"hoax\"\n",
        )?;

        let config = Config::from_path(&path)?;
        assert_eq!(config.paths.raw, PathBuf::from("downloads"));
        let defaults = Paths::default();
        assert_eq!(config.paths.normalized, defaults.normalized);
        assert_eq!(config.paths.combined, defaults.combined);
        assert_eq!(config.labels.truthful, "1");
        assert_eq!(config.labels.fake, "hoax");
        Ok(())
    }
}
