use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::prelude::*;

pub(crate) struct Project {
    /// The root directory of the project.
    root_dir: PathBuf,

    /// The project config; a default config if the project has no
    /// `claimset.toml` yet.
    config: Config,
}

impl Project {
    pub(crate) const DOT_DIR: &'static str = ".claimset";
    pub(crate) const STATE_DIR: &'static str = "state";

    /// Discovers the root of the project.
    ///
    /// The current directory and every parent directory is searched
    /// for a [Config] file. If none is found, the current directory
    /// is used together with the default config.
    pub(crate) fn discover() -> ClaimsetResult<Self> {
        let cwd = env::current_dir()?;
        let mut root_dir = cwd.clone();

        loop {
            if let Ok(metadata) =
                fs::metadata(root_dir.join(Config::FILENAME))
            {
                if metadata.is_file() {
                    return Self::open(root_dir);
                }
            }

            if !root_dir.pop() {
                log::debug!(
                    "no {} found, using {}",
                    Config::FILENAME,
                    cwd.display()
                );

                return Ok(Self {
                    config: Config::create(cwd.join(Config::FILENAME))?,
                    root_dir: cwd,
                });
            }
        }
    }

    /// Opens the project rooted at `root_dir`.
    pub(crate) fn open<P: AsRef<Path>>(
        root_dir: P,
    ) -> ClaimsetResult<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        let path = root_dir.join(Config::FILENAME);
        let config = if path.is_file() {
            Config::from_path(path)?
        } else {
            Config::create(path)?
        };

        Ok(Self { root_dir, config })
    }

    /// Returns the config associated with the project.
    #[inline]
    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub(crate) fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the base directory of the project.
    #[inline]
    pub(crate) fn base_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    #[inline]
    fn resolve(&self, path: &Path) -> PathBuf {
        self.root_dir.join(path)
    }

    /// Returns the directory of the raw source files.
    #[inline]
    pub(crate) fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.raw)
    }

    /// Returns the directory of the normalized files.
    #[inline]
    pub(crate) fn normalized_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.normalized)
    }

    /// Returns the path of the combined dataset.
    #[inline]
    pub(crate) fn combined_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.combined)
    }

    /// Returns the directory of the review logs.
    #[inline]
    pub(crate) fn state_dir(&self) -> PathBuf {
        self.root_dir.join(Self::DOT_DIR).join(Self::STATE_DIR)
    }

    /// Returns the normalized file of a source.
    #[inline]
    pub(crate) fn normalized_path(&self, source: &str) -> PathBuf {
        self.normalized_dir().join(format!("{source}.csv"))
    }

    /// Returns the review log of a source.
    #[inline]
    pub(crate) fn state_path(&self, source: &str) -> PathBuf {
        self.state_dir().join(format!("{source}.csv"))
    }
}
