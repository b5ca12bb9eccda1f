//! Builder for constructing Settings.

use super::{ArchiveConfig, Settings, defaults::resolve_archives};
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Builder for constructing [`Settings`].
///
/// `project_name` and `version` are required. [`build`](Self::build) applies
/// archive defaults, so configuration errors such as duplicate archive IDs
/// surface here.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_archive::bundler::{ArchiveConfig, ArchiveFormat, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_archive::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_name("myapp")
///     .version("1.0.0")
///     .project_directory(".")
///     .parallelism(4)
///     .archives(vec![ArchiveConfig {
///         format: Some(ArchiveFormat::Zip),
///         ..Default::default()
///     }])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    project_name: Option<String>,
    version: Option<String>,
    tag: Option<String>,
    project_directory: Option<PathBuf>,
    dist_directory: Option<PathBuf>,
    parallelism: Option<usize>,
    build_ids: Vec<String>,
    archives: Vec<ArchiveConfig>,
    env: Option<BTreeMap<String, String>>,
    date: Option<DateTime<Utc>>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project name.
    ///
    /// # Required
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Sets the version string.
    ///
    /// # Required
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the release tag.
    ///
    /// Default: `v{version}`
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the directory extra-file globs are resolved against.
    ///
    /// Default: current directory
    pub fn project_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    ///
    /// Default: `dist` under the project directory
    pub fn dist_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dist_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the maximum number of concurrent packaging tasks.
    ///
    /// Default: number of CPUs
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Sets the configured build identifiers.
    pub fn build_ids(mut self, ids: Vec<String>) -> Self {
        self.build_ids = ids;
        self
    }

    /// Sets the raw archive rules.
    ///
    /// Default: empty (a single default archive)
    pub fn archives(mut self, archives: Vec<ArchiveConfig>) -> Self {
        self.archives = archives;
        self
    }

    /// Sets the environment exposed to templates as `Env`.
    ///
    /// Default: process environment
    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the run timestamp exposed to templates.
    ///
    /// Default: now
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `project_name` or `version` is missing, or if
    /// archive defaults cannot be resolved.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let project_name = self.project_name.context("project_name is required")?;
        let version = self.version.context("version is required")?;
        let tag = self.tag.unwrap_or_else(|| format!("v{version}"));
        let project_directory = self.project_directory.unwrap_or_else(|| PathBuf::from("."));
        let dist_directory = self
            .dist_directory
            .unwrap_or_else(|| project_directory.join("dist"));
        let parallelism = self.parallelism.unwrap_or_else(num_cpus::get).max(1);
        let archives = resolve_archives(self.archives, &self.build_ids)?;
        let env = self.env.unwrap_or_else(|| std::env::vars().collect());

        Ok(Settings::new(
            project_name,
            version,
            tag,
            project_directory,
            dist_directory,
            parallelism,
            self.build_ids,
            archives,
            env,
            self.date.unwrap_or_else(Utc::now),
        ))
    }
}
