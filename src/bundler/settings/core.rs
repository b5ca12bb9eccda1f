//! Core Settings struct and implementations.

use super::ArchiveSpec;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Settings for one packaging run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder), which also
/// resolves archive defaults. Immutable once built.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_archive::bundler::SettingsBuilder;
///
/// # fn example() -> kodegen_bundler_archive::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_name("myapp")
///     .version("1.0.0")
///     .dist_directory("dist")
///     .build_ids(vec!["myapp".into()])
///     .build()?;
/// assert_eq!(settings.archives().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    project_name: String,
    version: String,
    tag: String,
    project_directory: PathBuf,
    dist_directory: PathBuf,
    parallelism: usize,
    build_ids: Vec<String>,
    archives: Vec<ArchiveSpec>,
    env: BTreeMap<String, String>,
    date: DateTime<Utc>,
}

impl Settings {
    /// Returns the project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.version
    }

    /// Returns the release tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Directory glob patterns are resolved against.
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }

    /// Directory archives are written to.
    pub fn dist_directory(&self) -> &Path {
        &self.dist_directory
    }

    /// Maximum number of packaging tasks running at once (at least 1).
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Configured build identifiers.
    pub fn build_ids(&self) -> &[String] {
        &self.build_ids
    }

    /// Resolved archive rules.
    pub fn archives(&self) -> &[ArchiveSpec] {
        &self.archives
    }

    /// Environment exposed to templates.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Timestamp of this run.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        project_name: String,
        version: String,
        tag: String,
        project_directory: PathBuf,
        dist_directory: PathBuf,
        parallelism: usize,
        build_ids: Vec<String>,
        archives: Vec<ArchiveSpec>,
        env: BTreeMap<String, String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            project_name,
            version,
            tag,
            project_directory,
            dist_directory,
            parallelism,
            build_ids,
            archives,
            env,
            date,
        }
    }
}
