//! Archive packaging rules.
//!
//! [`ArchiveConfig`] is the raw rule as written in configuration; every field
//! is optional. The [`defaults`](super::defaults) resolver turns a list of
//! them into [`ArchiveSpec`] values, which are complete and never change
//! afterwards.
//!
//! # Configuration
//!
//! ```toml
//! [[package.metadata.release.archives]]
//! id = "default"
//! format = "tar.gz"
//! format_overrides = [{ os = "windows", format = "zip" }]
//! wrap_in_directory = true
//! name_template = "{{ProjectName}}_{{Version}}_{{Os}}_{{Arch}}"
//! files = ["LICENSE*", { source = "docs/*.md", destination = "docs" }]
//! replacements = { darwin = "Darwin", amd64 = "x86_64" }
//! ```

use crate::bundler::{archive::ArchiveFormat, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::Path,
    str::FromStr,
};

/// Raw archive rule as loaded from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveConfig {
    /// Unique identifier.
    ///
    /// Default: `"default"`
    #[serde(default)]
    pub id: Option<String>,

    /// Base archive format.
    ///
    /// Default: `tar.gz`
    #[serde(default)]
    pub format: Option<ArchiveFormat>,

    /// Per-OS format overrides, first prefix match wins.
    #[serde(default)]
    pub format_overrides: Vec<FormatOverride>,

    /// Wrap directory mode.
    ///
    /// Default: off
    #[serde(default)]
    pub wrap_in_directory: WrapInDirectory,

    /// Template for the archive (or binary) name, without extension.
    #[serde(default)]
    pub name_template: Option<String>,

    /// Extra files to include next to the binaries.
    ///
    /// Default: license, readme and changelog globs
    #[serde(default)]
    pub files: Vec<FileRule>,

    /// Build identifiers whose binaries go into this archive.
    ///
    /// Default: every configured build
    #[serde(default)]
    pub builds: Option<Vec<String>>,

    /// Replacement table for `Os`, `Arch`, `Arm` and `Mips` template fields.
    #[serde(default)]
    pub replacements: BTreeMap<String, String>,

    /// Allow platform groups with different binary counts.
    #[serde(default)]
    pub allow_different_binary_count: bool,
}

/// Fully resolved archive rule.
#[derive(Debug, Clone)]
pub struct ArchiveSpec {
    /// Unique identifier
    pub id: String,
    /// Base archive format
    pub format: ArchiveFormat,
    /// Per-OS format overrides
    pub format_overrides: Vec<FormatOverride>,
    /// Wrap directory mode
    pub wrap_in_directory: WrapInDirectory,
    /// Archive name template
    pub name_template: String,
    /// Extra file rules
    pub files: Vec<FileRule>,
    /// Build identifiers to include
    pub builds: Vec<String>,
    /// Template field replacements
    pub replacements: BTreeMap<String, String>,
    /// Whether mismatched binary counts are tolerated
    pub allow_different_binary_count: bool,
}

impl ArchiveSpec {
    /// Resolves the effective format for an operating system.
    ///
    /// Overrides are checked in order; the first one whose `os` is a prefix of
    /// `os` wins. Falls back to the base format.
    pub fn format_for(&self, os: &str) -> ArchiveFormat {
        self.format_overrides
            .iter()
            .find(|o| os.starts_with(&o.os))
            .map(|o| o.format)
            .unwrap_or(self.format)
    }
}

/// Format override for one operating system prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormatOverride {
    /// Operating system prefix (e.g. "windows")
    pub os: String,
    /// Format used when the prefix matches
    pub format: ArchiveFormat,
}

/// Wrap-directory mode of an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WrapInDirectory {
    /// Files sit at the archive root
    #[default]
    Off,
    /// Files are wrapped in a directory named by the archive name template
    On,
    /// Files are wrapped in the given (templated) directory
    Custom(String),
}

impl WrapInDirectory {
    /// Template used to render the wrap prefix for `name_template`.
    ///
    /// Returns an empty string when wrapping is off.
    pub fn template<'a>(&'a self, name_template: &'a str) -> &'a str {
        match self {
            Self::Off => "",
            Self::On => name_template,
            Self::Custom(dir) => dir,
        }
    }
}

impl FromStr for WrapInDirectory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::On),
            "false" | "" => Ok(Self::Off),
            custom => {
                validate_wrap_directory(custom)?;
                Ok(Self::Custom(custom.to_string()))
            }
        }
    }
}

/// Fails unless `value` is a relative path that stays inside the archive root.
pub fn validate_wrap_directory(value: &str) -> Result<(), Error> {
    let path = Path::new(value);
    if path.is_absolute() || value.starts_with('/') || value.starts_with('\\') {
        return Err(Error::InvalidWrapMode {
            value: value.to_string(),
            reason: "must be a relative directory".to_string(),
        });
    }
    if value.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(Error::InvalidWrapMode {
            value: value.to_string(),
            reason: "must not leave the archive root".to_string(),
        });
    }
    Ok(())
}

impl<'de> Deserialize<'de> for WrapInDirectory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(Self::On),
            Raw::Flag(false) => Ok(Self::Off),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// An extra-file rule: a glob plus optional destination and file info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRule {
    /// Templated glob pattern
    pub source: String,
    /// Destination directory inside the archive
    pub destination: Option<String>,
    /// Header overrides applied to every matched file
    pub info: Option<FileInfo>,
}

impl FileRule {
    /// Rule matching `source` with no destination or file info.
    pub fn glob(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

impl<'de> Deserialize<'de> for FileRule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Glob(String),
            Rule {
                source: String,
                #[serde(default)]
                destination: Option<String>,
                #[serde(default)]
                info: Option<FileInfo>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Glob(source) => Self::glob(source),
            Raw::Rule {
                source,
                destination,
                info,
            } => Self {
                source,
                destination: destination.filter(|d| !d.is_empty()),
                info,
            },
        })
    }
}

/// Header overrides for files added to an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileInfo {
    /// Owner user name
    #[serde(default)]
    pub owner: Option<String>,
    /// Owner group name
    #[serde(default)]
    pub group: Option<String>,
    /// Unix permission bits
    #[serde(default)]
    pub mode: Option<u32>,
    /// Modification time
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_overrides(overrides: Vec<FormatOverride>) -> ArchiveSpec {
        ArchiveSpec {
            id: "default".into(),
            format: ArchiveFormat::TarGz,
            format_overrides: overrides,
            wrap_in_directory: WrapInDirectory::Off,
            name_template: String::new(),
            files: Vec::new(),
            builds: Vec::new(),
            replacements: BTreeMap::new(),
            allow_different_binary_count: false,
        }
    }

    #[test]
    fn format_override_first_prefix_match_wins() {
        let spec = spec_with_overrides(vec![
            FormatOverride {
                os: "win".into(),
                format: ArchiveFormat::Zip,
            },
            FormatOverride {
                os: "windows".into(),
                format: ArchiveFormat::Binary,
            },
        ]);
        assert_eq!(spec.format_for("windows"), ArchiveFormat::Zip);
        assert_eq!(spec.format_for("linux"), ArchiveFormat::TarGz);
    }

    #[test]
    fn wrap_mode_literals() {
        assert_eq!("true".parse::<WrapInDirectory>().unwrap(), WrapInDirectory::On);
        assert_eq!("false".parse::<WrapInDirectory>().unwrap(), WrapInDirectory::Off);
        assert_eq!(
            "{{ProjectName}}".parse::<WrapInDirectory>().unwrap(),
            WrapInDirectory::Custom("{{ProjectName}}".into())
        );
        assert!("../escape".parse::<WrapInDirectory>().is_err());
        assert!("/abs".parse::<WrapInDirectory>().is_err());
        assert!("a\\..\\b".parse::<WrapInDirectory>().is_err());
        validate_wrap_directory("releases/{{Version}}").unwrap();
    }

    #[test]
    fn wrap_template_selection() {
        assert_eq!(WrapInDirectory::Off.template("name"), "");
        assert_eq!(WrapInDirectory::On.template("name"), "name");
        assert_eq!(WrapInDirectory::Custom("dir".into()).template("name"), "dir");
    }

    #[test]
    fn deserializes_mixed_file_rules() {
        #[derive(Deserialize)]
        struct Doc {
            files: Vec<FileRule>,
            wrap_in_directory: WrapInDirectory,
        }

        let doc: Doc = toml::from_str(
            r#"
            wrap_in_directory = true
            files = ["README*", { source = "docs/*", destination = "doc", info = { mode = 420 } }]
            "#,
        )
        .unwrap();
        assert_eq!(doc.wrap_in_directory, WrapInDirectory::On);
        assert_eq!(doc.files[0], FileRule::glob("README*"));
        assert_eq!(doc.files[1].destination.as_deref(), Some("doc"));
        assert_eq!(doc.files[1].info.as_ref().and_then(|i| i.mode), Some(0o644));
    }
}
