//! Artifact descriptors shared between release stages.
//!
//! Binaries come from the build stage and are read-only here. The packaging
//! stage appends [`ArtifactKind::UploadableArchive`] and
//! [`ArtifactKind::UploadableBinary`] entries to the [`Artifacts`] registry.

mod registry;

pub use registry::{Artifacts, Filter, and, by_ids, by_kind};

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::PathBuf};

/// Kind of artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Compiled binary produced by a build
    Binary,
    /// Archive produced by the packaging stage, ready for publishing
    UploadableArchive,
    /// Raw binary passed through the packaging stage, ready for publishing
    UploadableBinary,
}

/// Platform tuple an artifact was built for.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system (e.g. "linux", "darwin", "windows")
    pub os: String,
    /// Architecture (e.g. "amd64", "arm64", "arm")
    pub arch: String,
    /// ARM variant (e.g. "6", "7")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<String>,
    /// MIPS float variant (e.g. "softfloat")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mips: Option<String>,
}

impl Platform {
    /// Platform for `os`/`arch` without ARM or MIPS variant.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            arm: None,
            mips: None,
        }
    }

    /// Grouping key, e.g. `linux_amd64`, `linux_armv7`, `linux_mips_softfloat`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)?;
        if let Some(arm) = self.arm.as_deref().filter(|a| !a.is_empty()) {
            write!(f, "v{arm}")?;
        }
        if let Some(mips) = self.mips.as_deref().filter(|m| !m.is_empty()) {
            write!(f, "_{mips}")?;
        }
        Ok(())
    }
}

/// A file produced or consumed by a release stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact kind
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Display name (for binaries, the name inside archives)
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
    /// Target platform
    #[serde(flatten)]
    pub platform: Platform,
    /// Open-ended metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Artifact {
    /// Creates an artifact without extra metadata.
    pub fn new(
        kind: ArtifactKind,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        platform: Platform,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            platform,
            extra: BTreeMap::new(),
        }
    }

    /// Adds an extra metadata entry.
    pub fn with_extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// String value of an extra entry, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Build identifier (`ID` extra).
    pub fn id(&self) -> Option<&str> {
        self.extra_str("ID")
    }

    /// File extension of a binary (`Ext` extra), empty if unset.
    pub fn ext(&self) -> &str {
        self.extra_str("Ext").unwrap_or_default()
    }

    /// Binary name without extension.
    ///
    /// Uses the `Binary` extra when present, otherwise strips [`ext`](Self::ext)
    /// from the name.
    pub fn binary_name(&self) -> &str {
        self.extra_str("Binary")
            .unwrap_or_else(|| self.name.strip_suffix(self.ext()).unwrap_or(&self.name))
    }
}
