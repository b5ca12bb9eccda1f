//! Project metadata and release configuration from Cargo.toml

use crate::bundler::ArchiveConfig;
use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Package metadata extracted from Cargo.toml
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    /// Package name from Cargo.toml
    pub name: String,

    /// Package version from Cargo.toml (e.g., "0.1.0")
    pub version: String,
}

/// Packaging configuration from `[package.metadata.release]`
///
/// ```toml
/// [package.metadata.release]
/// dist = "dist"
/// parallelism = 4
/// builds = ["myapp"]
///
/// [[package.metadata.release.archives]]
/// format = "tar.gz"
/// format_overrides = [{ os = "windows", format = "zip" }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseMetadata {
    /// Output directory, relative to the manifest directory
    #[serde(default)]
    pub dist: Option<PathBuf>,

    /// Maximum concurrent packaging tasks
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Configured build identifiers
    #[serde(default)]
    pub builds: Option<Vec<String>>,

    /// Archive rules
    #[serde(default)]
    pub archives: Vec<ArchiveConfig>,
}

/// Complete manifest data from Cargo.toml
#[derive(Debug, Clone)]
pub struct CargoManifest {
    /// Package metadata ([package] section)
    pub metadata: PackageMetadata,

    /// Directory containing the manifest
    pub root: PathBuf,

    /// Release configuration ([package.metadata.release] section)
    pub release: ReleaseMetadata,
}

#[derive(Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
}

#[derive(Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    metadata: Option<RawPackageMetadata>,
}

#[derive(Deserialize)]
struct RawPackageMetadata {
    #[serde(default)]
    release: Option<ReleaseMetadata>,
}

/// Load project metadata and release configuration from Cargo.toml
pub fn load_manifest(cargo_toml_path: &Path) -> Result<CargoManifest> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_cargo_toml".to_string(),
            reason: format!("Failed to read {}: {}", cargo_toml_path.display(), e),
        })
    })?;

    let root = cargo_toml_path
        .parent()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .ok_or_else(|| {
            BundlerError::Cli(CliError::InvalidArguments {
                reason: "Invalid Cargo.toml path".to_string(),
            })
        })?
        .to_path_buf();

    parse_manifest(&manifest, root)
}

fn parse_manifest(manifest: &str, root: PathBuf) -> Result<CargoManifest> {
    let raw: RawManifest = toml::from_str(manifest)?;

    let package = raw.package.ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "No [package] section in Cargo.toml".to_string(),
        })
    })?;

    let name = package.name.ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "Missing 'name' in [package]".to_string(),
        })
    })?;

    let version = package.version.ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "Missing 'version' in [package]".to_string(),
        })
    })?;

    let release = package
        .metadata
        .and_then(|m| m.release)
        .unwrap_or_else(|| {
            log::debug!("No [package.metadata.release] section, using archive defaults");
            ReleaseMetadata::default()
        });

    Ok(CargoManifest {
        metadata: PackageMetadata { name, version },
        root,
        release,
    })
}
