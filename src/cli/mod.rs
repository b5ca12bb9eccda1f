//! Command line interface for the archive packager.
//!
//! This module wires argument parsing, manifest loading and the
//! [`Archiver`] together.

mod args;

pub use args::Args;

use crate::{
    bundler::{Archiver, Artifact, Artifacts, SettingsBuilder},
    error::{BundlerError, CliError, Result},
    metadata,
};
use std::{collections::BTreeSet, path::Path, sync::Arc};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Runs the packager for already parsed arguments
pub async fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let manifest = metadata::load_manifest(&args.manifest_path)?;
    let binaries = load_artifacts(&args.artifacts).await?;
    log::info!(
        "Packaging {} {} ({} binaries)",
        manifest.metadata.name,
        manifest.metadata.version,
        binaries.len()
    );

    let release = manifest.release;
    let build_ids = release.builds.unwrap_or_else(|| {
        binaries
            .iter()
            .filter_map(|b| b.id().map(String::from))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    });
    let dist = args
        .dist
        .clone()
        .or(release.dist.map(|d| manifest.root.join(d)))
        .unwrap_or_else(|| manifest.root.join("dist"));

    let mut builder = SettingsBuilder::new()
        .project_name(manifest.metadata.name)
        .version(manifest.metadata.version)
        .project_directory(&manifest.root)
        .dist_directory(&dist)
        .build_ids(build_ids)
        .archives(release.archives);
    if let Some(parallelism) = args.parallelism.or(release.parallelism) {
        builder = builder.parallelism(parallelism);
    }
    let settings = builder.build()?;

    let artifacts = Arc::new(Artifacts::from(binaries));
    Archiver::new(settings, Arc::clone(&artifacts)).run().await?;

    let output = dist.join("artifacts.json");
    let json = serde_json::to_string_pretty(&artifacts.list())?;
    tokio::fs::create_dir_all(&dist).await.map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "create dist directory".to_string(),
            reason: format!("Failed to create {}: {}", dist.display(), e),
        })
    })?;
    tokio::fs::write(&output, json).await.map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "write artifacts.json".to_string(),
            reason: format!("Failed to write {}: {}", output.display(), e),
        })
    })?;
    log::info!("Wrote {}", output.display());

    Ok(0)
}

async fn load_artifacts(path: &Path) -> Result<Vec<Artifact>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read artifacts".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;
    Ok(serde_json::from_str(&content)?)
}
