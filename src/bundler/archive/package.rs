//! Packaging of one platform group under one archive spec.

use super::{
    ArchiveWriter, EnhancedArchive, FileEntry, archive_path, expand_globs,
    naming::ArchivePathGuard, new_writer,
};
use crate::{
    bail,
    bundler::{
        artifact::{Artifact, ArtifactKind, Artifacts},
        error::{Context, Error, Result},
        settings::{ArchiveSpec, Settings, validate_wrap_directory},
        template::Template,
    },
};
use std::path::{Path, PathBuf};

/// Packages `binaries`, which all share one platform, according to `spec`.
///
/// The pass-through `binary` format registers one uploadable binary per input
/// binary; every other format writes a single archive.
pub async fn package_group(
    settings: &Settings,
    guard: &ArchivePathGuard,
    artifacts: &Artifacts,
    spec: &ArchiveSpec,
    binaries: Vec<Artifact>,
) -> Result<()> {
    let Some(first) = binaries.first() else {
        bail!("archive {} has an empty platform group", spec.id);
    };

    if spec.format_for(&first.platform.os).is_binary() {
        return skip(settings, artifacts, spec, &binaries);
    }
    create(settings, guard, artifacts, spec, binaries).await
}

async fn create(
    settings: &Settings,
    guard: &ArchivePathGuard,
    artifacts: &Artifacts,
    spec: &ArchiveSpec,
    binaries: Vec<Artifact>,
) -> Result<()> {
    let first = &binaries[0];
    let format = spec.format_for(&first.platform.os);
    let template = Template::new(settings).with_artifact(first, &spec.replacements);

    let folder = template.apply(&spec.name_template)?;
    let wrap = template.apply(spec.wrap_in_directory.template(&spec.name_template))?;
    validate_wrap_directory(&wrap)?;

    let path = archive_path(settings.dist_directory(), &folder, format);
    let file = guard.create(&path).await?;

    log::info!("creating archive {}", path.display());

    let files = expand_globs(&template, settings.project_directory(), &spec.files)
        .context("failed to find files to archive")?;

    let writer = new_writer(format, file)?;
    let archive = EnhancedArchive::new(writer, wrap.clone());
    let platform = first.platform.clone();
    let builds =
        serde_json::to_value(&binaries).map_err(|e| Error::GenericError(e.to_string()))?;

    let write_path = path.clone();
    tokio::task::spawn_blocking(move || write_archive(archive, &files, &binaries, &write_path))
        .await
        .map_err(|e| {
            Error::GenericError(format!("archive task for {} panicked: {e}", path.display()))
        })??;

    let name = format!("{folder}.{}", format.extension());
    artifacts.add(
        Artifact::new(ArtifactKind::UploadableArchive, name, path, platform)
            .with_extra("Builds", builds)
            .with_extra("ID", spec.id.as_str())
            .with_extra("Format", format.as_str())
            .with_extra("WrappedIn", wrap),
    );
    Ok(())
}

fn write_archive<W: ArchiveWriter>(
    mut archive: EnhancedArchive<W>,
    files: &[FileEntry],
    binaries: &[Artifact],
    path: &Path,
) -> Result<()> {
    let binary_entries = binaries.iter().map(|binary| FileEntry {
        source: binary.path.clone(),
        destination: binary.name.clone(),
        info: None,
    });

    for entry in files.iter().cloned().chain(binary_entries) {
        archive.add(&entry).map_err(|error| Error::AddFile {
            from: entry.source.clone(),
            destination: entry.destination.clone(),
            archive: PathBuf::from(path),
            error: Box::new(error),
        })?;
    }
    archive.close()
}

fn skip(
    settings: &Settings,
    artifacts: &Artifacts,
    spec: &ArchiveSpec,
    binaries: &[Artifact],
) -> Result<()> {
    for binary in binaries {
        log::info!("skip archiving {}", binary.name);
        let name = Template::new(settings)
            .with_artifact(binary, &spec.replacements)
            .apply(&spec.name_template)?;
        let builds = serde_json::to_value(std::slice::from_ref(binary))
            .map_err(|e| Error::GenericError(e.to_string()))?;

        artifacts.add(
            Artifact::new(
                ArtifactKind::UploadableBinary,
                format!("{name}{}", binary.ext()),
                binary.path.clone(),
                binary.platform.clone(),
            )
            .with_extra("Builds", builds)
            .with_extra("ID", spec.id.as_str())
            .with_extra("Format", spec.format_for(&binary.platform.os).as_str()),
        );
    }
    Ok(())
}
