//! Archive path naming and serialized creation.

use super::ArchiveFormat;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;

/// Output path of an archive: `dist/<name>.<extension>`.
pub fn archive_path(dist: &Path, name: &str, format: ArchiveFormat) -> PathBuf {
    dist.join(format!("{name}.{}", format.extension()))
}

/// Serializes archive file creation across the packaging tasks of one run.
///
/// Directory creation, the existence check and file creation happen under a
/// single lock, so no two tasks can both create the same path. The lock is
/// released before any archive content is written.
#[derive(Debug, Default)]
pub struct ArchivePathGuard {
    lock: Mutex<()>,
}

impl ArchivePathGuard {
    /// Creates a new guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `path` and its parent directories.
    ///
    /// # Errors
    ///
    /// [`Error::ArchiveExists`] if `path` is already present, [`Error::Fs`]
    /// for any other filesystem failure.
    pub async fn create(&self, path: &Path) -> Result<File> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating archive directory", parent)?;
        }

        if tokio::fs::try_exists(path)
            .await
            .fs_context("checking archive path", path)?
        {
            return Err(Error::ArchiveExists {
                path: path.to_path_buf(),
            });
        }

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|error| match error.kind() {
                io::ErrorKind::AlreadyExists => Error::ArchiveExists {
                    path: path.to_path_buf(),
                },
                _ => Error::Fs {
                    context: "creating archive file",
                    path: path.to_path_buf(),
                    error,
                },
            })?;

        Ok(file.into_std().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn path_appends_extension() {
        assert_eq!(
            archive_path(Path::new("dist"), "app_1.0.0_linux_amd64", ArchiveFormat::TarGz),
            PathBuf::from("dist/app_1.0.0_linux_amd64.tar.gz")
        );
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/app.zip");
        ArchivePathGuard::new().create(&path).await.unwrap();
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn existing_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.tar.gz");
        std::fs::write(&path, "keep").unwrap();

        let err = ArchivePathGuard::new().create(&path).await.unwrap_err();
        assert!(matches!(err, Error::ArchiveExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creation_has_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist/same.tar.gz");
        let guard = Arc::new(ArchivePathGuard::new());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let path = path.clone();
                tokio::spawn(async move { guard.create(&path).await.map(|_| ()) })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => created += 1,
                Err(Error::ArchiveExists { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
    }
}
