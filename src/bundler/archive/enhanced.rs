//! Archive writer decorator adding wrap-directory support.

use super::{ArchiveWriter, FileEntry};
use crate::bundler::error::{Error, Result};
use std::collections::HashSet;

/// Decorates an [`ArchiveWriter`] with a wrap-directory prefix, backslash
/// normalization and duplicate-destination detection.
///
/// One instance belongs to exactly one archive being built.
pub struct EnhancedArchive<W: ArchiveWriter> {
    inner: W,
    wrap: String,
    files: HashSet<String>,
}

impl<W: ArchiveWriter> EnhancedArchive<W> {
    /// Wraps `inner`, prefixing every destination with `wrap` (may be empty).
    pub fn new(inner: W, wrap: impl Into<String>) -> Self {
        Self {
            inner,
            wrap: wrap.into(),
            files: HashSet::new(),
        }
    }

    /// Final in-archive path recorded for `destination`, if added.
    pub fn archived_path(&self, destination: &str) -> Option<&str> {
        self.files
            .get(&archive_path(&self.wrap, destination))
            .map(String::as_str)
    }
}

impl<W: ArchiveWriter> ArchiveWriter for EnhancedArchive<W> {
    fn add(&mut self, file: &FileEntry) -> Result<()> {
        let name = archive_path(&self.wrap, &file.destination);
        log::debug!("adding file: {} as {}", file.source.display(), name);
        if !self.files.insert(name.clone()) {
            return Err(Error::DuplicateEntry(name));
        }

        self.inner.add(&FileEntry {
            source: file.source.clone(),
            destination: name,
            info: file.info.clone(),
        })
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

/// Joins `wrap` and `destination` with `/` as the only separator.
///
/// Empty and `.` segments are dropped, so a rooted destination still lands
/// under `wrap`.
fn archive_path(wrap: &str, destination: &str) -> String {
    let wrap = wrap.replace('\\', "/");
    let destination = destination.replace('\\', "/");
    wrap.split('/')
        .chain(destination.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
