//! Pluggable archive writers.
//!
//! Each [`ArchiveFormat`] except `binary` maps to one [`ArchiveWriter`]
//! implementation. Writers are synchronous and owned by a single packaging
//! task; callers run them on a blocking thread.

use super::{ArchiveFormat, FileEntry};
use crate::{
    bail,
    bundler::{
        error::{Error, ErrorExt, Result},
        settings::FileInfo,
    },
};
use chrono::{Datelike, Timelike};
use flate2::{Compression, GzBuilder, write::GzEncoder};
use std::{
    fs::File,
    io::{self, Write},
};

/// A format-specific archive writer.
pub trait ArchiveWriter: Send {
    /// Adds `file.source` under `file.destination`.
    fn add(&mut self, file: &FileEntry) -> Result<()>;

    /// Finishes the archive and flushes it to disk.
    fn close(&mut self) -> Result<()>;
}

impl<W: ArchiveWriter + ?Sized> ArchiveWriter for Box<W> {
    fn add(&mut self, file: &FileEntry) -> Result<()> {
        (**self).add(file)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Creates the writer for `format` on top of an already created file.
pub fn new_writer(format: ArchiveFormat, file: File) -> Result<Box<dyn ArchiveWriter>> {
    Ok(match format {
        ArchiveFormat::TarGz | ArchiveFormat::Tgz => Box::new(TarArchive::new(TarStream::Gzip(
            GzEncoder::new(file, Compression::default()),
        ))),
        ArchiveFormat::Tar => Box::new(TarArchive::new(TarStream::Plain(file))),
        ArchiveFormat::Gz => Box::new(GzArchive::new(file)),
        ArchiveFormat::Zip => Box::new(ZipArchive::new(file)),
        ArchiveFormat::Binary => bail!("the binary format does not create archives"),
    })
}

/// Output stream of a tarball.
enum TarStream {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl TarStream {
    fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut file) => file.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for TarStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(file) => file.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(file) => file.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Tarball writer, optionally gzip-compressed.
pub struct TarArchive {
    builder: Option<tar::Builder<TarStream>>,
}

impl TarArchive {
    fn new(stream: TarStream) -> Self {
        Self {
            builder: Some(tar::Builder::new(stream)),
        }
    }
}

impl ArchiveWriter for TarArchive {
    fn add(&mut self, file: &FileEntry) -> Result<()> {
        let Some(builder) = self.builder.as_mut() else {
            bail!("archive is already closed");
        };

        let metadata =
            std::fs::metadata(&file.source).fs_context("reading file metadata", &file.source)?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);
        if let Some(info) = &file.info {
            apply_tar_info(&mut header, info)?;
        }

        if metadata.is_dir() {
            header.set_size(0);
            builder
                .append_data(&mut header, &file.destination, io::empty())
                .fs_context("writing directory entry", &file.source)?;
        } else {
            let source =
                File::open(&file.source).fs_context("opening file for archiving", &file.source)?;
            builder
                .append_data(&mut header, &file.destination, source)
                .fs_context("writing file entry", &file.source)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(builder) = self.builder.take() {
            builder.into_inner()?.finish()?;
        }
        Ok(())
    }
}

fn apply_tar_info(header: &mut tar::Header, info: &FileInfo) -> Result<()> {
    if let Some(mode) = info.mode {
        header.set_mode(mode);
    }
    if let Some(mtime) = info.mtime {
        header.set_mtime(u64::try_from(mtime.timestamp()).unwrap_or_default());
    }
    if let Some(owner) = &info.owner {
        header.set_username(owner)?;
    }
    if let Some(group) = &info.group {
        header.set_groupname(group)?;
    }
    Ok(())
}

/// Single-file gzip writer.
pub struct GzArchive {
    file: Option<File>,
    encoder: Option<GzEncoder<File>>,
}

impl GzArchive {
    fn new(file: File) -> Self {
        Self {
            file: Some(file),
            encoder: None,
        }
    }
}

impl ArchiveWriter for GzArchive {
    fn add(&mut self, file: &FileEntry) -> Result<()> {
        let Some(out) = self.file.take() else {
            bail!(
                "gzip: failed to add {}, only one file can be archived in gz format",
                file.destination
            );
        };

        let mut builder = GzBuilder::new().filename(file.destination.as_bytes());
        if let Some(mtime) = file.info.as_ref().and_then(|i| i.mtime) {
            builder = builder.mtime(u32::try_from(mtime.timestamp()).unwrap_or_default());
        }
        let mut encoder = builder.write(out, Compression::default());

        let mut source =
            File::open(&file.source).fs_context("opening file for archiving", &file.source)?;
        io::copy(&mut source, &mut encoder).fs_context("compressing file", &file.source)?;
        self.encoder = Some(encoder);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(encoder) = self.encoder.take() {
            encoder.finish()?.flush()?;
        } else if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Zip writer using deflate compression.
pub struct ZipArchive {
    writer: Option<zip::ZipWriter<File>>,
}

impl ZipArchive {
    fn new(file: File) -> Self {
        Self {
            writer: Some(zip::ZipWriter::new(file)),
        }
    }
}

impl ArchiveWriter for ZipArchive {
    fn add(&mut self, file: &FileEntry) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            bail!("archive is already closed");
        };

        let metadata =
            std::fs::metadata(&file.source).fs_context("reading file metadata", &file.source)?;
        let info = file.info.clone().unwrap_or_default();

        let mut options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(info.mode.unwrap_or_else(|| default_mode(&metadata)));
        if let Some(mtime) = info.mtime {
            let mtime = zip::DateTime::from_date_and_time(
                u16::try_from(mtime.year()).unwrap_or(1980),
                mtime.month() as u8,
                mtime.day() as u8,
                mtime.hour() as u8,
                mtime.minute() as u8,
                mtime.second() as u8,
            )
            .map_err(|e| Error::GenericError(format!("invalid zip timestamp {mtime}: {e}")))?;
            options = options.last_modified_time(mtime);
        }

        if metadata.is_dir() {
            writer.add_directory(file.destination.as_str(), options)?;
        } else {
            writer.start_file(file.destination.as_str(), options)?;
            let mut source =
            File::open(&file.source).fs_context("opening file for archiving", &file.source)?;
            io::copy(&mut source, writer).fs_context("writing file entry", &file.source)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finish()?.flush()?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn default_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn default_mode(metadata: &std::fs::Metadata) -> u32 {
    if metadata.is_dir() { 0o755 } else { 0o644 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry(dir: &std::path::Path, name: &str, body: &str) -> FileEntry {
        let source = dir.join(name);
        std::fs::write(&source, body).unwrap();
        FileEntry {
            source,
            destination: name.to_string(),
            info: None,
        }
    }

    #[test]
    fn tar_gz_round_trip_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.tar.gz");
        let mut writer = new_writer(ArchiveFormat::TarGz, File::create(&out).unwrap()).unwrap();
        let mut file = entry(dir.path(), "README", "hello");
        file.info = Some(FileInfo {
            mode: Some(0o600),
            owner: Some("release".into()),
            ..Default::default()
        });
        writer.add(&file).unwrap();
        writer.close().unwrap();

        let decoder = flate2::read::GzDecoder::new(File::open(&out).unwrap());
        let mut archive = tar::Archive::new(decoder);
        let mut entries = archive.entries().unwrap();
        let mut first = entries.next().unwrap().unwrap();
        assert_eq!(first.path().unwrap().to_str(), Some("README"));
        assert_eq!(first.header().mode().unwrap(), 0o600);
        assert_eq!(first.header().username().unwrap(), Some("release"));
        let mut body = String::new();
        first.read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello");
    }

    #[test]
    fn gz_accepts_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = File::create(dir.path().join("out.gz")).unwrap();
        let mut writer = new_writer(ArchiveFormat::Gz, out).unwrap();
        writer.add(&entry(dir.path(), "a", "1")).unwrap();
        assert!(writer.add(&entry(dir.path(), "b", "2")).is_err());
        writer.close().unwrap();
    }

    #[test]
    fn zip_contains_entry() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.zip");
        let mut writer = new_writer(ArchiveFormat::Zip, File::create(&out).unwrap()).unwrap();
        writer.add(&entry(dir.path(), "app.exe", "MZ")).unwrap();
        writer.close().unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut file = archive.by_name("app.exe").unwrap();
        let mut body = String::new();
        file.read_to_string(&mut body).unwrap();
        assert_eq!(body, "MZ");
    }

    #[test]
    fn binary_format_has_no_writer() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("x")).unwrap();
        assert!(new_writer(ArchiveFormat::Binary, file).is_err());
    }
}
