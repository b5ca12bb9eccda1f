//! Error types for archive packaging operations.
//!
//! Every failure the packaging stage can surface is a variant of [`Error`].
//! The [`Context`] and [`ErrorExt`] extension traits attach the operation and
//! path that failed, and the [`bail!`](crate::bail) macro returns early with a
//! formatted message.

use std::{fmt::Display, path::PathBuf};

/// Result alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while resolving configuration and building archives.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An error with an additional message describing what was being done.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// A filesystem operation failed on a specific path.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path the operation touched
        path: PathBuf,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// An IO error without path information.
    #[error("`{0}`")]
    IoError(#[from] std::io::Error),

    /// Two or more configuration entries share one identifier.
    #[error("found {count} {section} with the ID '{id}', please fix your config")]
    DuplicateId {
        /// Configuration section (e.g. "archives")
        section: &'static str,
        /// The repeated identifier
        id: String,
        /// How many entries use it
        count: usize,
    },

    /// The `wrap_in_directory` value cannot be used as an in-archive prefix.
    #[error("invalid wrap_in_directory value '{value}': {reason}")]
    InvalidWrapMode {
        /// The configured value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The archive format string is not one this crate can write.
    #[error("unknown archive format '{0}', expected one of: tar.gz, tgz, tar, gz, zip, binary")]
    UnknownFormat(String),

    /// Platform groups of one archive spec hold different numbers of binaries.
    #[error(
        "invalid archive: {index}: archive has different count of built binaries \
         for each platform ({counts}), which may cause your users confusion. \
         Please make sure all builds used have the same set of \
         os/arch/etc or split it into multiple archives"
    )]
    DifferentBinaryCount {
        /// Index of the offending archive spec
        index: usize,
        /// Group sizes observed, comma separated
        counts: String,
    },

    /// A template failed to parse or referenced an unknown field.
    #[error("failed to apply template {template}: {reason}")]
    Template {
        /// Template source text
        template: String,
        /// Rendering error
        reason: String,
    },

    /// A glob pattern was malformed.
    #[error("globbing failed for pattern {pattern}: {reason}")]
    Glob {
        /// The rendered pattern
        pattern: String,
        /// Pattern error
        reason: String,
    },

    /// The target archive path already exists on disk.
    #[error("archive named {} already exists. Check your archive name template", path.display())]
    ArchiveExists {
        /// The path that was about to be created
        path: PathBuf,
    },

    /// The same destination was added twice to one archive.
    #[error("file {0} already exists in the archive")]
    DuplicateEntry(String),

    /// Adding a file to an archive failed.
    #[error("failed to add: {} -> {destination} to {}: {error}", from.display(), archive.display())]
    AddFile {
        /// Source path on disk
        from: PathBuf,
        /// Destination inside the archive
        destination: String,
        /// Archive being written
        archive: PathBuf,
        /// What went wrong
        error: Box<Self>,
    },

    /// Zip writer error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Any other failure.
    #[error("{0}")]
    GenericError(String),
}

/// Attaches a message to an error or a missing value.
pub trait Context<T> {
    /// Wraps the error with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wraps the error with a lazily built context.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Converts IO errors into [`Error::Fs`] with operation and path.
pub trait ErrorExt<T> {
    /// Records what was being done to which path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chains_messages() {
        let err: Result<()> = Err(Error::DuplicateEntry("README.md".into()));
        let err = err.context("failed to find files to archive").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to find files to archive: file README.md already exists in the archive"
        );
    }

    #[test]
    fn fs_context_keeps_path() {
        let io: std::io::Result<()> = Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        match io.fs_context("opening file", "dist/app").unwrap_err() {
            Error::Fs { context, path, .. } => {
                assert_eq!(context, "opening file");
                assert_eq!(path, PathBuf::from("dist/app"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
