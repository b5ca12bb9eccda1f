//! Archive creation for per-platform binary groups.
//!
//! # Module Organization
//!
//! - `format` - [`ArchiveFormat`] and per-OS resolution
//! - `writer` - the [`ArchiveWriter`] trait and tar / tar.gz / gz / zip writers
//! - `enhanced` - [`EnhancedArchive`], adding wrap directories and duplicate checks
//! - `files` - extra-file glob expansion into [`FileEntry`] values
//! - `naming` - output paths and the [`ArchivePathGuard`]
//! - `platform` - grouping binaries by platform and count consistency
//! - `package` - packaging one group (archive or pass-through)

mod enhanced;
mod files;
mod format;
mod naming;
mod package;
mod platform;
mod writer;

pub use enhanced::EnhancedArchive;
pub use files::{FileEntry, expand_globs};
pub use format::ArchiveFormat;
pub use naming::{ArchivePathGuard, archive_path};
pub use package::package_group;
pub use platform::{check_binary_counts, group_binaries};
pub use writer::{ArchiveWriter, GzArchive, TarArchive, ZipArchive, new_writer};
