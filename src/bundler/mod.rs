//! Release archive packaging.
//!
//! Takes the compiled binaries of a release plus auxiliary files (license,
//! readme, changelog) and produces the distributable artifacts: compressed
//! archives or pass-through raw binaries, one set per platform.

pub mod archive;
pub mod artifact;
pub mod builder;
pub mod error;
pub mod settings;
pub mod template;

pub use archive::{ArchiveFormat, ArchiveWriter, EnhancedArchive, FileEntry};
pub use artifact::{Artifact, ArtifactKind, Artifacts, Platform};
pub use builder::Archiver;
pub use error::{Error, Result};
pub use settings::{
    ArchiveConfig, ArchiveSpec, FileInfo, FileRule, FormatOverride, Settings, SettingsBuilder,
    WrapInDirectory,
};
pub use template::Template;
