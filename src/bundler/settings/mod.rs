//! Configuration structures for packaging runs.
//!
//! This module provides the run-wide [`Settings`], the raw and resolved
//! archive rules, and the resolver that fills in their defaults.

mod archive;
mod builder;
mod core;
pub mod defaults;

// Re-export all public types
pub use archive::{
    ArchiveConfig, ArchiveSpec, FileInfo, FileRule, FormatOverride, WrapInDirectory,
    validate_wrap_directory,
};
pub use builder::SettingsBuilder;
pub use self::core::Settings;
