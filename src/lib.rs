//! Release archive packager
//!
//! This library packages the compiled binaries of a release into
//! distributable artifacts:
//! - Compressed archives (.tar.gz, .tgz, .tar, .gz, .zip), one per platform
//! - Raw binaries passed through unchanged (`binary` format)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
