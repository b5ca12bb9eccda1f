//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap,
//! with validation of the values clap cannot check itself.

use clap::Parser;
use std::path::PathBuf;

/// Release archive packager for compiled Rust binaries
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_archive",
    version,
    about = "Release archive packager for compiled Rust binaries",
    long_about = "Packages per-platform binaries plus license, readme and changelog files into
release archives (.tar.gz, .tgz, .tar, .gz, .zip) or passes them through as raw binaries.

Archive rules are read from [package.metadata.release] in Cargo.toml. Binaries are read
from a JSON artifacts file produced by the build stage. The resulting artifact list is
written to <dist>/artifacts.json.

Usage:
  kodegen_bundler_archive --artifacts dist/binaries.json
  kodegen_bundler_archive --manifest-path app/Cargo.toml --artifacts bins.json --dist out -p 4

Exit code 0 = every archive was created."
)]
pub struct Args {
    /// JSON file listing the binary artifacts to package
    #[arg(short = 'a', long, value_name = "PATH")]
    pub artifacts: PathBuf,

    /// Path to Cargo.toml holding project metadata and release configuration
    #[arg(short = 'm', long, value_name = "PATH", default_value = "Cargo.toml")]
    pub manifest_path: PathBuf,

    /// Output directory (overrides the configured one)
    #[arg(short = 'd', long, value_name = "DIR", env = "KODEGEN_DIST")]
    pub dist: Option<PathBuf>,

    /// Maximum number of archives built at once (default: number of CPUs)
    #[arg(short = 'p', long, value_name = "N", env = "KODEGEN_PARALLELISM")]
    pub parallelism: Option<usize>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.parallelism == Some(0) {
            return Err("Parallelism must be at least 1".to_string());
        }

        if self.manifest_path.file_name().is_none() {
            return Err(format!(
                "Invalid manifest path: {}",
                self.manifest_path.display()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parallelism: &str) -> Args {
        Args::try_parse_from(["kodegen_bundler_archive", "-a", "bins.json", "-p", parallelism])
            .unwrap()
    }

    #[test]
    fn parses_short_flags() {
        let args = parse("3");
        assert_eq!(args.artifacts, PathBuf::from("bins.json"));
        assert_eq!(args.manifest_path, PathBuf::from("Cargo.toml"));
        assert_eq!(args.parallelism, Some(3));
        args.validate().unwrap();
    }

    #[test]
    fn zero_parallelism_is_invalid() {
        let args = parse("0");
        assert!(args.validate().is_err());
    }
}
