//! Error types for the packaging CLI.
//!
//! This module defines the top-level error types with actionable error messages
//! and recovery suggestions.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Packaging errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        let bundler_error = match self {
            Self::Bundler(e) => root_cause(e),
            Self::Toml(_) => {
                return vec![
                    "Check the [package.metadata.release] section of Cargo.toml".to_string(),
                ];
            }
            Self::Json(_) => {
                return vec![
                    "Check that the artifacts file is a JSON list of binary artifacts".to_string(),
                ];
            }
            _ => return vec!["Check the error message above for specific details".to_string()],
        };

        match bundler_error {
            Error::ArchiveExists { .. } => vec![
                "Two platform groups render to the same archive name; \
                 add {{Os}}/{{Arch}} to name_template"
                    .to_string(),
                "Or clean the dist directory before re-running".to_string(),
            ],
            Error::DuplicateEntry(_) => vec![
                "An extra file has the same destination as another file or a binary".to_string(),
                "Set a destination on the extra file rule or rename the file".to_string(),
            ],
            Error::DuplicateId { .. } => {
                vec!["Give every archive rule a unique id".to_string()]
            }
            Error::DifferentBinaryCount { .. } => vec![
                "Make sure all builds used by the archive target the same platforms".to_string(),
                "Or split it into multiple archives, or set allow_different_binary_count = true"
                    .to_string(),
            ],
            Error::Template { .. } => {
                vec![
                    "Check template syntax and field names (e.g. {{ProjectName}}, {{Os}})"
                        .to_string(),
                ]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

fn root_cause(mut error: &crate::bundler::Error) -> &crate::bundler::Error {
    use crate::bundler::Error;

    loop {
        match error {
            Error::Context(_, inner) | Error::AddFile { error: inner, .. } => error = &**inner,
            _ => return error,
        }
    }
}
