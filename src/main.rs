//! Kodegen Bundler Archive - release archive packager for Rust binaries.
//!
//! This binary packages per-platform binaries and their license, readme and
//! changelog files into release archives and records the produced artifacts.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match kodegen_bundler_archive::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
