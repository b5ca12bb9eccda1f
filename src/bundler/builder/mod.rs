//! Archive build orchestration and coordination.
//!
//! This module provides the main [`Archiver`] orchestrator that turns the
//! binaries of a release into uploadable archives.
//!
//! # Overview
//!
//! The archiver:
//! 1. Reads resolved archive rules from [`Settings`](crate::bundler::Settings)
//! 2. Groups the matching binaries of each rule by platform
//! 3. Rejects rules whose groups disagree on binary count
//! 4. Packages every group concurrently, bounded by the configured parallelism
//! 5. Registers the results as uploadable artifacts
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kodegen_bundler_archive::bundler::{
//!     Archiver, Artifact, ArtifactKind, Artifacts, Platform, SettingsBuilder,
//! };
//!
//! # async fn example() -> kodegen_bundler_archive::bundler::Result<()> {
//! let artifacts = Arc::new(Artifacts::from(vec![
//!     Artifact::new(
//!         ArtifactKind::Binary,
//!         "myapp",
//!         "dist/linux_amd64/myapp",
//!         Platform::new("linux", "amd64"),
//!     )
//!     .with_extra("ID", "myapp"),
//! ]));
//!
//! let settings = SettingsBuilder::new()
//!     .project_name("myapp")
//!     .version("1.0.0")
//!     .build_ids(vec!["myapp".into()])
//!     .build()?;
//!
//! Archiver::new(settings, Arc::clone(&artifacts)).run().await?;
//!
//! for artifact in artifacts.list() {
//!     println!("{:?}: {}", artifact.kind, artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod orchestrator;

pub use orchestrator::Archiver;
