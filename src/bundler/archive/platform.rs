//! Platform grouping and binary-count consistency.

use crate::bundler::{
    artifact::{Artifact, ArtifactKind, Artifacts, and, by_ids, by_kind},
    error::{Error, Result},
    settings::ArchiveSpec,
};
use std::collections::{BTreeMap, BTreeSet};

/// Binaries of `spec`'s builds, grouped by platform key.
pub fn group_binaries(
    artifacts: &Artifacts,
    spec: &ArchiveSpec,
) -> BTreeMap<String, Vec<Artifact>> {
    let filter = and(vec![by_kind(ArtifactKind::Binary), by_ids(&spec.builds)]);
    Artifacts::group_by_platform(artifacts.filter(&filter))
}

/// Fails when the groups of archive spec `index` hold different binary counts.
pub fn check_binary_counts(index: usize, groups: &BTreeMap<String, Vec<Artifact>>) -> Result<()> {
    let counts: BTreeSet<usize> = groups.values().map(Vec::len).collect();
    if counts.len() <= 1 {
        return Ok(());
    }

    Err(Error::DifferentBinaryCount {
        index,
        counts: counts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}
