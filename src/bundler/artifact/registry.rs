//! Append-only artifact registry.

use super::{Artifact, ArtifactKind};
use std::{collections::BTreeMap, sync::Mutex};

/// Predicate over artifacts.
pub type Filter = Box<dyn Fn(&Artifact) -> bool + Send + Sync>;

/// Matches artifacts of the given kind.
pub fn by_kind(kind: ArtifactKind) -> Filter {
    Box::new(move |a| a.kind == kind)
}

/// Matches artifacts whose `ID` extra is one of `ids`.
pub fn by_ids(ids: &[String]) -> Filter {
    let ids = ids.to_vec();
    Box::new(move |a| a.id().is_some_and(|id| ids.iter().any(|i| i == id)))
}

/// Matches artifacts accepted by every filter.
pub fn and(filters: Vec<Filter>) -> Filter {
    Box::new(move |a| filters.iter().all(|f| f(a)))
}

/// Thread-safe, append-only list of artifacts.
///
/// Entries are never removed or rewritten. Reads operate on a snapshot taken
/// under the lock, so concurrent appends never observe a partial state.
#[derive(Debug, Default)]
pub struct Artifacts {
    items: Mutex<Vec<Artifact>>,
}

impl Artifacts {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an artifact.
    pub fn add(&self, artifact: Artifact) {
        log::debug!("added new artifact {} ({:?})", artifact.name, artifact.kind);
        self.lock().push(artifact);
    }

    /// Snapshot of every artifact, in insertion order.
    pub fn list(&self) -> Vec<Artifact> {
        self.lock().clone()
    }

    /// Snapshot of the artifacts accepted by `filter`, in insertion order.
    pub fn filter(&self, filter: &Filter) -> Vec<Artifact> {
        self.lock().iter().filter(|a| filter(a)).cloned().collect()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Groups artifacts by [`Platform::key`](super::Platform::key).
    ///
    /// Groups iterate in key order; each group keeps the input order.
    pub fn group_by_platform(artifacts: Vec<Artifact>) -> BTreeMap<String, Vec<Artifact>> {
        let mut groups: BTreeMap<String, Vec<Artifact>> = BTreeMap::new();
        for artifact in artifacts {
            groups.entry(artifact.platform.key()).or_default().push(artifact);
        }
        groups
    }

    // Only whole entries are ever pushed, so a poisoned list is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Artifact>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<Vec<Artifact>> for Artifacts {
    fn from(items: Vec<Artifact>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}
