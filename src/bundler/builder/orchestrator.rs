//! Concurrent archive building.
//!
//! This module provides the [`Archiver`] orchestrator that schedules one
//! packaging task per archive spec and platform group.

use crate::bundler::{
    archive::{ArchivePathGuard, check_binary_counts, group_binaries, package_group},
    artifact::Artifacts,
    error::{Error, Result},
    settings::Settings,
};
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};

/// Packages binaries from the artifact registry into release archives.
///
/// Each run owns its [`ArchivePathGuard`], so independent archivers never
/// contend with each other.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use kodegen_bundler_archive::bundler::{Archiver, Artifacts, SettingsBuilder};
///
/// # async fn example(binaries: Arc<Artifacts>) -> kodegen_bundler_archive::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_name("myapp")
///     .version("1.0.0")
///     .build_ids(vec!["myapp".into()])
///     .build()?;
///
/// Archiver::new(settings, Arc::clone(&binaries)).run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Archiver {
    settings: Arc<Settings>,
    artifacts: Arc<Artifacts>,
    guard: Arc<ArchivePathGuard>,
}

impl Archiver {
    /// Creates an archiver reading binaries from and registering results in `artifacts`.
    pub fn new(settings: Settings, artifacts: Arc<Artifacts>) -> Self {
        Self {
            settings: Arc::new(settings),
            artifacts,
            guard: Arc::new(ArchivePathGuard::new()),
        }
    }

    /// Returns a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs every packaging task.
    ///
    /// Platform groups of all archive specs are checked before anything is
    /// written. Tasks then run with at most `parallelism` at once. A failing
    /// task does not cancel the others; once all have finished, the first
    /// error observed is returned. Archives written by successful tasks stay
    /// on disk either way.
    pub async fn run(&self) -> Result<()> {
        let mut units = Vec::new();
        for (index, spec) in self.settings.archives().iter().enumerate() {
            let groups = group_binaries(&self.artifacts, spec);
            if let Err(err) = check_binary_counts(index, &groups) {
                if !spec.allow_different_binary_count {
                    return Err(err);
                }
                log::warn!("{err}");
            }

            let spec = Arc::new(spec.clone());
            for (platform, binaries) in groups {
                log::debug!("group {} has {} binaries", platform, binaries.len());
                units.push((Arc::clone(&spec), binaries));
            }
        }

        let settings = &self.settings;
        let artifacts = &self.artifacts;
        let guard = &self.guard;
        run_bounded(settings.parallelism(), units, |(spec, binaries)| {
            let settings = Arc::clone(settings);
            let artifacts = Arc::clone(artifacts);
            let guard = Arc::clone(guard);
            async move { package_group(&settings, &guard, &artifacts, &spec, binaries).await }
        })
        .await
    }
}

/// Runs `task` for every unit with at most `parallelism` running at once.
///
/// Every unit runs to completion; the first error observed is returned.
async fn run_bounded<T, F, Fut>(parallelism: usize, units: Vec<T>, task: F) -> Result<()>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut join_set = JoinSet::new();

    for unit in units {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::GenericError(format!("packaging scheduler closed: {e}")))?;
        let work = task(unit);

        join_set.spawn(async move {
            let _permit = permit;
            work.await
        });
    }

    let mut first_error = None;
    while let Some(joined) = join_set.join_next().await {
        let result = joined
            .map_err(|e| Error::GenericError(format!("packaging task panicked: {e}")))
            .and_then(|r| r);
        if let Err(err) = result {
            log::error!("{err}");
            first_error.get_or_insert(err);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[derive(Default)]
    struct Gauge {
        running: AtomicUsize,
        peak: AtomicUsize,
        finished: AtomicUsize,
    }

    async fn peak_for(parallelism: usize, units: usize) -> usize {
        let gauge = Arc::new(Gauge::default());
        run_bounded(parallelism, (0..units).collect(), |_| {
            let gauge = Arc::clone(&gauge);
            async move {
                let now = gauge.running.fetch_add(1, Ordering::SeqCst) + 1;
                gauge.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                gauge.running.fetch_sub(1, Ordering::SeqCst);
                gauge.finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();
        assert_eq!(gauge.finished.load(Ordering::SeqCst), units);
        gauge.peak.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn parallelism_caps_running_tasks() {
        assert_eq!(peak_for(1, 5).await, 1);
        assert_eq!(peak_for(2, 6).await, 2);
    }

    #[tokio::test]
    async fn failure_does_not_cancel_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let err = run_bounded(2, (0..4).collect(), |i: usize| {
            let finished = Arc::clone(&finished);
            async move {
                if i == 0 {
                    return Err(Error::GenericError("unit 0 failed".into()));
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "unit 0 failed");
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }
}
