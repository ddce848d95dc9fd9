//! Bounded concurrent dispatch
//!
//! This module handles:
//! - Concurrency limiting via one semaphore per lane
//! - Failure isolation: an error or panic in one worker fails only its item
//! - Correlating results back to the planned order
//! - Progress reporting (completed / total)

use crate::config::ConcurrencyConfig;
use crate::SyncError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Progress of one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub lane: &'static str,
    pub completed: usize,
    pub total: usize,
}

/// Receives progress updates from a dispatcher
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

/// Logs progress through `tracing`
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: Progress) {
        if progress.completed == progress.total {
            tracing::info!(
                "{}: {}/{} complete",
                progress.lane,
                progress.completed,
                progress.total
            );
        } else {
            tracing::debug!(
                "{}: {}/{} complete",
                progress.lane,
                progress.completed,
                progress.total
            );
        }
    }
}

/// Runs work items on a bounded number of concurrent tasks
///
/// Clones share the same permits, so every batch run through clones of one
/// dispatcher counts against one bound.
#[derive(Clone)]
pub struct Dispatcher {
    lane: &'static str,
    limit: usize,
    permits: Arc<Semaphore>,
    progress: Arc<dyn ProgressSink>,
}

impl Dispatcher {
    /// Creates a dispatcher running at most `limit` items at once (minimum 1)
    pub fn new(lane: &'static str, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            lane,
            limit,
            permits: Arc::new(Semaphore::new(limit)),
            progress: Arc::new(LogProgress),
        }
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn lane(&self) -> &'static str {
        self.lane
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `worker` over every item and returns each item with its result
    ///
    /// Items may complete in any order; the returned vector is in the order of
    /// `items`. A worker error, or a panic inside a worker, is that item's
    /// result only and never stops the rest of the batch.
    pub async fn run_all<I, T, F, Fut>(&self, items: Vec<I>, worker: F) -> Vec<(I, Result<T, SyncError>)>
    where
        I: Clone + Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let worker = Arc::new(worker);
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = items
            .iter()
            .cloned()
            .map(|item| {
                let permits = Arc::clone(&self.permits);
                let worker = Arc::clone(&worker);
                let completed = Arc::clone(&completed);
                let progress = Arc::clone(&self.progress);
                let lane = self.lane;

                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| SyncError::Worker(format!("{} pool is closed", lane)))?;

                    let result = worker(item).await;

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.report(Progress {
                        lane,
                        completed: done,
                        total,
                    });
                    result
                })
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        for (item, handle) in items.into_iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("{} worker crashed: {}", self.lane, e);
                    Err(SyncError::Worker(e.to_string()))
                }
            };
            results.push((item, result));
        }

        results
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lane", &self.lane)
            .field("limit", &self.limit)
            .field("available", &self.permits.available_permits())
            .finish()
    }
}

/// Runs filesystem, decoding or rendering work on tokio's blocking pool
///
/// A panic inside `work` becomes `SyncError::Worker`.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, SyncError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SyncError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SyncError::Worker(e.to_string()))?
}

/// The two worker lanes shared by every operation
///
/// Series listings and issue syncs share the `series` lane; page-image
/// fetches inside issues use the independent `images` lane, so an issue
/// holding a series permit never waits on another series permit.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    series: Dispatcher,
    images: Dispatcher,
}

impl WorkerPool {
    pub fn new(config: &ConcurrencyConfig) -> Self {
        Self {
            series: Dispatcher::new("series", config.series_workers),
            images: Dispatcher::new("images", config.image_workers),
        }
    }

    /// Replaces the progress sink of both lanes
    pub fn with_progress(self, progress: Arc<dyn ProgressSink>) -> Self {
        Self {
            series: self.series.with_progress(Arc::clone(&progress)),
            images: self.images.with_progress(progress),
        }
    }

    pub fn series(&self) -> &Dispatcher {
        &self.series
    }

    pub fn images(&self) -> &Dispatcher {
        &self.images
    }
}
