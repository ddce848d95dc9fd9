//! Sync coordinator - top-level operation orchestration
//!
//! This module ties the pipeline together for each operation:
//! - Searching the catalog for series
//! - Resolving series listings into issues (recording or reading sentinels)
//! - Planning against the library and dispatching missing issues
//! - Collecting every outcome into a report
//!
//! Every sync walks `Start -> ListingFetched -> Planned -> Dispatched -> Reported`.
//! Only a failure to enumerate the top-level work is returned as an error;
//! per-series and per-issue failures end up in the report.

use crate::catalog::{fetch_listing, HttpFetcher};
use crate::config::{validate, Config};
use crate::library::{Library, LocalStorage, Storage};
use crate::model::{IssueEntry, SeriesEntry, SeriesTarget, WorkItem};
use crate::output::SyncReport;
use crate::pipeline::assemble::Assembler;
use crate::pipeline::dispatch::{run_blocking, ProgressSink, WorkerPool};
use crate::pipeline::plan::{dispatch_order, issue_entries, plan, unique_destinations};
use crate::state::{Outcome, PhaseTracker, SkipReason, SyncPhase};
use crate::url::search_url;
use crate::SyncError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs the catalog operations against one library
pub struct Syncer {
    config: Arc<Config>,
    fetcher: HttpFetcher,
    library: Library,
    pool: WorkerPool,
    assembler: Assembler,
}

impl Syncer {
    /// Creates a syncer writing to the local filesystem
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Syncer)` - Ready to run operations
    /// * `Err(SyncError)` - The configuration is invalid or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, SyncError> {
        Self::with_storage(config, Arc::new(LocalStorage))
    }

    /// Creates a syncer on top of a custom storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Result<Self, SyncError> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let library = Library::new(&config.library, Arc::clone(&storage));
        let pool = WorkerPool::new(&config.concurrency);
        let assembler = Assembler::new(
            fetcher.clone(),
            pool.images().clone(),
            config.images.clone(),
            storage,
        );

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            library,
            pool,
            assembler,
        })
    }

    /// Sends dispatcher progress to `progress` instead of the log
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.pool = self.pool.with_progress(progress);
        self.assembler = self.assembler.with_images(self.pool.images().clone());
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Searches the catalog for series matching `term`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SeriesEntry>)` - Matching series in catalog order (may be empty)
    /// * `Err(SyncError)` - The search page could not be fetched
    pub async fn search(&self, term: &str) -> Result<Vec<SeriesEntry>, SyncError> {
        let url = search_url(&self.config.catalog.base_url, term)?;
        tracing::info!("Searching catalog for '{}'", term);

        let listing =
            fetch_listing(&self.fetcher, url.as_str(), &self.config.catalog.listing_selector)
                .await?;

        tracing::info!("Found {} series", listing.len());
        Ok(listing.into_iter().map(SeriesEntry::from).collect())
    }

    /// Downloads every missing issue of the given series
    ///
    /// Each series gets its folder and origin sentinel; series that cannot be
    /// listed are reported and the rest carry on. All issues of all series are
    /// dispatched as one batch.
    pub async fn download_series(&self, series: Vec<SeriesEntry>) -> Result<SyncReport, SyncError> {
        let mut phases = PhaseTracker::new("download");
        let mut report = SyncReport::new();

        let mut folders = HashSet::new();
        let mut targets = Vec::with_capacity(series.len());
        for entry in series {
            let target = SeriesTarget {
                series_dir: self.library.series_dir(&entry.title),
                remote_url: Some(entry.remote_url),
            };
            if folders.insert(target.series_dir.clone()) {
                targets.push(target);
            } else {
                tracing::warn!(
                    "Skipping '{}': {} is already used by another series",
                    entry.title,
                    target.series_dir.display()
                );
                report.record(
                    WorkItem::Series(target),
                    Outcome::Skipped(SkipReason::FolderCollision),
                );
            }
        }

        tracing::info!("Listing {} series", targets.len());
        let issues = self.resolve_series(targets, &mut report).await;
        phases.advance(SyncPhase::ListingFetched)?;

        self.sync_issues(issues, &mut phases, &mut report).await?;
        Self::finish(phases, report)
    }

    /// Downloads the missing issues of one series into `folder` under the library root
    ///
    /// The series listing is the top-level work here, so failing to fetch it
    /// is returned as an error.
    pub async fn sync_series(&self, url: &str, folder: &str) -> Result<SyncReport, SyncError> {
        let mut phases = PhaseTracker::new("sync-series");
        let mut report = SyncReport::new();

        let series_dir = self.library.series_dir(folder);
        record_origin(&self.library, &series_dir, url).await?;

        let listing =
            fetch_listing(&self.fetcher, url, &self.config.catalog.listing_selector).await?;
        let issues = issue_entries(&series_dir, listing);
        tracing::info!("{}: {} issues listed", series_dir.display(), issues.len());
        phases.advance(SyncPhase::ListingFetched)?;

        self.sync_issues(issues, &mut phases, &mut report).await?;
        Self::finish(phases, report)
    }

    /// Downloads one issue to `destination`, used as given
    ///
    /// An existing file at `destination` is reported as already present.
    pub async fn sync_issue(&self, url: &str, destination: &Path) -> Result<SyncReport, SyncError> {
        let mut phases = PhaseTracker::new("sync-issue");
        let mut report = SyncReport::new();

        let title = destination
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let issue = IssueEntry {
            title,
            remote_url: url.to_string(),
            local_path: destination.to_path_buf(),
        };
        phases.advance(SyncPhase::ListingFetched)?;

        self.sync_issues(vec![issue], &mut phases, &mut report).await?;
        Self::finish(phases, report)
    }

    /// Brings every series in the library up to date
    ///
    /// Series folders are read in name order. A folder without a sentinel is
    /// skipped; a series whose listing cannot be fetched is reported failed.
    pub async fn update_library(&self) -> Result<SyncReport, SyncError> {
        let mut phases = PhaseTracker::new("update");
        let mut report = SyncReport::new();

        let library = self.library.clone();
        let series_dirs = run_blocking(move || Ok(library.series_dirs()?)).await?;
        let targets: Vec<SeriesTarget> = series_dirs
            .into_iter()
            .map(|series_dir| SeriesTarget {
                series_dir,
                remote_url: None,
            })
            .collect();

        tracing::info!(
            "Updating {} series in {}",
            targets.len(),
            self.library.root().display()
        );
        let issues = self.resolve_series(targets, &mut report).await;
        phases.advance(SyncPhase::ListingFetched)?;

        self.sync_issues(issues, &mut phases, &mut report).await?;
        Self::finish(phases, report)
    }

    /// Lists every series concurrently and returns their issues
    ///
    /// Targets with a known origin get it recorded as their sentinel; targets
    /// without one read it from the sentinel. Series that cannot be resolved
    /// are added to `report`.
    async fn resolve_series(
        &self,
        targets: Vec<SeriesTarget>,
        report: &mut SyncReport,
    ) -> Vec<IssueEntry> {
        let fetcher = self.fetcher.clone();
        let library = self.library.clone();
        let selector: Arc<str> = Arc::from(self.config.catalog.listing_selector.as_str());

        let results = self
            .pool
            .series()
            .run_all(targets, move |target: SeriesTarget| {
                let fetcher = fetcher.clone();
                let library = library.clone();
                let selector = Arc::clone(&selector);
                async move { list_issues(&fetcher, &library, &selector, target).await }
            })
            .await;

        let mut issues = Vec::new();
        for (target, result) in results {
            let outcome = Outcome::from_result(&result);
            match result {
                Ok(found) => issues.extend(found),
                Err(SyncError::SentinelMissing { series_dir }) => {
                    tracing::warn!("Skipping {}: no origin recorded", series_dir.display());
                    report.record(WorkItem::Series(target), outcome);
                }
                Err(e) => {
                    tracing::warn!("Could not list {}: {}", target.series_dir.display(), e);
                    report.record(WorkItem::Series(target), outcome);
                }
            }
        }
        issues
    }

    /// Plans `issues` against the library and downloads the missing ones
    async fn sync_issues(
        &self,
        issues: Vec<IssueEntry>,
        phases: &mut PhaseTracker,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let (issues, duplicates) = unique_destinations(issues);
        for issue in duplicates {
            report.record(
                WorkItem::Issue(issue),
                Outcome::Skipped(SkipReason::DuplicateDestination),
            );
        }

        let library = self.library.clone();
        let planned =
            run_blocking(move || Ok(plan(issues, local_path, |path| library.exists(path)))).await?;
        phases.advance(SyncPhase::Planned)?;

        tracing::info!(
            "{} issues to download, {} already present",
            planned.pending.len(),
            planned.present.len()
        );
        for issue in planned.present {
            report.record(
                WorkItem::Issue(issue),
                Outcome::Skipped(SkipReason::AlreadyExists),
            );
        }

        let pending = dispatch_order(planned.pending, local_path);
        let assembler = self.assembler.clone();
        let results = self
            .pool
            .series()
            .run_all(pending, move |issue: IssueEntry| {
                let assembler = assembler.clone();
                async move { assembler.assemble(&issue.remote_url, &issue.local_path).await }
            })
            .await;
        phases.advance(SyncPhase::Dispatched)?;

        for (issue, result) in results {
            match &result {
                Ok(assembled) => report.add_pages(assembled.pages, assembled.dropped),
                Err(e) => tracing::warn!("Failed {}: {}", issue.local_path.display(), e),
            }
            report.record(WorkItem::Issue(issue), Outcome::from_result(&result));
        }
        Ok(())
    }

    fn finish(mut phases: PhaseTracker, mut report: SyncReport) -> Result<SyncReport, SyncError> {
        phases.advance(SyncPhase::Reported)?;
        report.finish();
        Ok(report)
    }
}

impl std::fmt::Debug for Syncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Syncer")
            .field("library", &self.library)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

fn local_path(issue: &IssueEntry) -> PathBuf {
    issue.local_path.clone()
}

async fn record_origin(library: &Library, series_dir: &Path, url: &str) -> Result<(), SyncError> {
    let library = library.clone();
    let (series_dir, url) = (series_dir.to_path_buf(), url.to_string());
    run_blocking(move || Ok(library.record_origin(&series_dir, &url)?)).await
}

async fn read_origin(library: &Library, series_dir: &Path) -> Result<Option<String>, SyncError> {
    let library = library.clone();
    let series_dir = series_dir.to_path_buf();
    run_blocking(move || Ok(library.read_origin(&series_dir)?)).await
}

/// Resolves one series into its issues
async fn list_issues(
    fetcher: &HttpFetcher,
    library: &Library,
    listing_selector: &str,
    target: SeriesTarget,
) -> Result<Vec<IssueEntry>, SyncError> {
    let url = match target.remote_url {
        Some(url) => {
            record_origin(library, &target.series_dir, &url).await?;
            url
        }
        None => read_origin(library, &target.series_dir)
            .await?
            .ok_or_else(|| SyncError::SentinelMissing {
                series_dir: target.series_dir.clone(),
            })?,
    };

    let listing = fetch_listing(fetcher, &url, listing_selector).await?;
    let issues = issue_entries(&target.series_dir, listing);
    tracing::debug!("{}: {} issues listed", target.series_dir.display(), issues.len());
    Ok(issues)
}
