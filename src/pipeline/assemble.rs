//! Issue assembly
//!
//! Fetches the page images of one issue, normalizes them and writes them as
//! a single PDF. Individual pages that fail to fetch or decode are dropped;
//! the issue only fails when no page survives.

use crate::catalog::HttpFetcher;
use crate::config::ImageConfig;
use crate::document::{decode_page, render_pdf, PageImage};
use crate::library::Storage;
use crate::pipeline::dispatch::{run_blocking, Dispatcher};
use crate::SyncError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Summary of a written issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembledIssue {
    /// Pages written to the document
    pub pages: usize,

    /// Pages referenced by the issue page but dropped, unusable sources included
    pub dropped: usize,
}

/// Builds issue documents from issue pages
///
/// Page-image fetches go through the `images` dispatcher, which is shared by
/// every issue in flight.
#[derive(Clone)]
pub struct Assembler {
    fetcher: HttpFetcher,
    images: Dispatcher,
    settings: Arc<ImageConfig>,
    storage: Arc<dyn Storage>,
}

impl Assembler {
    pub fn new(
        fetcher: HttpFetcher,
        images: Dispatcher,
        settings: ImageConfig,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            fetcher,
            images,
            settings: Arc::new(settings),
            storage,
        }
    }

    /// Replaces the dispatcher used for page-image fetches
    pub fn with_images(mut self, images: Dispatcher) -> Self {
        self.images = images;
        self
    }

    /// Fetches the issue at `issue_url` and writes it to `destination`
    ///
    /// # Returns
    ///
    /// * `Ok(AssembledIssue)` - The document was written
    /// * `Err(SyncError::Fetch)` - The issue page itself could not be fetched
    /// * `Err(SyncError::NoContent)` - No page survived; nothing was written
    /// * `Err(SyncError)` - The document could not be rendered or stored
    pub async fn assemble(
        &self,
        issue_url: &str,
        destination: &Path,
    ) -> Result<AssembledIssue, SyncError> {
        let document = self.fetcher.fetch_document(issue_url).await?;
        let references = document.page_images();
        if references.urls.is_empty() {
            tracing::warn!(
                "No usable page images on {} ({} referenced)",
                issue_url,
                references.total()
            );
            return Err(SyncError::NoContent {
                destination: destination.to_path_buf(),
            });
        }

        let referenced = references.total();
        let pages = self.fetch_pages(references.urls).await;
        let dropped = referenced - pages.len();

        if pages.is_empty() {
            tracing::warn!(
                "All {} pages of {} failed, nothing written",
                referenced,
                issue_url
            );
            return Err(SyncError::NoContent {
                destination: destination.to_path_buf(),
            });
        }

        let page_count = pages.len();
        self.write_document(pages, destination.to_path_buf()).await?;

        if dropped > 0 {
            tracing::warn!(
                "{}: wrote {} of {} pages",
                destination.display(),
                page_count,
                referenced
            );
        } else {
            tracing::info!("{}: wrote {} pages", destination.display(), page_count);
        }

        Ok(AssembledIssue {
            pages: page_count,
            dropped,
        })
    }

    /// Fetches and decodes every page, keeping the survivors in page order
    async fn fetch_pages(&self, references: Vec<Url>) -> Vec<PageImage> {
        let fetcher = self.fetcher.clone();
        let settings = Arc::clone(&self.settings);
        let items: Vec<(usize, Url)> = references.into_iter().enumerate().collect();

        let results = self
            .images
            .run_all(items, move |(index, url): (usize, Url)| {
                let fetcher = fetcher.clone();
                let settings = Arc::clone(&settings);
                async move {
                    let bytes = fetcher.fetch_bytes(url.as_str()).await?;
                    run_blocking(move || {
                        decode_page(index, &bytes, &settings).map_err(|e| SyncError::Decode {
                            url: url.to_string(),
                            message: e.to_string(),
                        })
                    })
                    .await
                }
            })
            .await;

        results
            .into_iter()
            .filter_map(|((index, url), result)| match result {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!("Dropping page {} ({}): {}", index + 1, url, e);
                    None
                }
            })
            .collect()
    }

    /// Renders and stores the document off the async runtime
    async fn write_document(
        &self,
        pages: Vec<PageImage>,
        destination: PathBuf,
    ) -> Result<(), SyncError> {
        let settings = Arc::clone(&self.settings);
        let storage = Arc::clone(&self.storage);

        run_blocking(move || {
            let pdf = render_pdf(&pages, &settings)?;
            storage.write_file(&destination, &pdf)?;
            Ok(())
        })
        .await
    }
}

impl std::fmt::Debug for Assembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("images", &self.images)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
