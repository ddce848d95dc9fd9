//! Catalog module for remote page access
//!
//! This module contains everything that talks to the remote catalog:
//! - HTTP fetching of catalog pages and page images
//! - Listing extraction (series on a search page, issues on a series page)
//! - Issue page image extraction

mod fetcher;
mod parser;

pub use fetcher::{build_http_client, Document, HttpFetcher};
pub use parser::{extract_entries, extract_page_images, ListingEntry, PageReferences};

use crate::FetchError;

/// Fetches a listing page and extracts its entries
///
/// A fetch failure is returned; a page without the listing container is an
/// empty listing.
pub async fn fetch_listing(
    fetcher: &HttpFetcher,
    url: &str,
    listing_selector: &str,
) -> Result<Vec<ListingEntry>, FetchError> {
    let document = fetcher.fetch_document(url).await?;
    let entries = document.entries(listing_selector);
    tracing::debug!("{} entries listed on {}", entries.len(), url);
    Ok(entries)
}
