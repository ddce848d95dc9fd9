//! HTML parser for catalog pages
//!
//! This module handles parsing catalog HTML to extract:
//! - Listing entries (series on a search page, issues on a series page)
//! - Content page images on an issue page

use crate::catalog::fetcher::Document;
use crate::url::resolve_reference;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One (title, link) entry of a listing container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub href: String,
}

/// Extracts the entries of the listing container in document order
///
/// # Extraction Rules
///
/// - Only the first element matching `listing_selector` is read
/// - Each `<li>` child contributes its first `<a href>`
/// - The title is the anchor's `title` attribute, falling back to its text
/// - Items without a usable link or title are skipped
///
/// A page without the container yields an empty listing rather than an error.
///
/// # Example
///
/// ```
/// use comic_sync::catalog::Document;
/// use url::Url;
///
/// let html = r#"<ul class="list-story"><li><a href="/saga-1" title="Saga 1">Saga 1</a></li></ul>"#;
/// let doc = Document::new(Url::parse("https://comics.example.com/").unwrap(), html);
/// let entries = doc.entries("ul.list-story");
/// assert_eq!(entries[0].href, "https://comics.example.com/saga-1");
/// ```
pub fn extract_entries(document: &Document, listing_selector: &str) -> Vec<ListingEntry> {
    let container_selector = match Selector::parse(listing_selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid listing selector '{}': {:?}", listing_selector, e);
            return Vec::new();
        }
    };

    let html = Html::parse_document(document.body());

    let Some(container) = html.select(&container_selector).next() else {
        tracing::debug!("No listing container on {}", document.url());
        return Vec::new();
    };

    let (Ok(item_selector), Ok(anchor_selector)) = (Selector::parse("li"), Selector::parse("a[href]"))
    else {
        return Vec::new();
    };

    container
        .select(&item_selector)
        .filter_map(|item| item.select(&anchor_selector).next())
        .filter_map(|anchor| listing_entry(anchor, document.url()))
        .collect()
}

fn listing_entry(anchor: ElementRef<'_>, base: &Url) -> Option<ListingEntry> {
    let href = resolve_reference(anchor.value().attr("href")?, base)?;

    let title = anchor
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            let text = anchor.text().collect::<String>();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })?;

    Some(ListingEntry {
        title,
        href: href.to_string(),
    })
}

/// Content page images referenced by an issue page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReferences {
    /// Resolved page image URLs in document order
    pub urls: Vec<Url>,

    /// Content images whose `src` is missing or could not be resolved
    pub unresolved: usize,
}

impl PageReferences {
    /// Number of content pages on the issue page, resolvable or not
    pub fn total(&self) -> usize {
        self.urls.len() + self.unresolved
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Extracts the content page images of an issue page, in document order
///
/// Every `<img>` on the page is considered except the first and the last,
/// which are the catalog's navigation banners rather than comic pages.
/// References are resolved against the page URL; unusable ones are counted
/// in `unresolved`.
pub fn extract_page_images(document: &Document) -> PageReferences {
    let Ok(img_selector) = Selector::parse("img") else {
        return PageReferences::default();
    };

    let html = Html::parse_document(document.body());
    let sources: Vec<&str> = html
        .select(&img_selector)
        .map(|img| img.value().attr("src").unwrap_or(""))
        .collect();

    if sources.len() < 3 {
        return PageReferences::default();
    }

    let mut references = PageReferences::default();
    for (position, src) in sources[1..sources.len() - 1].iter().enumerate() {
        match resolve_reference(src, document.url()) {
            Some(url) => references.urls.push(url),
            None => {
                tracing::warn!(
                    "Page {} on {} has no usable image source '{}'",
                    position + 1,
                    document.url(),
                    src
                );
                references.unresolved += 1;
            }
        }
    }
    references
}
