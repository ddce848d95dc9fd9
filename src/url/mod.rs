//! URL handling module for Comic-Sync
//!
//! Builds catalog search URLs and resolves references found on catalog pages.

mod resolve;

pub use resolve::resolve_reference;

use url::Url;

/// Builds the catalog search URL for a search term
///
/// The catalog expects `{base}/?story={term}&s=&type=comic`; the term is
/// percent-encoded.
///
/// # Examples
///
/// ```
/// use comic_sync::url::search_url;
///
/// let url = search_url("https://comics.example.com", "Saga").unwrap();
/// assert_eq!(url.as_str(), "https://comics.example.com/?story=Saga&s=&type=comic");
/// ```
pub fn search_url(base_url: &str, term: &str) -> Result<Url, url::ParseError> {
    let base = Url::parse(base_url)?;
    let mut url = base.join("/")?;
    url.query_pairs_mut()
        .clear()
        .append_pair("story", term)
        .append_pair("s", "")
        .append_pair("type", "comic");
    Ok(url)
}
