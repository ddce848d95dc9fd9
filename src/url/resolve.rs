use url::Url;

/// Resolves a link or image reference found on `base` to an absolute URL
///
/// Relative paths and protocol-relative references (`//host/page.jpg`) are
/// resolved against the page they were found on, so a protocol-relative
/// reference takes the page's scheme.
///
/// Returns None if the reference should be ignored:
/// - empty references and fragment-only anchors
/// - javascript:, mailto:, tel: and data: references
/// - references that do not resolve to an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use comic_sync::url::resolve_reference;
/// use url::Url;
///
/// let page = Url::parse("https://comics.example.com/issue-1/").unwrap();
/// let image = resolve_reference("//cdn.example.com/p1.jpg", &page).unwrap();
/// assert_eq!(image.as_str(), "https://cdn.example.com/p1.jpg");
/// ```
pub fn resolve_reference(reference: &str, base: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    if reference.starts_with("javascript:")
        || reference.starts_with("mailto:")
        || reference.starts_with("tel:")
        || reference.starts_with("data:")
    {
        return None;
    }

    match base.join(reference) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
