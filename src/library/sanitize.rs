/// Extension of materialized issues
pub const ISSUE_EXTENSION: &str = "pdf";

const FALLBACK_NAME: &str = "untitled";

/// Turns a catalog title into a path component
///
/// `/` and `\` become `-`, `(` and `)` are removed and surrounding
/// whitespace is trimmed. A result that is empty or only dots becomes
/// `untitled`. The same function names series folders and issue files, so a
/// destination computed when planning matches the one checked later.
///
/// # Examples
///
/// ```
/// use comic_sync::library::sanitize;
///
/// assert_eq!(sanitize("Issue 2/Special"), "Issue 2-Special");
/// assert_eq!(sanitize("Saga (2012)"), "Saga 2012");
/// ```
pub fn sanitize(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// File name of an issue: `sanitize(title).pdf`
pub fn issue_file_name(issue_title: &str) -> String {
    format!("{}.{}", sanitize(issue_title), ISSUE_EXTENSION)
}
