//! Search result listing

use crate::model::SeriesEntry;

/// Width of the title column
const TITLE_WIDTH: usize = 60;

/// Formats search results, one block per series
///
/// Each block is the title padded to 60 columns, followed by the series URL
/// when `with_url` is set, and a blank line.
///
/// # Example
///
/// ```
/// use comic_sync::output::format_search_results;
/// use comic_sync::SeriesEntry;
///
/// let series = vec![SeriesEntry {
///     title: "Saga".to_string(),
///     remote_url: "https://comics.example.com/saga".to_string(),
/// }];
/// assert_eq!(format_search_results(&series, false), "Saga\n\n");
/// ```
pub fn format_search_results(series: &[SeriesEntry], with_url: bool) -> String {
    if series.is_empty() {
        return "No comics found.\n".to_string();
    }

    let mut out = String::new();
    for entry in series {
        let line = if with_url {
            format!("{:<width$} {}", entry.title, entry.remote_url, width = TITLE_WIDTH)
        } else {
            format!("{:<width$}", entry.title, width = TITLE_WIDTH)
        };
        out.push_str(line.trim());
        out.push_str("\n\n");
    }
    out
}
