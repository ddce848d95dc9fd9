//! Interactive selection of search results
//!
//! The search-and-download flow can narrow the series list down to the ones
//! the user picks. The picker is a trait so the flow runs without a terminal
//! in tests.

use crate::model::SeriesEntry;
use crate::SyncError;
use dialoguer::MultiSelect;

/// Chooses a subset of titles
pub trait SubsetSelector {
    /// Returns the indices of the chosen titles
    fn select(&self, titles: &[String]) -> Result<Vec<usize>, SyncError>;
}

/// Multi-select prompt on the controlling terminal
#[derive(Debug, Clone)]
pub struct TerminalSelector {
    prompt: String,
}

impl TerminalSelector {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalSelector {
    fn default() -> Self {
        Self::new("Select comics to download (space to toggle, enter to confirm)")
    }
}

impl SubsetSelector for TerminalSelector {
    fn select(&self, titles: &[String]) -> Result<Vec<usize>, SyncError> {
        MultiSelect::new()
            .with_prompt(&self.prompt)
            .items(titles)
            .interact()
            .map_err(|e| SyncError::Selection(e.to_string()))
    }
}

/// Keeps the series picked by `selector`, in listing order
///
/// Out-of-range and repeated indices are ignored.
pub fn apply_selection(
    series: Vec<SeriesEntry>,
    selector: &dyn SubsetSelector,
) -> Result<Vec<SeriesEntry>, SyncError> {
    if series.is_empty() {
        return Ok(series);
    }

    let titles: Vec<String> = series.iter().map(|s| s.title.clone()).collect();
    let mut chosen = vec![false; series.len()];
    for index in selector.select(&titles)? {
        match chosen.get_mut(index) {
            Some(slot) => *slot = true,
            None => tracing::debug!("Ignoring out-of-range selection {}", index),
        }
    }

    let picked: Vec<SeriesEntry> = series
        .into_iter()
        .zip(chosen)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect();

    tracing::info!("{} of {} series selected", picked.len(), titles.len());
    Ok(picked)
}
