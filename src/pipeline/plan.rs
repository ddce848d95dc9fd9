//! Dedup planning
//!
//! Turns listing entries into issues with destinations and filters out the
//! issues that are already present locally. Planning is pure: the existence
//! check is injected, so the same functions run against the filesystem or a
//! fixed set of paths in tests.

use crate::catalog::ListingEntry;
use crate::library::{issue_file_name, sanitize, ISSUE_EXTENSION};
use crate::model::IssueEntry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Candidates split by whether their destination already exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan<T> {
    /// Destination absent; to be dispatched (input order preserved)
    pub pending: Vec<T>,

    /// Destination present; reported as skipped (input order preserved)
    pub present: Vec<T>,
}

impl<T> Plan<T> {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Splits `entries` into those whose destination is missing and those already present
///
/// Both halves keep the input's relative order.
///
/// # Example
///
/// ```
/// use comic_sync::pipeline::plan;
/// use std::path::{Path, PathBuf};
///
/// let entries = vec!["A", "B", "C"];
/// let local = [PathBuf::from("A.pdf"), PathBuf::from("B.pdf")];
/// let plan = plan(
///     entries,
///     |e| PathBuf::from(format!("{e}.pdf")),
///     |p: &Path| local.iter().any(|l| l == p),
/// );
/// assert_eq!(plan.pending, vec!["C"]);
/// ```
pub fn plan<T, D, E>(entries: Vec<T>, destination: D, exists: E) -> Plan<T>
where
    D: Fn(&T) -> PathBuf,
    E: Fn(&Path) -> bool,
{
    let (present, pending): (Vec<T>, Vec<T>) = entries
        .into_iter()
        .partition(|entry| exists(&destination(entry)));

    Plan { pending, present }
}

/// Orders work by destination path so reports do not depend on completion order
///
/// The sort is stable; entries with equal destinations keep their relative order.
pub fn dispatch_order<T, D>(mut entries: Vec<T>, destination: D) -> Vec<T>
where
    D: Fn(&T) -> PathBuf,
{
    entries.sort_by_cached_key(|entry| destination(entry));
    entries
}

/// Builds the issues of a series listing with their destinations
///
/// Destinations are `series_dir/sanitize(title).pdf`. When two titles
/// sanitize to the same file name, the first keeps it and later ones get
/// ` [2]`, ` [3]`, ... appended in listing order.
pub fn issue_entries(series_dir: &Path, listing: Vec<ListingEntry>) -> Vec<IssueEntry> {
    let mut taken: HashSet<String> = HashSet::with_capacity(listing.len());

    listing
        .into_iter()
        .map(|entry| {
            let mut file_name = issue_file_name(&entry.title);
            let mut ordinal = 2;
            while !taken.insert(file_name.clone()) {
                file_name = format!("{} [{}].{}", sanitize(&entry.title), ordinal, ISSUE_EXTENSION);
                ordinal += 1;
            }

            if ordinal > 2 {
                tracing::warn!(
                    "Duplicate issue title '{}' in {}, saving as '{}'",
                    entry.title,
                    series_dir.display(),
                    file_name
                );
            }

            IssueEntry {
                title: entry.title,
                remote_url: entry.href,
                local_path: series_dir.join(file_name),
            }
        })
        .collect()
}

/// Splits off every issue whose destination was already claimed by an earlier one
///
/// Returns the kept issues and the dropped duplicates, both in input order.
/// Issues from different series can only meet here when two series titles
/// sanitize to the same folder; the first listed series wins.
pub fn unique_destinations(issues: Vec<IssueEntry>) -> (Vec<IssueEntry>, Vec<IssueEntry>) {
    let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(issues.len());

    issues.into_iter().partition(|issue| {
        let fresh = claimed.insert(issue.local_path.clone());
        if !fresh {
            tracing::warn!(
                "{} is listed twice, keeping the first listing",
                issue.local_path.display()
            );
        }
        fresh
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(titles: &[&str]) -> Vec<ListingEntry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| ListingEntry {
                title: title.to_string(),
                href: format!("https://comics.example.com/issue-{}", i),
            })
            .collect()
    }

    fn local_path(issue: &IssueEntry) -> PathBuf {
        issue.local_path.clone()
    }

    #[test]
    fn test_plan_returns_missing_only() {
        let dir = Path::new("series");
        let issues = issue_entries(dir, listing(&["A", "B", "C"]));
        let local: HashSet<PathBuf> = [dir.join("A.pdf"), dir.join("B.pdf")].into_iter().collect();

        let plan = plan(issues, local_path, |p| local.contains(p));

        let pending: Vec<&str> = plan.pending.iter().map(|i| i.title.as_str()).collect();
        let present: Vec<&str> = plan.present.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(pending, vec!["C"]);
        assert_eq!(present, vec!["A", "B"]);
    }

    #[test]
    fn test_plan_is_empty_when_everything_present() {
        let issues = issue_entries(Path::new("series"), listing(&["A", "B"]));
        let plan = plan(issues, local_path, |_| true);
        assert!(plan.is_empty());
        assert_eq!(plan.present.len(), 2);
    }

    #[test]
    fn test_plan_preserves_input_order() {
        let issues = issue_entries(Path::new("s"), listing(&["Z", "M", "A", "Q"]));
        let plan = plan(issues, local_path, |p| p.ends_with("M.pdf"));
        let pending: Vec<&str> = plan.pending.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(pending, vec!["Z", "A", "Q"]);
    }

    #[test]
    fn test_dispatch_order_independent_of_input_permutation() {
        let forward = issue_entries(Path::new("s"), listing(&["Issue 3", "Issue 1", "Issue 2"]));
        let mut backward = forward.clone();
        backward.reverse();

        let a = dispatch_order(forward, local_path);
        let b = dispatch_order(backward, local_path);

        assert_eq!(a, b);
        let titles: Vec<&str> = a.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Issue 1", "Issue 2", "Issue 3"]);
    }

    #[test]
    fn test_issue_destinations_sanitized() {
        let issues = issue_entries(Path::new("series"), listing(&["Issue 1", "Issue 2/Special"]));
        assert_eq!(issues[0].local_path, Path::new("series/Issue 1.pdf"));
        assert_eq!(issues[1].local_path, Path::new("series/Issue 2-Special.pdf"));
    }

    #[test]
    fn test_destination_recomputed_identically() {
        let before = issue_entries(Path::new("series"), listing(&["Saga (2012)/1"]));
        let after = issue_entries(Path::new("series"), listing(&["Saga (2012)/1"]));
        assert_eq!(
            before[0].local_path.as_os_str().as_encoded_bytes(),
            after[0].local_path.as_os_str().as_encoded_bytes()
        );
    }

    #[test]
    fn test_colliding_titles_disambiguated() {
        let issues = issue_entries(
            Path::new("s"),
            listing(&["Annual (1)", "Annual 1", "Annual/1", "Annual 1"]),
        );
        let names: Vec<PathBuf> = issues.iter().map(|i| i.local_path.clone()).collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("s/Annual 1.pdf"),
                PathBuf::from("s/Annual 1 [2].pdf"),
                PathBuf::from("s/Annual-1.pdf"),
                PathBuf::from("s/Annual 1 [3].pdf"),
            ]
        );
        let unique: HashSet<&PathBuf> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_unique_destinations_keeps_first() {
        let mut issues = issue_entries(Path::new("s"), listing(&["A", "B"]));
        let mut again = issue_entries(Path::new("s"), listing(&["B", "C"]));
        again[0].remote_url = "https://mirror.example.com/b".to_string();
        issues.append(&mut again);

        let (kept, duplicates) = unique_destinations(issues);

        let titles: Vec<&str> = kept.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(kept[1].remote_url, "https://comics.example.com/issue-1");
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].remote_url, "https://mirror.example.com/b");
    }
}
