//! Integration tests for the sync operations
//!
//! These tests use wiremock to serve a small catalog (search page, series
//! listings, issue pages and page images) and run the search, download and
//! update flows end-to-end against a temporary library.

use comic_sync::config::{Config, LibraryConfig};
use comic_sync::pipeline::{Progress, ProgressSink};
use comic_sync::state::SkipReason;
use comic_sync::{FailureKind, Outcome, SeriesEntry, Syncer};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock catalog and a temporary library
fn create_test_config(base_url: &str, root: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.library = LibraryConfig {
        root: root.to_string_lossy().into_owned(),
        ..LibraryConfig::default()
    };
    config.concurrency.series_workers = 4;
    config.concurrency.image_workers = 4;
    // Small pages keep resampling and encoding fast
    config.images.page_width = 64;
    config
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn listing_page(entries: &[(&str, String)]) -> String {
    let items: String = entries
        .iter()
        .map(|(title, href)| format!(r#"<li><a href="{}" title="{}">{}</a></li>"#, href, title, title))
        .collect();
    format!(
        r#"<html><body><div class="nav"><a href="/">Home</a></div>
        <ul class="list-story">{}</ul></body></html>"#,
        items
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Mounts `/{slug}` as an issue page with `pages` content images plus the
/// two navigation banners; pages listed in `failing` answer 500
async fn mount_issue(server: &MockServer, slug: &str, pages: usize, failing: &[usize]) {
    let mut html = String::from(r#"<html><body><img src="/static/logo.png">"#);
    for page in 1..=pages {
        html.push_str(&format!(r#"<p><img src="/img/{}/{}.png"></p>"#, slug, page));
    }
    html.push_str(r#"<img src="/static/footer.png"></body></html>"#);
    mount_html(server, &format!("/{}", slug), html).await;

    for page in 1..=pages {
        let response = if failing.contains(&page) {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_raw(png(32, 48), "image/png")
        };
        Mock::given(method("GET"))
            .and(path(format!("/img/{}/{}.png", slug, page)))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

fn pdf_pages(file: &Path) -> usize {
    let bytes = std::fs::read(file).expect("issue file should exist");
    lopdf::Document::load_mem(&bytes)
        .expect("issue file should be a PDF")
        .get_pages()
        .len()
}

fn report_paths(report: &comic_sync::SyncReport) -> Vec<PathBuf> {
    report
        .entries()
        .iter()
        .map(|e| e.item.destination().to_path_buf())
        .collect()
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<Progress>>,
}

impl ProgressSink for RecordingProgress {
    fn report(&self, progress: Progress) {
        self.events.lock().unwrap().push(progress);
    }
}

#[tokio::test]
async fn test_search_and_download_then_rerun_is_idempotent() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("story", "saga"))
        .and(query_param("type", "comic"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            listing_page(&[
                ("Saga (2012)", format!("{}/series/saga", base)),
                ("Saga of the Swamp", format!("{}/series/swamp", base)),
            ]),
            "text/html",
        ))
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/series/saga",
        listing_page(&[
            ("Saga 2", format!("{}/saga-2", base)),
            ("Saga 1", format!("{}/saga-1", base)),
        ]),
    )
    .await;
    mount_html(
        &server,
        "/series/swamp",
        listing_page(&[("Swamp 1", format!("{}/swamp-1", base))]),
    )
    .await;
    mount_issue(&server, "saga-1", 3, &[]).await;
    mount_issue(&server, "saga-2", 2, &[]).await;
    mount_issue(&server, "swamp-1", 4, &[]).await;

    let root = TempDir::new().unwrap();
    let syncer = Syncer::new(create_test_config(&base, root.path())).unwrap();

    let series = syncer.search("saga").await.unwrap();
    assert_eq!(
        series,
        vec![
            SeriesEntry {
                title: "Saga (2012)".to_string(),
                remote_url: format!("{}/series/saga", base),
            },
            SeriesEntry {
                title: "Saga of the Swamp".to_string(),
                remote_url: format!("{}/series/swamp", base),
            },
        ]
    );

    let report = syncer.download_series(series.clone()).await.unwrap();

    assert_eq!(report.downloaded(), 3);
    assert_eq!(report.failed(), 0);
    assert!(report.is_clean());

    let saga = root.path().join("Saga 2012");
    let swamp = root.path().join("Saga of the Swamp");
    assert_eq!(pdf_pages(&saga.join("Saga 1.pdf")), 3);
    assert_eq!(pdf_pages(&saga.join("Saga 2.pdf")), 2);
    assert_eq!(pdf_pages(&swamp.join("Swamp 1.pdf")), 4);
    assert_eq!(
        std::fs::read_to_string(saga.join("url.txt")).unwrap().trim(),
        format!("{}/series/saga", base)
    );
    assert_eq!(
        report_paths(&report),
        vec![
            saga.join("Saga 1.pdf"),
            saga.join("Saga 2.pdf"),
            swamp.join("Swamp 1.pdf"),
        ]
    );

    let second = syncer.download_series(series).await.unwrap();
    assert_eq!(second.downloaded(), 0);
    assert_eq!(second.already_present(), 3);
}

#[tokio::test]
async fn test_sync_series_sanitizes_issue_titles() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/series/special",
        listing_page(&[
            ("Issue 1", format!("{}/issue-1", base)),
            ("Issue 2/Special", format!("{}/issue-2", base)),
        ]),
    )
    .await;
    mount_issue(&server, "issue-1", 2, &[]).await;
    mount_issue(&server, "issue-2", 2, &[]).await;

    let root = TempDir::new().unwrap();
    let syncer = Syncer::new(create_test_config(&base, root.path())).unwrap();

    let report = syncer
        .sync_series(&format!("{}/series/special", base), "series")
        .await
        .unwrap();

    let series_dir = root.path().join("series");
    assert_eq!(report.downloaded(), 2);
    assert!(series_dir.join("Issue 1.pdf").is_file());
    assert!(series_dir.join("Issue 2-Special.pdf").is_file());
    assert_eq!(
        report_paths(&report),
        vec![series_dir.join("Issue 1.pdf"), series_dir.join("Issue 2-Special.pdf")]
    );
}

#[tokio::test]
async fn test_partial_issue_kept_and_empty_issue_failed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/series/mixed",
        listing_page(&[
            ("Broken", format!("{}/broken", base)),
            ("Partial", format!("{}/partial", base)),
            ("Whole", format!("{}/whole", base)),
        ]),
    )
    .await;
    mount_issue(&server, "partial", 10, &[3]).await;
    mount_issue(&server, "broken", 10, &(1..=10).collect::<Vec<_>>()).await;
    mount_issue(&server, "whole", 2, &[]).await;

    let root = TempDir::new().unwrap();
    let syncer = Syncer::new(create_test_config(&base, root.path())).unwrap();

    let report = syncer
        .sync_series(&format!("{}/series/mixed", base), "Mixed")
        .await
        .unwrap();

    let series_dir = root.path().join("Mixed");
    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(pdf_pages(&series_dir.join("Partial.pdf")), 9);
    assert_eq!(pdf_pages(&series_dir.join("Whole.pdf")), 2);
    assert!(!series_dir.join("Broken.pdf").exists());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0.destination(), series_dir.join("Broken.pdf"));
    assert_eq!(failures[0].1.kind, FailureKind::NoContent);

    // The failed issue is retried by the next run; nothing else is
    let retry = syncer
        .sync_series(&format!("{}/series/mixed", base), "Mixed")
        .await
        .unwrap();
    assert_eq!(retry.already_present(), 2);
    assert_eq!(retry.failed(), 1);
}

#[tokio::test]
async fn test_update_library() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/series/alpha",
        listing_page(&[
            ("Alpha 1", format!("{}/alpha-1", base)),
            ("Alpha 2", format!("{}/alpha-2", base)),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/series/beta"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_issue(&server, "alpha-2", 2, &[]).await;

    let root = TempDir::new().unwrap();
    let alpha = root.path().join("Alpha");
    let beta = root.path().join("Beta");
    let loose = root.path().join("Loose");
    std::fs::create_dir_all(&alpha).unwrap();
    std::fs::create_dir_all(&beta).unwrap();
    std::fs::create_dir_all(&loose).unwrap();
    std::fs::write(alpha.join("url.txt"), format!("{}/series/alpha\n", base)).unwrap();
    std::fs::write(beta.join("url.txt"), format!("{}/series/beta", base)).unwrap();
    std::fs::write(alpha.join("Alpha 1.pdf"), b"%PDF-1.5").unwrap();

    let syncer = Syncer::new(create_test_config(&base, root.path())).unwrap();
    let report = syncer.update_library().await.unwrap();

    assert_eq!(report.downloaded(), 1);
    assert_eq!(report.already_present(), 1);
    assert_eq!(pdf_pages(&alpha.join("Alpha 2.pdf")), 2);

    let notes: Vec<_> = report.series_notes().collect();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].item.destination(), beta.as_path());
    assert!(notes[0].outcome.is_failed());
    assert_eq!(notes[1].item.destination(), loose.as_path());
    assert_eq!(notes[1].outcome, Outcome::Skipped(SkipReason::SentinelMissing));

    // Untouched: the existing issue was not re-fetched
    assert_eq!(std::fs::read(alpha.join("Alpha 1.pdf")).unwrap(), b"%PDF-1.5");
}

#[tokio::test]
async fn test_report_order_independent_of_listing_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    let issues: Vec<(&str, String)> = ["D", "B", "E", "A", "C"]
        .iter()
        .map(|t| (*t, format!("{}/issue-{}", base, t.to_lowercase())))
        .collect();
    let mut reversed = issues.clone();
    reversed.reverse();

    mount_html(&server, "/series/forward", listing_page(&issues)).await;
    mount_html(&server, "/series/backward", listing_page(&reversed)).await;
    for slug in ["a", "b", "c", "d", "e"] {
        mount_issue(&server, &format!("issue-{}", slug), 1, &[]).await;
    }

    let first_root = TempDir::new().unwrap();
    let second_root = TempDir::new().unwrap();

    let first = Syncer::new(create_test_config(&base, first_root.path()))
        .unwrap()
        .sync_series(&format!("{}/series/forward", base), "S")
        .await
        .unwrap();
    let second = Syncer::new(create_test_config(&base, second_root.path()))
        .unwrap()
        .sync_series(&format!("{}/series/backward", base), "S")
        .await
        .unwrap();

    let strip = |report: &comic_sync::SyncReport, root: &Path| -> Vec<PathBuf> {
        report_paths(report)
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect()
    };
    let expected: Vec<PathBuf> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|t| PathBuf::from(format!("S/{}.pdf", t)))
        .collect();

    assert_eq!(strip(&first, first_root.path()), expected);
    assert_eq!(strip(&second, second_root.path()), expected);
}

#[tokio::test]
async fn test_download_single_issue_with_progress() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_issue(&server, "one-shot", 3, &[]).await;

    let root = TempDir::new().unwrap();
    let progress = Arc::new(RecordingProgress::default());
    let syncer = Syncer::new(create_test_config(&base, root.path()))
        .unwrap()
        .with_progress(progress.clone());

    let dest = root.path().join("loose").join("One Shot.pdf");
    let report = syncer
        .sync_issue(&format!("{}/one-shot", base), &dest)
        .await
        .unwrap();

    assert_eq!(report.downloaded(), 1);
    assert_eq!(pdf_pages(&dest), 3);

    let events = progress.events.lock().unwrap();
    let image_events = events.iter().filter(|p| p.lane == "images").count();
    let series_events = events.iter().filter(|p| p.lane == "series").count();
    assert_eq!(image_events, 3);
    assert_eq!(series_events, 1);
}

#[tokio::test]
async fn test_search_without_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>Nothing here</p></body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let syncer = Syncer::new(create_test_config(&server.uri(), root.path())).unwrap();

    let series = syncer.search("nothing").await.unwrap();
    assert!(series.is_empty());

    let report = syncer.download_series(series).await.unwrap();
    assert_eq!(report.entries().len(), 0);
    assert!(report.is_clean());
}
