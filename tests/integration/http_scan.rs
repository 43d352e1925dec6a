use crate::support::{config_for, manifest_json, Route, TestServer};
use chrono::{TimeZone, Utc};
use docket::scanner::DocumentWatcher;
use docket::types::DocumentKind;
use tempfile::TempDir;

const ALMOND: &str = "Almond - Financial Analysis.pdf";
const ALMOND_PATH: &str = "/docs/Almond%20-%20Financial%20Analysis.pdf";

#[tokio::test(flavor = "multi_thread")]
async fn scan_reports_probe_metadata_for_manifest_entries() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json(&manifest_json(&[ALMOND])));
    server.route(ALMOND_PATH, Route::document(204800));

    let config = config_for(temp.path(), &server);
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    let files = watcher.scan().await.unwrap();

    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.name, ALMOND);
    assert_eq!(file.display_name, "Almond Financial Analysis");
    assert_eq!(file.kind, DocumentKind::Pdf);
    assert_eq!(file.size, 204800);
    assert_eq!(
        file.last_modified,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(file.path, server.url(ALMOND_PATH));

    let snapshot = watcher.snapshot();
    assert!(snapshot.error.is_none());
    assert!(!snapshot.loading && !snapshot.is_refreshing);
    assert!(server
        .requests()
        .contains(&format!("HEAD {}", ALMOND_PATH)));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_documents_are_dropped_silently() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route(
        "/manifest.json",
        Route::json(&manifest_json(&["a.pdf", "gone.pdf", "c.docx"])),
    );
    server.route("/docs/a.pdf", Route::document(10));
    server.route("/docs/c.docx", Route::document(30));

    let config = config_for(temp.path(), &server);
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    let files = watcher.scan().await.unwrap();

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "c.docx"]);
    assert_eq!(files[1].kind, DocumentKind::Docx);
    assert!(watcher.snapshot().error.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn manifest_404_falls_back_to_configured_list() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/docs/my_cv.pdf", Route::document(1));

    let mut config = config_for(temp.path(), &server);
    config.scanner.fallback = vec!["my_cv.pdf".to_string(), "absent.pdf".to_string()];
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    let files = watcher.scan().await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].display_name, "My CV");
}

#[tokio::test(flavor = "multi_thread")]
async fn manifest_404_without_fallback_is_empty_state() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();

    let config = config_for(temp.path(), &server);
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    let files = watcher.scan().await.unwrap();

    assert!(files.is_empty());
    assert!(watcher.snapshot().is_empty_state());
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_keeps_previous_files_until_recovery() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json(&manifest_json(&["a.pdf"])));
    server.route("/docs/a.pdf", Route::document(10));

    let config = config_for(temp.path(), &server);
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    watcher.scan().await.unwrap();

    server.route("/manifest.json", Route::status(500));
    assert!(watcher.scan().await.is_err());
    let failed = watcher.snapshot();
    assert_eq!(failed.files.len(), 1);
    assert!(failed.error.is_some());

    server.route("/manifest.json", Route::json(&manifest_json(&[])));
    let recovered = watcher.refetch().await;
    assert!(recovered.error.is_none());
    assert!(recovered.files.is_empty());
    assert_eq!(recovered.scans_completed, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_manifest_is_a_total_failure() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json("{\"not\": \"an array\"}"));

    let config = config_for(temp.path(), &server);
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    assert!(watcher.scan().await.is_err());
    assert!(watcher.snapshot().error.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn local_manifest_file_is_read_from_disk() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/docs/a.pdf", Route::document(10));
    let manifest = temp.path().join("manifest.json");
    std::fs::write(&manifest, manifest_json(&["a.pdf", "b.pdf"])).unwrap();

    let mut config = config_for(temp.path(), &server);
    config.scanner.manifest_location = manifest.display().to_string();
    let watcher = DocumentWatcher::from_config(&config.scanner).unwrap();
    let files = watcher.scan().await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "a.pdf");
}
