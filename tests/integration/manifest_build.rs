use docket::config::ConfigLoader;
use docket::manifest::{parse_manifest, ManifestBuilder, ManifestWatchConfig, ManifestWatchDaemon};
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn builder_for(temp: &TempDir) -> ManifestBuilder {
    ManifestBuilder::new(&ConfigLoader::default_for(temp.path()).manifest)
}

#[test]
fn default_layout_builds_under_root() {
    let temp = TempDir::new().unwrap();
    let builder = builder_for(&temp);
    let source = temp.path().join("public/projects/finance/protected");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("Almond - Financial Analysis.pdf"), b"%PDF").unwrap();
    fs::write(source.join("deck.pptx"), b"x").unwrap();

    let report = builder.build().unwrap();
    assert_eq!(
        report.output_path,
        temp.path().join("src/generated/financeManifest.json")
    );

    let written = fs::read(&report.output_path).unwrap();
    let parsed = parse_manifest(&written).unwrap();
    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.entries[0].title, "Almond Financial Analysis");
    assert_eq!(
        parsed.entries[0].path,
        "/projects/finance/protected/Almond - Financial Analysis.pdf"
    );
}

#[test]
fn repeated_builds_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    let builder = builder_for(&temp);
    builder.ensure_source_dir().unwrap();
    for name in ["z.pdf", "a_b.pdf", "M-n.PDF"] {
        fs::write(builder.source_dir().join(name), b"x").unwrap();
    }

    let first = builder.build().unwrap();
    let first_bytes = fs::read(builder.output_path()).unwrap();
    let second = builder.build().unwrap();
    let second_bytes = fs::read(builder.output_path()).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert!(!second.created_source_dir);
}

#[test]
fn absent_source_directory_yields_empty_manifest() {
    let temp = TempDir::new().unwrap();
    let builder = builder_for(&temp);

    let report = builder.build().unwrap();
    assert!(report.created_source_dir);
    assert!(report.entries.is_empty());
    assert_eq!(fs::read_to_string(builder.output_path()).unwrap(), "[]");
}

fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    check()
}

#[test]
fn dev_watcher_rebuilds_on_qualifying_changes() {
    let temp = TempDir::new().unwrap();
    let builder = builder_for(&temp);
    builder.ensure_source_dir().unwrap();
    let source = builder.source_dir().to_path_buf();
    let output = builder.output_path().to_path_buf();

    let daemon = Arc::new(ManifestWatchDaemon::new(
        builder,
        ManifestWatchConfig {
            debounce_ms: 50,
            batch_window_ms: 20,
            max_batch_size: 100,
        },
    ));
    let handle = daemon.handle();
    let worker = {
        let daemon = Arc::clone(&daemon);
        std::thread::spawn(move || daemon.start().map(|r| r.entries.len()))
    };
    let filenames = || {
        fs::read(&output)
            .ok()
            .and_then(|bytes| parse_manifest(&bytes).ok())
            .map(|m| m.filenames())
    };

    assert!(wait_for(Duration::from_secs(5), || output.exists()));
    // Give the watcher time to register before touching the directory.
    std::thread::sleep(Duration::from_millis(200));

    fs::write(source.join("notes.txt"), b"x").unwrap();
    fs::write(source.join("fresh_report.pdf"), b"x").unwrap();
    let added = wait_for(Duration::from_secs(10), || {
        filenames() == Some(vec!["fresh_report.pdf".to_string()])
    });

    // Let trailing events for the write settle before sampling the count.
    std::thread::sleep(Duration::from_millis(500));
    let settled = daemon.rebuild_count();
    fs::write(source.join("scratch.txt"), b"y").unwrap();
    std::thread::sleep(Duration::from_millis(500));
    let after_text_write = daemon.rebuild_count();

    fs::remove_file(source.join("fresh_report.pdf")).unwrap();
    let removed = wait_for(Duration::from_secs(10), || filenames() == Some(Vec::new()));

    handle.stop();
    let initial = worker.join().unwrap();
    assert_eq!(initial.unwrap(), 0);
    assert!(added);
    assert!(settled >= 1);
    assert_eq!(after_text_write, settled);
    assert!(removed);
    assert_eq!(fs::read_to_string(&output).unwrap().trim(), "[]");
    assert!(daemon.rebuild_count() > settled);
}
