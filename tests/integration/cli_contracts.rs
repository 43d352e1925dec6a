use crate::support::{config_for, manifest_json, Route, TestServer};
use clap::Parser;
use docket::config::ConfigLoader;
use docket::tooling::cli::{Cli, CliContext, Commands};
use docket::tooling::format::EMPTY_STATE_MESSAGE;
use std::fs;
use tempfile::TempDir;

fn offline_context(temp: &TempDir) -> CliContext {
    let root = temp.path().to_path_buf();
    let config = ConfigLoader::default_for(&root);
    CliContext::with_config(root, config)
}

#[test]
fn build_json_contract_has_required_fields() {
    let temp = TempDir::new().unwrap();
    let cli = offline_context(&temp);
    let source = &cli.config().manifest.source_dir;
    fs::create_dir_all(source).unwrap();
    fs::write(source.join("my_cv.pdf"), b"x").unwrap();

    let output = cli
        .execute(&Commands::Build {
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let entries = parsed.get("entries").and_then(|v| v.as_array()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["filename"], "my_cv.pdf");
    assert_eq!(entries[0]["title"], "My Cv");
    assert!(parsed.get("output_path").and_then(|v| v.as_str()).is_some());
    assert_eq!(
        parsed
            .get("fingerprint")
            .and_then(|v| v.as_str())
            .map(str::len),
        Some(64)
    );
    assert!(parsed
        .get("created_source_dir")
        .and_then(|v| v.as_bool())
        .is_some());
}

#[test]
fn inspect_json_reports_skipped_entries() {
    let temp = TempDir::new().unwrap();
    let cli = offline_context(&temp);
    let output_path = &cli.config().manifest.output_path;
    fs::create_dir_all(output_path.parent().unwrap()).unwrap();
    fs::write(
        output_path,
        r#"[{"filename":"a.pdf","title":"A","path":"/p/a.pdf"},{"title":"orphan"},{"filename":"a.pdf"}]"#,
    )
    .unwrap();

    let output = cli
        .execute(&Commands::Inspect {
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["entries"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["skipped"].as_array().unwrap().len(), 2);
    assert!(parsed["path"].as_str().is_some());
}

#[test]
fn inspect_without_manifest_fails_with_path() {
    let temp = TempDir::new().unwrap();
    let cli = offline_context(&temp);
    let err = cli
        .execute(&Commands::Inspect {
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("financeManifest.json"));
}

#[test]
fn scan_json_contract_includes_presentation_fields() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route(
        "/manifest.json",
        Route::json(&manifest_json(&["Almond - Financial Analysis.pdf"])),
    );
    server.route(
        "/docs/Almond%20-%20Financial%20Analysis.pdf",
        Route::document(204800),
    );
    server.route(
        "/projects/covers/Almond%20-%20Financial%20Analysis.jpg",
        Route::document(5120),
    );
    let cli = CliContext::with_config(
        temp.path().to_path_buf(),
        config_for(temp.path(), &server),
    );

    let output = cli
        .execute(&Commands::Scan {
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["count"], 1);
    let file = &parsed["files"][0];
    assert_eq!(file["name"], "Almond - Financial Analysis.pdf");
    assert_eq!(file["displayName"], "Almond Financial Analysis");
    assert_eq!(file["type"], "pdf");
    assert_eq!(file["size"], 204800);
    assert_eq!(file["category"], "Analysis");
    assert_eq!(file["lastModified"], "2025-01-01T00:00:00Z");
    assert_eq!(
        file["coverPath"],
        "/projects/covers/Almond - Financial Analysis.jpg"
    );
    assert!(server
        .requests()
        .contains(&"HEAD /projects/covers/Almond%20-%20Financial%20Analysis.jpg".to_string()));
}

#[test]
fn scan_json_uses_default_cover_when_image_is_missing() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json(&manifest_json(&["budget.pdf"])));
    server.route("/docs/budget.pdf", Route::document(2048));
    let mut config = config_for(temp.path(), &server);
    config.scanner.default_cover = "/img/fallback.jpg".to_string();
    let cli = CliContext::with_config(temp.path().to_path_buf(), config);

    let output = cli
        .execute(&Commands::Scan {
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["count"], 1);
    assert_eq!(parsed["files"][0]["coverPath"], "/img/fallback.jpg");
    assert!(server
        .requests()
        .contains(&"HEAD /projects/covers/budget.jpg".to_string()));
}

#[test]
fn scan_text_shows_empty_state() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json("[]"));
    let cli = CliContext::with_config(
        temp.path().to_path_buf(),
        config_for(temp.path(), &server),
    );

    let output = cli
        .execute(&Commands::Scan {
            format: "text".to_string(),
        })
        .unwrap();
    assert_eq!(output.trim(), EMPTY_STATE_MESSAGE);
}

#[test]
fn scan_total_failure_is_an_error() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::status(500));
    let cli = CliContext::with_config(
        temp.path().to_path_buf(),
        config_for(temp.path(), &server),
    );

    let err = cli
        .execute(&Commands::Scan {
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(err.to_string().starts_with("Manifest unavailable"));
}

#[test]
fn watch_stops_after_requested_cycles() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start();
    server.route("/manifest.json", Route::json(&manifest_json(&["a.pdf"])));
    server.route("/docs/a.pdf", Route::document(1));
    let cli = CliContext::with_config(
        temp.path().to_path_buf(),
        config_for(temp.path(), &server),
    );

    let output = cli
        .execute(&Commands::Watch {
            interval_secs: Some(1),
            cycles: Some(2),
        })
        .unwrap();
    assert!(output.contains("stopped after 2 scan(s)"));
}

#[test]
fn unknown_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    let cli = offline_context(&temp);
    assert!(cli
        .execute(&Commands::Build {
            format: "yaml".to_string(),
        })
        .is_err());
}

#[test]
fn config_file_flag_replaces_file_layers() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("custom.toml");
    fs::write(
        &config_path,
        "[manifest]\nsource_dir = \"docs\"\noutput_path = \"out/manifest.json\"\nextensions = [\"pdf\", \"docx\"]\n",
    )
    .unwrap();

    let cli = CliContext::new(temp.path().to_path_buf(), Some(config_path)).unwrap();
    assert_eq!(cli.config().manifest.source_dir, temp.path().join("docs"));
    fs::create_dir_all(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("docs/letter.docx"), b"x").unwrap();

    cli.execute(&Commands::Build {
        format: "text".to_string(),
    })
    .unwrap();
    let written = fs::read_to_string(temp.path().join("out/manifest.json")).unwrap();
    assert!(written.contains("letter.docx"));
}

#[test]
fn cli_parses_subcommands_and_global_flags() {
    let cli = Cli::try_parse_from([
        "docket",
        "--root",
        "site",
        "--log-level",
        "debug",
        "scan",
        "--format",
        "json",
    ])
    .unwrap();
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert!(matches!(cli.command, Commands::Scan { ref format } if format == "json"));

    let cli = Cli::try_parse_from(["docket", "dev", "--debounce-ms", "250"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Dev {
            debounce_ms: Some(250),
            batch_window_ms: None
        }
    ));

    assert!(Cli::try_parse_from(["docket", "publish"]).is_err());
}
