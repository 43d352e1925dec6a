//! Format build reports, manifests, scan results, and watch transitions as text.

use crate::manifest::{BuildReport, ParsedManifest};
use crate::scanner::WatchSnapshot;
use crate::views::DocumentCard;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

/// Shown when a clean scan confirmed no documents.
pub const EMPTY_STATE_MESSAGE: &str = "No documents found.";

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_build_report_text(report: &BuildReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Manifest")));
    out.push_str(&format!("  Output: {}\n", report.output_path.display()));
    out.push_str(&format!("  Entries: {}\n", report.entries.len()));
    out.push_str(&format!(
        "  Fingerprint: {}...\n",
        &report.fingerprint[..report.fingerprint.len().min(12)]
    ));
    if report.created_source_dir {
        out.push_str("  Source directory was missing and has been created\n");
    }
    if !report.entries.is_empty() {
        out.push('\n');
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Filename", "Title"]);
        for entry in &report.entries {
            table.add_row(vec![entry.filename.clone(), entry.title.clone()]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out
}

pub fn format_manifest_text(path: &Path, manifest: &ParsedManifest) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Manifest")));
    out.push_str(&format!("  Path: {}\n", path.display()));
    out.push_str(&format!("  Entries: {}\n", manifest.entries.len()));
    if !manifest.skipped.is_empty() {
        out.push_str(&format!(
            "  {}\n",
            format!("Skipped: {}", manifest.skipped.len()).yellow()
        ));
        for reason in &manifest.skipped {
            out.push_str(&format!("    - {}\n", reason));
        }
    }
    if manifest.entries.is_empty() {
        return out;
    }
    out.push('\n');
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Filename", "Title", "Path"]);
    for entry in &manifest.entries {
        table.add_row(vec![
            entry.filename.clone(),
            entry.title.clone(),
            entry.path.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Scan result as a document table, the empty state, or the error.
pub fn format_scan_text(snapshot: &WatchSnapshot, covers_prefix: &str) -> String {
    let mut out = String::new();
    if let Some(ref error) = snapshot.error {
        out.push_str(&format!("{} {}\n", "Scan failed:".red().bold(), error));
        if snapshot.files.is_empty() {
            return out;
        }
        out.push('\n');
    }
    if snapshot.is_empty_state() {
        out.push_str(EMPTY_STATE_MESSAGE);
        out.push('\n');
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "Document", "Type", "Size", "Modified", "Category"]);
    for file in snapshot.files.iter() {
        let card = DocumentCard::from_file(file, covers_prefix);
        table.add_row(vec![
            card.icon.to_string(),
            card.display_name.clone(),
            card.kind.as_str().to_uppercase(),
            format!("{} KB", card.size_kb()),
            card.last_modified.format("%Y-%m-%d %H:%M").to_string(),
            card.category.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("{} document(s)\n", snapshot.files.len()));
    out
}

/// One line per observable change between two snapshots.
pub fn format_transition(previous: &WatchSnapshot, current: &WatchSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    if current.loading && !previous.loading {
        lines.push(format!("{}", "loading...".dimmed()));
    }
    if current.is_refreshing && !previous.is_refreshing {
        lines.push(format!("{}", "refreshing...".dimmed()));
    }
    if current.scans_completed > previous.scans_completed {
        let diff = current.diff(previous);
        for name in &diff.added {
            lines.push(format!("{} {}", "+".green(), name));
        }
        for name in &diff.removed {
            lines.push(format!("{} {}", "-".red(), name));
        }
        match current.error {
            Some(ref error) => lines.push(format!("{} {}", "error:".red().bold(), error)),
            None if current.files.is_empty() => lines.push(EMPTY_STATE_MESSAGE.to_string()),
            None => lines.push(format!(
                "scan #{}: {} document(s)",
                current.scans_completed,
                current.files.len()
            )),
        }
    }
    lines
}
