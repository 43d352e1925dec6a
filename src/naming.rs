//! Filename-derived naming
//!
//! Pure functions shared by the manifest builder and the document watcher:
//! display titles, acronym restoration, and document kind inference. The
//! watcher re-derives names itself rather than trusting manifest titles, so
//! stale manifests and fallback lists still render consistently.

use crate::types::DocumentKind;
use unicode_normalization::UnicodeNormalization;

/// Short tokens restored to uppercase after title-casing.
pub const ACRONYMS: [&str; 4] = ["CV", "API", "UI", "ID"];

/// Remove the final `.ext` from a filename.
///
/// The extension must be non-empty and must not contain a path separator;
/// `"report."` is returned unchanged.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => {
            let ext = &filename[idx + 1..];
            if ext.is_empty() || ext.contains('/') {
                filename
            } else {
                &filename[..idx]
            }
        }
        None => filename,
    }
}

/// Lowercased final extension, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let stem = strip_extension(filename);
    if stem.len() == filename.len() {
        return None;
    }
    Some(filename[stem.len() + 1..].to_lowercase())
}

/// Case-insensitive check that `filename` ends in `.{ext}` for one of `extensions`.
pub fn matches_extension(filename: &str, extensions: &[String]) -> bool {
    let lower = filename.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        !ext.is_empty() && lower.len() > ext.len() + 1 && lower.ends_with(&format!(".{}", ext))
    })
}

/// Title-case naming rule.
///
/// Strips the extension, turns runs of `-`/`_` into single spaces, collapses
/// whitespace, and uppercases the first character of every word.
///
/// `"wine_production-financial_analysis.pdf"` becomes
/// `"Wine Production Financial Analysis"`.
pub fn derive_title(filename: &str) -> String {
    let normalized: String = filename.nfc().collect();
    let stem = strip_extension(&normalized);
    let spaced: String = stem
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();

    spaced
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case naming rule plus acronym restoration (`"my_cv.pdf"` -> `"My CV"`).
pub fn derive_display_name(filename: &str) -> String {
    derive_title(filename)
        .split(' ')
        .map(restore_acronyms)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Document kind from the extension; anything unrecognized is a PDF.
pub fn infer_type(filename: &str) -> DocumentKind {
    match extension_of(filename).as_deref() {
        Some("ppt") => DocumentKind::Ppt,
        Some("pptx") => DocumentKind::Pptx,
        Some("doc") => DocumentKind::Doc,
        Some("docx") => DocumentKind::Docx,
        _ => DocumentKind::Pdf,
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn restore_acronyms(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut token = String::new();
    for ch in word.chars() {
        if ch.is_alphanumeric() {
            token.push(ch);
        } else {
            flush_token(&mut out, &mut token);
            out.push(ch);
        }
    }
    flush_token(&mut out, &mut token);
    out
}

fn flush_token(out: &mut String, token: &mut String) {
    if token.is_empty() {
        return;
    }
    match ACRONYMS.iter().find(|a| a.eq_ignore_ascii_case(token)) {
        Some(acronym) => out.push_str(acronym),
        None => out.push_str(token),
    }
    token.clear();
}
