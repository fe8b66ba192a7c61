pub mod cache;
pub mod coerce;
pub mod config;
pub mod error;
pub mod normalize;
pub mod report;
pub mod severity;
pub mod state;
pub mod storage;
pub mod types;

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use walkdir::WalkDir;

pub use crate::{
    error::NormalizationError,
    normalize::{normalize, normalize_with, NormalizeOptions, SchemaVariant, ShapeFallback},
    types::ForensicCase,
};

pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub cases: Vec<ForensicCase>,
    pub rejected: Vec<Rejection>,
    pub sources: Vec<String>,
}

pub fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Reads and normalizes one scanner result file.
///
/// Files without a `.json` extension are refused with
/// [`NormalizationError::UnsupportedFileType`] before anything is read.
pub fn normalize_file(path: &Path, opts: &NormalizeOptions) -> anyhow::Result<ForensicCase> {
    if !has_json_extension(path) {
        return Err(NormalizationError::UnsupportedFileType(path.display().to_string()).into());
    }

    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let decoded = String::from_utf8_lossy(&bytes);
    let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);

    let case = normalize_with(text, opts).with_context(|| format!("normalize {}", path.display()))?;
    Ok(case)
}

/// Normalizes every `.json` file under `input`, in file name order, until
/// `max_total_bytes` have been read. A bad file is recorded as a rejection
/// and never aborts the batch.
pub fn normalize_dir(
    input: &Path,
    opts: &NormalizeOptions,
    max_total_bytes: u64,
) -> anyhow::Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    let mut scanned: u64 = 0;

    for entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", input.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_json_extension(path) {
            continue;
        }

        let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if scanned.saturating_add(len) > max_total_bytes {
            tracing::warn!(
                path = %path.display(),
                scanned,
                max_total_bytes,
                "byte budget exhausted; skipping remaining files"
            );
            break;
        }
        scanned += len;

        let source = path.display().to_string();
        match normalize_file(path, opts) {
            Ok(case) => outcome.cases.push(case),
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(path = %source, error = %reason, "rejected scanner output");
                outcome.rejected.push(Rejection {
                    path: source.clone(),
                    reason,
                });
            }
        }
        outcome.sources.push(source);
    }

    tracing::info!(
        accepted = outcome.cases.len(),
        rejected = outcome.rejected.len(),
        "batch normalized"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extension_check_is_case_insensitive() {
        assert!(has_json_extension(Path::new("a/b/results.JSON")));
        assert!(has_json_extension(Path::new("results.json")));
        assert!(!has_json_extension(Path::new("results.json.txt")));
        assert!(!has_json_extension(Path::new("results")));
    }

    #[test]
    fn non_json_path_is_refused_without_reading() {
        let err = normalize_file(Path::new("does-not-exist.csv"), &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NormalizationError>(),
            Some(NormalizationError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.json");
        std::fs::write(&path, "\u{feff}{\"scanInfo\": {\"diskName\": \"usb\"}}").unwrap();
        let case = normalize_file(&path, &NormalizeOptions::default()).unwrap();
        assert_eq!(case.summary.disk_name, "usb");
    }
}
