mod fields;
mod timeline;
mod variant;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    coerce::{self, Object},
    error::NormalizationError,
    severity::{SeverityRules, SeveritySignals},
    types::{
        FileRecord, FileSizes, FileStatus, FileTypes, Finding, ForensicCase, Statistics, Summary,
    },
};

use fields::{FieldTable, FileFields, FindingFields, Scope};

pub use timeline::reconstruct as reconstruct_timeline;
pub use variant::SchemaVariant;

pub const UNKNOWN_DISK: &str = "Unknown Disk";
pub const UNKNOWN_NAME: &str = "unknown";
pub const DEFAULT_REASON: &str = "Suspicious file detected";

/// What to do with a parseable object that matches no known scanner schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeFallback {
    /// Produce a fully defaulted, empty record.
    #[default]
    Permissive,
    /// Fail with [`NormalizationError::UnrecognizedShape`].
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub shape_fallback: ShapeFallback,
    pub rules: SeverityRules,
}

pub fn normalize(raw: &str) -> Result<ForensicCase, NormalizationError> {
    normalize_with(raw, &NormalizeOptions::default())
}

pub fn normalize_with(
    raw: &str,
    opts: &NormalizeOptions,
) -> Result<ForensicCase, NormalizationError> {
    normalize_at(raw, opts, Utc::now())
}

/// Like [`normalize_with`], with `now` standing in for the current time
/// wherever a timestamp or case id has to be generated.
pub fn normalize_at(
    raw: &str,
    opts: &NormalizeOptions,
    now: DateTime<Utc>,
) -> Result<ForensicCase, NormalizationError> {
    let value: Value = serde_json::from_str(raw)?;
    normalize_value(&value, opts, now)
}

pub fn normalize_value(
    value: &Value,
    opts: &NormalizeOptions,
    now: DateTime<Utc>,
) -> Result<ForensicCase, NormalizationError> {
    let Some(root) = value.as_object() else {
        return Err(NormalizationError::MalformedJson(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(value)
        )));
    };

    let variant = SchemaVariant::detect(root);
    tracing::debug!(variant = variant.as_str(), "detected scanner schema");

    let case = match variant {
        SchemaVariant::ScannerNative => build_case(root, &fields::SCANNER_NATIVE, &opts.rules, now),
        SchemaVariant::Canonical => build_case(root, &fields::CANONICAL, &opts.rules, now),
        SchemaVariant::Unrecognized => match opts.shape_fallback {
            ShapeFallback::Strict => return Err(NormalizationError::UnrecognizedShape),
            ShapeFallback::Permissive => {
                tracing::warn!(
                    keys = root.len(),
                    "payload matches no known scanner schema; producing an empty case"
                );
                build_case(&Object::new(), &fields::CANONICAL, &opts.rules, now)
            }
        },
    };

    tracing::debug!(
        case_id = %case.case_id,
        files = case.files.len(),
        timeline = case.timeline.len(),
        findings = case.suspicious_findings.len(),
        "normalized case"
    );

    Ok(case)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn resolve<'a>(root: &'a Object, scopes: &[Scope]) -> Vec<&'a Object> {
    scopes
        .iter()
        .filter_map(|s| match s {
            Scope::Root => Some(root),
            Scope::Key(k) => root.get(*k).and_then(Value::as_object),
        })
        .collect()
}

fn first_in<'a, T>(scopes: &[&'a Object], f: impl Fn(&'a Object) -> Option<T>) -> Option<T> {
    scopes.iter().find_map(|o| f(*o))
}

fn build_case(
    root: &Object,
    t: &FieldTable,
    rules: &SeverityRules,
    now: DateTime<Utc>,
) -> ForensicCase {
    let summary_scopes = resolve(root, t.summary_scopes);
    let statistics_scopes = resolve(root, t.statistics_scopes);

    let scan_timestamp = first_in(&summary_scopes, |o| coerce::timestamp(o, t.scan_timestamp))
        .unwrap_or_else(|| coerce::format_timestamp(now));

    let summary = Summary {
        disk_name: first_in(&summary_scopes, |o| coerce::string(o, t.disk_name))
            .unwrap_or_else(|| UNKNOWN_DISK.to_string()),
        total_files: first_in(&summary_scopes, |o| coerce::count(o, t.total_files)).unwrap_or(0),
        deleted_files: first_in(&summary_scopes, |o| coerce::count(o, t.deleted_files))
            .unwrap_or(0),
        anomalies_found: first_in(&summary_scopes, |o| coerce::count(o, t.anomalies_found))
            .unwrap_or(0),
        scan_timestamp,
    };

    let case_id = coerce::non_empty_string(root, t.case_id)
        .unwrap_or_else(|| format!("case_{}", now.timestamp_millis()));

    let empty = Object::new();

    let files = coerce::array(root, t.files)
        .map(|items| {
            items
                .iter()
                .map(|v| {
                    file_record(
                        v.as_object().unwrap_or(&empty),
                        &t.file,
                        &summary.scan_timestamp,
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let timeline = t
        .timeline
        .iter()
        .find_map(|k| root.get(*k).filter(|v| v.is_object() || v.is_array()))
        .map(|src| timeline::reconstruct(src, &summary.scan_timestamp))
        .unwrap_or_default();

    let statistics = Statistics {
        file_types: first_in(&statistics_scopes, |o| coerce::object(o, t.file_types))
            .map(fold_file_types)
            .unwrap_or_default(),
        file_sizes: first_in(&statistics_scopes, |o| coerce::object(o, t.file_sizes))
            .map(file_sizes)
            .unwrap_or_default(),
    };

    let scores = ScoreTable::collect(&summary_scopes, t.score_tables);

    let suspicious_findings = coerce::array(root, t.findings)
        .map(|items| {
            items
                .iter()
                .map(|v| finding(v.as_object().unwrap_or(&empty), &t.finding, &scores, rules))
                .collect()
        })
        .unwrap_or_default();

    ForensicCase {
        case_id,
        summary,
        files,
        timeline,
        statistics,
        suspicious_findings,
    }
}

fn file_record(o: &Object, f: &FileFields, default_time: &str) -> FileRecord {
    let file_path = coerce::string(o, f.path).unwrap_or_default();
    let file_name = coerce::non_empty_string(o, f.name)
        .or_else(|| coerce::last_path_segment(&file_path).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let created_at = coerce::timestamp(o, f.created).unwrap_or_else(|| default_time.to_string());
    let modified_at = coerce::timestamp(o, f.modified).unwrap_or_else(|| created_at.clone());

    // Any non-empty deletion marker counts; an unparseable one is pinned to
    // the scan time.
    let deleted_at = coerce::non_empty_string(o, f.deleted_at).map(|raw| {
        coerce::parse_timestamp(&raw)
            .map(coerce::format_timestamp)
            .unwrap_or_else(|| default_time.to_string())
    });

    let status = match coerce::label(o, f.status).as_deref() {
        Some("active") => FileStatus::Active,
        Some("deleted") => FileStatus::Deleted,
        _ => {
            let flagged = f
                .deleted_flag
                .iter()
                .any(|k| o.get(*k).and_then(Value::as_bool) == Some(true));
            if deleted_at.is_some() || flagged {
                FileStatus::Deleted
            } else {
                FileStatus::Active
            }
        }
    };

    FileRecord {
        file_name,
        file_path,
        file_size: coerce::count(o, f.size).unwrap_or(0),
        hash: coerce::string(o, f.hash).unwrap_or_default(),
        created_at,
        modified_at,
        deleted_at,
        status,
    }
}

/// Heuristic scores keyed by lowercased file path.
struct ScoreTable(HashMap<String, f64>);

impl ScoreTable {
    fn collect(scopes: &[&Object], keys: &[&str]) -> Self {
        let mut map = HashMap::new();
        if let Some(table) = first_in(scopes, |o| coerce::object(o, keys)) {
            for (path, v) in table {
                let score = match v {
                    Value::Number(n) => n.as_f64(),
                    Value::Object(o) => coerce::number(o, &["score", "heuristicScore"]),
                    _ => None,
                };
                if let Some(s) = score.filter(|s| s.is_finite()) {
                    map.insert(path.to_lowercase(), s);
                }
            }
        }
        Self(map)
    }

    fn lookup(&self, path: &str) -> Option<f64> {
        self.0.get(&path.to_lowercase()).copied()
    }
}

fn finding(o: &Object, f: &FindingFields, scores: &ScoreTable, rules: &SeverityRules) -> Finding {
    let path = coerce::non_empty_string(o, f.path);
    let file_name = coerce::non_empty_string(o, f.name)
        .or_else(|| {
            path.as_deref()
                .and_then(coerce::last_path_segment)
                .map(str::to_string)
        })
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let rule = coerce::non_empty_string(o, f.reason);

    let entropy_high = f.entropy.iter().any(|k| match o.get(*k) {
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("high"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|bits| rules.entropy_is_high(bits)),
        _ => false,
    });

    let signals = SeveritySignals {
        label: coerce::label(o, f.label),
        score: coerce::number(o, f.score)
            .or_else(|| path.as_deref().and_then(|p| scores.lookup(p))),
        rule: rule.clone(),
        entropy_high,
    };

    Finding {
        file_name,
        reason: rule.unwrap_or_else(|| DEFAULT_REASON.to_string()),
        severity: rules.classify(&signals),
    }
}

fn fold_file_types(src: &Object) -> FileTypes {
    let mut types = FileTypes::default();
    for (category, v) in src {
        let n = coerce::count_value(v).unwrap_or(0);
        let slot = match category.to_ascii_lowercase().as_str() {
            "documents" => &mut types.documents,
            "images" => &mut types.images,
            "videos" => &mut types.videos,
            "executables" => &mut types.executables,
            // "archives" and anything else the scanner invents.
            _ => &mut types.others,
        };
        *slot = slot.saturating_add(n);
    }
    types
}

fn file_sizes(src: &Object) -> FileSizes {
    FileSizes {
        small: coerce::count(src, &["small"]).unwrap_or(0),
        medium: coerce::count(src, &["medium"]).unwrap_or(0),
        large: coerce::count(src, &["large"]).unwrap_or(0),
    }
}
