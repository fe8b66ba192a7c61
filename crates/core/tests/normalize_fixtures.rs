use std::path::Path;

use scanlens_core::types::{EventKind, FileStatus, Severity};
use scanlens_core::{normalize_file, NormalizeOptions};

#[test]
fn scanner_native_fixture_maps_every_section() {
    let path = Path::new("../../fixtures/scanner_native.json");
    let case = normalize_file(path, &NormalizeOptions::default()).expect("normalize ok");

    assert_eq!(case.case_id, "case-usb-0192");
    assert_eq!(case.summary.disk_name, "KINGSTON-USB-32GB.dd");
    assert_eq!(case.summary.total_files, 6);
    assert_eq!(case.summary.deleted_files, 2);
    assert_eq!(case.summary.anomalies_found, 4);
    assert_eq!(case.summary.scan_timestamp, "2025-01-03T09:15:00.000Z");

    assert_eq!(case.files.len(), 4);
    let report = &case.files[0];
    assert_eq!(report.file_name, "report.docx");
    assert_eq!(report.file_path, "/Users/jdoe/Documents/report.docx");
    assert_eq!(report.file_size, 48213);
    assert!(report.hash.starts_with("9f2c1d0c"));
    assert_eq!(report.modified_at, "2025-01-02T16:45:12.000Z");
    assert_eq!(report.status, FileStatus::Active);

    let invoice = &case.files[1];
    assert_eq!(invoice.modified_at, invoice.created_at);
    assert_eq!(invoice.status, FileStatus::Active);

    let script = &case.files[2];
    assert_eq!(script.created_at, "2025-01-02T21:03:44.000Z");
    assert_eq!(script.deleted_at.as_deref(), Some("2025-01-03T01:00:00.000Z"));
    assert_eq!(script.status, FileStatus::Deleted);
    assert_eq!(script.hash, "");

    let photo = &case.files[3];
    assert_eq!(photo.file_size, 0);
    assert_eq!(photo.created_at, case.summary.scan_timestamp);
    assert_eq!(photo.deleted_at, None);
    assert_eq!(photo.status, FileStatus::Deleted);

    let timeline: Vec<_> = case
        .timeline
        .iter()
        .map(|e| (e.timestamp.as_str(), e.event, e.count))
        .collect();
    assert_eq!(
        timeline,
        vec![
            ("2025-01-01", EventKind::FileCreated, 3),
            ("2025-01-01", EventKind::FileModified, 1),
            ("2025-01-02", EventKind::FileCreated, 2),
            ("2025-01-02", EventKind::FileDeleted, 1),
            ("2025-01-03", EventKind::FileDeleted, 1),
        ]
    );

    let types = &case.statistics.file_types;
    assert_eq!(
        (types.documents, types.images, types.videos, types.executables, types.others),
        (2, 1, 0, 1, 6)
    );
    let sizes = &case.statistics.file_sizes;
    assert_eq!((sizes.small, sizes.medium, sizes.large), (3, 2, 1));

    let findings: Vec<_> = case
        .suspicious_findings
        .iter()
        .map(|f| (f.file_name.as_str(), f.reason.as_str(), f.severity))
        .collect();
    assert_eq!(
        findings,
        vec![
            ("Invoice_2025.pdf.exe", "Double extension", Severity::High),
            ("upd.sh", "Hidden directory", Severity::Medium),
            ("svch0st.dll", "Trojan.Agent.Gen", Severity::Low),
            ("blob.bin", "Unusual location", Severity::Medium),
            ("notes.txt", "Suspicious file detected", Severity::Low),
        ]
    );
}

#[test]
fn legacy_scanner_fixture_reads_top_level_summary_and_date_map() {
    let path = Path::new("../../fixtures/scanner_legacy.json");
    let case = normalize_file(path, &NormalizeOptions::default()).expect("normalize ok");

    assert!(case.case_id.starts_with("case_"));
    assert_eq!(case.summary.disk_name, "WD-Blue-500G.E01");
    assert_eq!(case.summary.scan_timestamp, "2024-11-20T14:02:00.000Z");
    assert_eq!(case.statistics.file_types.executables, 1);
    assert_eq!(case.statistics.file_sizes.small, 2);

    assert_eq!(case.timeline.len(), 4);
    assert_eq!(case.timeline[0].timestamp, "2024-11-18");
    assert_eq!(case.timeline[1].event, EventKind::FileModified);
    assert_eq!(case.timeline[1].count, 4);
    assert_eq!(case.timeline[3].timestamp, "2024-11-19");

    assert_eq!(case.files[0].status, FileStatus::Active);
    assert_eq!(case.suspicious_findings[0].severity, Severity::Medium);
    assert_eq!(case.suspicious_findings[1].file_name, "beacon.ps1");
    assert_eq!(case.suspicious_findings[1].severity, Severity::High);
}

#[test]
fn canonical_fixture_passes_through_with_coercion() {
    let path = Path::new("../../fixtures/canonical_case.json");
    let case = normalize_file(path, &NormalizeOptions::default()).expect("normalize ok");

    assert_eq!(case.case_id, "case-lab-7");
    assert_eq!(case.summary.scan_timestamp, "2025-02-10T08:30:00.000Z");
    assert_eq!(case.files[0].status, FileStatus::Deleted);
    assert_eq!(case.files[1].deleted_at, None);
    assert_eq!(case.timeline[0].count, 1);
    assert_eq!(case.timeline[1].event, EventKind::FileDeleted);

    // "bogus" is not a usable label, so the reason decides.
    assert_eq!(case.suspicious_findings[0].severity, Severity::Medium);
    assert_eq!(case.suspicious_findings[1].severity, Severity::High);
}

#[test]
fn canonical_output_matches_the_published_shape() {
    let path = Path::new("../../fixtures/canonical_case.json");
    let case = normalize_file(path, &NormalizeOptions::default()).unwrap();
    let v = serde_json::to_value(&case).unwrap();

    for key in [
        "caseId",
        "summary",
        "files",
        "timeline",
        "statistics",
        "suspiciousFindings",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert!(v["files"][1]["deletedAt"].is_null());
    assert_eq!(v["files"][0]["status"], "deleted");
    assert_eq!(v["timeline"][1]["event"], "file_deleted");
    assert_eq!(v["suspiciousFindings"][1]["severity"], "high");
    assert!(v["statistics"]["fileTypes"].get("archives").is_none());
}
