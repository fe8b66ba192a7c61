use crate::types::{ForensicCase, Severity};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte size, base 1024, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

pub fn to_markdown(case: &ForensicCase) -> String {
    let mut s = String::new();
    s.push_str(&format!("# Case {}\n\n", case.case_id));

    s.push_str("## Summary\n\n");
    s.push_str(&format!("- disk: `{}`\n", case.summary.disk_name));
    s.push_str(&format!("- scanned_at: `{}`\n", case.summary.scan_timestamp));
    s.push_str(&format!("- total_files: `{}`\n", case.summary.total_files));
    s.push_str(&format!("- deleted_files: `{}`\n", case.summary.deleted_files));
    s.push_str(&format!(
        "- anomalies_found: `{}`\n",
        case.summary.anomalies_found
    ));
    s.push('\n');

    let types = &case.statistics.file_types;
    let sizes = &case.statistics.file_sizes;
    s.push_str("## Statistics\n\n");
    s.push_str("| category | count |\n|---|---|\n");
    for (name, n) in [
        ("documents", types.documents),
        ("images", types.images),
        ("videos", types.videos),
        ("executables", types.executables),
        ("others", types.others),
    ] {
        s.push_str(&format!("| {} | {} |\n", name, n));
    }
    s.push('\n');
    s.push_str(&format!(
        "- sizes: small `{}`, medium `{}`, large `{}`\n",
        sizes.small, sizes.medium, sizes.large
    ));
    s.push('\n');

    s.push_str("## Files\n\n");
    if case.files.is_empty() {
        s.push_str("- (none)\n");
    } else {
        for f in &case.files {
            s.push_str(&format!(
                "- `{}` ({}, {:?}) {}\n",
                f.file_path,
                format_file_size(f.file_size),
                f.status,
                f.modified_at
            ));
        }
    }
    s.push('\n');

    s.push_str("## Timeline\n\n");
    if case.timeline.is_empty() {
        s.push_str("- (none)\n");
    } else {
        for e in &case.timeline {
            s.push_str(&format!(
                "- {} `{}` {} x{}\n",
                e.timestamp,
                e.event.as_str(),
                e.file_name,
                e.count
            ));
        }
    }
    s.push('\n');

    s.push_str("## Findings\n\n");
    if case.suspicious_findings.is_empty() {
        s.push_str("- (none)\n");
    } else {
        let mut findings: Vec<_> = case.suspicious_findings.iter().collect();
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));
        for f in findings {
            s.push_str(&format!("### {}\n", f.file_name));
            s.push_str(&format!("- severity: `{}`\n", f.severity.as_str()));
            s.push_str(&format!("- reason: {}\n", f.reason));
            s.push('\n');
        }
    }

    s
}

pub fn severity_counts(case: &ForensicCase) -> [(Severity, usize); 3] {
    [Severity::High, Severity::Medium, Severity::Low].map(|sev| (sev, case.count_severity(sev)))
}
