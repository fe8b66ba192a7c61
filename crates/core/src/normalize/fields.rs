/// Where a group of fields lives inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Root,
    Key(&'static str),
}

#[derive(Debug)]
pub struct FileFields {
    pub name: &'static [&'static str],
    pub path: &'static [&'static str],
    pub size: &'static [&'static str],
    pub hash: &'static [&'static str],
    pub created: &'static [&'static str],
    pub modified: &'static [&'static str],
    pub deleted_at: &'static [&'static str],
    /// Boolean deletion markers, consulted when no status label is usable.
    pub deleted_flag: &'static [&'static str],
    pub status: &'static [&'static str],
}

#[derive(Debug)]
pub struct FindingFields {
    pub name: &'static [&'static str],
    pub path: &'static [&'static str],
    pub reason: &'static [&'static str],
    pub label: &'static [&'static str],
    pub score: &'static [&'static str],
    pub entropy: &'static [&'static str],
}

/// Field-name mapping from one scanner schema variant onto the canonical record.
#[derive(Debug)]
pub struct FieldTable {
    pub case_id: &'static [&'static str],

    pub summary_scopes: &'static [Scope],
    pub disk_name: &'static [&'static str],
    pub total_files: &'static [&'static str],
    pub deleted_files: &'static [&'static str],
    pub anomalies_found: &'static [&'static str],
    pub scan_timestamp: &'static [&'static str],
    /// Path-keyed heuristic score tables, searched in the summary scopes.
    pub score_tables: &'static [&'static str],

    pub files: &'static [&'static str],
    pub file: FileFields,

    pub timeline: &'static [&'static str],

    pub statistics_scopes: &'static [Scope],
    pub file_types: &'static [&'static str],
    pub file_sizes: &'static [&'static str],

    pub findings: &'static [&'static str],
    pub finding: FindingFields,
}

pub static CANONICAL: FieldTable = FieldTable {
    case_id: &["caseId"],

    summary_scopes: &[Scope::Key("summary")],
    disk_name: &["diskName"],
    total_files: &["totalFiles"],
    deleted_files: &["deletedFiles"],
    anomalies_found: &["anomaliesFound"],
    scan_timestamp: &["scanTimestamp"],
    score_tables: &[],

    files: &["files"],
    file: FileFields {
        name: &["fileName"],
        path: &["filePath"],
        size: &["fileSize"],
        hash: &["hash"],
        created: &["createdAt"],
        modified: &["modifiedAt"],
        deleted_at: &["deletedAt"],
        deleted_flag: &[],
        status: &["status"],
    },

    timeline: &["timeline"],

    statistics_scopes: &[Scope::Key("statistics")],
    file_types: &["fileTypes"],
    file_sizes: &["fileSizes"],

    findings: &["suspiciousFindings"],
    finding: FindingFields {
        name: &["fileName"],
        path: &["filePath"],
        reason: &["reason"],
        label: &["severity"],
        score: &["heuristicScore"],
        entropy: &["entropy"],
    },
};

pub static SCANNER_NATIVE: FieldTable = FieldTable {
    case_id: &["caseId", "case_id", "scanId"],

    summary_scopes: &[Scope::Key("scanInfo"), Scope::Root],
    disk_name: &["diskName", "disk", "imageName"],
    total_files: &["totalFiles", "filesScanned"],
    deleted_files: &["deletedFiles", "deletedCount"],
    anomalies_found: &["anomaliesFound", "anomalies"],
    scan_timestamp: &["scanTimestamp", "scannedAt", "scanTime", "timestamp"],
    score_tables: &["heuristicScores", "scores"],

    files: &["allFiles", "files"],
    file: FileFields {
        name: &["name", "fileName"],
        path: &["path", "filePath"],
        size: &["size", "fileSize"],
        hash: &["hash_sha256", "sha256", "hash"],
        created: &["created", "createdAt"],
        modified: &["modified", "modifiedAt"],
        deleted_at: &["deletedAt", "deleted_at", "deleted"],
        deleted_flag: &["deleted", "isDeleted"],
        status: &["status"],
    },

    timeline: &["fileTimeline", "timeline"],

    statistics_scopes: &[Scope::Key("statistics"), Scope::Key("scanInfo"), Scope::Root],
    file_types: &["fileTypeDistribution", "fileTypes"],
    file_sizes: &["fileSizeDistribution", "fileSizes"],

    findings: &["suspiciousFiles", "suspiciousFindings"],
    finding: FindingFields {
        name: &["fileName", "name"],
        path: &["path", "filePath"],
        reason: &["rule", "signature", "reason"],
        label: &["risk", "riskLevel", "severity"],
        score: &["heuristicScore", "score"],
        entropy: &["entropyClass", "entropy"],
    },
};
