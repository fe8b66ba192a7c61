use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForensicCase {
    pub case_id: String,
    pub summary: Summary,
    pub files: Vec<FileRecord>,
    pub timeline: Vec<TimelineEvent>,
    pub statistics: Statistics,
    pub suspicious_findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub disk_name: String,
    pub total_files: u64,
    pub deleted_files: u64,
    pub anomalies_found: u64,
    pub scan_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub hash: String,
    pub created_at: String,
    pub modified_at: String,
    pub deleted_at: Option<String>,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub event: EventKind,
    pub file_name: String,
    pub timestamp: String,
    /// Number of underlying file events collapsed into this entry.
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FileCreated,
    FileDeleted,
    FileModified,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::FileCreated => "file_created",
            EventKind::FileDeleted => "file_deleted",
            EventKind::FileModified => "file_modified",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub file_types: FileTypes,
    pub file_sizes: FileSizes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypes {
    pub documents: u64,
    pub images: u64,
    pub videos: u64,
    pub executables: u64,
    pub others: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSizes {
    pub small: u64,
    pub medium: u64,
    pub large: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub file_name: String,
    pub reason: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl ForensicCase {
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.suspicious_findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.suspicious_findings.iter().map(|f| f.severity).max()
    }
}
