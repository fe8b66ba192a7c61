use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("unsupported file type: {0} (expected a .json file)")]
    UnsupportedFileType(String),

    #[error("payload matches no known scanner schema")]
    UnrecognizedShape,
}

impl From<serde_json::Error> for NormalizationError {
    fn from(e: serde_json::Error) -> Self {
        NormalizationError::MalformedJson(e.to_string())
    }
}
