use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::types::ForensicCase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("case not found: {0}")]
    CaseNotFound(String),
}

/// Remote case store the normalized output is exchanged with.
pub trait CaseStorage {
    /// Registers an empty case and returns its opaque identifier.
    fn create_case(&mut self) -> String;

    /// Stores results for a case, overwriting anything submitted before.
    fn submit_results(&mut self, case_id: &str, case: &ForensicCase) -> Result<(), StorageError>;

    /// `Ok(None)` while the case exists but has no results yet.
    fn fetch_results(&self, case_id: &str) -> Result<Option<ForensicCase>, StorageError>;
}

/// Non-durable store keyed by a millisecond timestamp id.
#[derive(Debug, Default)]
pub struct MemoryCaseStorage {
    cases: HashMap<String, Option<ForensicCase>>,
}

impl MemoryCaseStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStorage for MemoryCaseStorage {
    fn create_case(&mut self) -> String {
        let mut stamp = Utc::now().timestamp_millis();
        while self.cases.contains_key(&stamp.to_string()) {
            stamp += 1;
        }
        let id = stamp.to_string();
        self.cases.insert(id.clone(), None);
        id
    }

    fn submit_results(&mut self, case_id: &str, case: &ForensicCase) -> Result<(), StorageError> {
        let slot = self
            .cases
            .get_mut(case_id)
            .ok_or_else(|| StorageError::CaseNotFound(case_id.to_string()))?;
        *slot = Some(case.clone());
        Ok(())
    }

    fn fetch_results(&self, case_id: &str) -> Result<Option<ForensicCase>, StorageError> {
        self.cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| StorageError::CaseNotFound(case_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn results_are_pending_until_submitted() {
        let mut store = MemoryCaseStorage::new();
        let id = store.create_case();
        assert_eq!(store.fetch_results(&id), Ok(None));

        let case = normalize(r#"{"scanInfo": {"diskName": "evidence.dd"}}"#).unwrap();
        store.submit_results(&id, &case).unwrap();
        store.submit_results(&id, &case).unwrap();
        assert_eq!(store.fetch_results(&id), Ok(Some(case)));
    }

    #[test]
    fn ids_are_unique_even_within_one_millisecond() {
        let mut store = MemoryCaseStorage::new();
        let a = store.create_case();
        let b = store.create_case();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_case_is_not_found() {
        let mut store = MemoryCaseStorage::new();
        let case = normalize("{}").unwrap();
        assert_eq!(
            store.submit_results("missing", &case),
            Err(StorageError::CaseNotFound("missing".to_string()))
        );
        assert!(store.fetch_results("missing").is_err());
    }
}
