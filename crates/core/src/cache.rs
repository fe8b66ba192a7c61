//! Best-effort local persistence of the case list.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::ForensicCase;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("case cache unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("case cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CaseCache {
    path: PathBuf,
}

impl CaseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previously saved cases; empty when the cache is missing or unreadable.
    pub fn load(&self) -> Vec<ForensicCase> {
        match self.try_load() {
            Ok(cases) => cases,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring case cache");
                Vec::new()
            }
        }
    }

    /// Overwrites the whole cached list. Failures are logged and dropped.
    pub fn save(&self, cases: &[ForensicCase]) {
        if let Err(e) = self.try_save(cases) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not persist case cache");
        }
    }

    pub fn try_load(&self) -> Result<Vec<ForensicCase>, CacheError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn try_save(&self, cases: &[ForensicCase]) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(cases)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
