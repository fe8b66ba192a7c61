use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::normalize::{NormalizeOptions, ShapeFallback};
use crate::severity::{SeverityPolicy, SeverityRules};

pub const CONFIG_FILE_NAME: &str = "scanlens.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub strict_shape: Option<bool>,
    pub cache_path: Option<PathBuf>,
    pub severity: SeverityPolicy,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    /// Loads `scanlens.toml` from the working directory. `None` when there is
    /// no such file; a file that fails to load is returned as the error.
    pub fn discover() -> Option<anyhow::Result<Self>> {
        Self::discover_in(Path::new("."))
    }

    pub fn discover_in(dir: &Path) -> Option<anyhow::Result<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Some(Config::load(&path))
        } else {
            None
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            shape_fallback: if self.strict_shape.unwrap_or(false) {
                ShapeFallback::Strict
            } else {
                ShapeFallback::Permissive
            },
            rules: SeverityRules::compile(self.severity.clone()),
        }
    }
}
