use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "jmdict-all-3.5.0.json".to_string()
}

fn default_cache_enabled() -> bool {
    true
}

fn default_preferred_language() -> String {
    "eng".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DictionaryConfig {
    /// JMdict source, `.json` (jmdict-simplified) or `.xml`
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    /// Snapshot location, defaults to `<path>.snapshot`
    #[serde(default)]
    pub cache_path: Option<String>,
    /// Translation language shown first (JMdict three-letter code)
    #[serde(default = "default_preferred_language")]
    pub preferred_language: String,
}

impl DictionaryConfig {
    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        if !self.cache_enabled {
            return None;
        }

        let path = match &self.cache_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}.snapshot", self.path)),
        };
        Some(path)
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            cache_enabled: default_cache_enabled(),
            cache_path: None,
            preferred_language: default_preferred_language(),
        }
    }
}
