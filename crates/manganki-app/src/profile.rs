use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use manganki_config::Config;
use serde::{Deserialize, Serialize};

/// Load the config file if one was given, otherwise defaults plus
/// environment overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::new());
    };

    let file = File::open(path)
        .with_context(|| format!("Could not open config file {}", path.display()))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .with_context(|| format!("Could not parse config file {}", path.display()))?;
    Ok(config)
}

/// Settings the user changes while working, restored on the next start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub preferred_translation_language: String,
    #[serde(default)]
    pub tag: String,
}

impl Preferences {
    pub fn new(preferred_translation_language: &str) -> Self {
        Self {
            preferred_translation_language: preferred_translation_language.to_string(),
            tag: String::new(),
        }
    }
}

/// Missing or unreadable preferences fall back to defaults
pub fn load_preferences(path: &Path, default_language: &str) -> Preferences {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("No stored preferences at {}: {e}", path.display());
            return Preferences::new(default_language);
        }
    };

    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable preferences {}: {e}", path.display());
        Preferences::new(default_language)
    })
}

pub fn store_preferences(path: &Path, preferences: &Preferences) -> anyhow::Result<()> {
    let data = serde_json::to_string_pretty(preferences)?;
    fs::write(path, data)
        .with_context(|| format!("Could not save preferences to {}", path.display()))?;
    Ok(())
}
