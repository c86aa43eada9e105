use std::env;

use serde::{Deserialize, Serialize};

use self::anki::AnkiConfig;
use self::dictionary::DictionaryConfig;

pub mod anki;
pub mod dictionary;

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_preferences_path() -> String {
    "manganki-preferences.json".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub anki: AnkiConfig,

    /// `tracing` filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Preferred language and tag saved between runs
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(path) = env::var("MANGANKI_DICT_PATH") {
            self.dictionary.path = path;
        }
        if let Ok(path) = env::var("MANGANKI_CACHE_PATH") {
            self.dictionary.cache_path = Some(path);
        }
        if let Ok(language) = env::var("MANGANKI_LANGUAGE") {
            self.dictionary.preferred_language = language;
        }
        if let Ok(url) = env::var("ANKI_CONNECT_URL") {
            self.anki.url = url;
        }
        if let Ok(filter) = env::var("MANGANKI_LOG") {
            self.log_filter = filter;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: DictionaryConfig::default(),
            anki: AnkiConfig::default(),
            log_filter: default_log_filter(),
            preferences_path: default_preferences_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"dictionary": {"path": "/data/JMdict.xml"}}"#).unwrap();

        assert_eq!(config.dictionary.path, "/data/JMdict.xml");
        assert_eq!(config.dictionary.preferred_language, "eng");
        assert_eq!(config.anki, AnkiConfig::default());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn snapshot_path_defaults_next_to_source() {
        let mut dictionary = DictionaryConfig {
            path: "/data/JMdict.xml".to_string(),
            ..DictionaryConfig::default()
        };
        assert_eq!(
            dictionary.snapshot_path(),
            Some(PathBuf::from("/data/JMdict.xml.snapshot"))
        );

        dictionary.cache_path = Some("/tmp/jmdict.bin".to_string());
        assert_eq!(dictionary.snapshot_path(), Some(PathBuf::from("/tmp/jmdict.bin")));

        dictionary.cache_enabled = false;
        assert_eq!(dictionary.snapshot_path(), None);
    }
}
