use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Language every JMdict source carries glosses for.
pub const FALLBACK_LANGUAGE: &str = "eng";

const NO_TRANSLATION: &str = "<no matching translation>";

/// Exact-match dictionary lookups
pub trait Dictionary: Send + Sync {
    /// Entries whose kanji readings match `query`, followed by entries whose
    /// kana readings match it
    fn lookup_exact(&self, query: &str) -> Vec<&DictionaryEntry>;

    /// Get entry by unique ID
    fn get_by_id(&self, id: &str) -> Option<&DictionaryEntry>;

    /// Translation languages seen while loading
    fn languages(&self) -> &BTreeSet<String>;

    /// Get dictionary metadata
    fn metadata(&self) -> DictionaryMetadata;
}

/// Parses one on-disk dictionary source
pub trait DictionaryLoader {
    /// Short name used in logs, e.g. "JMdict (JSON)"
    fn name(&self) -> &str;

    /// Load every entry of the source at `path`
    fn load_from_file(&self, path: &Path) -> Result<ParsedDictionary, LoadError>;
}

/// Single dictionary entry with its readings and translations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Source ID (`ent_seq`), used for outbound links
    pub unique_id: String,
    pub kanji_readings: Vec<String>,
    pub kana_readings: Vec<String>,
    /// Language code -> glosses in source order
    pub translations: BTreeMap<String, Vec<String>>,
}

impl DictionaryEntry {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..Self::default()
        }
    }

    pub fn add_translation(&mut self, language: &str, gloss: String) {
        self.translations
            .entry(language.to_string())
            .or_default()
            .push(gloss);
    }

    /// Kanji spellings, or the kana ones for kana-only words
    pub fn expression(&self) -> String {
        if self.kanji_readings.is_empty() {
            self.kana_readings.join(", ")
        } else {
            self.kanji_readings.join(", ")
        }
    }

    /// Kana readings, empty when `expression` already shows them
    pub fn reading(&self) -> String {
        if self.kanji_readings.is_empty() {
            String::new()
        } else {
            self.kana_readings.join(", ")
        }
    }

    /// Glosses for `preferred_language`, falling back to English
    pub fn translation(&self, preferred_language: &str) -> String {
        self.glosses(preferred_language)
            .map(|glosses| glosses.join(", "))
            .unwrap_or_else(|| NO_TRANSLATION.to_string())
    }

    /// One-line summary: readings followed by translations
    pub fn stringify(&self, preferred_language: &str) -> String {
        let readings: Vec<&str> = self
            .kana_readings
            .iter()
            .chain(&self.kanji_readings)
            .map(String::as_str)
            .collect();

        format!(
            "{}: {}",
            readings.join(", "),
            self.translation(preferred_language)
        )
    }

    fn glosses(&self, preferred_language: &str) -> Option<&Vec<String>> {
        self.translations
            .get(preferred_language)
            .or_else(|| self.translations.get(FALLBACK_LANGUAGE))
    }
}

/// Output of a loader run
#[derive(Debug, Clone, Default)]
pub struct ParsedDictionary {
    pub entries: Vec<DictionaryEntry>,
    pub languages: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryMetadata {
    pub name: String,
    pub language: String,
    pub entry_count: usize,
    pub kanji_keys: usize,
    pub kana_keys: usize,
    pub translation_languages: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read dictionary file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse dictionary file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported dictionary format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("entry #{position} in {} has no id", path.display())]
    MissingId { path: PathBuf, position: usize },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::UnsupportedFormat { path }
            | LoadError::MissingId { path, .. } => path,
        }
    }
}

/// Snapshot could not be used; callers fall back to a full parse.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("no snapshot at {}", path.display())]
    Missing { path: PathBuf },

    #[error("could not access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("snapshot {} is corrupt: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("snapshot {} has format version {found}, expected {expected}", path.display())]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("snapshot {} is stale: {reason}", path.display())]
    Stale { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DictionaryEntry {
        let mut entry = DictionaryEntry::new("1358280");
        entry.kanji_readings = vec!["日本語".to_string()];
        entry.kana_readings = vec!["にほんご".to_string()];
        entry.add_translation("eng", "Japanese (language) [n]".to_string());
        entry.add_translation("ger", "Japanisch".to_string());
        entry.add_translation("ger", "japanische Sprache".to_string());
        entry
    }

    #[test]
    fn expression_prefers_kanji() {
        let entry = entry();
        assert_eq!(entry.expression(), "日本語");
        assert_eq!(entry.reading(), "にほんご");
    }

    #[test]
    fn kana_only_entry_has_no_separate_reading() {
        let mut entry = DictionaryEntry::new("1");
        entry.kana_readings = vec!["それ".to_string(), "そり".to_string()];

        assert_eq!(entry.expression(), "それ, そり");
        assert_eq!(entry.reading(), "");
    }

    #[test]
    fn translation_falls_back_to_english() {
        let entry = entry();
        assert_eq!(entry.translation("ger"), "Japanisch, japanische Sprache");
        assert_eq!(entry.translation("fre"), "Japanese (language) [n]");

        let bare = DictionaryEntry::new("2");
        assert_eq!(bare.translation("eng"), "<no matching translation>");
    }

    #[test]
    fn stringify_lists_kana_before_kanji() {
        assert_eq!(
            entry().stringify("eng"),
            "にほんご, 日本語: Japanese (language) [n]"
        );
    }

    #[test]
    fn load_error_names_path() {
        let err = LoadError::Io {
            path: PathBuf::from("/missing/jmdict.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert_eq!(err.path(), Path::new("/missing/jmdict.json"));
        assert!(err.to_string().contains("/missing/jmdict.json"));
    }
}
