use std::collections::{BTreeSet, HashMap};

use manganki_core::dictionary::Dictionary;
use manganki_core::{DictionaryEntry, DictionaryMetadata, ParsedDictionary};
use serde::{Deserialize, Serialize};

/// JMdict lookup index: exact-text maps from kanji and kana spellings to
/// entries. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JMdict {
    entries: Vec<DictionaryEntry>,
    kanji_index: HashMap<String, Vec<usize>>,
    kana_index: HashMap<String, Vec<usize>>,
    languages: BTreeSet<String>,
}

impl JMdict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut dict = Self::new();
        dict.build(entries);
        dict
    }

    pub fn from_parsed(parsed: ParsedDictionary) -> Self {
        let mut dict = Self::from_entries(parsed.entries);
        dict.languages.extend(parsed.languages);
        dict
    }

    /// Replace the contents with `entries`, indexing every reading.
    /// Bucket order is entry order.
    pub fn build(&mut self, entries: Vec<DictionaryEntry>) {
        let mut kanji_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut kana_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut languages = BTreeSet::new();

        for (entry_idx, entry) in entries.iter().enumerate() {
            for k in &entry.kanji_readings {
                kanji_index.entry(k.clone()).or_default().push(entry_idx);
            }
            for r in &entry.kana_readings {
                kana_index.entry(r.clone()).or_default().push(entry_idx);
            }
            languages.extend(entry.translations.keys().cloned());
        }

        self.entries = entries;
        self.kanji_index = kanji_index;
        self.kana_index = kana_index;
        self.languages = languages;
    }

    /// Kanji matches first, then kana matches. No normalization.
    pub fn lookup(&self, text: &str) -> Vec<&DictionaryEntry> {
        if text.is_empty() {
            return Vec::new();
        }

        let kanji = self.kanji_index.get(text).into_iter().flatten();
        let kana = self.kana_index.get(text).into_iter().flatten();

        kanji
            .chain(kana)
            .filter_map(|&idx| self.entries.get(idx))
            .collect()
    }

    pub fn get_languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    /// Get the number of entries in the dictionary
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }
}

impl Dictionary for JMdict {
    fn lookup_exact(&self, query: &str) -> Vec<&DictionaryEntry> {
        self.lookup(query)
    }

    fn get_by_id(&self, id: &str) -> Option<&DictionaryEntry> {
        self.entries.iter().find(|e| e.unique_id == id)
    }

    fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            name: "JMdict".to_string(),
            language: "ja".to_string(),
            entry_count: self.entries.len(),
            kanji_keys: self.kanji_index.len(),
            kana_keys: self.kana_index.len(),
            translation_languages: self.languages.len(),
        }
    }
}
