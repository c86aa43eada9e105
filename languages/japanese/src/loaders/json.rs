//! Loader for the jmdict-simplified JSON export.

use std::collections::BTreeSet;
use std::path::Path;

use manganki_core::{DictionaryEntry, DictionaryLoader, LoadError, ParsedDictionary};
use serde::Deserialize;

use super::is_excluded_reading;

// JSON structures for parsing jmdict-simplified format
#[derive(Debug, Deserialize)]
struct JMdictJson {
    words: Vec<JMdictJsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JMdictJsonEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    kanji: Vec<ReadingElement>,
    #[serde(default)]
    kana: Vec<ReadingElement>,
    #[serde(default)]
    sense: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct ReadingElement {
    text: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Sense {
    #[serde(rename = "partOfSpeech", default)]
    part_of_speech: Vec<String>,
    #[serde(default)]
    gloss: Vec<Gloss>,
}

#[derive(Debug, Deserialize)]
struct Gloss {
    #[serde(default = "default_gloss_language")]
    lang: String,
    text: String,
}

fn default_gloss_language() -> String {
    manganki_core::dictionary::FALLBACK_LANGUAGE.to_string()
}

/// Keeps the glosses of every language found in the file.
pub struct JsonLoader;

impl JsonLoader {
    pub fn parse_str(&self, json: &str, path: &Path) -> Result<ParsedDictionary, LoadError> {
        let data: JMdictJson = serde_json::from_str(json).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut parsed = ParsedDictionary {
            entries: Vec::with_capacity(data.words.len()),
            languages: BTreeSet::new(),
        };

        for (position, word) in data.words.into_iter().enumerate() {
            if word.id.is_empty() {
                return Err(LoadError::MissingId {
                    path: path.to_path_buf(),
                    position,
                });
            }

            let entry = convert_word(word, &mut parsed.languages);
            parsed.entries.push(entry);
        }

        Ok(parsed)
    }
}

fn surviving_readings(elements: Vec<ReadingElement>) -> Vec<String> {
    elements
        .into_iter()
        .filter(|element| !is_excluded_reading(&element.tags))
        .filter(|element| !element.text.is_empty())
        .map(|element| element.text)
        .collect()
}

fn convert_word(word: JMdictJsonEntry, languages: &mut BTreeSet<String>) -> DictionaryEntry {
    let mut entry = DictionaryEntry::new(word.id);
    entry.kanji_readings = surviving_readings(word.kanji);
    entry.kana_readings = surviving_readings(word.kana);

    for sense in word.sense {
        let pos = sense.part_of_speech.join(", ");

        for gloss in sense.gloss {
            let translation = if pos.is_empty() {
                gloss.text
            } else {
                format!("{} [{}]", gloss.text, pos)
            };

            languages.insert(gloss.lang.clone());
            entry.add_translation(&gloss.lang, translation);
        }
    }

    entry
}

impl DictionaryLoader for JsonLoader {
    fn name(&self) -> &str {
        "JMdict (JSON)"
    }

    fn load_from_file(&self, path: &Path) -> Result<ParsedDictionary, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse_str(&json, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "3.5.0",
        "words": [
            {
                "id": "1358280",
                "kanji": [{"common": true, "text": "日本語", "tags": []}],
                "kana": [{"common": true, "text": "にほんご", "tags": [], "appliesToKanji": ["*"]}],
                "sense": [
                    {
                        "partOfSpeech": ["n"],
                        "gloss": [
                            {"lang": "eng", "text": "Japanese (language)"},
                            {"lang": "ger", "text": "Japanisch"}
                        ]
                    }
                ]
            },
            {
                "id": "1000220",
                "kanji": [
                    {"text": "明白", "tags": []},
                    {"text": "明々白々", "tags": ["rK"]}
                ],
                "kana": [
                    {"text": "めいはく", "tags": []},
                    {"text": "めーはく", "tags": ["io"]}
                ],
                "sense": [
                    {"partOfSpeech": ["adj-na", "n"], "gloss": [{"lang": "eng", "text": "obvious"}]},
                    {"partOfSpeech": [], "gloss": [{"lang": "eng", "text": "clear"}]}
                ]
            }
        ]
    }"#;

    fn parse(json: &str) -> Result<ParsedDictionary, LoadError> {
        JsonLoader.parse_str(json, Path::new("test.json"))
    }

    #[test]
    fn parses_entries_in_source_order() {
        let parsed = parse(SAMPLE).unwrap();

        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].unique_id, "1358280");
        assert_eq!(parsed.entries[0].kanji_readings, vec!["日本語"]);
        assert_eq!(parsed.entries[0].kana_readings, vec!["にほんご"]);
        assert_eq!(parsed.entries[1].unique_id, "1000220");
    }

    #[test]
    fn drops_rare_and_irregular_readings_only() {
        let parsed = parse(SAMPLE).unwrap();
        let entry = &parsed.entries[1];

        assert_eq!(entry.kanji_readings, vec!["明白"]);
        assert_eq!(entry.kana_readings, vec!["めいはく"]);
        assert_eq!(entry.translations["eng"].len(), 2);
    }

    #[test]
    fn annotates_glosses_with_part_of_speech() {
        let parsed = parse(SAMPLE).unwrap();

        assert_eq!(
            parsed.entries[1].translations["eng"],
            vec!["obvious [adj-na, n]", "clear"]
        );
        assert_eq!(parsed.entries[0].translations["ger"], vec!["Japanisch [n]"]);
    }

    #[test]
    fn collects_every_gloss_language() {
        let parsed = parse(SAMPLE).unwrap();
        let languages: Vec<&str> = parsed.languages.iter().map(String::as_str).collect();
        assert_eq!(languages, vec!["eng", "ger"]);
    }

    #[test]
    fn missing_optional_arrays_default_to_empty() {
        let parsed = parse(r#"{"words": [{"id": "7", "kana": [{"text": "ね"}]}]}"#).unwrap();

        let entry = &parsed.entries[0];
        assert!(entry.kanji_readings.is_empty());
        assert_eq!(entry.kana_readings, vec!["ね"]);
        assert!(entry.translations.is_empty());
    }

    #[test]
    fn entry_without_id_fails_whole_load() {
        let err = parse(r#"{"words": [{"id": "1", "kana": []}, {"kana": []}]}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingId { position: 1, .. }));
    }

    #[test]
    fn malformed_json_names_path() {
        let err = parse(r#"{"words": [ {"id": "1", "#).unwrap_err();

        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("test.json"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JsonLoader
            .load_from_file(Path::new("/nonexistent/jmdict.json"))
            .unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/jmdict.json"));
    }
}
