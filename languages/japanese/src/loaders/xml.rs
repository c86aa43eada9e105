//! Streaming loader for the JMdict XML release.
//!
//! Only one translation language is kept (plus English as a fallback), which
//! keeps the in-memory dictionary small for the full multi-language file.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use manganki_core::dictionary::FALLBACK_LANGUAGE;
use manganki_core::{DictionaryEntry, DictionaryLoader, LoadError, ParsedDictionary};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::is_excluded_reading;

pub struct XmlLoader {
    preferred_language: String,
}

/// Element whose text is being collected
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    EntSeq,
    Keb,
    KeInf,
    Reb,
    ReInf,
    Gloss(String),
}

#[derive(Debug, Default)]
struct PendingReading {
    text: String,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct PendingEntry {
    id: String,
    kanji: Vec<PendingReading>,
    kana: Vec<PendingReading>,
    glosses: Vec<(String, String)>,
}

impl XmlLoader {
    pub fn new(preferred_language: impl Into<String>) -> Self {
        Self {
            preferred_language: preferred_language.into(),
        }
    }

    pub fn parse_reader<R: BufRead>(
        &self,
        source: R,
        path: &Path,
    ) -> Result<ParsedDictionary, LoadError> {
        let parse_error = |message: String| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();

        let mut parsed = ParsedDictionary::default();
        let mut pending: Option<PendingEntry> = None;
        let mut field: Option<Field> = None;
        let mut text = String::new();
        let mut saw_element = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    saw_element = true;
                    match e.name().as_ref() {
                        b"entry" => pending = Some(PendingEntry::default()),
                        b"k_ele" => {
                            if let Some(entry) = pending.as_mut() {
                                entry.kanji.push(PendingReading::default());
                            }
                        }
                        b"r_ele" => {
                            if let Some(entry) = pending.as_mut() {
                                entry.kana.push(PendingReading::default());
                            }
                        }
                        b"ent_seq" => field = Some(Field::EntSeq),
                        b"keb" => field = Some(Field::Keb),
                        b"ke_inf" => field = Some(Field::KeInf),
                        b"reb" => field = Some(Field::Reb),
                        b"re_inf" => field = Some(Field::ReInf),
                        b"gloss" => field = Some(Field::Gloss(gloss_language(e).map_err(parse_error)?)),
                        _ => {}
                    }
                    text.clear();
                }
                Ok(Event::Empty(_)) => saw_element = true,
                Ok(Event::Text(ref e)) => {
                    match field {
                        // Reading tags are DTD entities such as `&rK;`; keep them raw
                        Some(Field::KeInf | Field::ReInf) => {
                            text.push_str(&String::from_utf8_lossy(e));
                        }
                        Some(_) => {
                            let unescaped = e.unescape().map_err(|err| {
                                parse_error(format!(
                                    "at byte {}: {err}",
                                    reader.buffer_position()
                                ))
                            })?;
                            text.push_str(&unescaped);
                        }
                        None => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    match e.name().as_ref() {
                        b"entry" => {
                            if let Some(entry) = pending.take() {
                                let position = parsed.entries.len();
                                let entry = self
                                    .finish_entry(entry, &mut parsed.languages)
                                    .ok_or_else(|| LoadError::MissingId {
                                        path: path.to_path_buf(),
                                        position,
                                    })?;
                                parsed.entries.push(entry);
                            }
                        }
                        b"ent_seq" | b"keb" | b"ke_inf" | b"reb" | b"re_inf" | b"gloss" => {
                            if let (Some(current), Some(entry)) = (field.take(), pending.as_mut()) {
                                store_field(entry, current, std::mem::take(&mut text));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(parse_error(format!(
                        "at byte {}: {err}",
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if pending.is_some() {
            return Err(parse_error("unexpected end of file inside <entry>".to_string()));
        }
        if !saw_element {
            return Err(parse_error("no XML elements found".to_string()));
        }

        Ok(parsed)
    }

    /// Returns `None` when the entry has no `ent_seq`
    fn finish_entry(
        &self,
        pending: PendingEntry,
        languages: &mut BTreeSet<String>,
    ) -> Option<DictionaryEntry> {
        if pending.id.is_empty() {
            return None;
        }

        let mut entry = DictionaryEntry::new(pending.id);
        entry.kanji_readings = surviving_readings(pending.kanji);
        entry.kana_readings = surviving_readings(pending.kana);

        for (language, gloss) in pending.glosses {
            let keep = language == self.preferred_language
                || (language == FALLBACK_LANGUAGE && self.preferred_language != FALLBACK_LANGUAGE);
            if !keep {
                continue;
            }

            languages.insert(language.clone());
            entry.add_translation(&language, gloss);
        }

        Some(entry)
    }
}

/// `xml:lang` of a gloss; JMdict omits it for English
fn gloss_language(element: &BytesStart<'_>) -> Result<String, String> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        if attribute.key.as_ref() == b"xml:lang" {
            let value = attribute.unescape_value().map_err(|e| e.to_string())?;
            return Ok(value.into_owned());
        }
    }

    Ok(FALLBACK_LANGUAGE.to_string())
}

fn store_field(entry: &mut PendingEntry, field: Field, text: String) {
    let text = text.trim().to_string();

    match field {
        Field::EntSeq => entry.id = text,
        Field::Keb => {
            if let Some(reading) = entry.kanji.last_mut() {
                reading.text = text;
            }
        }
        Field::Reb => {
            if let Some(reading) = entry.kana.last_mut() {
                reading.text = text;
            }
        }
        Field::KeInf => {
            if let Some(reading) = entry.kanji.last_mut() {
                reading.tags.push(entity_name(&text));
            }
        }
        Field::ReInf => {
            if let Some(reading) = entry.kana.last_mut() {
                reading.tags.push(entity_name(&text));
            }
        }
        Field::Gloss(language) => entry.glosses.push((language, text)),
    }
}

/// `&rK;` -> `rK`
fn entity_name(raw: &str) -> String {
    raw.trim_start_matches('&').trim_end_matches(';').to_string()
}

fn surviving_readings(readings: Vec<PendingReading>) -> Vec<String> {
    readings
        .into_iter()
        .filter(|reading| !is_excluded_reading(&reading.tags))
        .filter(|reading| !reading.text.is_empty())
        .map(|reading| reading.text)
        .collect()
}

impl DictionaryLoader for XmlLoader {
    fn name(&self) -> &str {
        "JMdict (XML)"
    }

    fn load_from_file(&self, path: &Path) -> Result<ParsedDictionary, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse_reader(BufReader::new(file), path)
    }
}
