use std::path::PathBuf;

use crate::dictionary::DictionaryEntry;
use crate::links::takoboto_web_link;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Text typed or pasted by the user
    TextInput(String),
    UiEvent(UiEvent),
    DictionaryReady {
        entries: usize,
        languages: Vec<String>,
    },
    DictionaryFailed(String),
    ShowResults(Vec<DisplayResult>),
    ResultSelected(DisplayResult),
    CardCreated {
        note_id: u64,
    },
    StatusMessage(String),
}

#[derive(Debug, Clone)]
pub struct DisplayResult {
    pub unique_id: String,
    pub expression: String,
    pub reading: String,
    pub translation: String,
    pub web_link: String,
}

impl DisplayResult {
    pub fn from_entry(entry: &DictionaryEntry, preferred_language: &str) -> Self {
        Self {
            unique_id: entry.unique_id.clone(),
            expression: entry.expression(),
            reading: entry.reading(),
            translation: entry.translation(preferred_language),
            web_link: takoboto_web_link(&entry.unique_id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    SelectResult(usize),
    CreateCard {
        image: Option<PathBuf>,
        audio: Option<PathBuf>,
    },
    SetLanguage(String),
    SetTag(String),
    Close,
}
