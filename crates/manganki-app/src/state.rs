use std::path::PathBuf;
use std::sync::Arc;

use manganki_anki::CardNote;
use manganki_config::Config;
use manganki_core::DictionaryEntry;
use manganki_core::dictionary::Dictionary;
use manganki_core::types::DisplayResult;
use tokio::sync::RwLock;

use crate::profile::Preferences;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dictionary still loading; lookups are not possible yet
    Loading,
    Ready,
    ResultsShown,
    EntrySelected,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("dictionary is still loading")]
    NotReady,

    #[error("no results to select from")]
    NoResults,

    #[error("result {index} does not exist ({count} results)")]
    OutOfRange { index: usize, count: usize },

    #[error("no dictionary entry selected")]
    NothingSelected,
}

/// Lookup state of one interactive session
pub struct Session {
    phase: Phase,
    dictionary: Option<Arc<dyn Dictionary>>,
    query: String,
    results: Vec<DictionaryEntry>,
    selected: Option<usize>,
    preferences: Preferences,
}

impl Session {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            phase: Phase::Loading,
            dictionary: None,
            query: String::new(),
            results: Vec::new(),
            selected: None,
            preferences,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn dictionary(&self) -> Option<&dyn Dictionary> {
        self.dictionary.as_deref()
    }

    pub fn results(&self) -> &[DictionaryEntry] {
        &self.results
    }

    pub fn dictionary_ready(&mut self, dictionary: Arc<dyn Dictionary>) {
        self.dictionary = Some(dictionary);
        self.phase = Phase::Ready;

        // Text typed while loading is looked up now
        if !self.query.is_empty() {
            let query = std::mem::take(&mut self.query);
            let _ = self.search(&query);
        }
    }

    /// Look up `text`, replacing previous results and selection
    pub fn search(&mut self, text: &str) -> Result<&[DictionaryEntry], SessionError> {
        self.query = text.to_string();
        self.selected = None;

        let Some(dictionary) = &self.dictionary else {
            return Err(SessionError::NotReady);
        };

        self.results = dictionary
            .lookup_exact(text)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!("Lookup '{}': {} results", text, self.results.len());

        self.phase = if self.results.is_empty() {
            Phase::Ready
        } else {
            Phase::ResultsShown
        };
        Ok(&self.results)
    }

    pub fn select(&mut self, index: usize) -> Result<&DictionaryEntry, SessionError> {
        if self.phase == Phase::Loading {
            return Err(SessionError::NotReady);
        }
        if self.results.is_empty() {
            return Err(SessionError::NoResults);
        }
        if index >= self.results.len() {
            return Err(SessionError::OutOfRange {
                index,
                count: self.results.len(),
            });
        }

        self.selected = Some(index);
        self.phase = Phase::EntrySelected;
        Ok(&self.results[index])
    }

    pub fn selected(&self) -> Option<&DictionaryEntry> {
        self.selected.and_then(|idx| self.results.get(idx))
    }

    /// Switch the translation language and redo the current lookup
    pub fn set_language(&mut self, language: &str) {
        self.preferences.preferred_translation_language = language.to_string();
        if self.dictionary.is_some() && !self.query.is_empty() {
            let query = self.query.clone();
            let _ = self.search(&query);
        }
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.preferences.tag = tag.trim().to_string();
    }

    pub fn display_results(&self) -> Vec<DisplayResult> {
        let language = &self.preferences.preferred_translation_language;
        self.results
            .iter()
            .map(|entry| DisplayResult::from_entry(entry, language))
            .collect()
    }

    pub fn card_note(
        &self,
        image: Option<PathBuf>,
        audio: Option<PathBuf>,
    ) -> Result<CardNote, SessionError> {
        let entry = self.selected().ok_or(SessionError::NothingSelected)?;

        Ok(CardNote::from_entry(
            &self.query,
            Some(entry),
            &self.preferences.preferred_translation_language,
        )
        .with_image(image)
        .with_audio(audio)
        .with_tag(&self.preferences.tag))
    }
}
