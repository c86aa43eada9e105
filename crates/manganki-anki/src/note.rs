use std::path::{Path, PathBuf};

use manganki_core::DictionaryEntry;
use manganki_core::links::takoboto_card_link;
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "MangAnkiV2";

pub const FIELD_EXPRESSION: &str = "Expression";
pub const FIELD_AUDIO: &str = "Audio";
pub const FIELD_TRANSLATION: &str = "Translation";
pub const FIELD_READING: &str = "Reading";
pub const FIELD_SENTENCE: &str = "Sentence";
pub const FIELD_TAKOBOTO_LINK: &str = "Takoboto Link";

const FRONT_TEMPLATE: &str = "
<H2>{{Sentence}}</H2>
<H2>{{Audio}}</H2>
";

const BACK_TEMPLATE: &str = "
<H1>{{Expression}}</H1>
<H1>{{Reading}}</H1>
<H2>{{Translation}}</H2>
<H3><a href={{Takoboto Link}}>{{Expression}}</a></H3>
";

const FRONT_TEMPLATE_REVERSE: &str = "
<H2>{{Translation}}</H2>
";

const BACK_TEMPLATE_REVERSE: &str = "
<H1>{{Expression}}</H1>
<H1>{{Reading}}</H1>
<H2>{{Translation}}</H2>
<H3><a href={{Takoboto Link}}>{{Expression}}</a></H3>
<H2>{{Sentence}}</H2>
<H2>{{Audio}}</H2>
";

const MODEL_CSS: &str = "
img {
    max-width: 100%;
    max-height: 100%;
}
.card {
    font-family: Arial;
    font-size: 20px;
    text-align: center;
    color: black;
    background-color: white;
}
";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub front: String,
    pub back: String,
}

/// Note type cards are created with; created in Anki when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteModel {
    pub name: String,
    pub fields: Vec<String>,
    pub css: String,
    pub templates: Vec<CardTemplate>,
}

impl NoteModel {
    pub fn manganki() -> Self {
        Self {
            name: MODEL_NAME.to_string(),
            fields: [
                FIELD_EXPRESSION,
                FIELD_AUDIO,
                FIELD_TRANSLATION,
                FIELD_READING,
                FIELD_SENTENCE,
                FIELD_TAKOBOTO_LINK,
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
            css: MODEL_CSS.to_string(),
            templates: vec![
                CardTemplate {
                    name: "MangAnki".to_string(),
                    front: FRONT_TEMPLATE.to_string(),
                    back: BACK_TEMPLATE.to_string(),
                },
                CardTemplate {
                    name: "MangAnkiReversed".to_string(),
                    front: FRONT_TEMPLATE_REVERSE.to_string(),
                    back: BACK_TEMPLATE_REVERSE.to_string(),
                },
            ],
        }
    }
}

/// Content of one flashcard before it is sent to Anki
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardNote {
    pub expression: String,
    pub reading: String,
    pub translation: String,
    pub takoboto_link: String,
    /// Screenshot of the sentence the word was marked in
    pub sentence_image: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub tag: Option<String>,
}

impl CardNote {
    /// `expression` is the text as marked by the user, which may differ
    /// from the entry's spelling.
    pub fn from_entry(
        expression: &str,
        entry: Option<&DictionaryEntry>,
        preferred_language: &str,
    ) -> Self {
        let mut note = CardNote {
            expression: expression.to_string(),
            ..CardNote::default()
        };

        if let Some(entry) = entry {
            note.translation = entry.translation(preferred_language);
            note.reading = entry.reading();
            note.takoboto_link = takoboto_card_link(&entry.unique_id);
        }

        note
    }

    pub fn with_image(mut self, image: Option<PathBuf>) -> Self {
        self.sentence_image = image;
        self
    }

    pub fn with_audio(mut self, audio: Option<PathBuf>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim();
        self.tag = (!tag.is_empty()).then(|| tag.to_string());
        self
    }

    /// Field values keyed by field name. `image_file`/`audio_file` are the
    /// names Anki stored the media under.
    pub fn fields(
        &self,
        image_file: Option<&str>,
        audio_file: Option<&str>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        let mut set = |name: &str, value: String| {
            fields.insert(name.to_string(), serde_json::Value::String(value));
        };

        set(FIELD_EXPRESSION, self.expression.clone());
        set(FIELD_READING, self.reading.clone());
        set(FIELD_TRANSLATION, self.translation.clone());
        set(FIELD_TAKOBOTO_LINK, self.takoboto_link.clone());
        set(
            FIELD_SENTENCE,
            image_file
                .map(|file| format!("<img src=\"{file}\"/>"))
                .unwrap_or_default(),
        );
        set(
            FIELD_AUDIO,
            audio_file
                .map(|file| format!("[sound:{file}]"))
                .unwrap_or_default(),
        );

        fields
    }

    pub fn tags(&self) -> Vec<String> {
        self.tag.iter().cloned().collect()
    }
}

/// File name to store a media file under in Anki's collection
pub fn media_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| format!("manganki_{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DictionaryEntry {
        let mut entry = DictionaryEntry::new("1358280");
        entry.kanji_readings = vec!["日本語".to_string()];
        entry.kana_readings = vec!["にほんご".to_string()];
        entry.add_translation("eng", "Japanese (language) [n]".to_string());
        entry
    }

    #[test]
    fn note_from_entry() {
        let note = CardNote::from_entry("日本語", Some(&entry()), "ger");

        assert_eq!(note.expression, "日本語");
        assert_eq!(note.reading, "にほんご");
        assert_eq!(note.translation, "Japanese (language) [n]");
        assert!(note.takoboto_link.starts_with("intent:#Intent;package=jp.takoboto;"));
        assert!(note.takoboto_link.contains("i.word=1358280;"));
    }

    #[test]
    fn note_without_entry_only_has_expression() {
        let note = CardNote::from_entry("にほんご", None, "eng");
        let fields = note.fields(None, None);

        assert_eq!(fields[FIELD_EXPRESSION], "にほんご");
        assert_eq!(fields[FIELD_TRANSLATION], "");
        assert_eq!(fields[FIELD_SENTENCE], "");
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn media_fields_reference_stored_files() {
        let note = CardNote::from_entry("日本語", Some(&entry()), "eng");
        let fields = note.fields(Some("manganki_page.png"), Some("manganki_word.mp3"));

        assert_eq!(fields[FIELD_SENTENCE], "<img src=\"manganki_page.png\"/>");
        assert_eq!(fields[FIELD_AUDIO], "[sound:manganki_word.mp3]");
    }

    #[test]
    fn blank_tag_is_dropped() {
        let note = CardNote::default().with_tag("  ");
        assert!(note.tags().is_empty());

        let note = CardNote::default().with_tag(" manga ");
        assert_eq!(note.tags(), vec!["manga"]);
    }

    #[test]
    fn model_fields_match_note_fields() {
        let model = NoteModel::manganki();
        let fields = CardNote::default().fields(None, None);

        assert_eq!(model.fields.len(), fields.len());
        for field in &model.fields {
            assert!(fields.contains_key(field), "missing {field}");
        }
        assert_eq!(model.templates.len(), 2);
    }

    #[test]
    fn media_names_are_prefixed() {
        assert_eq!(
            media_file_name(Path::new("/tmp/shot.png")),
            Some("manganki_shot.png".to_string())
        );
        assert_eq!(media_file_name(Path::new("/")), None);
    }
}
