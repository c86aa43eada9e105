mod client;
mod note;

pub use client::AnkiConnectClient;
pub use note::{CardNote, CardTemplate, MODEL_NAME, NoteModel, media_file_name};

use anyhow::Result;
use async_trait::async_trait;

/// Destination for finished flashcards
#[async_trait]
pub trait CardSink: Send + Sync {
    /// Create the card, returning the new note's ID
    async fn add_card(&self, deck: &str, note: &CardNote) -> Result<u64>;
}

#[async_trait]
impl CardSink for AnkiConnectClient {
    async fn add_card(&self, deck: &str, note: &CardNote) -> Result<u64> {
        let model = NoteModel::manganki();
        self.ensure_model(&model).await?;

        let image_file = match &note.sentence_image {
            Some(path) => Some(self.store_media_file(path).await?),
            None => None,
        };
        let audio_file = match &note.audio {
            Some(path) => Some(self.store_media_file(path).await?),
            None => None,
        };

        let fields = note.fields(image_file.as_deref(), audio_file.as_deref());
        self.add_note(deck, &model.name, fields, &note.tags()).await
    }
}
