use std::path::PathBuf;

use kanal::AsyncSender;
use manganki_anki::CardSink;
use manganki_core::types::AppEvent;

use crate::state::Session;

pub async fn handle_card_creation(
    session: &Session,
    card_sink: Option<&dyn CardSink>,
    deck: &str,
    image: Option<PathBuf>,
    audio: Option<PathBuf>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(sink) = card_sink else {
        tracing::warn!("Anki integration disabled");
        app_to_ui_tx
            .send(AppEvent::StatusMessage("Anki integration is disabled".to_string()))
            .await?;
        return Ok(());
    };

    let note = match session.card_note(image, audio) {
        Ok(note) => note,
        Err(e) => {
            app_to_ui_tx.send(AppEvent::StatusMessage(e.to_string())).await?;
            return Ok(());
        }
    };

    match sink.add_card(deck, &note).await {
        Ok(note_id) => {
            tracing::info!("Added card to Anki: note_id={}", note_id);
            app_to_ui_tx.send(AppEvent::CardCreated { note_id }).await?;
        }
        Err(e) => {
            tracing::error!("Failed to add card to Anki: {e:#}");
            app_to_ui_tx
                .send(AppEvent::StatusMessage(format!("Card not created: {e}")))
                .await?;
        }
    }

    Ok(())
}
