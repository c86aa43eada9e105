use kanal::AsyncSender;
use manganki_core::types::{AppEvent, DisplayResult};

use crate::state::{Session, SessionError};

pub async fn handle_text_input(
    session: &mut Session,
    text: &str,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::debug!("Looking up '{}'", text);

    match session.search(text).map(|results| results.len()) {
        Ok(0) => {
            app_to_ui_tx
                .send(AppEvent::StatusMessage(format!("No entries for {text}")))
                .await?;
        }
        Ok(_) => {
            app_to_ui_tx
                .send(AppEvent::ShowResults(session.display_results()))
                .await?;
        }
        Err(SessionError::NotReady) => {
            // Looked up once the dictionary arrives
            app_to_ui_tx
                .send(AppEvent::StatusMessage(
                    "Dictionary is still loading, the lookup will run once it is ready".to_string(),
                ))
                .await?;
        }
        Err(e) => {
            app_to_ui_tx.send(AppEvent::StatusMessage(e.to_string())).await?;
        }
    }

    Ok(())
}

pub async fn handle_result_selection(
    session: &mut Session,
    index: usize,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let language = session.preferences().preferred_translation_language.clone();

    let event = match session.select(index) {
        Ok(entry) => AppEvent::ResultSelected(DisplayResult::from_entry(entry, &language)),
        Err(e) => AppEvent::StatusMessage(e.to_string()),
    };
    app_to_ui_tx.send(event).await?;

    Ok(())
}
