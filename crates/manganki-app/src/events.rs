use std::path::PathBuf;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use manganki_anki::CardSink;
use manganki_core::dictionary::Dictionary;
use manganki_core::types::{AppEvent, UiEvent};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::loading::{LoadResult, dictionary_request, language_reload, spawn_dictionary_load};
use crate::profile::store_preferences;
use crate::state::{AppState, Session};

pub mod create_card;
pub mod text_input;

use create_card::handle_card_creation;
use text_input::{handle_result_selection, handle_text_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Parse the source again for the current preferences
    ReloadDictionary,
    Exit,
}

/// App's main loop. Owns the session; the dictionary arrives through
/// `load_rx` once the background load completes.
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    mut load_rx: oneshot::Receiver<LoadResult>,
    card_sink: Option<Arc<dyn CardSink>>,
    mut session: Session,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut loading = true;

    tracing::info!("Event loop started, waiting for the dictionary");
    loop {
        tokio::select! {
            result = &mut load_rx, if loading => {
                loading = false;
                let event = match result {
                    Ok(Ok(dictionary)) => {
                        let languages = dictionary.get_languages().iter().cloned().collect();
                        let entries = dictionary.entry_count();
                        let dictionary: Arc<dyn Dictionary> = dictionary;
                        session.dictionary_ready(dictionary);
                        AppEvent::DictionaryReady { entries, languages }
                    }
                    Ok(Err(e)) => AppEvent::DictionaryFailed(e.to_string()),
                    Err(_) => AppEvent::DictionaryFailed("dictionary loader stopped".to_string()),
                };
                app_to_ui_tx.send(event.clone()).await?;

                if let AppEvent::DictionaryFailed(message) = event {
                    // A failed reload keeps the dictionary already loaded
                    if session.dictionary().is_some() {
                        tracing::warn!("Reloading dictionary failed: {message}");
                        continue;
                    }
                    // Nothing to look up without a dictionary; `manganki rebuild` is the way out
                    anyhow::bail!("Loading dictionary failed: {message}");
                }

                if !session.results().is_empty() {
                    app_to_ui_tx.send(AppEvent::ShowResults(session.display_results())).await?;
                }
            }
            event = ui_to_app_rx.recv() => {
                let event = event?;
                tracing::debug!("Event received: {:?}", std::mem::discriminant(&event));

                let flow = handle_events(
                    &state,
                    &mut session,
                    card_sink.as_deref(),
                    &app_to_ui_tx,
                    event,
                )
                .await?;
                match flow {
                    Flow::Continue => {}
                    Flow::ReloadDictionary => {
                        let request = {
                            let config = state.config.read().await;
                            dictionary_request(
                                &config,
                                &session.preferences().preferred_translation_language,
                                false,
                            )
                        };
                        load_rx = spawn_dictionary_load(request);
                        loading = true;
                    }
                    Flow::Exit => break,
                }
            }
            _ = cancel.cancelled() => break,
        }
    }

    save_preferences(&state, &session).await;
    Ok(())
}

pub async fn handle_events(
    state: &AppState,
    session: &mut Session,
    card_sink: Option<&dyn CardSink>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<Flow> {
    match event {
        AppEvent::TextInput(text) => {
            handle_text_input(session, &text, app_to_ui_tx).await?;
        }
        AppEvent::UiEvent(UiEvent::SelectResult(index)) => {
            handle_result_selection(session, index, app_to_ui_tx).await?;
        }
        AppEvent::UiEvent(UiEvent::CreateCard { image, audio }) => {
            let deck = state.config.read().await.anki.deck.clone();
            handle_card_creation(session, card_sink, &deck, image, audio, app_to_ui_tx).await?;
        }
        AppEvent::UiEvent(UiEvent::SetLanguage(language)) => {
            session.set_language(&language);
            save_preferences(state, session).await;

            let reload = match session.dictionary() {
                Some(dictionary) => {
                    language_reload(&*state.config.read().await, dictionary, &language).is_some()
                }
                None => false,
            };
            if reload {
                tracing::info!("Reloading dictionary for language {language}");
                app_to_ui_tx
                    .send(AppEvent::StatusMessage(format!(
                        "Loading {language} translations..."
                    )))
                    .await?;
                return Ok(Flow::ReloadDictionary);
            }

            app_to_ui_tx
                .send(AppEvent::StatusMessage(format!("Translation language: {language}")))
                .await?;
            if !session.results().is_empty() {
                app_to_ui_tx
                    .send(AppEvent::ShowResults(session.display_results()))
                    .await?;
            }
        }
        AppEvent::UiEvent(UiEvent::SetTag(tag)) => {
            session.set_tag(&tag);
            save_preferences(state, session).await;
            let message = match session.preferences().tag.as_str() {
                "" => "Tag cleared".to_string(),
                tag => format!("Tag: {tag}"),
            };
            app_to_ui_tx.send(AppEvent::StatusMessage(message)).await?;
        }
        AppEvent::UiEvent(UiEvent::Close) => return Ok(Flow::Exit),
        // App-to-UI events, nothing to do in the backend
        AppEvent::DictionaryReady { .. }
        | AppEvent::DictionaryFailed(_)
        | AppEvent::ShowResults(_)
        | AppEvent::ResultSelected(_)
        | AppEvent::CardCreated { .. }
        | AppEvent::StatusMessage(_) => {}
    }

    Ok(Flow::Continue)
}

async fn save_preferences(state: &AppState, session: &Session) {
    let path = PathBuf::from(&state.config.read().await.preferences_path);
    if let Err(e) = store_preferences(&path, session.preferences()) {
        tracing::warn!("{e:#}");
    }
}
