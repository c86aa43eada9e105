use std::io::BufRead;
use std::path::PathBuf;

use kanal::AsyncSender;
use manganki_core::types::{AppEvent, UiEvent};
use tokio_util::sync::CancellationToken;

/// Turn one line of session input into an event. Plain text is a lookup,
/// lines starting with `:` are commands. Surrounding whitespace is not part
/// of the input.
pub fn parse_line(line: &str) -> Result<Option<AppEvent>, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        if line.is_empty() {
            return Ok(None);
        }
        return Ok(Some(AppEvent::TextInput(line.to_string())));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();

    let event = match name {
        "q" | "quit" => UiEvent::Close,
        "card" => UiEvent::CreateCard {
            image: parts.next().map(PathBuf::from),
            audio: parts.next().map(PathBuf::from),
        },
        "lang" => match parts.next() {
            Some(language) => UiEvent::SetLanguage(language.to_string()),
            None => return Err("usage: :lang <code>".to_string()),
        },
        "tag" => UiEvent::SetTag(parts.collect::<Vec<_>>().join(" ")),
        number => match number.parse::<usize>() {
            Ok(n) if n >= 1 => UiEvent::SelectResult(n - 1),
            _ => return Err(format!("unknown command :{command}")),
        },
    };

    Ok(Some(AppEvent::UiEvent(event)))
}

/// Read session input from stdin on a dedicated thread, so a pending read
/// never holds up shutdown
pub async fn watcher_io(
    event_tx: AsyncSender<AppEvent>,
    ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let handle = tokio::runtime::Handle::current();
    let thread_cancel = cancel.clone();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if thread_cancel.is_cancelled() {
                return;
            }

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read input: {e}");
                    break;
                }
            };

            let sent = match parse_line(&line) {
                Ok(Some(event)) => handle.block_on(event_tx.send(event)),
                Ok(None) => Ok(()),
                Err(message) => handle.block_on(ui_tx.send(AppEvent::StatusMessage(message))),
            };
            if sent.is_err() {
                return;
            }
        }

        // End of input closes the session
        let _ = handle.block_on(event_tx.send(AppEvent::UiEvent(UiEvent::Close)));
    });

    cancel.cancelled().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui(line: &str) -> UiEvent {
        match parse_line(line) {
            Ok(Some(AppEvent::UiEvent(event))) => event,
            other => panic!("expected ui event for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_lookup() {
        match parse_line("日本語") {
            Ok(Some(AppEvent::TextInput(text))) => assert_eq!(text, "日本語"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse_line(""), Ok(None)));
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        match parse_line("  箸\r") {
            Ok(Some(AppEvent::TextInput(text))) => assert_eq!(text, "箸"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse_line("   "), Ok(None)));
        assert!(matches!(ui(" :2 "), UiEvent::SelectResult(1)));
    }

    #[test]
    fn selection_is_one_based() {
        assert!(matches!(ui(":1"), UiEvent::SelectResult(0)));
        assert!(matches!(ui(":12"), UiEvent::SelectResult(11)));
        assert!(parse_line(":0").is_err());
    }

    #[test]
    fn commands() {
        assert!(matches!(ui(":q"), UiEvent::Close));
        assert!(matches!(ui(":lang ger"), UiEvent::SetLanguage(lang) if lang == "ger"));
        assert!(matches!(ui(":tag one piece"), UiEvent::SetTag(tag) if tag == "one piece"));
        assert!(matches!(ui(":tag"), UiEvent::SetTag(tag) if tag.is_empty()));

        match ui(":card page.png word.mp3") {
            UiEvent::CreateCard { image, audio } => {
                assert_eq!(image, Some(PathBuf::from("page.png")));
                assert_eq!(audio, Some(PathBuf::from("word.mp3")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_commands_are_reported() {
        assert!(parse_line(":lang").is_err());
        assert!(parse_line(":frobnicate").is_err());
    }
}
