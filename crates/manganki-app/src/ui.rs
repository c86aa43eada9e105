use std::io::Write;

use kanal::AsyncReceiver;
use manganki_core::types::{AppEvent, DisplayResult};
use tokio_util::sync::CancellationToken;

/// Print app events for the terminal session
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            event = app_to_ui_rx.recv() => event?,
            _ = cancel.cancelled() => break,
        };

        let text = render_event(&event);
        if text.is_empty() {
            continue;
        }

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
    }

    Ok(())
}

pub fn render_event(event: &AppEvent) -> String {
    match event {
        AppEvent::DictionaryReady { entries, languages } => format!(
            "Dictionary ready: {entries} entries, languages: {}",
            languages.join(", ")
        ),
        AppEvent::DictionaryFailed(message) => format!("Dictionary failed to load: {message}"),
        AppEvent::ShowResults(results) => render_results(results),
        AppEvent::ResultSelected(result) => {
            format!("Selected {}\n{}", render_result(result), result.web_link)
        }
        AppEvent::CardCreated { note_id } => format!("Card created (note {note_id})"),
        AppEvent::StatusMessage(message) => message.clone(),
        AppEvent::TextInput(_) | AppEvent::UiEvent(_) => String::new(),
    }
}

pub fn render_results(results: &[DisplayResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("{:>3}. {}", i + 1, render_result(result)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_result(result: &DisplayResult) -> String {
    if result.reading == result.expression {
        format!("{}: {}", result.expression, result.translation)
    } else {
        format!(
            "{} [{}]: {}",
            result.expression, result.reading, result.translation
        )
    }
}
