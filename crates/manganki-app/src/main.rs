use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use manganki_anki::{AnkiConnectClient, CardSink};
use manganki_config::Config;
use tokio::signal;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod controller;
pub mod events;
pub mod io;
pub mod loading;
pub mod profile;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::commands::CardRequest;
use self::controller::AppController;
use self::loading::{dictionary_request, spawn_dictionary_load};
use self::profile::{Preferences, load_config, load_preferences};
use self::state::{AppState, Session};

#[derive(Parser, Debug)]
#[command(name = "manganki", about = "Japanese dictionary lookups and Anki cards", version)]
struct Cli {
    /// JSON config file, replaces defaults and environment settings
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JMdict source file (.json or .xml)
    #[arg(long, global = true, value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// Preferred translation language, e.g. eng or ger
    #[arg(long, global = true)]
    language: Option<String>,

    /// Always parse the source, never read or write the snapshot
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the entries matching a kanji or kana spelling
    Lookup { text: String },
    /// List the translation languages of the dictionary
    Languages,
    /// Show dictionary metadata
    Info,
    /// Parse the source again and rewrite the snapshot
    Rebuild,
    /// Send one lookup result to Anki
    Card {
        text: String,
        /// Result number as printed by `lookup`
        #[arg(short, long, default_value_t = 1)]
        select: usize,
        /// Sentence image attached to the card
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Audio clip attached to the card
        #[arg(long, value_name = "PATH")]
        audio: Option<PathBuf>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Interactive lookup session (default)
    Session,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => apply_cli(config, &cli),
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn apply_cli(mut config: Config, cli: &Cli) -> Config {
    if let Some(path) = &cli.dictionary {
        config.dictionary.path = path.display().to_string();
    }
    if let Some(language) = &cli.language {
        config.dictionary.preferred_language = language.clone();
    }
    if cli.no_cache {
        config.dictionary.cache_enabled = false;
    }
    config
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let mut preferences = load_preferences(
        &PathBuf::from(&config.preferences_path),
        &config.dictionary.preferred_language,
    );
    if let Some(language) = &cli.language {
        preferences.preferred_translation_language = language.clone();
    }

    match cli.command.unwrap_or(Command::Session) {
        Command::Lookup { text } => commands::lookup(&config, &preferences, &text).await,
        Command::Languages => commands::languages(&config, &preferences).await,
        Command::Info => commands::info(&config, &preferences).await,
        Command::Rebuild => commands::rebuild(&config, &preferences).await,
        Command::Card {
            text,
            select,
            image,
            audio,
            tag,
        } => {
            let request = CardRequest {
                text,
                select,
                image,
                audio,
                tag,
            };
            commands::card(&config, &preferences, request).await
        }
        Command::Session => run_session(config, preferences).await,
    }
}

async fn run_session(config: Config, preferences: Preferences) -> anyhow::Result<()> {
    // Restored preferences decide which glosses an XML source keeps
    let load_rx = spawn_dictionary_load(dictionary_request(
        &config,
        &preferences.preferred_translation_language,
        false,
    ));

    let card_sink: Option<Arc<dyn CardSink>> = if config.anki.enabled {
        Some(Arc::new(AnkiConnectClient::new(config.anki.url.clone())))
    } else {
        None
    };

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(load_rx, card_sink, Session::new(preferences));

    println!("Loading dictionary... type a word to look it up, :q to quit");

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::debug!("Session task finished"),
                Some(Ok(Err(e))) => tracing::error!("Session task failed: {e:#}"),
                Some(Err(e)) => tracing::error!("Session task panicked: {e}"),
                None => {}
            }
        }
    }

    controller.shutdown();
    drain(&mut tasks).await;
    Ok(())
}

async fn drain(tasks: &mut JoinSet<anyhow::Result<()>>) {
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::debug!("Task ended with {e:#}");
        }
    }
}
