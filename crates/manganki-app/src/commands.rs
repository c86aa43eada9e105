use std::path::PathBuf;

use anyhow::Context;
use manganki_anki::{AnkiConnectClient, CardNote, CardSink};
use manganki_config::Config;
use manganki_core::dictionary::Dictionary;
use manganki_core::links::takoboto_web_link;
use manganki_lang_japanese::JMdict;

use crate::loading::{dictionary_request, spawn_dictionary_load, wait_for_dictionary};
use crate::profile::Preferences;

async fn load(
    config: &Config,
    preferences: &Preferences,
    force_rebuild: bool,
) -> anyhow::Result<std::sync::Arc<JMdict>> {
    let request = dictionary_request(
        config,
        &preferences.preferred_translation_language,
        force_rebuild,
    );
    wait_for_dictionary(spawn_dictionary_load(request)).await
}

pub async fn lookup(config: &Config, preferences: &Preferences, text: &str) -> anyhow::Result<()> {
    let dictionary = load(config, preferences, false).await?;
    let results = dictionary.lookup(text);

    if results.is_empty() {
        println!("No entries for {text}");
        return Ok(());
    }

    for (i, entry) in results.iter().enumerate() {
        println!(
            "{:>3}. {}",
            i + 1,
            entry.stringify(&preferences.preferred_translation_language)
        );
        println!("     {}", takoboto_web_link(&entry.unique_id));
    }
    Ok(())
}

pub async fn languages(config: &Config, preferences: &Preferences) -> anyhow::Result<()> {
    let dictionary = load(config, preferences, false).await?;
    for language in dictionary.get_languages() {
        println!("{language}");
    }
    Ok(())
}

pub async fn info(config: &Config, preferences: &Preferences) -> anyhow::Result<()> {
    let dictionary = load(config, preferences, false).await?;
    let metadata = dictionary.metadata();

    println!("Name:                  {}", metadata.name);
    println!("Language:              {}", metadata.language);
    println!("Source:                {}", config.dictionary.path);
    match config.dictionary.snapshot_path() {
        Some(path) => println!("Snapshot:              {}", path.display()),
        None => println!("Snapshot:              disabled"),
    }
    println!("Entries:               {}", metadata.entry_count);
    println!("Kanji keys:            {}", metadata.kanji_keys);
    println!("Kana keys:             {}", metadata.kana_keys);
    println!("Translation languages: {}", metadata.translation_languages);
    Ok(())
}

pub async fn rebuild(config: &Config, preferences: &Preferences) -> anyhow::Result<()> {
    if config.dictionary.snapshot_path().is_none() {
        tracing::warn!("Snapshot cache is disabled, rebuilding only in memory");
    }

    let dictionary = load(config, preferences, true).await?;
    println!("Rebuilt dictionary with {} entries", dictionary.entry_count());
    Ok(())
}

pub struct CardRequest {
    pub text: String,
    /// One-based position in the lookup results
    pub select: usize,
    pub image: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub tag: Option<String>,
}

pub async fn card(
    config: &Config,
    preferences: &Preferences,
    request: CardRequest,
) -> anyhow::Result<()> {
    if !config.anki.enabled {
        anyhow::bail!("Anki integration is disabled in the config");
    }

    let client = AnkiConnectClient::new(config.anki.url.clone());
    let version = client
        .check_connection()
        .await
        .with_context(|| format!("AnkiConnect is not reachable at {}", config.anki.url))?;
    tracing::debug!("AnkiConnect version {version}");

    let dictionary = load(config, preferences, false).await?;
    let text = request.text.as_str();
    let results = dictionary.lookup(text);

    let entry = request
        .select
        .checked_sub(1)
        .and_then(|idx| results.get(idx).copied())
        .with_context(|| {
            format!(
                "No result {} for {text} ({} results)",
                request.select,
                results.len()
            )
        })?;

    let tag = request.tag.as_deref().unwrap_or(&preferences.tag);
    let note = CardNote::from_entry(text, Some(entry), &preferences.preferred_translation_language)
        .with_image(request.image)
        .with_audio(request.audio)
        .with_tag(tag);

    let note_id = client
        .add_card(&config.anki.deck, &note)
        .await
        .context("Creating Anki card failed")?;

    println!("Card created (note {note_id})");
    Ok(())
}
