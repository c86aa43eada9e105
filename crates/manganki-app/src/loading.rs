use std::sync::Arc;

use manganki_config::Config;
use manganki_core::LoadError;
use manganki_core::dictionary::Dictionary;
use manganki_lang_japanese::{DictionaryRequest, JMdict, JMdictLoader, SourceFormat};
use tokio::sync::oneshot;

pub type LoadResult = Result<Arc<JMdict>, LoadError>;

/// `preferred_language` is the language the user reads translations in,
/// which decides the glosses an XML source keeps.
pub fn dictionary_request(
    config: &Config,
    preferred_language: &str,
    force_rebuild: bool,
) -> DictionaryRequest {
    DictionaryRequest {
        source: config.dictionary.source_path(),
        cache: config.dictionary.snapshot_path(),
        preferred_language: preferred_language.to_string(),
        force_rebuild,
    }
}

/// Request that parses the source again for `language`, if `loaded` has no
/// glosses in it and the source drops languages at parse time (XML).
pub fn language_reload(
    config: &Config,
    loaded: &dyn Dictionary,
    language: &str,
) -> Option<DictionaryRequest> {
    if loaded.languages().contains(language) {
        return None;
    }

    match SourceFormat::detect(&config.dictionary.source_path()) {
        Ok(SourceFormat::Xml) => Some(dictionary_request(config, language, false)),
        Ok(SourceFormat::Json) | Err(_) => None,
    }
}

/// Load the dictionary on a blocking worker. The receiver completes exactly
/// once, with the whole dictionary or the load error.
pub fn spawn_dictionary_load(request: DictionaryRequest) -> oneshot::Receiver<LoadResult> {
    let (tx, rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let result = JMdictLoader::load_or_build(&request).map(Arc::new);
        if tx.send(result).is_err() {
            tracing::debug!("Dictionary load finished after its receiver was dropped");
        }
    });

    rx
}

/// Wait for a load started with [`spawn_dictionary_load`]
pub async fn wait_for_dictionary(rx: oneshot::Receiver<LoadResult>) -> anyhow::Result<Arc<JMdict>> {
    match rx.await {
        Ok(Ok(dict)) => Ok(dict),
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("Loading dictionary failed")),
        Err(_) => anyhow::bail!("Dictionary loader stopped without a result"),
    }
}
