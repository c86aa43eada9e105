use std::path::{Path, PathBuf};
use std::time::Instant;

use manganki_core::{CacheError, LoadError};

use crate::cache::{SourceStamp, load_snapshot, save_snapshot};
use crate::dictionary::JMdict;
use crate::loaders;

/// Where to load the dictionary from and whether a snapshot may be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRequest {
    pub source: PathBuf,
    /// Snapshot location; `None` disables the snapshot
    pub cache: Option<PathBuf>,
    pub preferred_language: String,
    /// Ignore an existing snapshot and parse the source again
    pub force_rebuild: bool,
}

pub struct JMdictLoader;

impl JMdictLoader {
    /// Parse the source and build the index
    pub fn load_from_file(path: &Path, preferred_language: &str) -> Result<JMdict, LoadError> {
        let started = Instant::now();
        let loader = loaders::for_path(path, preferred_language)?;
        tracing::info!("Loading {} from file: {}", loader.name(), path.display());

        let parsed = loader.load_from_file(path)?;
        let dict = JMdict::from_parsed(parsed);

        tracing::info!(
            "Loaded {} dictionary entries ({} languages) in {:?}",
            dict.entry_count(),
            dict.get_languages().len(),
            started.elapsed()
        );
        Ok(dict)
    }

    /// Use the snapshot when it matches the source, otherwise parse and
    /// write a fresh snapshot. Snapshot problems never fail the load.
    pub fn load_or_build(request: &DictionaryRequest) -> Result<JMdict, LoadError> {
        let stamp = SourceStamp::for_source(&request.source, &request.preferred_language)?;

        if let Some(cache_path) = &request.cache {
            if request.force_rebuild {
                tracing::info!("Rebuild requested, ignoring snapshot {}", cache_path.display());
            } else {
                match load_snapshot(cache_path, Some(&stamp)) {
                    Ok(dict) => {
                        tracing::info!(
                            "Loaded {} dictionary entries from snapshot {}",
                            dict.entry_count(),
                            cache_path.display()
                        );
                        return Ok(dict);
                    }
                    Err(CacheError::Missing { .. }) => {
                        tracing::debug!("No snapshot at {}", cache_path.display());
                    }
                    Err(e) => {
                        tracing::warn!("Dictionary snapshot unusable, rebuilding: {e}");
                    }
                }
            }
        }

        let dict = Self::load_from_file(&request.source, &request.preferred_language)?;

        if let Some(cache_path) = &request.cache {
            match save_snapshot(&dict, Some(&stamp), cache_path) {
                Ok(()) => tracing::info!("Wrote dictionary snapshot {}", cache_path.display()),
                Err(e) => tracing::warn!("Could not write dictionary snapshot: {e}"),
            }
        }

        Ok(dict)
    }
}
