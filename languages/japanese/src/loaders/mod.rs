use std::fs::File;
use std::io::Read;
use std::path::Path;

use manganki_core::{DictionaryLoader, LoadError};

pub mod json;
pub mod xml;

pub use json::JsonLoader;
pub use xml::XmlLoader;

/// Reading tags whose readings are never indexed: rarely used kanji forms
/// and irregular okurigana.
const EXCLUDED_READING_TAGS: &[&str] = &["rK", "io"];

pub(crate) fn is_excluded_reading<S: AsRef<str>>(tags: &[S]) -> bool {
    tags.iter()
        .any(|tag| EXCLUDED_READING_TAGS.contains(&tag.as_ref()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Xml,
}

impl SourceFormat {
    /// Pick the format from the file extension, then from the first
    /// non-whitespace byte of the file.
    pub fn detect(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => return Ok(SourceFormat::Json),
            Some("xml") => return Ok(SourceFormat::Xml),
            _ => {}
        }

        let io_error = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut head = [0u8; 512];
        let read = File::open(path)
            .and_then(|mut file| file.read(&mut head))
            .map_err(io_error)?;

        // Skip a UTF-8 BOM before sniffing
        let head = head[..read]
            .strip_prefix(&[0xEF, 0xBB, 0xBF])
            .unwrap_or(&head[..read]);

        match head.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Ok(SourceFormat::Json),
            Some(b'<') => Ok(SourceFormat::Xml),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Loader for the source at `path`. `preferred_language` only affects XML
/// sources, JSON sources keep every gloss language.
pub fn for_path(
    path: &Path,
    preferred_language: &str,
) -> Result<Box<dyn DictionaryLoader>, LoadError> {
    let loader: Box<dyn DictionaryLoader> = match SourceFormat::detect(path)? {
        SourceFormat::Json => Box::new(JsonLoader),
        SourceFormat::Xml => Box::new(XmlLoader::new(preferred_language)),
    };

    Ok(loader)
}
