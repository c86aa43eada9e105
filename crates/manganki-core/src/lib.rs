pub mod dictionary;
pub mod links;
pub mod types;

pub use dictionary::{
    CacheError, DictionaryEntry, DictionaryLoader, DictionaryMetadata, LoadError,
    ParsedDictionary,
};
