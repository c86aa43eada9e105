pub mod cache;
pub mod dictionary;
pub mod loader;
pub mod loaders;

pub use cache::{SourceStamp, load_snapshot, save_snapshot};
pub use dictionary::JMdict;
pub use loader::{DictionaryRequest, JMdictLoader};
pub use loaders::{JsonLoader, SourceFormat, XmlLoader};
