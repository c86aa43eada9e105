mod loading_tests;

use std::sync::Arc;

use manganki_core::DictionaryEntry;
use manganki_lang_japanese::JMdict;

pub(crate) fn entry(id: &str, kanji: &[&str], kana: &[&str], eng: &str) -> DictionaryEntry {
    let mut entry = DictionaryEntry::new(id);
    entry.kanji_readings = kanji.iter().map(|s| s.to_string()).collect();
    entry.kana_readings = kana.iter().map(|s| s.to_string()).collect();
    entry.add_translation("eng", eng.to_string());
    entry
}

/// 箸 and 橋 share the reading はし
pub(crate) fn dictionary() -> Arc<JMdict> {
    let mut hashi = entry("1", &["箸"], &["はし"], "chopsticks");
    hashi.add_translation("ger", "Essstäbchen".to_string());

    Arc::new(JMdict::from_entries(vec![
        hashi,
        entry("2", &["橋"], &["はし"], "bridge"),
        entry("3", &[], &["それ"], "that"),
    ]))
}
