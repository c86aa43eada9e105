use std::fs;

use manganki_config::Config;

use crate::loading::{
    dictionary_request, language_reload, spawn_dictionary_load, wait_for_dictionary,
};

const JMDICT_JSON: &str = r#"{"words": [{
    "id": "1358280",
    "kanji": [{"text": "日本語", "tags": []}],
    "kana": [{"text": "にほんご", "tags": []}],
    "sense": [{"partOfSpeech": ["n"], "gloss": [{"lang": "eng", "text": "Japanese (language)"}]}]
}]}"#;

fn config_for(dir: &tempfile::TempDir, source: &str) -> Config {
    let mut config = Config::default();
    config.dictionary.path = dir.path().join(source).display().to_string();
    config.dictionary.cache_path = Some(dir.path().join("jmdict.snapshot").display().to_string());
    config
}

#[tokio::test]
async fn background_load_completes_once_with_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("jmdict.json"), JMDICT_JSON).unwrap();
    let config = config_for(&dir, "jmdict.json");

    let rx = spawn_dictionary_load(dictionary_request(&config, "eng", false));
    let dictionary = wait_for_dictionary(rx).await.unwrap();

    let results = dictionary.lookup("日本語");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].unique_id, "1358280");
    assert!(dir.path().join("jmdict.snapshot").exists());
}

#[tokio::test]
async fn background_load_reports_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir, "missing.json");

    let rx = spawn_dictionary_load(dictionary_request(&config, "eng", false));
    let err = wait_for_dictionary(rx).await.unwrap_err();

    assert!(format!("{err:#}").contains("missing.json"));
}

#[tokio::test]
async fn disabled_cache_writes_no_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("jmdict.json"), JMDICT_JSON).unwrap();
    let mut config = config_for(&dir, "jmdict.json");
    config.dictionary.cache_enabled = false;

    let request = dictionary_request(&config, "eng", false);
    assert!(request.cache.is_none());

    let dictionary = wait_for_dictionary(spawn_dictionary_load(request)).await.unwrap();
    assert_eq!(dictionary.entry_count(), 1);
    assert!(!dir.path().join("jmdict.snapshot").exists());
}

const JMDICT_XML: &str = r#"<JMdict>
<entry>
<ent_seq>1358280</ent_seq>
<k_ele><keb>日本語</keb></k_ele>
<r_ele><reb>にほんご</reb></r_ele>
<sense>
<gloss>Japanese (language)</gloss>
<gloss xml:lang="ger">Japanisch</gloss>
</sense>
</entry>
</JMdict>"#;

#[tokio::test]
async fn xml_source_keeps_the_requested_language() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("JMdict.xml"), JMDICT_XML).unwrap();
    let config = config_for(&dir, "JMdict.xml");
    assert_eq!(config.dictionary.preferred_language, "eng");

    // The preferred language comes from the user's preferences, not the config default
    let rx = spawn_dictionary_load(dictionary_request(&config, "ger", false));
    let dictionary = wait_for_dictionary(rx).await.unwrap();

    assert!(dictionary.get_languages().contains("ger"));
    assert_eq!(dictionary.lookup("日本語")[0].translation("ger"), "Japanisch");
}

#[tokio::test]
async fn reload_only_for_xml_missing_the_language() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("JMdict.xml"), JMDICT_XML).unwrap();
    fs::write(dir.path().join("jmdict.json"), JMDICT_JSON).unwrap();

    let xml_config = config_for(&dir, "JMdict.xml");
    let rx = spawn_dictionary_load(dictionary_request(&xml_config, "eng", false));
    let english = wait_for_dictionary(rx).await.unwrap();

    let request = language_reload(&xml_config, &*english, "ger").unwrap();
    assert_eq!(request.preferred_language, "ger");
    assert!(language_reload(&xml_config, &*english, "eng").is_none());

    let json_config = config_for(&dir, "jmdict.json");
    assert!(language_reload(&json_config, &*english, "ger").is_none());
}
