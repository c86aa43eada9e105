//! Outbound links to the Takoboto dictionary, keyed by JMdict entry ID.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

const WEB_BASE: &str = "https://takoboto.jp/?w=";

/// `http://takoboto.jp/?w=`, already percent-encoded
const ENCODED_FALLBACK_BASE: &str = "http%3A%2F%2Ftakoboto.jp%2F%3Fw%3D";

/// Browser link, used for the "open in browser" action
pub fn takoboto_web_link(unique_id: &str) -> String {
    format!("{WEB_BASE}{unique_id}")
}

/// Android intent opening the Takoboto app, with a browser fallback.
/// Stored on cards so the link works from AnkiDroid.
pub fn takoboto_card_link(unique_id: &str) -> String {
    let encoded_id = utf8_percent_encode(unique_id, NON_ALPHANUMERIC);
    format!(
        "intent:#Intent;package=jp.takoboto;action=jp.takoboto.WORD;i.word={unique_id};\
         S.browser_fallback_url={ENCODED_FALLBACK_BASE}{encoded_id};end"
    )
}
