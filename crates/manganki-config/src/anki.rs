use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_url() -> String {
    "http://localhost:8765".to_string()
}

fn default_deck() -> String {
    "Default".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AnkiConfig {
    /// Enable Anki integration
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// AnkiConnect URL
    #[serde(default = "default_url")]
    pub url: String,
    /// Deck new cards are added to
    #[serde(default = "default_deck")]
    pub deck: String,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            deck: default_deck(),
        }
    }
}
