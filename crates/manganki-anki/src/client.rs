use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::note::{NoteModel, media_file_name};

#[derive(Clone)]
pub struct AnkiConnectClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnkiConnectClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Check if AnkiConnect is available
    pub async fn check_connection(&self) -> Result<u32> {
        let response: AnkiResponse<u32> = self.invoke("version", json!({})).await?;
        response.into_result()
    }

    /// Get list of model (note type) names
    pub async fn model_names(&self) -> Result<Vec<String>> {
        let response: AnkiResponse<Vec<String>> = self.invoke("modelNames", json!({})).await?;
        response.into_result()
    }

    /// Create `model` unless a note type with its name exists
    pub async fn ensure_model(&self, model: &NoteModel) -> Result<()> {
        let existing = self.model_names().await?;
        if existing.iter().any(|name| name == &model.name) {
            return Ok(());
        }

        tracing::info!("Creating Anki note type {}", model.name);
        let response: AnkiResponse<serde_json::Value> = self
            .invoke("createModel", create_model_params(model))
            .await?;
        response.into_result().map(|_| ())
    }

    /// Copy a local file into Anki's media folder, returning the stored name
    pub async fn store_media_file(&self, path: &Path) -> Result<String> {
        let filename = media_file_name(path)
            .with_context(|| format!("Invalid media file name: {}", path.display()))?;
        let absolute = std::fs::canonicalize(path)
            .with_context(|| format!("Media file not found: {}", path.display()))?;

        let params = json!({
            "filename": filename,
            "path": absolute.to_string_lossy(),
        });

        let response: AnkiResponse<String> = self.invoke("storeMediaFile", params).await?;
        response.into_result()
    }

    /// Add a note to Anki
    pub async fn add_note(
        &self,
        deck: &str,
        model: &str,
        fields: serde_json::Map<String, serde_json::Value>,
        tags: &[String],
    ) -> Result<u64> {
        let params = json!({
            "note": {
                "deckName": deck,
                "modelName": model,
                "fields": fields,
                "tags": tags,
            }
        });

        let response: AnkiResponse<u64> = self.invoke("addNote", params).await?;
        response.into_result()
    }

    /// Invoke an AnkiConnect API action
    async fn invoke<T>(&self, action: &str, params: serde_json::Value) -> Result<AnkiResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = AnkiRequest {
            action: action.to_string(),
            version: 6,
            params,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to AnkiConnect")?;

        response
            .json::<AnkiResponse<T>>()
            .await
            .context("Failed to parse AnkiConnect response")
    }
}

fn create_model_params(model: &NoteModel) -> serde_json::Value {
    let templates: Vec<serde_json::Value> = model
        .templates
        .iter()
        .map(|template| {
            json!({
                "Name": template.name,
                "Front": template.front,
                "Back": template.back,
            })
        })
        .collect();

    json!({
        "modelName": model.name,
        "inOrderFields": model.fields,
        "css": model.css,
        "cardTemplates": templates,
    })
}

#[derive(Serialize)]
struct AnkiRequest {
    action: String,
    version: u32,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct AnkiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

impl<T> AnkiResponse<T> {
    fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            anyhow::bail!("AnkiConnect error: {}", error);
        }

        self.result
            .context("AnkiConnect returned null result")
    }
}
