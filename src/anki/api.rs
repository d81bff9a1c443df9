use std::collections::HashMap;

use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use super::types::Deck;
use crate::core::{
    DeckId,
    LanguageToolsError,
    ModelId,
};

pub const ANKI_CONNECT_URL: &str = "http://localhost:8765/";
pub const ANKI_CONNECT_VERSION: u32 = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, action: &str) -> Result<T, LanguageToolsError> {
        if let Some(error) = self.error {
            tracing::warn!(action, %error, "AnkiConnect returned an error");
            return Err(LanguageToolsError::Request(format!("AnkiConnect {action}: {error}")));
        }
        self.result.ok_or_else(|| {
            LanguageToolsError::Request(format!("AnkiConnect {action}: empty result"))
        })
    }
}

fn request_body(action: &str, params: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
    body.insert("version".to_string(), serde_json::Value::Number(ANKI_CONNECT_VERSION.into()));

    if let Some(params) = params {
        body.insert("params".to_string(), params);
    }

    serde_json::Value::Object(body)
}

async fn make_request<T: for<'de> Deserialize<'de>>(
    client: &Client,
    action: &str,
    params: Option<serde_json::Value>,
) -> Result<T, LanguageToolsError> {
    let body = request_body(action, params);

    let response: ApiResponse<T> =
        client.post(ANKI_CONNECT_URL).json(&body).send().await?.json().await?;

    response.into_result(action)
}

/// Fails with a message the user can act on when Anki is closed or the
/// AnkiConnect add-on is missing or outdated.
pub async fn check_connection(client: &Client) -> Result<u32, LanguageToolsError> {
    checked_version(make_request(client, "version", None).await)
}

fn checked_version(
    version: Result<u32, LanguageToolsError>,
) -> Result<u32, LanguageToolsError> {
    match version {
        Ok(version) if version >= ANKI_CONNECT_VERSION => Ok(version),
        Ok(version) => Err(LanguageToolsError::Request(format!(
            "AnkiConnect version {version} is too old, version {ANKI_CONNECT_VERSION} or newer is needed"
        ))),
        Err(e) => Err(LanguageToolsError::Request(format!(
            "AnkiConnect is not reachable at {ANKI_CONNECT_URL} ({e}). Make sure Anki is running \
             with the AnkiConnect add-on installed"
        ))),
    }
}

pub async fn get_decks(client: &Client) -> Result<Vec<Deck>, LanguageToolsError> {
    let decks: HashMap<String, DeckId> = make_request(client, "deckNamesAndIds", None).await?;

    Ok(decks.into_iter().map(|(name, id)| Deck { name, id }).collect())
}

pub async fn get_model_ids(client: &Client) -> Result<HashMap<String, ModelId>, LanguageToolsError> {
    make_request(client, "modelNamesAndIds", None).await
}

pub async fn get_field_names(
    client: &Client,
    model_name: &str,
) -> Result<Vec<String>, LanguageToolsError> {
    let params = serde_json::json!({ "modelName": model_name });
    make_request(client, "modelFieldNames", Some(params)).await
}
