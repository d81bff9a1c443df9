use std::time::Duration;

use reqwest::{
    header::USER_AGENT,
    Client,
    Response,
};

use crate::core::LanguageToolsError;

pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub fn http_client() -> Result<Client, LanguageToolsError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| LanguageToolsError::Custom(format!("HTTP client build failed: {e}")))
}

pub fn user_agent() -> (reqwest::header::HeaderName, String) {
    (USER_AGENT, format!("languagetools/{} (+reqwest)", env!("CARGO_PKG_VERSION")))
}

/// Turns a non-success status into a request error, preferring the `error`
/// field of a JSON body when the service sent one.
pub async fn ensure_success(resp: Response) -> Result<Response, LanguageToolsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(LanguageToolsError::Request(error_message(status.as_u16(), &url, &body)))
}

fn error_message(status: u16, url: &str, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP error {} from {}", status, url))
}
