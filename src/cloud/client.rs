use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    Client,
    RequestBuilder,
    Response,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{
    providers::{
        AudioProvider,
        LanguageCatalog,
        TranslationProvider,
        TransliterationProvider,
    },
    types::{
        sound_tag,
        AudioResponse,
        DetectResponse,
        ServiceError,
        TranslateAllResponse,
        TranslationResponse,
        TransliterationOption,
        TransliterationResponse,
    },
};
use crate::{
    core::{
        http::{
            ensure_success,
            http_client,
            user_agent,
        },
        LanguageToolsError,
        LanguageToolsResult,
        TranslationRule,
        TransliterationRule,
        VoiceDescriptor,
    },
    persistence::get_app_data_dir,
};

pub const DEFAULT_BASE_URL: &str = "https://cloud-language-tools-6e7b3.ondigitalocean.app";
pub const BASE_URL_ENV: &str = "ANKI_LANGUAGE_TOOLS_BASE_URL";
pub const API_KEY_ENV: &str = "ANKI_LANGUAGE_TOOLS_API_KEY";
const API_KEY_HEADER: &str = "api_key";
const MEDIA_DIR: &str = "media";

/// Client for the language tools cloud service.
pub struct CloudLanguageTools {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    media_dir: PathBuf,
}

impl CloudLanguageTools {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        media_dir: PathBuf,
    ) -> LanguageToolsResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            media_dir,
        })
    }

    /// Base url from `ANKI_LANGUAGE_TOOLS_BASE_URL`, api key from the argument
    /// or `ANKI_LANGUAGE_TOOLS_API_KEY`, audio under the data directory.
    pub fn from_env(api_key: Option<String>) -> LanguageToolsResult<Self> {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = api_key.or_else(|| std::env::var(API_KEY_ENV).ok());
        let media_dir = get_app_data_dir().join(MEDIA_DIR);

        tracing::info!(%base_url, api_key_set = api_key.is_some(), "Using language tools service");
        Self::new(&base_url, api_key, media_dir)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let (name, value) = user_agent();
        let builder = builder.header(name, value);
        match &self.api_key {
            Some(api_key) => builder.header(API_KEY_HEADER, api_key),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> LanguageToolsResult<T> {
        let response = self.with_headers(self.client.get(self.url(path))).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> LanguageToolsResult<Response> {
        tracing::debug!(path, "POST");
        let response = self.with_headers(self.client.post(self.url(path))).json(body).send().await?;
        ensure_success(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> LanguageToolsResult<T> {
        Ok(self.post(path, body).await?.json().await?)
    }

    async fn write_audio(&self, bytes: &[u8]) -> LanguageToolsResult<PathBuf> {
        tokio::fs::create_dir_all(&self.media_dir).await?;
        let full_filename = self.media_dir.join(format!("languagetools-{}.mp3", Uuid::new_v4()));
        tokio::fs::write(&full_filename, bytes).await?;
        Ok(full_filename)
    }
}

#[async_trait]
impl TranslationProvider for CloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        rule: &TranslationRule,
    ) -> LanguageToolsResult<TranslationResponse> {
        let body = serde_json::json!({
            "text": text,
            "service": rule.service,
            "from_language": rule.from_language,
            "to_language": rule.to_language,
        });
        self.post_json("translate", &body).await
    }

    async fn request_all(
        &self,
        text: &str,
        from_language: &str,
        to_language: &str,
    ) -> LanguageToolsResult<BTreeMap<String, String>> {
        let body = serde_json::json!({
            "text": text,
            "from_language": from_language,
            "to_language": to_language,
        });
        match self.post_json("translate_all", &body).await? {
            TranslateAllResponse::Success(translations) => Ok(translations),
            TranslateAllResponse::Error { error } => Err(LanguageToolsError::Request(error)),
        }
    }
}

#[async_trait]
impl TransliterationProvider for CloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        rule: &TransliterationRule,
    ) -> LanguageToolsResult<TransliterationResponse> {
        let body = serde_json::json!({
            "text": text,
            "service": rule.transliteration_service,
            "transliteration_key": rule.transliteration_key,
        });
        self.post_json("transliterate", &body).await
    }
}

#[async_trait]
impl AudioProvider for CloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        voice: &VoiceDescriptor,
    ) -> LanguageToolsResult<AudioResponse> {
        if text.trim().is_empty() {
            return Ok(AudioResponse::Success { sound_tag: None, full_filename: PathBuf::new() });
        }

        let body = serde_json::json!({ "text": text, "voice": voice.voice_key });
        // error statuses read the same as an error payload
        let response = match self.post("audio", &body).await {
            Ok(response) => response,
            Err(e) => return Ok(AudioResponse::Error { error: e.to_string() }),
        };

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        if is_json {
            let ServiceError { error } = response.json().await?;
            return Ok(AudioResponse::Error { error });
        }

        let bytes = response.bytes().await?;
        let full_filename = self.write_audio(&bytes).await?;
        let tag = full_filename.file_name().and_then(|name| name.to_str()).map(sound_tag);

        tracing::debug!(path = %full_filename.display(), size = bytes.len(), "Audio written");
        Ok(AudioResponse::Success { sound_tag: tag, full_filename })
    }
}

#[async_trait]
impl LanguageCatalog for CloudLanguageTools {
    async fn language_list(&self) -> LanguageToolsResult<BTreeMap<String, String>> {
        self.get_json("language_list").await
    }

    async fn transliteration_language_list(&self) -> LanguageToolsResult<Vec<TransliterationOption>> {
        self.get_json("transliteration_language_list").await
    }

    async fn detect(&self, text_list: &[String]) -> LanguageToolsResult<String> {
        let body = serde_json::json!({ "text_list": text_list });
        let DetectResponse { detected_language } = self.post_json("detect", &body).await?;
        Ok(detected_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CloudLanguageTools {
        CloudLanguageTools::new("http://localhost:5000/", None, PathBuf::from("/tmp/media")).unwrap()
    }

    #[test]
    fn test_url_joins_paths() {
        let client = client();
        assert_eq!(client.base_url, "http://localhost:5000");
        assert_eq!(client.url("translate"), "http://localhost:5000/translate");
        assert_eq!(client.url("/detect"), "http://localhost:5000/detect");
    }

    #[tokio::test]
    async fn test_audio_for_whitespace_has_no_tag() {
        let voice = VoiceDescriptor {
            voice_key: serde_json::json!({ "name": "x" }),
            voice_description: "x".to_string(),
        };
        let response = AudioProvider::request(&client(), "   ", &voice).await.unwrap();
        let result = AudioProvider::interpret(&client(), response).unwrap();
        assert_eq!(result.sound_tag, None);
    }

    #[tokio::test]
    async fn test_write_audio_uses_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let client =
            CloudLanguageTools::new("http://localhost:5000", None, dir.path().join("media")).unwrap();

        let first = client.write_audio(b"ID3").await.unwrap();
        let second = client.write_audio(b"ID3").await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with(dir.path().join("media")));
        assert_eq!(std::fs::read(&first).unwrap(), b"ID3");
    }

    /// Answers one request with `status` and a JSON body, then closes.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{
            AsyncReadExt,
            AsyncWriteExt,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            loop {
                let read = socket.read(&mut buffer).await.unwrap();
                request.extend_from_slice(&buffer[..read]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if read == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{address}")
    }

    #[tokio::test]
    async fn test_audio_error_status_reads_like_error_payload() {
        let base_url = serve_once("429 Too Many Requests", r#"{"error": "quota exceeded"}"#).await;
        let dir = tempfile::tempdir().unwrap();
        let client = CloudLanguageTools::new(&base_url, None, dir.path().to_path_buf()).unwrap();
        let voice = VoiceDescriptor {
            voice_key: serde_json::json!({ "name": "x" }),
            voice_description: "x".to_string(),
        };

        let response = AudioProvider::request(&client, "老人家", &voice).await.unwrap();
        assert!(matches!(&response, AudioResponse::Error { error } if error == "quota exceeded"));

        let err = AudioProvider::interpret(&client, response).unwrap_err();
        assert_eq!(err.to_string(), "Could not generate audio: quota exceeded");
    }
}
