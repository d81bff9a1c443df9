use std::{
    collections::BTreeMap,
    sync::Arc,
};

use async_trait::async_trait;

use super::types::{
    AudioResponse,
    AudioResult,
    TranslationResponse,
    TransliterationOption,
    TransliterationResponse,
};
use crate::core::{
    LanguageToolsResult,
    TranslationRule,
    TransliterationRule,
    VoiceDescriptor,
};

/// `request` does the network call and may fail for any service reported
/// reason. `interpret` is pure and turns an error payload into an error.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn request(
        &self,
        text: &str,
        rule: &TranslationRule,
    ) -> LanguageToolsResult<TranslationResponse>;

    fn interpret(&self, response: TranslationResponse) -> LanguageToolsResult<String> {
        response.into_result()
    }

    /// Every available service's translation, keyed by service name.
    async fn request_all(
        &self,
        text: &str,
        from_language: &str,
        to_language: &str,
    ) -> LanguageToolsResult<BTreeMap<String, String>>;
}

#[async_trait]
pub trait TransliterationProvider: Send + Sync {
    async fn request(
        &self,
        text: &str,
        rule: &TransliterationRule,
    ) -> LanguageToolsResult<TransliterationResponse>;

    fn interpret(&self, response: TransliterationResponse) -> LanguageToolsResult<String> {
        response.into_result()
    }
}

#[async_trait]
pub trait AudioProvider: Send + Sync {
    async fn request(&self, text: &str, voice: &VoiceDescriptor)
        -> LanguageToolsResult<AudioResponse>;

    fn interpret(&self, response: AudioResponse) -> LanguageToolsResult<AudioResult> {
        response.into_result()
    }
}

/// Language names, transliteration choices and detection.
#[async_trait]
pub trait LanguageCatalog: Send + Sync {
    /// language code -> display name
    async fn language_list(&self) -> LanguageToolsResult<BTreeMap<String, String>>;

    async fn transliteration_language_list(&self) -> LanguageToolsResult<Vec<TransliterationOption>>;

    async fn detect(&self, text_list: &[String]) -> LanguageToolsResult<String>;
}

/// The three providers the dispatcher fans out to.
#[derive(Clone)]
pub struct Providers {
    pub translation: Arc<dyn TranslationProvider>,
    pub transliteration: Arc<dyn TransliterationProvider>,
    pub audio: Arc<dyn AudioProvider>,
}

impl Providers {
    /// All three backed by one service.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: TranslationProvider + TransliterationProvider + AudioProvider + 'static,
    {
        Self { translation: service.clone(), transliteration: service.clone(), audio: service }
    }
}
