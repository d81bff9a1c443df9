use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    path::PathBuf,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

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
        TranslationResponse,
        TransliterationOption,
        TransliterationResponse,
    },
};
use crate::core::{
    LanguageToolsError,
    LanguageToolsResult,
    TransformationKind,
    TranslationRule,
    TransliterationRule,
    VoiceDescriptor,
};

#[derive(Default)]
struct MockState {
    translations: HashMap<String, TranslationResponse>,
    all_translations: HashMap<String, BTreeMap<String, String>>,
    transliterations: HashMap<String, TransliterationResponse>,
    audio: HashMap<String, AudioResponse>,
    request_errors: HashMap<TransformationKind, String>,
    delays: HashMap<String, Duration>,
    panics: Vec<String>,
    calls: Vec<(TransformationKind, String)>,
    languages: BTreeMap<String, String>,
    transliteration_options: Vec<TransliterationOption>,
    detected_language: Option<String>,
    detect_calls: Vec<Vec<String>>,
}

/// Canned responses keyed by source text. Clones share state.
#[derive(Clone, Default)]
pub struct MockCloudLanguageTools {
    state: Arc<Mutex<MockState>>,
}

impl MockCloudLanguageTools {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_translation(self, text: &str, translated_text: &str) -> Self {
        let response = TranslationResponse::Success { translated_text: translated_text.to_string() };
        self.update(|s| {
            s.translations.insert(text.to_string(), response);
        })
    }

    pub fn with_translation_error(self, text: &str, error: &str) -> Self {
        let response = TranslationResponse::Error { error: error.to_string() };
        self.update(|s| {
            s.translations.insert(text.to_string(), response);
        })
    }

    pub fn with_all_translations(self, text: &str, translations: &[(&str, &str)]) -> Self {
        let translations =
            translations.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.update(|s| {
            s.all_translations.insert(text.to_string(), translations);
        })
    }

    pub fn with_transliteration(self, text: &str, transliterated_text: &str) -> Self {
        let response = TransliterationResponse::Success {
            transliterated_text: transliterated_text.to_string(),
        };
        self.update(|s| {
            s.transliterations.insert(text.to_string(), response);
        })
    }

    pub fn with_audio(self, text: &str, filename: &str) -> Self {
        let response = AudioResponse::Success {
            sound_tag: Some(sound_tag(filename)),
            full_filename: PathBuf::from("/tmp").join(filename),
        };
        self.update(|s| {
            s.audio.insert(text.to_string(), response);
        })
    }

    pub fn with_audio_error(self, text: &str, error: &str) -> Self {
        let response = AudioResponse::Error { error: error.to_string() };
        self.update(|s| {
            s.audio.insert(text.to_string(), response);
        })
    }

    /// Every request of `kind` fails before a response is produced.
    pub fn with_request_error(self, kind: TransformationKind, error: &str) -> Self {
        self.update(|s| {
            s.request_errors.insert(kind, error.to_string());
        })
    }

    pub fn with_delay(self, text: &str, delay: Duration) -> Self {
        self.update(|s| {
            s.delays.insert(text.to_string(), delay);
        })
    }

    /// Any request for `text` panics instead of answering.
    pub fn with_panic(self, text: &str) -> Self {
        self.update(|s| s.panics.push(text.to_string()))
    }

    pub fn with_languages(self, languages: &[(&str, &str)]) -> Self {
        self.update(|s| {
            s.languages = languages.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        })
    }

    pub fn with_transliteration_options(self, options: Vec<TransliterationOption>) -> Self {
        self.update(|s| s.transliteration_options = options)
    }

    pub fn with_detected_language(self, language: &str) -> Self {
        self.update(|s| s.detected_language = Some(language.to_string()))
    }

    pub fn calls(&self) -> Vec<(TransformationKind, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, kind: TransformationKind) -> usize {
        self.calls().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn detect_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().detect_calls.clone()
    }

    /// Records the call, waits out any configured delay, then fails if
    /// `kind` was set up to fail.
    async fn begin(&self, kind: TransformationKind, text: &str) -> LanguageToolsResult<()> {
        let (delay, error, panics) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((kind, text.to_string()));
            (
                state.delays.get(text).copied(),
                state.request_errors.get(&kind).cloned(),
                state.panics.iter().any(|panic_text| panic_text == text),
            )
        };

        if panics {
            panic!("mock {} adapter panicked on {text}", kind.name());
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match error {
            Some(error) => Err(LanguageToolsError::Request(error)),
            None => Ok(()),
        }
    }

    fn missing(kind: TransformationKind, text: &str) -> LanguageToolsError {
        LanguageToolsError::Request(format!("no {} configured for {text}", kind.name()))
    }
}

#[async_trait]
impl TranslationProvider for MockCloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        _rule: &TranslationRule,
    ) -> LanguageToolsResult<TranslationResponse> {
        self.begin(TransformationKind::Translation, text).await?;
        self.state
            .lock()
            .unwrap()
            .translations
            .get(text)
            .cloned()
            .ok_or_else(|| Self::missing(TransformationKind::Translation, text))
    }

    async fn request_all(
        &self,
        text: &str,
        _from_language: &str,
        _to_language: &str,
    ) -> LanguageToolsResult<BTreeMap<String, String>> {
        self.begin(TransformationKind::Translation, text).await?;
        self.state
            .lock()
            .unwrap()
            .all_translations
            .get(text)
            .cloned()
            .ok_or_else(|| Self::missing(TransformationKind::Translation, text))
    }
}

#[async_trait]
impl TransliterationProvider for MockCloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        _rule: &TransliterationRule,
    ) -> LanguageToolsResult<TransliterationResponse> {
        self.begin(TransformationKind::Transliteration, text).await?;
        self.state
            .lock()
            .unwrap()
            .transliterations
            .get(text)
            .cloned()
            .ok_or_else(|| Self::missing(TransformationKind::Transliteration, text))
    }
}

#[async_trait]
impl AudioProvider for MockCloudLanguageTools {
    async fn request(
        &self,
        text: &str,
        _voice: &VoiceDescriptor,
    ) -> LanguageToolsResult<AudioResponse> {
        self.begin(TransformationKind::Audio, text).await?;
        self.state
            .lock()
            .unwrap()
            .audio
            .get(text)
            .cloned()
            .ok_or_else(|| Self::missing(TransformationKind::Audio, text))
    }
}

#[async_trait]
impl LanguageCatalog for MockCloudLanguageTools {
    async fn language_list(&self) -> LanguageToolsResult<BTreeMap<String, String>> {
        Ok(self.state.lock().unwrap().languages.clone())
    }

    async fn transliteration_language_list(&self) -> LanguageToolsResult<Vec<TransliterationOption>> {
        Ok(self.state.lock().unwrap().transliteration_options.clone())
    }

    async fn detect(&self, text_list: &[String]) -> LanguageToolsResult<String> {
        let mut state = self.state.lock().unwrap();
        state.detect_calls.push(text_list.to_vec());
        state
            .detected_language
            .clone()
            .ok_or_else(|| LanguageToolsError::Request("language could not be detected".to_string()))
    }
}
