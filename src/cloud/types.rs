use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    LanguageToolsError,
    LanguageToolsResult,
};

/// What the service sent back for a single translation. An `error` payload
/// is a normal response; it only becomes an error when interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationResponse {
    Error { error: String },
    Success { translated_text: String },
}

impl TranslationResponse {
    pub fn into_result(self) -> LanguageToolsResult<String> {
        match self {
            TranslationResponse::Success { translated_text } => Ok(translated_text),
            TranslationResponse::Error { error } => Err(LanguageToolsError::Request(error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransliterationResponse {
    Error { error: String },
    Success { transliterated_text: String },
}

impl TransliterationResponse {
    pub fn into_result(self) -> LanguageToolsResult<String> {
        match self {
            TransliterationResponse::Success { transliterated_text } => Ok(transliterated_text),
            TransliterationResponse::Error { error } => Err(LanguageToolsError::Request(error)),
        }
    }
}

/// `translate_all` answers with service name -> translation, or an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum TranslateAllResponse {
    Error { error: String },
    Success(std::collections::BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioResponse {
    Error { error: String },
    Success { sound_tag: Option<String>, full_filename: PathBuf },
}

/// Generated audio. `sound_tag` is `None` when there was nothing to speak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResult {
    pub sound_tag: Option<String>,
    pub full_filename: PathBuf,
}

impl AudioResponse {
    pub fn into_result(self) -> LanguageToolsResult<AudioResult> {
        match self {
            AudioResponse::Success { sound_tag, full_filename } => {
                Ok(AudioResult { sound_tag, full_filename })
            }
            AudioResponse::Error { error } => {
                Err(LanguageToolsError::Request(format!("Could not generate audio: {error}")))
            }
        }
    }
}

/// One entry of the transliteration catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterationOption {
    pub language_code: String,
    pub service: String,
    pub transliteration_key: serde_json::Value,
    pub transliteration_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectResponse {
    pub detected_language: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceError {
    pub error: String,
}

pub fn sound_tag(filename: &str) -> String {
    format!("[sound:{filename}]")
}
