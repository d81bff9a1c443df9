use thiserror::Error;

use super::models::FieldIdentity;

#[derive(Error, Debug)]
pub enum LanguageToolsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No language set for field {0}")]
    FieldLanguageMapping(FieldIdentity),

    #[error("{0}")]
    Request(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("LanguageToolsError: {0}")]
    Custom(String),
}

pub type LanguageToolsResult<T> = Result<T, LanguageToolsError>;

impl LanguageToolsError {
    /// Every failure reported by the language service is surfaced the same way,
    /// whether or not a retry could succeed.
    pub fn is_request_error(&self) -> bool {
        matches!(self, LanguageToolsError::Request(_) | LanguageToolsError::Reqwest(_))
    }
}

impl From<std::io::Error> for LanguageToolsError {
    fn from(error: std::io::Error) -> Self {
        LanguageToolsError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LanguageToolsError {
    fn from(error: reqwest::Error) -> Self {
        LanguageToolsError::Reqwest(Box::new(error))
    }
}
