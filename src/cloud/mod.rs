mod client;
pub mod detection;
#[cfg(test)]
pub mod mock;
mod providers;
mod types;

pub use client::{
    CloudLanguageTools,
    API_KEY_ENV,
    BASE_URL_ENV,
    DEFAULT_BASE_URL,
};
pub use providers::{
    AudioProvider,
    LanguageCatalog,
    Providers,
    TranslationProvider,
    TransliterationProvider,
};
pub use types::{
    sound_tag,
    AudioResponse,
    AudioResult,
    TranslationResponse,
    TransliterationOption,
    TransliterationResponse,
};
