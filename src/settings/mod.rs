mod data;
mod language_config;

pub use data::{
    ConfigData,
    DeckModelMap,
};
pub use language_config::LanguageConfig;
