use std::collections::{
    BTreeMap,
    BTreeSet,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    AudioRule,
    TextProcessingOptions,
    TranslationRule,
    TransliterationRule,
    VoiceDescriptor,
};

/// model name -> deck name -> key -> value.
///
/// Intermediate levels are created on demand by [`DeckModelMap::ensure_path`],
/// so writers never see a missing level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckModelMap<V>(BTreeMap<String, BTreeMap<String, BTreeMap<String, V>>>);

impl<V> Default for DeckModelMap<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<V> DeckModelMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(&self, model_name: &str, deck_name: &str) -> Option<&BTreeMap<String, V>> {
        self.0.get(model_name).and_then(|decks| decks.get(deck_name))
    }

    pub fn get(&self, model_name: &str, deck_name: &str, key: &str) -> Option<&V> {
        self.leaf(model_name, deck_name).and_then(|leaf| leaf.get(key))
    }

    pub fn ensure_path(&mut self, model_name: &str, deck_name: &str) -> &mut BTreeMap<String, V> {
        self.0
            .entry(model_name.to_string())
            .or_default()
            .entry(deck_name.to_string())
            .or_default()
    }

    pub fn remove(&mut self, model_name: &str, deck_name: &str, key: &str) -> Option<V> {
        self.0.get_mut(model_name).and_then(|decks| decks.get_mut(deck_name))?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.values().flat_map(|decks| decks.values()).map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn default_true() -> bool {
    true
}

/// Everything persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub deck_languages: DeckModelMap<String>,
    #[serde(default)]
    pub wanted_languages: BTreeSet<String>,
    #[serde(default)]
    pub batch_translation: DeckModelMap<TranslationRule>,
    #[serde(default)]
    pub batch_transliteration: DeckModelMap<TransliterationRule>,
    #[serde(default)]
    pub batch_audio: DeckModelMap<AudioRule>,
    /// language code -> voice used when building audio rules
    #[serde(default)]
    pub voice_selection: BTreeMap<String, VoiceDescriptor>,
    #[serde(default)]
    pub text_processing: TextProcessingOptions,
    #[serde(default = "default_true")]
    pub apply_updates_automatically: bool,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            api_key: None,
            deck_languages: DeckModelMap::new(),
            wanted_languages: BTreeSet::new(),
            batch_translation: DeckModelMap::new(),
            batch_transliteration: DeckModelMap::new(),
            batch_audio: DeckModelMap::new(),
            voice_selection: BTreeMap::new(),
            text_processing: TextProcessingOptions::default(),
            apply_updates_automatically: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_path_creates_levels() {
        let mut map: DeckModelMap<String> = DeckModelMap::new();
        assert!(map.leaf("note-type", "deck 1").is_none());

        map.ensure_path("note-type", "deck 1").insert("Chinese".to_string(), "zh_cn".to_string());
        map.ensure_path("note-type", "deck 1").insert("English".to_string(), "en".to_string());
        map.ensure_path("note-type", "deck 2").insert("Chinese".to_string(), "zh_tw".to_string());

        assert_eq!(map.get("note-type", "deck 1", "Chinese").map(String::as_str), Some("zh_cn"));
        assert_eq!(map.get("note-type", "deck 2", "Chinese").map(String::as_str), Some("zh_tw"));
        assert_eq!(map.get("other", "deck 1", "Chinese"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut map: DeckModelMap<u32> = DeckModelMap::new();
        assert_eq!(map.remove("note-type", "deck 1", "Sound"), None);

        map.ensure_path("note-type", "deck 1").insert("Sound".to_string(), 1);
        assert_eq!(map.remove("note-type", "deck 1", "Sound"), Some(1));
        assert!(map.is_empty());
    }

    #[test]
    fn test_config_shape() {
        let mut config = ConfigData::default();
        config
            .deck_languages
            .ensure_path("note-type", "deck 1")
            .insert("Chinese".to_string(), "zh_cn".to_string());
        config.wanted_languages.insert("zh_cn".to_string());

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["deck_languages"]["note-type"]["deck 1"]["Chinese"], "zh_cn");
        assert_eq!(value["wanted_languages"], serde_json::json!(["zh_cn"]));
        assert_eq!(value["apply_updates_automatically"], true);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ConfigData =
            serde_json::from_str(r#"{"wanted_languages": ["en", "fr"]}"#).unwrap();
        assert_eq!(config.wanted_languages.len(), 2);
        assert!(config.apply_updates_automatically);
        assert!(config.batch_translation.is_empty());
        assert!(config.api_key.is_none());
    }
}
