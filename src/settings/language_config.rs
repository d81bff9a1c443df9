use std::collections::{
    BTreeMap,
    BTreeSet,
};

use super::data::{
    ConfigData,
    DeckModelMap,
};
use crate::{
    core::{
        AudioRule,
        FieldIdentity,
        LanguageToolsError,
        LanguageToolsResult,
        TextProcessingOptions,
        TextProcessor,
        TransformationKind,
        TransformationRule,
        VoiceDescriptor,
    },
    persistence::ConfigStore,
};

/// Language mappings and transformation rules, loaded once and written back
/// to the store after every change.
pub struct LanguageConfig {
    data: ConfigData,
    store: Box<dyn ConfigStore<ConfigData>>,
    text_processor: TextProcessor,
}

impl LanguageConfig {
    pub fn load(store: Box<dyn ConfigStore<ConfigData>>) -> LanguageToolsResult<Self> {
        let data = store.load()?;
        let text_processor = TextProcessor::new(&data.text_processing)?;

        tracing::info!(
            translation_rules = data.batch_translation.len(),
            transliteration_rules = data.batch_transliteration.len(),
            audio_rules = data.batch_audio.len(),
            "Loaded language configuration"
        );
        Ok(Self { data, store, text_processor })
    }

    pub fn data(&self) -> &ConfigData {
        &self.data
    }

    fn persist(&mut self) -> LanguageToolsResult<()> {
        self.store.write(&self.data).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to persist configuration");
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.data.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: &str) -> LanguageToolsResult<()> {
        self.data.api_key = Some(api_key.to_string());
        self.persist()
    }

    /// `None` when no language is set for the field.
    pub fn get_language(&self, identity: &FieldIdentity) -> Option<&str> {
        self.data
            .deck_languages
            .get(identity.model_name(), identity.deck_name(), identity.field_name())
            .map(String::as_str)
    }

    pub fn set_language(&mut self, identity: &FieldIdentity, language: &str) -> LanguageToolsResult<()> {
        self.data
            .deck_languages
            .ensure_path(identity.model_name(), identity.deck_name())
            .insert(identity.field_name().to_string(), language.to_string());
        self.data.wanted_languages.insert(language.to_string());

        tracing::debug!(field = %identity, language, "Language set");
        self.persist()
    }

    /// Fails with `FieldLanguageMapping` instead of returning `None`.
    pub fn require_language(&self, identity: &FieldIdentity) -> LanguageToolsResult<String> {
        self.get_language(identity)
            .map(str::to_string)
            .ok_or_else(|| LanguageToolsError::FieldLanguageMapping(identity.clone()))
    }

    pub fn wanted_languages(&self) -> &BTreeSet<String> {
        &self.data.wanted_languages
    }

    pub fn get_rules_for_target(
        &self,
        identity: &FieldIdentity,
        kind: TransformationKind,
    ) -> Option<TransformationRule> {
        let (model, deck, target) =
            (identity.model_name(), identity.deck_name(), identity.field_name());

        match kind {
            TransformationKind::Translation => self
                .data
                .batch_translation
                .get(model, deck, target)
                .cloned()
                .map(TransformationRule::Translation),
            TransformationKind::Transliteration => self
                .data
                .batch_transliteration
                .get(model, deck, target)
                .cloned()
                .map(TransformationRule::Transliteration),
            TransformationKind::Audio => self
                .data
                .batch_audio
                .get(model, deck, target)
                .cloned()
                .map(TransformationRule::Audio),
        }
    }

    /// All rules of one kind for a (note type, deck), keyed by target field.
    pub fn get_rules(
        &self,
        model_name: &str,
        deck_name: &str,
        kind: TransformationKind,
    ) -> BTreeMap<String, TransformationRule> {
        match kind {
            TransformationKind::Translation => collect_rules(
                &self.data.batch_translation,
                model_name,
                deck_name,
                TransformationRule::Translation,
            ),
            TransformationKind::Transliteration => collect_rules(
                &self.data.batch_transliteration,
                model_name,
                deck_name,
                TransformationRule::Transliteration,
            ),
            TransformationKind::Audio => collect_rules(
                &self.data.batch_audio,
                model_name,
                deck_name,
                TransformationRule::Audio,
            ),
        }
    }

    /// Rules of one kind that read from `source`, keyed by target field.
    pub fn get_rules_by_source(
        &self,
        source: &FieldIdentity,
        kind: TransformationKind,
    ) -> BTreeMap<String, TransformationRule> {
        let mut rules = self.get_rules(source.model_name(), source.deck_name(), kind);
        rules.retain(|_, rule| rule.source_field() == source.field_name());
        rules
    }

    /// Stores `rule` for the target field, replacing any rule of the same kind.
    pub fn set_rule(
        &mut self,
        identity: &FieldIdentity,
        rule: TransformationRule,
    ) -> LanguageToolsResult<()> {
        if rule.target_field() != identity.field_name() {
            return Err(LanguageToolsError::InvalidRule(format!(
                "rule targets {} but was stored for {}",
                rule.target_field(),
                identity
            )));
        }
        if rule.source_field() == rule.target_field() {
            return Err(LanguageToolsError::InvalidRule(format!(
                "{} cannot be its own source",
                identity
            )));
        }

        let (model, deck, target) =
            (identity.model_name(), identity.deck_name(), identity.field_name().to_string());
        let kind = rule.kind();

        match rule {
            TransformationRule::Translation(rule) => {
                self.data.batch_translation.ensure_path(model, deck).insert(target, rule);
            }
            TransformationRule::Transliteration(rule) => {
                self.data.batch_transliteration.ensure_path(model, deck).insert(target, rule);
            }
            TransformationRule::Audio(rule) => {
                self.data.batch_audio.ensure_path(model, deck).insert(target, rule);
            }
        }

        tracing::debug!(field = %identity, kind = kind.name(), "Rule set");
        self.persist()
    }

    pub fn remove_rule(
        &mut self,
        identity: &FieldIdentity,
        kind: TransformationKind,
    ) -> LanguageToolsResult<Option<TransformationRule>> {
        let (model, deck, target) =
            (identity.model_name(), identity.deck_name(), identity.field_name());

        let removed = match kind {
            TransformationKind::Translation => self
                .data
                .batch_translation
                .remove(model, deck, target)
                .map(TransformationRule::Translation),
            TransformationKind::Transliteration => self
                .data
                .batch_transliteration
                .remove(model, deck, target)
                .map(TransformationRule::Transliteration),
            TransformationKind::Audio => self
                .data
                .batch_audio
                .remove(model, deck, target)
                .map(TransformationRule::Audio),
        };

        if removed.is_some() {
            tracing::debug!(field = %identity, kind = kind.name(), "Rule removed");
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn voice_for_language(&self, language: &str) -> Option<&VoiceDescriptor> {
        self.data.voice_selection.get(language)
    }

    pub fn set_voice_for_language(
        &mut self,
        language: &str,
        voice: VoiceDescriptor,
    ) -> LanguageToolsResult<()> {
        self.data.voice_selection.insert(language.to_string(), voice);
        self.persist()
    }

    /// An audio rule reading `source` with the voice selected for its language.
    pub fn build_audio_rule(
        &self,
        target: &FieldIdentity,
        source: &FieldIdentity,
    ) -> LanguageToolsResult<AudioRule> {
        let language = self.require_language(source)?;
        let voice = self.voice_for_language(&language).cloned().ok_or_else(|| {
            LanguageToolsError::NotFound(format!("no voice selected for language {language}"))
        })?;

        Ok(AudioRule {
            target_field: target.field_name().to_string(),
            source_field: source.field_name().to_string(),
            voice,
        })
    }

    pub fn text_processor(&self) -> &TextProcessor {
        &self.text_processor
    }

    /// Rejects the options without storing anything if a pattern does not compile.
    pub fn set_text_processing(&mut self, options: TextProcessingOptions) -> LanguageToolsResult<()> {
        self.text_processor = TextProcessor::new(&options)?;
        self.data.text_processing = options;
        self.persist()
    }

    pub fn apply_updates_automatically(&self) -> bool {
        self.data.apply_updates_automatically
    }

    pub fn set_apply_updates_automatically(&mut self, enabled: bool) -> LanguageToolsResult<()> {
        self.data.apply_updates_automatically = enabled;
        self.persist()
    }
}

fn collect_rules<V: Clone>(
    map: &DeckModelMap<V>,
    model_name: &str,
    deck_name: &str,
    wrap: fn(V) -> TransformationRule,
) -> BTreeMap<String, TransformationRule> {
    map.leaf(model_name, deck_name)
        .map(|leaf| {
            leaf.iter().map(|(target, rule)| (target.clone(), wrap(rule.clone()))).collect()
        })
        .unwrap_or_default()
}
