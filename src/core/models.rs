use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

pub type DeckId = u64;
pub type ModelId = u64;
pub type NoteId = u64;

/// A (deck, note type) pairing. Names are looked up from the ids once and kept
/// alongside them since the configuration is keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeckNoteType {
    pub deck_id: DeckId,
    pub deck_name: String,
    pub model_id: ModelId,
    pub model_name: String,
}

impl DeckNoteType {
    pub fn new(deck_id: DeckId, deck_name: String, model_id: ModelId, model_name: String) -> Self {
        Self { deck_id, deck_name, model_id, model_name }
    }

    pub fn field(&self, field_name: &str) -> FieldIdentity {
        FieldIdentity::new(self.clone(), field_name.to_string())
    }
}

/// One editable field slot within a (deck, note type) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIdentity {
    deck_note_type: DeckNoteType,
    field_name: String,
}

impl FieldIdentity {
    pub fn new(deck_note_type: DeckNoteType, field_name: String) -> Self {
        Self { deck_note_type, field_name }
    }

    pub fn deck_note_type(&self) -> &DeckNoteType {
        &self.deck_note_type
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_note_type.deck_id
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_note_type.deck_name
    }

    pub fn model_id(&self) -> ModelId {
        self.deck_note_type.model_id
    }

    pub fn model_name(&self) -> &str {
        &self.deck_note_type.model_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Another field of the same deck / note type.
    pub fn sibling(&self, field_name: &str) -> FieldIdentity {
        self.deck_note_type.field(field_name)
    }
}

impl fmt::Display for FieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.model_name(), self.deck_name(), self.field_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransformationKind {
    Translation,
    Transliteration,
    Audio,
}

impl TransformationKind {
    pub const ALL: [TransformationKind; 3] = [
        TransformationKind::Translation,
        TransformationKind::Transliteration,
        TransformationKind::Audio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransformationKind::Translation => "translation",
            TransformationKind::Transliteration => "transliteration",
            TransformationKind::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRule {
    pub target_field: String,
    pub source_field: String,
    pub from_language: String,
    pub to_language: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterationRule {
    pub target_field: String,
    pub source_field: String,
    pub transliteration_service: String,
    pub transliteration_key: serde_json::Value,
}

/// Service-specific voice options plus a human readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    pub voice_key: serde_json::Value,
    pub voice_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRule {
    pub target_field: String,
    pub source_field: String,
    pub voice: VoiceDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformationRule {
    Translation(TranslationRule),
    Transliteration(TransliterationRule),
    Audio(AudioRule),
}

impl TransformationRule {
    pub fn kind(&self) -> TransformationKind {
        match self {
            TransformationRule::Translation(_) => TransformationKind::Translation,
            TransformationRule::Transliteration(_) => TransformationKind::Transliteration,
            TransformationRule::Audio(_) => TransformationKind::Audio,
        }
    }

    pub fn target_field(&self) -> &str {
        match self {
            TransformationRule::Translation(rule) => &rule.target_field,
            TransformationRule::Transliteration(rule) => &rule.target_field,
            TransformationRule::Audio(rule) => &rule.target_field,
        }
    }

    pub fn source_field(&self) -> &str {
        match self {
            TransformationRule::Translation(rule) => &rule.source_field,
            TransformationRule::Transliteration(rule) => &rule.source_field,
            TransformationRule::Audio(rule) => &rule.source_field,
        }
    }
}
