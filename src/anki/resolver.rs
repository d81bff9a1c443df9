use std::sync::Arc;

use super::{
    collection::Collection,
    types::{
        Model,
        Note,
    },
};
use crate::core::{
    DeckId,
    DeckNoteType,
    FieldIdentity,
    LanguageToolsError,
    LanguageToolsResult,
    ModelId,
};

/// Where the editor's deck comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingContext {
    /// Editing an existing note through one of its cards.
    ExistingCard { deck_id: DeckId },
    /// Adding a new note; the deck is the one selected in the add dialog.
    AddNote { target_deck_id: DeckId },
    /// No card and not adding: the deck is unknown.
    NoCard,
}

impl EditingContext {
    pub fn deck_id(&self) -> Option<DeckId> {
        match self {
            EditingContext::ExistingCard { deck_id } => Some(*deck_id),
            EditingContext::AddNote { target_deck_id } => Some(*target_deck_id),
            EditingContext::NoCard => None,
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    collection: Arc<dyn Collection>,
}

impl IdentityResolver {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self { collection }
    }

    pub fn model(&self, model_id: ModelId) -> LanguageToolsResult<Model> {
        self.collection
            .model(model_id)
            .ok_or_else(|| LanguageToolsError::NotFound(format!("note type {model_id}")))
    }

    pub fn resolve_deck_note_type(
        &self,
        deck_id: DeckId,
        model_id: ModelId,
    ) -> LanguageToolsResult<DeckNoteType> {
        let deck = self
            .collection
            .deck(deck_id)
            .ok_or_else(|| LanguageToolsError::NotFound(format!("deck {deck_id}")))?;
        let model = self.model(model_id)?;

        Ok(DeckNoteType::new(deck.id, deck.name, model.id, model.name))
    }

    pub fn resolve(
        &self,
        deck_id: DeckId,
        model_id: ModelId,
        field_name: &str,
    ) -> LanguageToolsResult<FieldIdentity> {
        Ok(self.resolve_deck_note_type(deck_id, model_id)?.field(field_name))
    }

    /// `Ok(None)` when the context carries no deck; the caller skips the field.
    pub fn resolve_from_editing_context(
        &self,
        note: &Note,
        context: &EditingContext,
        field_index: usize,
    ) -> LanguageToolsResult<Option<FieldIdentity>> {
        let Some(deck_id) = context.deck_id() else {
            return Ok(None);
        };

        let deck_note_type = self.resolve_deck_note_type(deck_id, note.model_id)?;
        let field_name = self.field_name(note.model_id, field_index)?;
        Ok(Some(deck_note_type.field(&field_name)))
    }

    pub fn field_name(&self, model_id: ModelId, field_index: usize) -> LanguageToolsResult<String> {
        let model = self.model(model_id)?;
        model.fields.get(field_index).cloned().ok_or_else(|| {
            LanguageToolsError::NotFound(format!("field {} of note type {}", field_index, model.name))
        })
    }

    pub fn field_index(&self, identity: &FieldIdentity) -> LanguageToolsResult<usize> {
        let model = self.model(identity.model_id())?;
        model.field_index(identity.field_name()).ok_or_else(|| {
            LanguageToolsError::NotFound(format!(
                "field {} of note type {}",
                identity.field_name(),
                model.name
            ))
        })
    }
}
