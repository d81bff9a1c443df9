use std::collections::HashMap;

use super::types::{
    Deck,
    Model,
};
use crate::core::{
    DeckId,
    ModelId,
};

/// Read access to the host's decks and note types.
pub trait Collection: Send + Sync {
    fn deck(&self, deck_id: DeckId) -> Option<Deck>;
    fn model(&self, model_id: ModelId) -> Option<Model>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCollection {
    decks: HashMap<DeckId, Deck>,
    models: HashMap<ModelId, Model>,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deck(mut self, id: DeckId, name: &str) -> Self {
        self.add_deck(Deck { id, name: name.to_string() });
        self
    }

    pub fn with_model(mut self, id: ModelId, name: &str, fields: &[&str]) -> Self {
        self.add_model(Model {
            id,
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    pub fn add_deck(&mut self, deck: Deck) {
        self.decks.insert(deck.id, deck);
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.insert(model.id, model);
    }

    pub fn deck_count(&self) -> usize {
        self.decks.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

impl Collection for InMemoryCollection {
    fn deck(&self, deck_id: DeckId) -> Option<Deck> {
        self.decks.get(&deck_id).cloned()
    }

    fn model(&self, model_id: ModelId) -> Option<Model> {
        self.models.get(&model_id).cloned()
    }
}
