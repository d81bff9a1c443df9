use crate::core::{
    DeckId,
    ModelId,
    NoteId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    pub id: DeckId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub id: ModelId,
    pub fields: Vec<String>,
}

impl Model {
    pub fn field_index(&self, field_name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field_name)
    }
}

/// The note currently open in the editor. A note that has not been added to
/// the collection yet has id 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub model_id: ModelId,
    pub fields: Vec<String>,
}

impl Note {
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}
