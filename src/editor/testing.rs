use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

use super::{
    bridge::{
        AudioPlayer,
        ChooseTranslationRequest,
        EditorBridge,
    },
    dispatcher::Dispatcher,
};
use crate::{
    anki::{
        IdentityResolver,
        InMemoryCollection,
        Note,
    },
    cloud::{
        mock::MockCloudLanguageTools,
        Providers,
    },
    core::{
        DeckId,
        DeckNoteType,
        FieldIdentity,
        LanguageToolsError,
        LanguageToolsResult,
        ModelId,
        NoteId,
    },
    persistence::MemoryStore,
    settings::{
        ConfigData,
        LanguageConfig,
    },
};

pub const DECK_ID: DeckId = 42001;
pub const OTHER_DECK_ID: DeckId = 42002;
pub const MODEL_ID: ModelId = 43001;
pub const NOTE_ID: NoteId = 1001;

pub const CHINESE: usize = 0;
pub const ENGLISH: usize = 1;
pub const SOUND: usize = 2;
pub const PINYIN: usize = 3;

pub fn collection() -> InMemoryCollection {
    InMemoryCollection::new()
        .with_deck(DECK_ID, "deck 1")
        .with_deck(OTHER_DECK_ID, "deck 2")
        .with_model(MODEL_ID, "note-type", &["Chinese", "English", "Sound", "Pinyin"])
}

pub fn resolver() -> IdentityResolver {
    IdentityResolver::new(Arc::new(collection()))
}

pub fn deck_note_type() -> DeckNoteType {
    DeckNoteType::new(DECK_ID, "deck 1".to_string(), MODEL_ID, "note-type".to_string())
}

pub fn field(name: &str) -> FieldIdentity {
    deck_note_type().field(name)
}

/// Chinese is zh_cn, English is en, Sound and Pinyin have no language.
pub fn config() -> LanguageConfig {
    let store: MemoryStore<ConfigData> = MemoryStore::default();
    let mut config = LanguageConfig::load(Box::new(store)).unwrap();
    config.set_language(&field("Chinese"), "zh_cn").unwrap();
    config.set_language(&field("English"), "en").unwrap();
    config
}

pub fn note(id: NoteId) -> Note {
    Note { id, model_id: MODEL_ID, fields: vec![String::new(); 4] }
}

#[derive(Debug, Clone, Default)]
pub struct MockEditor {
    pub note: Option<Note>,
    pub card_deck: Option<DeckId>,
    pub add_target_deck: Option<DeckId>,
    pub add_mode: bool,
    /// Service to pick in the choose-translation dialog; `None` cancels.
    pub chosen_service: Option<String>,

    pub field_writes: Vec<(usize, String)>,
    pub loading_shown: Vec<(usize, String)>,
    pub loading_removed: Vec<(usize, String)>,
    pub critical_messages: Vec<String>,
    pub choose_requests: Vec<ChooseTranslationRequest>,
    pub progress: Vec<String>,
    pub progress_stopped: usize,
}

impl MockEditor {
    /// Editing note `note_id` through a card in deck 1.
    pub fn editing(note_id: NoteId) -> Self {
        Self { note: Some(note(note_id)), card_deck: Some(DECK_ID), ..Self::default() }
    }

    /// The add dialog with deck 1 selected.
    pub fn adding() -> Self {
        Self {
            note: Some(note(0)),
            add_target_deck: Some(DECK_ID),
            add_mode: true,
            ..Self::default()
        }
    }

    pub fn field_value(&self, field_index: usize) -> Option<&str> {
        self.note.as_ref().and_then(|note| note.field(field_index))
    }

    pub fn writes_to(&self, field_index: usize) -> Vec<&str> {
        self.field_writes
            .iter()
            .filter(|(index, _)| *index == field_index)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

impl EditorBridge for MockEditor {
    fn current_note(&self) -> Option<Note> {
        self.note.clone()
    }

    fn current_card_deck(&self) -> Option<DeckId> {
        self.card_deck
    }

    fn add_target_deck(&self) -> Option<DeckId> {
        self.add_target_deck
    }

    fn is_add_mode(&self) -> bool {
        self.add_mode
    }

    fn set_field_value(&mut self, field_index: usize, text: &str) {
        if let Some(field) = self.note.as_mut().and_then(|note| note.fields.get_mut(field_index)) {
            *field = text.to_string();
        }
        self.field_writes.push((field_index, text.to_string()));
    }

    fn show_loading_indicator(&mut self, field_index: usize, field_name: &str) {
        self.loading_shown.push((field_index, field_name.to_string()));
    }

    fn remove_loading_indicator(&mut self, field_index: usize, field_name: &str) {
        self.loading_removed.push((field_index, field_name.to_string()));
    }

    fn critical_message(&mut self, message: &str) {
        self.critical_messages.push(message.to_string());
    }

    fn choose_translation(&mut self, request: &ChooseTranslationRequest) -> Option<String> {
        self.choose_requests.push(request.clone());
        self.chosen_service.as_ref().and_then(|service| request.translations.get(service).cloned())
    }

    fn show_progress(&mut self, label: &str) {
        self.progress.push(label.to_string());
    }

    fn stop_progress(&mut self) {
        self.progress_stopped += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockAudioPlayer {
    pub played: Arc<Mutex<Vec<PathBuf>>>,
    pub fail: bool,
}

impl MockAudioPlayer {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }
}

impl AudioPlayer for MockAudioPlayer {
    fn play_file(&self, path: &Path) -> LanguageToolsResult<()> {
        self.played.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(LanguageToolsError::Custom("no audio device".to_string()));
        }
        Ok(())
    }
}

pub fn dispatcher(service: &MockCloudLanguageTools, player: &MockAudioPlayer) -> Dispatcher {
    Dispatcher::new(
        Providers::from_service(Arc::new(service.clone())),
        resolver(),
        Box::new(player.clone()),
    )
    .unwrap()
}
