use std::{
    collections::BTreeMap,
    path::Path,
};

use crate::{
    anki::{
        EditingContext,
        Note,
    },
    core::{
        DeckId,
        LanguageToolsResult,
        NoteId,
    },
};

/// The live editor. All calls happen on the thread that owns the editor.
pub trait EditorBridge {
    fn current_note(&self) -> Option<Note>;
    /// Deck of the card being edited, if the editor was opened from a card.
    fn current_card_deck(&self) -> Option<DeckId>;
    /// Deck selected in the add dialog.
    fn add_target_deck(&self) -> Option<DeckId>;
    fn is_add_mode(&self) -> bool;

    /// Writes the value into the note and refreshes the view.
    fn set_field_value(&mut self, field_index: usize, text: &str);
    fn show_loading_indicator(&mut self, field_index: usize, field_name: &str);
    fn remove_loading_indicator(&mut self, field_index: usize, field_name: &str);
    fn critical_message(&mut self, message: &str);

    /// Lets the user pick one translation. `None` means the dialog was cancelled.
    fn choose_translation(&mut self, request: &ChooseTranslationRequest) -> Option<String>;

    fn show_progress(&mut self, _label: &str) {}
    fn stop_progress(&mut self) {}

    fn editing_context(&self, is_add_mode: bool) -> EditingContext {
        if is_add_mode {
            return match self.add_target_deck() {
                Some(target_deck_id) => EditingContext::AddNote { target_deck_id },
                None => EditingContext::NoCard,
            };
        }
        match self.current_card_deck() {
            Some(deck_id) => EditingContext::ExistingCard { deck_id },
            None => EditingContext::NoCard,
        }
    }
}

pub trait AudioPlayer {
    fn play_file(&self, path: &Path) -> LanguageToolsResult<()>;
}

/// Plays nothing. For hosts without audio output.
pub struct SilentAudioPlayer;

impl AudioPlayer for SilentAudioPlayer {
    fn play_file(&self, path: &Path) -> LanguageToolsResult<()> {
        tracing::debug!(path = %path.display(), "Audio playback skipped");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooseTranslationRequest {
    pub source_text: String,
    pub from_language: String,
    pub to_language: String,
    /// service name -> translation
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChangedEvent {
    pub note_id: NoteId,
    pub field_index: usize,
    pub new_value: String,
    pub is_add_mode: bool,
}

/// Messages the editor page sends to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    /// `key:<field_index>:<note_id>:<value>`
    FieldChanged { field_index: usize, note_id: NoteId, value: String },
    /// `choosetranslation:<field_index>`
    ChooseTranslation { field_index: usize },
}

impl BridgeCommand {
    /// `None` for messages meant for someone else or that do not parse.
    pub fn parse(message: &str) -> Option<Self> {
        if let Some(rest) = message.strip_prefix("key:") {
            let mut parts = rest.splitn(3, ':');
            let field_index = parts.next()?.parse().ok()?;
            let note_id = parts.next()?.parse().ok()?;
            let value = parts.next()?.to_string();
            return Some(BridgeCommand::FieldChanged { field_index, note_id, value });
        }

        if let Some(rest) = message.strip_prefix("choosetranslation:") {
            let field_index = rest.split(':').next()?.parse().ok()?;
            return Some(BridgeCommand::ChooseTranslation { field_index });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_changed() {
        assert_eq!(
            BridgeCommand::parse("key:0:1001:老人家"),
            Some(BridgeCommand::FieldChanged {
                field_index: 0,
                note_id: 1001,
                value: "老人家".to_string()
            })
        );
    }

    #[test]
    fn test_parse_value_with_colons() {
        assert_eq!(
            BridgeCommand::parse("key:2:0:12:30 <b>a:b</b>"),
            Some(BridgeCommand::FieldChanged {
                field_index: 2,
                note_id: 0,
                value: "12:30 <b>a:b</b>".to_string()
            })
        );
        assert_eq!(
            BridgeCommand::parse("key:1:5:"),
            Some(BridgeCommand::FieldChanged { field_index: 1, note_id: 5, value: String::new() })
        );
    }

    #[test]
    fn test_parse_choose_translation() {
        assert_eq!(
            BridgeCommand::parse("choosetranslation:1"),
            Some(BridgeCommand::ChooseTranslation { field_index: 1 })
        );
    }

    #[test]
    fn test_silent_player_succeeds() {
        assert!(SilentAudioPlayer.play_file(Path::new("/tmp/x.mp3")).is_ok());
    }

    #[test]
    fn test_parse_rejects_other_messages() {
        assert_eq!(BridgeCommand::parse("blur:0:1001:x"), None);
        assert_eq!(BridgeCommand::parse("key:x:1001:value"), None);
        assert_eq!(BridgeCommand::parse("key:0:1001"), None);
        assert_eq!(BridgeCommand::parse("choosetranslation:"), None);
    }
}
