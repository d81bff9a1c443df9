pub mod errors;
pub mod http;
pub mod logging;
pub mod models;
pub mod tasks;
pub mod text;

pub use errors::{
    LanguageToolsError,
    LanguageToolsResult,
};
pub use models::{
    AudioRule,
    DeckId,
    DeckNoteType,
    FieldIdentity,
    ModelId,
    NoteId,
    TransformationKind,
    TransformationRule,
    TranslationRule,
    TransliterationRule,
    VoiceDescriptor,
};
pub use text::{
    TextProcessingOptions,
    TextProcessor,
    TextReplacement,
};
