use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    future::Future,
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};

use chrono::{
    DateTime,
    Utc,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::bridge::{
    AudioPlayer,
    ChooseTranslationRequest,
    EditorBridge,
};
use crate::{
    anki::IdentityResolver,
    cloud::{
        AudioResponse,
        Providers,
        TranslationResponse,
        TransliterationResponse,
    },
    core::{
        tasks::TaskManager,
        FieldIdentity,
        LanguageToolsError,
        LanguageToolsResult,
        NoteId,
        TransformationKind,
        TransformationRule,
    },
    settings::LanguageConfig,
};

/// One request in flight, remembered until its result comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: Uuid,
    /// 0 for a note that was not yet added when the request was issued.
    pub original_note_id: NoteId,
    pub target: FieldIdentity,
    pub field_index: usize,
    pub kind: TransformationKind,
    pub issued_at: DateTime<Utc>,
}

impl PendingRequest {
    fn new(
        original_note_id: NoteId,
        target: FieldIdentity,
        field_index: usize,
        kind: TransformationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_note_id,
            target,
            field_index,
            kind,
            issued_at: Utc::now(),
        }
    }

    /// Whether a result may still be written into the editor's note.
    pub fn is_current(&self, editor: &dyn EditorBridge) -> bool {
        match editor.current_note() {
            None => false,
            Some(note) => self.original_note_id == 0 || note.id == self.original_note_id,
        }
    }
}

enum Outcome {
    Translation(LanguageToolsResult<TranslationResponse>),
    Transliteration(LanguageToolsResult<TransliterationResponse>),
    Audio(LanguageToolsResult<AudioResponse>),
    Choices(LanguageToolsResult<BTreeMap<String, String>>),
    /// The request panicked before producing a response.
    Panicked(String),
}

pub struct Completion {
    request_id: Uuid,
    outcome: Outcome,
}

/// Fans a field edit out to the providers and applies what comes back.
///
/// Provider calls run on the task manager's runtime. Results are queued and
/// only touch the editor from [`Dispatcher::process_completions`], which the
/// editor's thread calls.
pub struct Dispatcher {
    tasks: TaskManager<Completion>,
    providers: Providers,
    resolver: IdentityResolver,
    audio_player: Box<dyn AudioPlayer>,
    pending: HashMap<Uuid, PendingRequest>,
    choices: HashMap<Uuid, ChooseTranslationRequest>,
}

impl Dispatcher {
    pub fn new(
        providers: Providers,
        resolver: IdentityResolver,
        audio_player: Box<dyn AudioPlayer>,
    ) -> LanguageToolsResult<Self> {
        Ok(Self::with_task_manager(TaskManager::new()?, providers, resolver, audio_player))
    }

    pub fn with_task_manager(
        tasks: TaskManager<Completion>,
        providers: Providers,
        resolver: IdentityResolver,
        audio_player: Box<dyn AudioPlayer>,
    ) -> Self {
        Self {
            tasks,
            providers,
            resolver,
            audio_player,
            pending: HashMap::new(),
            choices: HashMap::new(),
        }
    }

    pub fn runtime(&self) -> Arc<Runtime> {
        self.tasks.runtime()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingRequest> {
        self.pending.values()
    }

    /// Issues one request per rule reading from `source`. Returns how many
    /// provider calls were started.
    pub fn dispatch(
        &mut self,
        config: &LanguageConfig,
        source: &FieldIdentity,
        field_value: &str,
        original_note_id: NoteId,
        editor: &mut dyn EditorBridge,
    ) -> usize {
        let Some(source_language) = config.get_language(source) else {
            tracing::debug!(field = %source, "No language for source field, nothing to do");
            return 0;
        };

        let mut issued = 0;
        for kind in TransformationKind::ALL {
            for (target_field, rule) in config.get_rules_by_source(source, kind) {
                let target = source.sibling(&target_field);
                let dispatched = self.dispatch_rule(
                    config,
                    target.clone(),
                    rule,
                    field_value,
                    original_note_id,
                    editor,
                );
                match dispatched {
                    Ok(true) => issued += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            field = %target,
                            kind = kind.name(),
                            error = %e,
                            "Rule not dispatched"
                        );
                        editor.critical_message(&e.to_string());
                    }
                }
            }
        }

        tracing::debug!(field = %source, language = source_language, issued, "Dispatched field change");
        issued
    }

    fn dispatch_rule(
        &mut self,
        config: &LanguageConfig,
        target: FieldIdentity,
        rule: TransformationRule,
        field_value: &str,
        original_note_id: NoteId,
        editor: &mut dyn EditorBridge,
    ) -> LanguageToolsResult<bool> {
        let field_index = self.resolver.field_index(&target)?;
        let kind = rule.kind();
        let processor = config.text_processor();

        let text = processor.process(field_value, kind);
        if processor.is_empty(field_value) || text.is_empty() {
            editor.set_field_value(field_index, "");
            return Ok(false);
        }

        let request = PendingRequest::new(original_note_id, target, field_index, kind);
        let request_id = request.id;
        editor.show_loading_indicator(field_index, request.target.field_name());
        tracing::debug!(field = %request.target, kind = kind.name(), %request_id, "Request issued");
        self.pending.insert(request_id, request);

        match rule {
            TransformationRule::Translation(rule) => {
                let provider = self.providers.translation.clone();
                self.submit(request_id, async move {
                    Outcome::Translation(provider.request(&text, &rule).await)
                });
            }
            TransformationRule::Transliteration(rule) => {
                let provider = self.providers.transliteration.clone();
                self.submit(request_id, async move {
                    Outcome::Transliteration(provider.request(&text, &rule).await)
                });
            }
            TransformationRule::Audio(rule) => {
                let provider = self.providers.audio.clone();
                self.submit(request_id, async move {
                    Outcome::Audio(provider.request(&text, &rule.voice).await)
                });
            }
        }

        Ok(true)
    }

    /// Fetches every service's translation of the request's source text and
    /// asks the user to pick one once they arrive.
    pub fn request_choices(
        &mut self,
        target: FieldIdentity,
        field_index: usize,
        original_note_id: NoteId,
        choice: ChooseTranslationRequest,
        editor: &mut dyn EditorBridge,
    ) {
        let request =
            PendingRequest::new(original_note_id, target, field_index, TransformationKind::Translation);
        let request_id = request.id;
        let (text, from_language, to_language) =
            (choice.source_text.clone(), choice.from_language.clone(), choice.to_language.clone());
        self.pending.insert(request_id, request);
        self.choices.insert(request_id, choice);

        editor.show_progress("retrieving all translations");
        let provider = self.providers.translation.clone();
        self.submit(request_id, async move {
            Outcome::Choices(provider.request_all(&text, &from_language, &to_language).await)
        });
    }

    fn submit<F>(&self, request_id: Uuid, work: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.tasks.submit(
            async move { Completion { request_id, outcome: work.await } },
            move |message| Completion { request_id, outcome: Outcome::Panicked(message) },
        );
    }

    /// Applies every result that has arrived. Never blocks.
    pub fn process_completions(&mut self, editor: &mut dyn EditorBridge) -> usize {
        let completions = self.tasks.poll_results();
        let count = completions.len();
        for completion in completions {
            self.complete(completion, editor);
        }
        count
    }

    /// Blocks until `expected` results were applied or `timeout` passes.
    pub fn wait_for_completions(
        &mut self,
        editor: &mut dyn EditorBridge,
        expected: usize,
        timeout: Duration,
    ) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while applied < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(completion) = self.tasks.wait_result(remaining) else {
                break;
            };
            self.complete(completion, editor);
            applied += 1;
        }
        applied
    }

    fn complete(&mut self, completion: Completion, editor: &mut dyn EditorBridge) {
        let Completion { request_id, outcome } = completion;
        let choice = self.choices.remove(&request_id);
        let Some(request) = self.pending.remove(&request_id) else {
            tracing::warn!(%request_id, "Result for unknown request");
            return;
        };

        let elapsed_ms = (Utc::now() - request.issued_at).num_milliseconds();
        if !request.is_current(editor) {
            tracing::info!(
                field = %request.target,
                kind = request.kind.name(),
                original_note_id = request.original_note_id,
                elapsed_ms,
                "Editor moved on, discarding result"
            );
            if choice.is_some() {
                editor.stop_progress();
            }
            return;
        }

        let field_index = request.field_index;
        let result = match outcome {
            Outcome::Translation(response) => {
                editor.remove_loading_indicator(field_index, request.target.field_name());
                response
                    .and_then(|r| self.providers.translation.interpret(r))
                    .map(|text| editor.set_field_value(field_index, &text))
            }
            Outcome::Transliteration(response) => {
                editor.remove_loading_indicator(field_index, request.target.field_name());
                response
                    .and_then(|r| self.providers.transliteration.interpret(r))
                    .map(|text| editor.set_field_value(field_index, &text))
            }
            Outcome::Audio(response) => {
                editor.remove_loading_indicator(field_index, request.target.field_name());
                response.and_then(|r| self.providers.audio.interpret(r)).map(|audio| {
                    editor.set_field_value(field_index, audio.sound_tag.as_deref().unwrap_or(""));
                    if audio.sound_tag.is_some() {
                        if let Err(e) = self.audio_player.play_file(&audio.full_filename) {
                            tracing::warn!(
                                path = %audio.full_filename.display(),
                                error = %e,
                                "Audio playback failed"
                            );
                        }
                    }
                })
            }
            Outcome::Choices(response) => {
                editor.stop_progress();
                response.map(|translations| {
                    let Some(mut chooser) = choice else {
                        return;
                    };
                    chooser.translations = translations;
                    match editor.choose_translation(&chooser) {
                        Some(chosen) => editor.set_field_value(field_index, &chosen),
                        None => {
                            tracing::debug!(field = %request.target, "Translation choice cancelled")
                        }
                    }
                })
            }
            Outcome::Panicked(message) => {
                if choice.is_some() {
                    editor.stop_progress();
                } else {
                    editor.remove_loading_indicator(field_index, request.target.field_name());
                }
                Err(LanguageToolsError::Request(format!(
                    "The {} request failed unexpectedly: {message}",
                    request.kind.name()
                )))
            }
        };

        match result {
            Ok(()) => tracing::debug!(
                field = %request.target,
                kind = request.kind.name(),
                elapsed_ms,
                "Result applied"
            ),
            Err(e) => {
                tracing::warn!(
                    field = %request.target,
                    kind = request.kind.name(),
                    error = %e,
                    "Request failed"
                );
                editor.critical_message(&e.to_string());
            }
        }
    }
}
