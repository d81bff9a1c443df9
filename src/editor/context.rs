use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
    sync::Arc,
};

use super::{
    bridge::{
        BridgeCommand,
        ChooseTranslationRequest,
        EditorBridge,
        FieldChangedEvent,
    },
    dispatcher::Dispatcher,
};
use crate::{
    anki::IdentityResolver,
    cloud::{
        detection,
        LanguageCatalog,
        TransliterationOption,
    },
    core::{
        FieldIdentity,
        LanguageToolsError,
        LanguageToolsResult,
        TransformationKind,
        TransformationRule,
    },
    settings::LanguageConfig,
};

/// Everything the editor hooks need, built once at startup.
pub struct AppContext {
    config: LanguageConfig,
    resolver: IdentityResolver,
    dispatcher: Dispatcher,
    catalog: Arc<dyn LanguageCatalog>,
}

impl AppContext {
    pub fn new(
        config: LanguageConfig,
        resolver: IdentityResolver,
        dispatcher: Dispatcher,
        catalog: Arc<dyn LanguageCatalog>,
    ) -> Self {
        Self { config, resolver, dispatcher, catalog }
    }

    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LanguageConfig {
        &mut self.config
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Dispatches the edit when automatic updates are on and the value
    /// actually changed. Returns how many requests were started.
    pub fn on_field_changed(
        &mut self,
        event: &FieldChangedEvent,
        editor: &mut dyn EditorBridge,
    ) -> usize {
        if !self.config.apply_updates_automatically() {
            return 0;
        }
        let Some(note) = editor.current_note() else {
            return 0;
        };

        let context = editor.editing_context(event.is_add_mode);
        let resolved =
            self.resolver.resolve_from_editing_context(&note, &context, event.field_index);
        let source = match resolved {
            Ok(Some(source)) => source,
            Ok(None) => {
                tracing::debug!(field_index = event.field_index, "No deck for this editor, skipping");
                return 0;
            }
            Err(e) => {
                tracing::warn!(field_index = event.field_index, error = %e, "Could not resolve field");
                return 0;
            }
        };

        if note.field(event.field_index) == Some(event.new_value.as_str()) {
            return 0;
        }

        tracing::debug!(
            field = %source,
            note_id = note.id,
            event_note_id = event.note_id,
            "Field changed"
        );
        self.dispatcher.dispatch(&self.config, &source, &event.new_value, note.id, editor)
    }

    /// Handles one message from the editor page. Returns whether it was ours.
    pub fn on_bridge_message(&mut self, message: &str, editor: &mut dyn EditorBridge) -> bool {
        match BridgeCommand::parse(message) {
            Some(BridgeCommand::FieldChanged { field_index, note_id, value }) => {
                let event = FieldChangedEvent {
                    note_id,
                    field_index,
                    new_value: value,
                    is_add_mode: editor.is_add_mode(),
                };
                self.on_field_changed(&event, editor);
                true
            }
            Some(BridgeCommand::ChooseTranslation { field_index }) => {
                if let Err(e) = self.choose_translation(field_index, editor) {
                    tracing::warn!(field_index, error = %e, "Choose translation failed");
                    editor.critical_message(&e.to_string());
                }
                true
            }
            None => false,
        }
    }

    /// Starts the manual flow for the translation rule targeting `field_index`.
    pub fn choose_translation(
        &mut self,
        field_index: usize,
        editor: &mut dyn EditorBridge,
    ) -> LanguageToolsResult<()> {
        let note = editor
            .current_note()
            .ok_or_else(|| LanguageToolsError::NotFound("no note in the editor".to_string()))?;
        let context = editor.editing_context(editor.is_add_mode());
        let target = self
            .resolver
            .resolve_from_editing_context(&note, &context, field_index)?
            .ok_or_else(|| LanguageToolsError::NotFound("no deck for this editor".to_string()))?;

        let rule = match self.config.get_rules_for_target(&target, TransformationKind::Translation) {
            Some(TransformationRule::Translation(rule)) => rule,
            _ => {
                return Err(LanguageToolsError::NotFound(format!("no translation rule for {target}")))
            }
        };

        let source = target.sibling(&rule.source_field);
        let source_index = self.resolver.field_index(&source)?;
        let from_text = note.field(source_index).unwrap_or_default();

        let from_language = self.config.require_language(&source)?;
        let to_language = self.config.require_language(&target)?;
        let source_text =
            self.config.text_processor().process(from_text, TransformationKind::Translation);

        let request = ChooseTranslationRequest {
            source_text,
            from_language,
            to_language,
            translations: Default::default(),
        };
        self.dispatcher.request_choices(target, field_index, note.id, request, editor);
        Ok(())
    }

    /// Applies finished requests. Call from the editor's thread.
    pub fn poll(&mut self, editor: &mut dyn EditorBridge) -> usize {
        self.dispatcher.process_completions(editor)
    }

    pub fn language_list(&self) -> LanguageToolsResult<BTreeMap<String, String>> {
        let catalog = self.catalog.clone();
        self.dispatcher.runtime().block_on(async move { catalog.language_list().await })
    }

    pub fn transliteration_options(
        &self,
        language: &str,
    ) -> LanguageToolsResult<Vec<TransliterationOption>> {
        let catalog = self.catalog.clone();
        let options = self
            .dispatcher
            .runtime()
            .block_on(async move { catalog.transliteration_language_list().await })?;
        Ok(detection::transliteration_options(&options, language))
    }

    /// Detects and stores the language of each field from a sample of its
    /// values. Fields without any text are left alone. Blocks until done.
    pub fn detect_languages(
        &mut self,
        fields: Vec<(FieldIdentity, Vec<String>)>,
    ) -> LanguageToolsResult<Vec<(FieldIdentity, String)>> {
        let runtime = self.dispatcher.runtime();
        let mut detected = Vec::new();

        for (identity, values) in fields {
            let catalog = self.catalog.clone();
            let language = runtime.block_on(async move {
                detection::detect_field_language(catalog.as_ref(), &values).await
            })?;

            if let Some(language) = language {
                self.config.set_language(&identity, &language)?;
                detected.push((identity, language));
            }
        }

        tracing::info!(detected = detected.len(), "Language detection finished");
        Ok(detected)
    }
}

/// Host registration points for editor events.
pub trait HostHooks {
    fn on_bridge_message(&mut self, handler: Box<dyn FnMut(&str, &mut dyn EditorBridge) -> bool>);
    /// Called regularly on the editor's thread.
    fn on_idle(&mut self, handler: Box<dyn FnMut(&mut dyn EditorBridge)>);
}

/// Registers the context's handlers with the host.
pub fn wire(context: Rc<RefCell<AppContext>>, hooks: &mut dyn HostHooks) {
    let bridge_context = context.clone();
    hooks.on_bridge_message(Box::new(move |message: &str, editor: &mut dyn EditorBridge| {
        match bridge_context.try_borrow_mut() {
            Ok(mut context) => context.on_bridge_message(message, editor),
            Err(_) => {
                tracing::warn!(message, "Context busy, bridge message dropped");
                false
            }
        }
    }));

    hooks.on_idle(Box::new(move |editor: &mut dyn EditorBridge| {
        if let Ok(mut context) = context.try_borrow_mut() {
            context.poll(editor);
        }
    }));
}
