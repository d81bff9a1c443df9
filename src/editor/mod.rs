pub mod bridge;
pub mod context;
pub mod dispatcher;
#[cfg(test)]
pub mod testing;

pub use bridge::{
    AudioPlayer,
    BridgeCommand,
    ChooseTranslationRequest,
    EditorBridge,
    FieldChangedEvent,
    SilentAudioPlayer,
};
pub use context::{
    wire,
    AppContext,
    HostHooks,
};
pub use dispatcher::{
    Completion,
    Dispatcher,
    PendingRequest,
};
