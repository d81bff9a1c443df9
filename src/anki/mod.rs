use std::time::Instant;

use reqwest::Client;
use tokio::task;

use crate::core::{
    http::http_client,
    LanguageToolsError,
};

pub mod api;
pub mod collection;
pub mod resolver;
pub mod types;

pub use collection::{
    Collection,
    InMemoryCollection,
};
pub use resolver::{
    EditingContext,
    IdentityResolver,
};
pub use types::{
    Deck,
    Model,
    Note,
};

/// Snapshot of every deck and note type (with field names) from AnkiConnect.
pub async fn fetch_collection() -> Result<InMemoryCollection, LanguageToolsError> {
    let start = Instant::now();
    let client = http_client()?;
    let version = api::check_connection(&client).await?;
    tracing::debug!(version, "AnkiConnect is reachable");

    let mut collection = InMemoryCollection::new();
    for deck in api::get_decks(&client).await? {
        collection.add_deck(deck);
    }

    let model_ids = api::get_model_ids(&client).await?;
    let handles: Vec<_> = model_ids
        .into_iter()
        .map(|(model_name, id)| {
            let client: Client = client.clone();
            task::spawn(async move {
                let fields = api::get_field_names(&client, &model_name).await?;
                Ok::<Model, LanguageToolsError>(Model { name: model_name, id, fields })
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        match result {
            Ok(Ok(model)) => collection.add_model(model),
            Ok(Err(e)) => tracing::warn!(error = %e, "Skipping note type"),
            Err(e) => tracing::warn!(error = %e, "Field name lookup task failed"),
        }
    }

    tracing::info!(
        decks = collection.deck_count(),
        models = collection.model_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded collection from AnkiConnect"
    );
    Ok(collection)
}
