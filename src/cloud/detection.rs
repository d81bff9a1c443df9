use rand::seq::IndexedRandom;

use super::{
    providers::LanguageCatalog,
    types::TransliterationOption,
};
use crate::core::{
    text::html_to_text_line,
    LanguageToolsResult,
};

pub const DETECTION_SAMPLE_SIZE: usize = 100;

/// Up to `sample_size` field values with some text in them, chosen at random
/// when there are more.
pub fn sample_field_values(values: &[String], sample_size: usize) -> Vec<String> {
    let non_empty: Vec<String> =
        values.iter().filter(|value| !html_to_text_line(value).is_empty()).cloned().collect();

    if non_empty.len() <= sample_size {
        return non_empty;
    }

    non_empty.choose_multiple(&mut rand::rng(), sample_size).cloned().collect()
}

/// `Ok(None)` when no value has text to detect from.
pub async fn detect_field_language(
    catalog: &dyn LanguageCatalog,
    values: &[String],
) -> LanguageToolsResult<Option<String>> {
    let sample = sample_field_values(values, DETECTION_SAMPLE_SIZE);
    if sample.is_empty() {
        return Ok(None);
    }

    let language = catalog.detect(&sample).await?;
    tracing::debug!(sample_size = sample.len(), %language, "Detected field language");
    Ok(Some(language))
}

pub fn transliteration_options(
    options: &[TransliterationOption],
    language: &str,
) -> Vec<TransliterationOption> {
    options.iter().filter(|option| option.language_code == language).cloned().collect()
}
