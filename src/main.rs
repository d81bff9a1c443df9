use std::process;

use languagetools::{
    anki,
    cloud::{
        AudioProvider,
        CloudLanguageTools,
        LanguageCatalog,
        TranslationProvider,
        TransliterationProvider,
    },
    core::{
        logging::init_tracing,
        LanguageToolsResult,
        TransformationKind,
        TransliterationRule,
        VoiceDescriptor,
    },
    persistence::JsonFileStore,
    settings::LanguageConfig,
};

const USAGE: &str = "Usage:
  languagetools languages
  languagetools translate <from> <to> <text>
  languagetools transliterate <service> <key-json> <text>
  languagetools audio <voice-json> <text>
  languagetools detect <text>...
  languagetools anki
  languagetools set-api-key <key>";

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: &[String]) -> LanguageToolsResult<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut config = LanguageConfig::load(Box::new(JsonFileStore::default_location()))?;
    if let ["set-api-key", api_key] = args.as_slice() {
        config.set_api_key(api_key)?;
        println!("API key saved");
        return Ok(());
    }

    let service = CloudLanguageTools::from_env(config.api_key().map(str::to_string))?;
    let processor = config.text_processor();

    match args.as_slice() {
        ["languages"] => {
            for (code, name) in service.language_list().await? {
                println!("{code}\t{name}");
            }
        }
        ["translate", from, to, text @ ..] if !text.is_empty() => {
            let text = processor.process(&text.join(" "), TransformationKind::Translation);
            for (service_name, translation) in service.request_all(&text, from, to).await? {
                println!("{service_name}: {translation}");
            }
        }
        ["transliterate", service_name, key, text @ ..] if !text.is_empty() => {
            let rule = TransliterationRule {
                target_field: String::new(),
                source_field: String::new(),
                transliteration_service: service_name.to_string(),
                transliteration_key: serde_json::from_str(key)?,
            };
            let text = processor.process(&text.join(" "), TransformationKind::Transliteration);
            let response = TransliterationProvider::request(&service, &text, &rule).await?;
            println!("{}", TransliterationProvider::interpret(&service, response)?);
        }
        ["audio", voice, text @ ..] if !text.is_empty() => {
            let voice = VoiceDescriptor {
                voice_key: serde_json::from_str(voice)?,
                voice_description: "command line".to_string(),
            };
            let text = processor.process(&text.join(" "), TransformationKind::Audio);
            let response = AudioProvider::request(&service, &text, &voice).await?;
            let audio = AudioProvider::interpret(&service, response)?;
            match audio.sound_tag {
                Some(tag) => println!("{tag}\t{}", audio.full_filename.display()),
                None => println!("Nothing to say"),
            }
        }
        ["detect", text @ ..] if !text.is_empty() => {
            let text_list: Vec<String> = text.iter().map(|t| t.to_string()).collect();
            println!("{}", service.detect(&text_list).await?);
        }
        ["anki"] => {
            let collection = anki::fetch_collection().await?;
            println!("{} decks, {} note types", collection.deck_count(), collection.model_count());
        }
        _ => println!("{USAGE}"),
    }

    Ok(())
}
