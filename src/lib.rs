use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

pub mod canvas;
pub mod error;
pub mod executor;
pub mod indent;
pub mod languages;
pub mod logging;
pub mod merge;
mod paths;
pub mod recognizers;
pub mod settings;
pub mod storage;
#[cfg(test)]
mod test_util;

pub use canvas::{Bitmap, Stroke, StrokePoint, StrokeSurface};
pub use error::{ExecutionCause, ScribeError};
pub use merge::INSERTION_MARKER;
pub use recognizers::{Accuracy, RecognizeOptions, Recognizer, RecognizerImpl, RecognizerKind};
pub use storage::{CodeFile, FileStore, JsonFileStore};

#[derive(Debug, Clone)]
pub struct Config {
    pub drawing: Option<String>,
    pub provider: Option<String>,
    pub language: Option<String>,
    pub key: Option<String>,
    pub file: Option<String>,
    pub execute: bool,
    pub scale: Option<f32>,
    pub new_file: Option<String>,
    pub delete_file: Option<String>,
    pub show_files: bool,
    pub show_languages: bool,
    pub settings_path: Option<String>,
}

pub async fn run(config: Config, input: Option<Vec<u8>>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    if config.show_languages {
        return Ok(languages::keys().join("\n"));
    }
    if config.show_files {
        let store = storage::JsonFileStore::open_default();
        return Ok(format_file_list(&store.list()?));
    }

    let language = config
        .language
        .as_deref()
        .unwrap_or(&settings.default_language);
    let lang = languages::resolve(language).ok_or_else(|| {
        anyhow!(
            "unsupported language '{}' (see --show-languages for the full set)",
            language
        )
    })?;

    if let Some(name) = config.new_file.as_deref() {
        let mut store = storage::JsonFileStore::open_default();
        if storage::find_by_name(&store, name)?.is_some() {
            return Err(anyhow!("a saved file named '{}' already exists", name));
        }
        let mut file = storage::create_file(name);
        file.script = lang.template.to_string();
        let id = file.id;
        store.put(file)?;
        return Ok(format!("created '{}' ({})", name, id));
    }
    if let Some(name) = config.delete_file.as_deref() {
        let mut store = storage::JsonFileStore::open_default();
        let Some(file) = storage::find_by_name(&store, name)? else {
            return Err(anyhow!("no saved file named '{}'", name));
        };
        store.delete(file.id)?;
        return Ok(format!("deleted '{}'", name));
    }

    let bytes = load_drawing_bytes(&config, input)?;
    let scale = config.scale.unwrap_or(settings.capture_scale);
    let bitmap = decode_drawing(&bytes, scale)?;

    let kind_name = config.provider.as_deref().unwrap_or(&settings.provider);
    let kind = RecognizerKind::parse(kind_name)
        .ok_or_else(|| anyhow!("unknown recognizer '{}' (expected local or remote)", kind_name))?;
    let recognizer =
        recognizers::build_recognizer(kind, &settings.ocr_language, config.key.as_deref())?;
    let options = recognize_options(&settings)?;

    tracing::debug!("recognizing with the {} recognizer", kind.as_str());
    let recognized = recognizer.recognize(bitmap, options).await?;
    let reconstructed = indent::reconstruct(&recognized);

    let mut store = storage::JsonFileStore::open_default();
    let target = match config.file.as_deref() {
        Some(name) => match storage::find_by_name(&store, name)? {
            Some(file) => Some(file),
            None => {
                let mut file = storage::create_file(name);
                file.script = lang.template.to_string();
                Some(file)
            }
        },
        None => None,
    };

    let buffer = target
        .as_ref()
        .map(|file| file.script.clone())
        .unwrap_or_else(|| lang.template.to_string());
    let merged = merge::merge(&buffer, &reconstructed, merge::INSERTION_MARKER);

    if let Some(mut file) = target {
        file.script = merged.clone();
        store.put(file)?;
    }

    if !config.execute {
        return Ok(merged);
    }

    let (client_id, client_secret) = resolve_execution_credentials(&settings)?;
    let runner = executor::Executor::new(client_id, client_secret);
    let run_output = runner.execute(&merged, language).await?;

    let mut output = merged;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str("output:\n");
    output.push_str(&run_output);
    Ok(output)
}

fn load_drawing_bytes(config: &Config, input: Option<Vec<u8>>) -> Result<Vec<u8>> {
    if let Some(path) = config.drawing.as_deref() {
        return fs::read(path).with_context(|| format!("failed to read drawing: {}", path));
    }
    if let Some(bytes) = input {
        if !bytes.is_empty() {
            return Ok(bytes);
        }
    }
    Err(anyhow!(
        "no drawing input (use --drawing or pipe bytes on stdin)"
    ))
}

fn decode_drawing(bytes: &[u8], scale: f32) -> Result<canvas::Bitmap> {
    if infer::is_image(bytes) {
        return Ok(canvas::Bitmap::from_image_bytes(bytes)?);
    }
    let surface: canvas::StrokeSurface = serde_json::from_slice(bytes)
        .with_context(|| "drawing is neither a supported image nor stroke JSON")?;
    Ok(canvas::capture(&surface, scale)?)
}

fn recognize_options(settings: &settings::Settings) -> Result<RecognizeOptions> {
    let accuracy = Accuracy::parse(&settings.accuracy).ok_or_else(|| {
        anyhow!(
            "unknown accuracy '{}' (expected fast or accurate)",
            settings.accuracy
        )
    })?;
    Ok(RecognizeOptions {
        accuracy,
        language_correction: settings.language_correction,
        min_engine_revision: settings.min_engine_revision,
    })
}

fn resolve_execution_credentials(settings: &settings::Settings) -> Result<(String, String)> {
    let client_id = get_env("JDOODLE_CLIENT_ID").or_else(|| settings.client_id.clone());
    let client_secret = get_env("JDOODLE_CLIENT_SECRET").or_else(|| settings.client_secret.clone());
    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok((client_id, client_secret)),
        _ => Err(anyhow!(
            "no execution credentials (set JDOODLE_CLIENT_ID/JDOODLE_CLIENT_SECRET or [execution] client_id/client_secret in settings)"
        )),
    }
}

fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn format_file_list(files: &[storage::CodeFile]) -> String {
    if files.is_empty() {
        return "no saved files".to_string();
    }
    files
        .iter()
        .map(|file| format!("{}\t{}", file.id, file.name))
        .collect::<Vec<_>>()
        .join("\n")
}
