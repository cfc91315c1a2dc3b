use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: String,
    pub accuracy: String,
    pub language_correction: bool,
    pub min_engine_revision: Option<u32>,
    pub ocr_language: String,
    pub capture_scale: f32,
    pub default_language: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            accuracy: "accurate".to_string(),
            language_correction: false,
            min_engine_revision: None,
            ocr_language: "eng".to_string(),
            capture_scale: 10.0,
            default_language: "Python 3".to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    recognizer: Option<RecognizerSettings>,
    capture: Option<CaptureSettings>,
    execution: Option<ExecutionSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizerSettings {
    provider: Option<String>,
    accuracy: Option<String>,
    language_correction: Option<bool>,
    min_revision: Option<u32>,
    ocr_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CaptureSettings {
    scale: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ExecutionSettings {
    language: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(recognizer) = incoming.recognizer {
            if let Some(provider) = recognizer.provider {
                if !provider.trim().is_empty() {
                    self.provider = provider;
                }
            }
            if let Some(accuracy) = recognizer.accuracy {
                if !accuracy.trim().is_empty() {
                    self.accuracy = accuracy;
                }
            }
            if let Some(correction) = recognizer.language_correction {
                self.language_correction = correction;
            }
            if let Some(revision) = recognizer.min_revision {
                if revision > 0 {
                    self.min_engine_revision = Some(revision);
                }
            }
            if let Some(language) = recognizer.ocr_language {
                if !language.trim().is_empty() {
                    self.ocr_language = language;
                }
            }
        }
        if let Some(capture) = incoming.capture {
            if let Some(scale) = capture.scale {
                if scale > 0.0 {
                    self.capture_scale = scale;
                }
            }
        }
        if let Some(execution) = incoming.execution {
            if let Some(language) = execution.language {
                if !language.trim().is_empty() {
                    self.default_language = language;
                }
            }
            if let Some(client_id) = execution.client_id {
                if !client_id.trim().is_empty() {
                    self.client_id = Some(client_id);
                }
            }
            if let Some(client_secret) = execution.client_secret {
                if !client_secret.trim().is_empty() {
                    self.client_secret = Some(client_secret);
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".codescribe"))
        }
    })
}
