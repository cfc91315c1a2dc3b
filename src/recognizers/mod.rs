use std::future::Future;
use std::pin::Pin;

use crate::canvas::Bitmap;
use crate::error::{Result, ScribeError};

mod local;
mod remote;

pub use local::LocalRecognizer;
pub use remote::RemoteRecognizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerKind {
    Local,
    Remote,
}

impl RecognizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognizerKind::Local => "local",
            RecognizerKind::Remote => "remote",
        }
    }

    pub fn parse(name: &str) -> Option<RecognizerKind> {
        match name.trim().to_lowercase().as_str() {
            "local" => Some(RecognizerKind::Local),
            "remote" | "cloud" => Some(RecognizerKind::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Fast,
    Accurate,
}

impl Accuracy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accuracy::Fast => "fast",
            Accuracy::Accurate => "accurate",
        }
    }

    pub fn parse(name: &str) -> Option<Accuracy> {
        match name.trim().to_lowercase().as_str() {
            "fast" => Some(Accuracy::Fast),
            "accurate" => Some(Accuracy::Accurate),
            _ => None,
        }
    }
}

/// Per-request recognition knobs. Language correction defaults to off:
/// natural-language correction rewrites identifiers and operators, which is
/// exactly wrong for code.
#[derive(Debug, Clone)]
pub struct RecognizeOptions {
    pub accuracy: Accuracy,
    pub language_correction: bool,
    pub min_engine_revision: Option<u32>,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Accurate,
            language_correction: false,
            min_engine_revision: None,
        }
    }
}

pub type RecognizerFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

pub trait Recognizer: Clone + Send + Sync {
    fn recognize(self, bitmap: Bitmap, options: RecognizeOptions) -> RecognizerFuture;
}

#[derive(Debug, Clone)]
pub enum RecognizerImpl {
    Local(LocalRecognizer),
    Remote(RemoteRecognizer),
}

impl Recognizer for RecognizerImpl {
    fn recognize(self, bitmap: Bitmap, options: RecognizeOptions) -> RecognizerFuture {
        match self {
            RecognizerImpl::Local(recognizer) => recognizer.recognize(bitmap, options),
            RecognizerImpl::Remote(recognizer) => recognizer.recognize(bitmap, options),
        }
    }
}

pub fn build_recognizer(
    kind: RecognizerKind,
    ocr_language: &str,
    override_key: Option<&str>,
) -> Result<RecognizerImpl> {
    match kind {
        RecognizerKind::Local => Ok(RecognizerImpl::Local(LocalRecognizer::new(ocr_language))),
        RecognizerKind::Remote => {
            let key = resolve_key(override_key)?;
            Ok(RecognizerImpl::Remote(RemoteRecognizer::new(key)))
        }
    }
}

pub fn resolve_key(override_key: Option<&str>) -> Result<String> {
    if let Some(key) = override_key {
        return Ok(key.to_string());
    }
    get_env("VISION_API_KEY")
        .or_else(|| get_env("GOOGLE_API_KEY"))
        .ok_or_else(|| {
            ScribeError::Recognition(
                "no API key for the remote recognizer (checked VISION_API_KEY, GOOGLE_API_KEY)"
                    .to_string(),
            )
        })
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
