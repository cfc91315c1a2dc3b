use std::io::Write;
use std::process::Command;

use super::{Accuracy, RecognizeOptions, Recognizer, RecognizerFuture};
use crate::canvas::Bitmap;
use crate::error::{Result, ScribeError};

/// On-device recognition backed by the `tesseract` binary. Never touches
/// the network.
#[derive(Debug, Clone)]
pub struct LocalRecognizer {
    language: String,
}

impl LocalRecognizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Recognizer for LocalRecognizer {
    fn recognize(self, bitmap: Bitmap, options: RecognizeOptions) -> RecognizerFuture {
        Box::pin(async move {
            let image = decode_bitmap(bitmap.png_bytes())?;
            if let Some(min) = options.min_engine_revision {
                check_engine_revision(min)?;
            }

            let mut tmp = tempfile::Builder::new()
                .suffix(".png")
                .tempfile()
                .map_err(|err| {
                    ScribeError::Recognition(format!("failed to create temp file: {}", err))
                })?;
            image
                .write_to(&mut tmp, image::ImageFormat::Png)
                .map_err(|err| {
                    ScribeError::Recognition(format!("failed to write temp image: {}", err))
                })?;
            tmp.flush().ok();

            let raw = run_tesseract(tmp.path(), &self.language, &options)?;
            finish_text(&raw)
        })
    }
}

fn decode_bitmap(bytes: &[u8]) -> Result<image::DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|err| ScribeError::Recognition(format!("failed to decode bitmap: {}", err)))
}

fn run_tesseract(path: &std::path::Path, language: &str, options: &RecognizeOptions) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .args(tesseract_args(language, options))
        .output()
        .map_err(|err| {
            ScribeError::Recognition(format!("failed to run tesseract (is it installed?): {}", err))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScribeError::Recognition(format!(
            "tesseract failed: {}",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn tesseract_args(language: &str, options: &RecognizeOptions) -> Vec<String> {
    let mut args = vec![
        "-l".to_string(),
        language.to_string(),
        "--oem".to_string(),
        "1".to_string(),
        "--psm".to_string(),
        "6".to_string(),
        "--dpi".to_string(),
        "300".to_string(),
    ];
    if options.accuracy == Accuracy::Fast {
        // skip the inverted-text pass
        args.push("-c".to_string());
        args.push("tessedit_do_invert=0".to_string());
    }
    if !options.language_correction {
        // no dictionary correction: handwriting here is code, not prose
        args.push("-c".to_string());
        args.push("load_system_dawg=0".to_string());
        args.push("-c".to_string());
        args.push("load_freq_dawg=0".to_string());
    }
    args
}

fn finish_text(raw: &str) -> Result<String> {
    let text = raw.trim_end();
    if text.trim().is_empty() {
        return Err(ScribeError::Recognition(
            "no text regions detected".to_string(),
        ));
    }
    Ok(text.to_string())
}

fn check_engine_revision(min: u32) -> Result<()> {
    let Some(revision) = engine_revision() else {
        tracing::debug!("could not determine tesseract revision, skipping the hint");
        return Ok(());
    };
    if revision < min {
        return Err(ScribeError::Recognition(format!(
            "engine revision {} is below the required minimum {}",
            revision, min
        )));
    }
    Ok(())
}

fn engine_revision() -> Option<u32> {
    let output = Command::new("tesseract").arg("--version").output().ok()?;
    let banner = if output.stdout.is_empty() {
        // some builds print the banner to stderr
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).to_string()
    };
    parse_engine_revision(&banner)
}

fn parse_engine_revision(banner: &str) -> Option<u32> {
    let first = banner.lines().next()?;
    let version = first.split_whitespace().last()?;
    let version = version.strip_prefix('v').unwrap_or(version);
    version.split('.').next()?.parse().ok()
}
