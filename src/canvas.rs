use image::GenericImageView;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

use crate::error::{Result, ScribeError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<StrokePoint>,
    #[serde(default = "default_pen_width")]
    pub width: f32,
}

fn default_pen_width() -> f32 {
    2.0
}

/// An ordered set of pen strokes over a fixed-size drawing surface, in
/// surface coordinates. This is the serialized drawing format stored on a
/// code file and the input to [`capture`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrokeSurface {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

/// A PNG-encoded raster of a stroke surface, produced per recognition
/// request and handed to a recognizer.
#[derive(Debug, Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl Bitmap {
    /// Wraps already-encoded image bytes (any format `image` can decode),
    /// normalizing them to PNG.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| ScribeError::Capture(format!("failed to decode image: {}", err)))?;
        let (width, height) = decoded.dimensions();
        let mut encoded = Cursor::new(Vec::new());
        decoded
            .write_to(&mut encoded, image::ImageFormat::Png)
            .map_err(|err| ScribeError::Capture(format!("failed to encode image: {}", err)))?;
        Ok(Self {
            width,
            height,
            png: encoded.into_inner(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }
}

/// Rasterizes the surface at `scale` pixels per surface unit: dark ink on a
/// white ground, round caps and joins. A scale of at least 10x the display
/// density keeps thin strokes legible to the OCR engines.
pub fn capture(surface: &StrokeSurface, scale: f32) -> Result<Bitmap> {
    if !(scale > 0.0) {
        return Err(ScribeError::Capture(format!(
            "scale must be positive, got {}",
            scale
        )));
    }
    let px_width = (surface.width * scale).ceil() as u32;
    let px_height = (surface.height * scale).ceil() as u32;
    if px_width == 0 || px_height == 0 {
        return Err(ScribeError::Capture("surface has zero area".to_string()));
    }

    let mut pixmap = Pixmap::new(px_width, px_height)
        .ok_or_else(|| ScribeError::Capture("rendering produced no pixel data".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let mut paint = Paint::default();
    paint.set_color(tiny_skia::Color::BLACK);
    paint.anti_alias = true;
    let transform = Transform::from_scale(scale, scale);

    for stroke in &surface.strokes {
        let Some(path) = stroke_path(stroke) else {
            continue;
        };
        let style = tiny_skia::Stroke {
            width: stroke.width.max(0.1),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..tiny_skia::Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &style, transform, None);
    }

    let png = pixmap
        .encode_png()
        .map_err(|err| ScribeError::Capture(format!("failed to encode capture: {}", err)))?;
    tracing::debug!("captured {}x{} bitmap at scale {}", px_width, px_height, scale);
    Ok(Bitmap {
        width: px_width,
        height: px_height,
        png,
    })
}

fn stroke_path(stroke: &Stroke) -> Option<tiny_skia::Path> {
    let first = stroke.points.first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    if stroke.points.len() == 1 {
        // zero-length segments rasterize to nothing; nudge so a tap
        // still leaves a dot
        builder.line_to(first.x + 0.01, first.y);
    }
    for point in &stroke.points[1..] {
        builder.line_to(point.x, point.y);
    }
    builder.finish()
}
