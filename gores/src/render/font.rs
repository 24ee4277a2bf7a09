//! Font metrics and glyph rasterization for labels.

use std::path::Path;

use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use tiny_skia::{ColorU8, Pixmap};

use crate::color::Color;
use crate::error::GoresError;
use crate::render::{TextMeasurer, TextMetrics};

/// Font of a fixed size, used both to measure and to rasterize labels.
#[derive(Clone)]
pub struct FontMeasurer {
    font: FontArc,
    scale: PxScale,
}

impl std::fmt::Debug for FontMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMeasurer")
            .field("scale", &self.scale)
            .finish()
    }
}

impl FontMeasurer {
    /// Parses a TrueType or OpenType font.
    pub fn from_bytes(data: Vec<u8>, size_px: f32) -> Result<Self, GoresError> {
        Ok(Self {
            font: FontArc::try_from_vec(data)?,
            scale: PxScale::from(size_px),
        })
    }

    /// Reads a font file.
    pub fn load(path: &Path, size_px: f32) -> Result<Self, GoresError> {
        let data = std::fs::read(path)?;
        let font = Self::from_bytes(data, size_px)?;
        log::debug!("Loaded font {} ({size_px}px)", path.display());

        Ok(font)
    }

    fn layout(&self, text: &str) -> (Vec<Glyph>, f32) {
        let font = self.font.as_scaled(self.scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0;
        let mut previous = None;

        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(previous) = previous {
                caret += font.kern(previous, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, point(caret, font.ascent())));
            caret += font.h_advance(id);
            previous = Some(id);
        }

        (glyphs, caret)
    }

    /// Draws the text into a new transparent pixmap of exactly [`TextMeasurer::measure`] size
    /// (rounded up). Returns `None` for empty text.
    pub fn rasterize(&self, text: &str, color: Color) -> Option<Pixmap> {
        let (glyphs, width) = self.layout(text);
        let metrics = self.measure(text);
        let width = width.ceil() as u32;
        let height = metrics.height().ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut coverage = vec![0.0f32; (width * height) as usize];
        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };

            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, c| {
                let px = bounds.min.x as i64 + x as i64;
                let py = bounds.min.y as i64 + y as i64;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    return;
                }

                let cell = &mut coverage[(py as u32 * width + px as u32) as usize];
                *cell = (*cell + c).min(1.0);
            });
        }

        let mut pixmap = Pixmap::new(width, height)?;
        for (pixel, c) in pixmap.pixels_mut().iter_mut().zip(coverage) {
            let alpha = (color.a() as f32 * c).round() as u8;
            *pixel = ColorU8::from_rgba(color.r(), color.g(), color.b(), alpha).premultiply();
        }

        Some(pixmap)
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str) -> TextMetrics {
        let font = self.font.as_scaled(self.scale);
        let (_, width) = self.layout(text);

        TextMetrics {
            width: width as f64,
            ascent: font.ascent() as f64,
            descent: -font.descent() as f64,
        }
    }
}
