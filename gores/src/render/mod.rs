//! Drawing surface abstraction.
//!
//! Everything the renderer draws goes through the [`Canvas`] trait, so the gore pipeline can be
//! run against the raster backend ([`PixmapCanvas`]) or against a recording test double.

use gores_types::cartesian::{Point2d, Size};
use image::RgbaImage;

use crate::color::Color;

mod font;
mod pixmap;

#[cfg(test)]
pub(crate) mod recording;

pub use font::FontMeasurer;
pub use pixmap::PixmapCanvas;

/// Builds closed paths in pixel coordinates.
pub trait PathBuilder {
    /// Path type produced by the builder.
    type Path;

    /// Starts a new contour.
    fn move_to(&mut self, point: Point2d);
    /// Adds a straight segment to the current contour.
    fn line_to(&mut self, point: Point2d);
    /// Closes the current contour.
    fn close(&mut self);
    /// Finishes the path. Returns `None` if the path is empty or invalid.
    fn finish(self) -> Option<Self::Path>;
}

/// Size of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    /// Advance width of the whole string.
    pub width: f64,
    /// Distance from the baseline to the top of the line.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line (positive).
    pub descent: f64,
}

impl TextMetrics {
    /// Full line height.
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Measures label text.
pub trait TextMeasurer {
    /// Returns the size the text takes when drawn with [`Canvas::draw_text`].
    fn measure(&self, text: &str) -> TextMetrics;
}

/// Fill and outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Fill color. Nothing is filled if not set.
    pub fill: Option<Color>,
    /// Outline color. No outline if not set.
    pub stroke: Option<Color>,
    /// Outline width in pixels.
    pub stroke_width: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::FEATURE_STROKE),
            stroke_width: 1.0,
        }
    }
}

/// 2D raster drawing surface.
///
/// The surface keeps a stack of drawing states. A state currently consists of the clip region
/// only: [`Canvas::clip`] narrows it and [`Canvas::restore`] returns to the last saved one.
pub trait Canvas {
    /// Path type of the canvas.
    type Path;
    /// Builder of [`Canvas::Path`]s.
    type PathBuilder: PathBuilder<Path = Self::Path>;

    /// Size of the surface in pixels.
    fn size(&self) -> Size<u32>;
    /// Creates an empty path builder.
    fn path_builder(&self) -> Self::PathBuilder;
    /// Fills the path using the non-zero rule.
    fn fill_path(&mut self, path: &Self::Path, color: Color, anti_alias: bool);
    /// Strokes the path with a line of the given width.
    fn stroke_path(&mut self, path: &Self::Path, color: Color, width: f64);
    /// Pushes the current drawing state on the stack.
    fn save(&mut self);
    /// Pops the last saved drawing state. Does nothing if nothing was saved.
    fn restore(&mut self);
    /// Intersects the current clip region with the path.
    fn clip(&mut self, path: &Self::Path);
    /// Draws the image with its top left corner at the given position.
    fn draw_image(&mut self, image: &RgbaImage, top_left: Point2d);
    /// Draws a single line of text centered on `center` and rotated around it by `rotation`
    /// radians.
    fn draw_text(&mut self, text: &str, center: Point2d, rotation: f64, color: Color);
}

/// Builds a closed path through the points. Returns `None` if there are less than three of them.
pub fn ring_path<C: Canvas + ?Sized>(canvas: &C, ring: &[Point2d]) -> Option<C::Path> {
    if ring.len() < 3 {
        return None;
    }

    let mut builder = canvas.path_builder();
    builder.move_to(ring[0]);
    for point in &ring[1..] {
        builder.line_to(*point);
    }
    builder.close();
    builder.finish()
}
