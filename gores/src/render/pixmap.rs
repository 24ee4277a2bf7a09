//! [`Canvas`](super::Canvas) drawing into a tiny-skia pixmap.

use std::path::Path;

use gores_types::cartesian::{Point2d, Size};
use image::{ImageFormat, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, IntSize, Mask, Paint, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke,
    Transform,
};

use crate::color::Color;
use crate::error::GoresError;
use crate::render::{Canvas, FontMeasurer, PathBuilder};

/// [`Canvas`] drawing into an in-memory RGBA raster.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    clip: Option<Mask>,
    saved: Vec<Option<Mask>>,
    font: Option<FontMeasurer>,
}

impl std::fmt::Debug for PixmapCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapCanvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clipped", &self.clip.is_some())
            .field("saved", &self.saved.len())
            .finish()
    }
}

impl PixmapCanvas {
    /// Creates a transparent canvas.
    pub fn new(size: Size<u32>) -> Result<Self, GoresError> {
        let pixmap = Pixmap::new(size.width(), size.height()).ok_or(GoresError::Canvas {
            width: size.width(),
            height: size.height(),
        })?;

        Ok(Self {
            pixmap,
            clip: None,
            saved: Vec::new(),
            font: None,
        })
    }

    /// Sets the font used by [`Canvas::draw_text`]. Text is not drawn without a font.
    pub fn with_font(mut self, font: FontMeasurer) -> Self {
        self.font = Some(font);
        self
    }

    /// Fills the whole canvas with the color, ignoring the clip.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color.into());
    }

    /// Color of a single pixel (not premultiplied).
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()))
    }

    /// Converts the canvas into an image.
    pub fn to_image(&self) -> Result<RgbaImage, GoresError> {
        let data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        RgbaImage::from_raw(self.pixmap.width(), self.pixmap.height(), data).ok_or(
            GoresError::Canvas {
                width: self.pixmap.width(),
                height: self.pixmap.height(),
            },
        )
    }

    /// Encodes the canvas as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), GoresError> {
        self.to_image()?.save_with_format(path, ImageFormat::Png)?;
        log::info!(
            "Saved {}x{} image to {}",
            self.pixmap.width(),
            self.pixmap.height(),
            path.display()
        );

        Ok(())
    }

    fn paint(color: Color, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = anti_alias;
        paint
    }
}

fn image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let data = image
        .pixels()
        .flat_map(|p| {
            let [r, g, b, a] = p.0;
            let c: PremultipliedColorU8 = ColorU8::from_rgba(r, g, b, a).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    Pixmap::from_vec(data, size)
}

impl Canvas for PixmapCanvas {
    type Path = tiny_skia::Path;
    type PathBuilder = SkiaPathBuilder;

    fn size(&self) -> Size<u32> {
        Size::new(self.pixmap.width(), self.pixmap.height())
    }

    fn path_builder(&self) -> SkiaPathBuilder {
        SkiaPathBuilder(tiny_skia::PathBuilder::new())
    }

    fn fill_path(&mut self, path: &tiny_skia::Path, color: Color, anti_alias: bool) {
        self.pixmap.fill_path(
            path,
            &Self::paint(color, anti_alias),
            FillRule::Winding,
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, color: Color, width: f64) {
        let stroke = Stroke {
            width: width as f32,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            path,
            &Self::paint(color, true),
            &stroke,
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    fn save(&mut self) {
        self.saved.push(self.clip.clone());
    }

    fn restore(&mut self) {
        if let Some(clip) = self.saved.pop() {
            self.clip = clip;
        }
    }

    fn clip(&mut self, path: &tiny_skia::Path) {
        if let Some(mask) = self.clip.as_mut() {
            mask.intersect_path(path, FillRule::Winding, true, Transform::identity());
            return;
        }

        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(path, FillRule::Winding, true, Transform::identity());
        self.clip = Some(mask);
    }

    fn draw_image(&mut self, image: &RgbaImage, top_left: Point2d) {
        let Some(tile) = image_to_pixmap(image) else {
            log::warn!("Cannot draw empty {}x{} image", image.width(), image.height());
            return;
        };

        self.pixmap.draw_pixmap(
            top_left.x.round() as i32,
            top_left.y.round() as i32,
            tile.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    fn draw_text(&mut self, text: &str, center: Point2d, rotation: f64, color: Color) {
        let Some(label) = self.font.as_ref().and_then(|f| f.rasterize(text, color)) else {
            return;
        };

        let x = center.x - label.width() as f64 / 2.0;
        let y = center.y - label.height() as f64 / 2.0;
        let transform = Transform::from_rotate_at(
            rotation.to_degrees() as f32,
            center.x as f32,
            center.y as f32,
        );

        self.pixmap.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            label.as_ref(),
            &PixmapPaint::default(),
            transform,
            self.clip.as_ref(),
        );
    }
}

/// [`PathBuilder`] producing `tiny-skia` paths.
#[derive(Default)]
pub struct SkiaPathBuilder(tiny_skia::PathBuilder);

impl PathBuilder for SkiaPathBuilder {
    type Path = tiny_skia::Path;

    fn move_to(&mut self, point: Point2d) {
        self.0.move_to(point.x as f32, point.y as f32);
    }

    fn line_to(&mut self, point: Point2d) {
        self.0.line_to(point.x as f32, point.y as f32);
    }

    fn close(&mut self) {
        self.0.close();
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.0.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ring_path;

    fn square(min: f64, max: f64) -> Vec<Point2d> {
        [(min, min), (max, min), (max, max), (min, max)]
            .iter()
            .map(|(x, y)| Point2d::new(*x, *y))
            .collect()
    }

    fn canvas() -> PixmapCanvas {
        PixmapCanvas::new(Size::new(20, 20)).expect("canvas")
    }

    #[test]
    fn fills_path() {
        let mut canvas = canvas();
        let path = ring_path(&canvas, &square(5.0, 15.0)).expect("path");
        canvas.fill_path(&path, Color::BLACK, false);

        assert_eq!(canvas.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(canvas.pixel(2, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn clip_limits_drawing_until_restored() {
        let mut canvas = canvas();
        let clip = ring_path(&canvas, &square(0.0, 10.0)).expect("path");
        let everything = ring_path(&canvas, &square(0.0, 20.0)).expect("path");

        canvas.save();
        canvas.clip(&clip);
        canvas.fill_path(&everything, Color::BLACK, false);
        canvas.restore();

        assert_eq!(canvas.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(canvas.pixel(15, 15), Some(Color::TRANSPARENT));

        canvas.fill_path(&everything, Color::WHITE, false);
        assert_eq!(canvas.pixel(15, 15), Some(Color::WHITE));
    }

    #[test]
    fn draws_image_at_position() {
        let mut canvas = canvas();
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        canvas.draw_image(&image, Point2d::new(8.0, 8.0));

        assert_eq!(canvas.pixel(9, 9), Some(Color::rgba(255, 0, 0, 255)));
        assert_eq!(canvas.pixel(7, 7), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(12, 12), Some(Color::TRANSPARENT));
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("gores.png");
        let mut canvas = canvas();
        canvas.clear(Color::WHITE);
        canvas.save_png(&path).expect("saved");

        let image = image::open(&path).expect("readable").to_rgba8();
        assert_eq!(image.dimensions(), (20, 20));
        assert_eq!(image.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn rejects_empty_canvas() {
        assert!(PixmapCanvas::new(Size::new(0, 10)).is_err());
    }
}
