//! Canvas that records drawing calls instead of rasterizing them.

use gores_types::cartesian::{Point2d, Size};
use image::RgbaImage;

use crate::color::Color;
use crate::render::{Canvas, PathBuilder, TextMeasurer, TextMetrics};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Fill { points: Vec<Point2d>, color: Color, anti_alias: bool },
    Stroke { points: Vec<Point2d>, color: Color, width: f64 },
    Save,
    Restore,
    Clip { points: Vec<Point2d> },
    Image { width: u32, height: u32, top_left: Point2d },
    Text { text: String, center: Point2d, rotation: f64 },
}

#[derive(Debug)]
pub(crate) struct RecordingCanvas {
    pub size: Size<u32>,
    pub ops: Vec<Op>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn fills(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| matches!(op, Op::Fill { .. })).collect()
    }

    pub fn strokes(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| matches!(op, Op::Stroke { .. })).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingPathBuilder(Vec<Point2d>);

impl PathBuilder for RecordingPathBuilder {
    type Path = Vec<Point2d>;

    fn move_to(&mut self, point: Point2d) {
        self.0.push(point);
    }

    fn line_to(&mut self, point: Point2d) {
        self.0.push(point);
    }

    fn close(&mut self) {}

    fn finish(self) -> Option<Vec<Point2d>> {
        (!self.0.is_empty()).then_some(self.0)
    }
}

impl Canvas for RecordingCanvas {
    type Path = Vec<Point2d>;
    type PathBuilder = RecordingPathBuilder;

    fn size(&self) -> Size<u32> {
        self.size
    }

    fn path_builder(&self) -> RecordingPathBuilder {
        RecordingPathBuilder::default()
    }

    fn fill_path(&mut self, path: &Vec<Point2d>, color: Color, anti_alias: bool) {
        self.ops.push(Op::Fill {
            points: path.clone(),
            color,
            anti_alias,
        });
    }

    fn stroke_path(&mut self, path: &Vec<Point2d>, color: Color, width: f64) {
        self.ops.push(Op::Stroke {
            points: path.clone(),
            color,
            width,
        });
    }

    fn save(&mut self) {
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }

    fn clip(&mut self, path: &Vec<Point2d>) {
        self.ops.push(Op::Clip {
            points: path.clone(),
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, top_left: Point2d) {
        self.ops.push(Op::Image {
            width: image.width(),
            height: image.height(),
            top_left,
        });
    }

    fn draw_text(&mut self, text: &str, center: Point2d, rotation: f64, _color: Color) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            center,
            rotation,
        });
    }
}

/// Every character is `char_width` wide, lines are 10 pixels high.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedMeasurer {
    pub char_width: f64,
}

impl Default for FixedMeasurer {
    fn default() -> Self {
        Self { char_width: 6.0 }
    }
}

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, text: &str) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as f64 * self.char_width,
            ascent: 8.0,
            descent: 2.0,
        }
    }
}
