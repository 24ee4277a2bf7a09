//! Per-gore render cycle and assembly of the output image.
//!
//! Gores are drawn one after another. For every gore the renderer:
//!
//! 1. projects the gore's clip boundary,
//! 2. saves the drawing state, outlines the gore and clips to it,
//! 3. draws every layer in order,
//! 4. resolves and draws the labels proposed by the layers,
//! 5. restores the drawing state, removing the clip.

use gores_types::cartesian::Size;

use crate::color::Color;
use crate::coloring::{FeatureColoring, GreedyColoring};
use crate::config::GoresConfig;
use crate::error::GoresError;
use crate::gore::{Gore, GoreBuilder};
use crate::labels::resolve_and_draw;
use crate::layer::{GdalWarp, Layer, RasterLayer, VectorLayer};
use crate::projector::{GoreLayout, GoreProjector};
use crate::render::{ring_path, Canvas, FontMeasurer, PixmapCanvas, TextMeasurer};

/// Everything a drawing function needs to know about the gore being drawn.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The gore.
    pub gore: &'a Gore,
    /// Projector of the gore into canvas pixels.
    pub projector: &'a GoreProjector,
    /// Render settings.
    pub config: &'a GoresConfig,
}

/// Stage of the render cycle of a single gore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoreStage {
    /// Nothing is drawn yet.
    Idle,
    /// The clip boundary is projected.
    ClipBoundaryComputed,
    /// The outline is drawn and the canvas is clipped to the gore.
    ClipApplied,
    /// All layers are drawn.
    ContentDrawn,
    /// Labels are drawn.
    LabelsResolved,
    /// The clip is removed.
    ClipReleased,
    /// All gores are drawn.
    Done,
}

impl GoreStage {
    /// Stage that follows this one, or `None` after [`GoreStage::Done`].
    pub fn next(self, last_gore: bool) -> Option<Self> {
        use GoreStage::*;
        Some(match self {
            Idle => ClipBoundaryComputed,
            ClipBoundaryComputed => ClipApplied,
            ClipApplied => ContentDrawn,
            ContentDrawn => LabelsResolved,
            LabelsResolved => ClipReleased,
            ClipReleased if last_gore => Done,
            ClipReleased => Idle,
            Done => return None,
        })
    }
}

#[derive(Debug)]
struct StageTracker {
    stage: GoreStage,
    gore: u32,
    last_gore: bool,
}

impl StageTracker {
    fn new(gore: u32, last_gore: bool) -> Self {
        Self {
            stage: GoreStage::Idle,
            gore,
            last_gore,
        }
    }

    fn advance(&mut self, to: GoreStage) {
        debug_assert_eq!(self.stage.next(self.last_gore), Some(to));
        log::trace!("Gore {}: {:?} -> {:?}", self.gore, self.stage, to);
        self.stage = to;
    }
}

/// Result of a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Number of drawn gores.
    pub gores: u32,
    /// Number of drawn labels over all gores.
    pub labels: usize,
}

/// Draws all gores of a configuration onto a canvas.
pub struct GoreRenderer<C: Canvas> {
    config: GoresConfig,
    layout: GoreLayout,
    gores: Vec<Gore>,
    layers: Vec<Box<dyn Layer<C>>>,
    measurer: Option<Box<dyn TextMeasurer>>,
    label_color: Color,
}

impl<C: Canvas> std::fmt::Debug for GoreRenderer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoreRenderer")
            .field("config", &self.config)
            .field("gores", &self.gores.len())
            .field(
                "layers",
                &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("labels", &self.measurer.is_some())
            .finish()
    }
}

impl<C: Canvas> GoreRenderer<C> {
    /// Creates a renderer without layers. Fails if the configuration is invalid.
    pub fn new(config: GoresConfig) -> Result<Self, GoresError> {
        let layout = GoreLayout::from_config(&config)?;
        let gores = GoreBuilder::new(&config, &layout)?.build_all(layout.num_gores());

        Ok(Self {
            config,
            layout,
            gores,
            layers: Vec::new(),
            measurer: None,
            label_color: Color::BLACK,
        })
    }

    /// Adds a layer on top of the existing ones.
    pub fn with_layer(mut self, layer: impl Layer<C> + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Enables labels, measured with the given measurer.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Some(Box::new(measurer));
        self
    }

    /// Placement of the gores on the canvas.
    pub fn layout(&self) -> &GoreLayout {
        &self.layout
    }

    /// Size of the canvas the renderer expects.
    pub fn canvas_size(&self) -> Result<Size<u32>, GoresError> {
        self.layout.canvas_size()
    }

    /// Draws every gore.
    pub fn render(&self, canvas: &mut C) -> Result<RenderSummary, GoresError> {
        let mut summary = RenderSummary::default();
        let count = self.gores.len();

        for (position, gore) in self.gores.iter().enumerate() {
            log::info!(
                "Drawing gore {} of {count} (central meridian {:.4})",
                gore.index() + 1,
                gore.central_meridian()
            );

            let mut tracker = StageTracker::new(gore.index(), position + 1 == count);
            summary.labels += self.render_gore(gore, canvas, &mut tracker)?;
            summary.gores += 1;

            if let Some(next) = tracker.stage.next(tracker.last_gore) {
                tracker.advance(next);
            }
        }

        Ok(summary)
    }

    fn render_gore(
        &self,
        gore: &Gore,
        canvas: &mut C,
        tracker: &mut StageTracker,
    ) -> Result<usize, GoresError> {
        let projector = self.layout.projector(gore.index(), gore.central_meridian())?;
        let clip = gore
            .projected_clip_ring(&projector)
            .and_then(|ring| ring_path(canvas, &ring))
            .ok_or(GoresError::ClipBoundary(gore.index()))?;
        tracker.advance(GoreStage::ClipBoundaryComputed);

        canvas.save();
        canvas.stroke_path(&clip, Color::GORE_OUTLINE, 1.0);
        canvas.clip(&clip);
        tracker.advance(GoreStage::ClipApplied);

        let ctx = RenderContext {
            gore,
            projector: &projector,
            config: &self.config,
        };

        for layer in &self.layers {
            log::debug!("Drawing {} into gore {}", layer.name(), gore.index());
            if let Err(err) = layer.render(&ctx, canvas) {
                canvas.restore();
                return Err(err);
            }
        }
        tracker.advance(GoreStage::ContentDrawn);

        let labels = match &self.measurer {
            Some(measurer) => {
                let candidates = self
                    .layers
                    .iter()
                    .flat_map(|layer| layer.label_candidates(&ctx, measurer.as_ref()))
                    .collect();
                resolve_and_draw(candidates, canvas, self.label_color)
            }
            None => 0,
        };
        tracker.advance(GoreStage::LabelsResolved);

        canvas.restore();
        tracker.advance(GoreStage::ClipReleased);

        Ok(labels)
    }
}

/// Loads every input of the configuration, draws all gores and writes the PNG file.
///
/// All files are read before anything is drawn, so missing or malformed inputs fail the render
/// early.
pub fn render(config: &GoresConfig) -> Result<RenderSummary, GoresError> {
    config.validate()?;
    let mut renderer = GoreRenderer::<PixmapCanvas>::new(config.clone())?;

    if let Some(source) = &config.raster_source {
        let reprojector = GdalWarp::new(config.scratch_dir());
        renderer = renderer.with_layer(RasterLayer::new(source, Box::new(reprojector))?);
    }

    let coloring = config.coloring.then(GreedyColoring::default);
    let mut wants_labels = false;
    for layer_config in &config.vector_layers {
        let layer = VectorLayer::load(
            layer_config,
            coloring.as_ref().map(|c| c as &dyn FeatureColoring),
        )?;
        wants_labels |= layer.has_labels();
        renderer = renderer.with_layer(layer);
    }

    let font = match &config.font_path {
        Some(path) => Some(FontMeasurer::load(path, config.font_size_px)?),
        None => {
            if wants_labels {
                log::warn!("No font configured, labels are not drawn");
            }
            None
        }
    };

    let size = renderer.canvas_size()?;
    log::info!("Canvas size is {}x{}", size.width(), size.height());
    let mut canvas = PixmapCanvas::new(size)?;
    if let Some(font) = font {
        canvas = canvas.with_font(font.clone());
        renderer = renderer.with_measurer(font);
    }

    let summary = renderer.render(&mut canvas)?;
    canvas.save_png(&config.output_path)?;
    log::info!(
        "Drew {} gores with {} labels",
        summary.gores,
        summary.labels
    );

    Ok(summary)
}
