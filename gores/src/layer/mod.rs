//! [Layers](Layer) specify a data source and the way the data is drawn into every gore.

use crate::driver::RenderContext;
use crate::error::GoresError;
use crate::labels::LabelCandidate;
use crate::render::{Canvas, TextMeasurer};

pub mod raster;
pub mod vector;

pub use raster::{GdalWarp, RasterLayer, RasterReprojector};
pub use vector::VectorLayer;

/// Content drawn into every gore, in the order the layers were added to the renderer.
///
/// There are two types of layers:
/// * [`RasterLayer`] - reprojects a georeferenced image into the projection of every gore.
/// * [`VectorLayer`] - draws polygons from a GeoJSON file, optionally labeling them.
pub trait Layer<C: Canvas> {
    /// Name of the layer for log messages.
    fn name(&self) -> &str;

    /// Draws the layer into the gore of the context. The canvas is already clipped to the gore.
    fn render(&self, ctx: &RenderContext, canvas: &mut C) -> Result<(), GoresError>;

    /// Proposes labels for the layer's features in the gore of the context.
    fn label_candidates(
        &self,
        _ctx: &RenderContext,
        _measurer: &dyn TextMeasurer,
    ) -> Vec<LabelCandidate> {
        Vec::new()
    }
}
