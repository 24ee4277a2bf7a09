//! Gores renders a world map as a set of "orange-peel" gores: lune-shaped strips that, cut out and
//! glued onto a ball, make a globe.
//!
//! Every gore is drawn with its own Lambert azimuthal equal-area projection centered on the gore's
//! central meridian, clipped to the two meridians bounding the gore, and placed next to the
//! previous gore with a small gutter in between.
//!
//! # Quick start
//!
//! ```no_run
//! use gores::config::{GoresConfig, VectorLayerConfig};
//!
//! let config = GoresConfig {
//!     raster_source: Some("HYP_50M_SR_W/HYP_50M_SR_W.tif".into()),
//!     vector_layers: vec![VectorLayerConfig::new("data/countries.json")],
//!     font_path: Some("DejaVuSans.ttf".into()),
//!     ..Default::default()
//! };
//!
//! gores::render(&config).expect("failed to render gores");
//! ```
//!
//! # Main components
//!
//! * [`GoreLayout`](projector::GoreLayout) and [`GoreProjector`](projector::GoreProjector)
//!   convert geographic coordinates into canvas pixels of a gore.
//! * [`GoreBuilder`](gore::GoreBuilder) computes central meridians and clip boundaries.
//! * [`layers`](layer) draw raster and vector content into a gore. Vector polygons distorted by
//!   the projection are checked and [repaired](repair) before drawing.
//! * [`labels`] picks non-overlapping labels for every gore.
//! * [`GoreRenderer`](driver::GoreRenderer) runs the render cycle of every gore on a
//!   [`Canvas`](render::Canvas).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
pub mod coloring;
pub mod config;
pub mod driver;
pub mod error;
pub mod feature;
pub mod gore;
pub mod labels;
pub mod layer;
pub mod projector;
pub mod render;
pub mod repair;
pub mod tessellation;

pub use color::Color;
pub use driver::{render, GoreRenderer, RenderContext, RenderSummary};
pub use error::GoresError;

// Reexport gores_types
pub use gores_types;
