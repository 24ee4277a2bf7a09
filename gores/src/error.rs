//! Error types used by the crate.

use gores_types::error::GoresTypesError;
use image::ImageError;
use thiserror::Error;

/// Gores error type.
#[derive(Debug, Error)]
pub enum GoresError {
    /// Error reading/writing data to the FS.
    #[error("failed to access file")]
    FsIo(#[from] std::io::Error),
    /// Input is not valid GeoJSON.
    #[error("failed to decode GeoJSON")]
    Decoding(#[from] geojson::Error),
    /// Input is valid GeoJSON, but its structure is not supported.
    #[error("malformed vector input: {0}")]
    MalformedInput(String),
    /// Geometry type other than `Polygon` or `MultiPolygon`.
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
    /// Image decoding or encoding error.
    #[error("image error: {0:?}")]
    Image(#[from] ImageError),
    /// External raster reprojection failed.
    #[error("raster reprojection failed: {0}")]
    Reprojection(String),
    /// Font file could not be parsed.
    #[error("invalid font file")]
    Font(#[from] ab_glyph::InvalidFont),
    /// Drawing surface could not be created.
    #[error("cannot allocate canvas of {width}x{height} pixels")]
    Canvas {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Projection could not be constructed.
    #[error(transparent)]
    Projection(#[from] GoresTypesError),
    /// Clip boundary of a gore could not be projected.
    #[error("cannot build the clip boundary of gore {0}")]
    ClipBoundary(u32),
    /// Polygon tessellation failed.
    #[error("tessellation failed: {0:?}")]
    Tessellation(lyon::tessellation::TessellationError),
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Configuration file could not be parsed.
    #[error("failed to parse configuration")]
    ConfigFormat(#[from] serde_json::Error),
}

impl From<lyon::tessellation::TessellationError> for GoresError {
    fn from(value: lyon::tessellation::TessellationError) -> Self {
        Self::Tessellation(value)
    }
}
