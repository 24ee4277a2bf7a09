//! Render configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::GoresError;

/// Polygons with a smaller geodesic area (square meters) are neither drawn nor labeled.
pub const DEFAULT_MIN_AREA_M2: f64 = 1e9;
/// Ramer-Douglas-Peucker tolerance (pixels) of the single repair pass on self-intersecting
/// polygons.
pub const DEFAULT_SIMPLIFY_TOLERANCE_PX: f64 = 0.5;
/// Spacing between gores relative to the width of one gore.
pub const DEFAULT_GUTTER_RATIO: f64 = 0.075;

/// Everything needed to render a set of gores.
///
/// Every field has a default, so a partial JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoresConfig {
    /// Number of gores. Odd numbers keep the prime meridian away from an interruption.
    pub num_gores: u32,
    /// Longitude (degrees) at the center of the map.
    pub prime_meridian: f64,
    /// Height of a gore in pixels. The canvas width follows from the gore count.
    pub map_height: u32,
    /// Spacing between gores relative to the width of one gore.
    pub gutter_ratio: f64,
    /// Georeferenced raster drawn under the vector layers.
    pub raster_source: Option<PathBuf>,
    /// Vector layers, drawn in order on top of the raster.
    pub vector_layers: Vec<VectorLayerConfig>,
    /// Output PNG file.
    pub output_path: PathBuf,
    /// TrueType/OpenType font used for labels. Labels are not drawn without it.
    pub font_path: Option<PathBuf>,
    /// Label font size in pixels.
    pub font_size_px: f32,
    /// Minimum geodesic area of a polygon to be drawn or labeled, in square meters.
    pub min_area_m2: f64,
    /// Simplification tolerance of the kink repair pass, in pixels.
    pub simplify_tolerance_px: f64,
    /// Padding added around label boxes before collision tests, in pixels.
    pub label_buffer_px: f64,
    /// Longitude offset (degrees) of the two points sampled to orient a label.
    pub label_rotation_delta: f64,
    /// Directory for intermediate reprojected rasters. System temp dir if not set.
    pub scratch_dir: Option<PathBuf>,
    /// Assign palette colors to features that have no fill of their own.
    pub coloring: bool,
}

impl Default for GoresConfig {
    fn default() -> Self {
        Self {
            num_gores: 13,
            prime_meridian: -77.036366,
            map_height: 512,
            gutter_ratio: DEFAULT_GUTTER_RATIO,
            raster_source: None,
            vector_layers: Vec::new(),
            output_path: PathBuf::from("output.png"),
            font_path: None,
            font_size_px: 12.0,
            min_area_m2: DEFAULT_MIN_AREA_M2,
            simplify_tolerance_px: DEFAULT_SIMPLIFY_TOLERANCE_PX,
            label_buffer_px: 2.0,
            label_rotation_delta: 0.01,
            scratch_dir: None,
            coloring: true,
        }
    }
}

/// One GeoJSON layer and the way it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorLayerConfig {
    /// GeoJSON `FeatureCollection` file.
    pub path: PathBuf,
    /// Fill for every feature of the layer. Overrides per-feature fills and palette coloring.
    #[serde(default)]
    pub fill: Option<Color>,
    /// Outline color.
    #[serde(default = "default_stroke")]
    pub stroke: Option<Color>,
    /// Whether features of this layer get labels.
    #[serde(default = "default_labels")]
    pub labels: bool,
}

fn default_stroke() -> Option<Color> {
    Some(Color::FEATURE_STROKE)
}

fn default_labels() -> bool {
    true
}

impl VectorLayerConfig {
    /// Layer with default styling.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fill: None,
            stroke: default_stroke(),
            labels: default_labels(),
        }
    }

    /// Parses `PATH[:#RRGGBB[AA]]`. A color suffix fixes the fill of the whole layer and disables
    /// its labels, which is how secondary layers such as lakes are drawn.
    pub fn parse(value: &str) -> Result<Self, GoresError> {
        match value.rsplit_once(":#") {
            Some((path, color)) => {
                let fill = Color::try_from_hex(&format!("#{color}"))
                    .ok_or_else(|| GoresError::Config(format!("invalid layer color in '{value}'")))?;
                Ok(Self {
                    fill: Some(fill),
                    labels: false,
                    ..Self::new(path)
                })
            }
            None => Ok(Self::new(value)),
        }
    }
}

impl GoresConfig {
    /// Reads a JSON configuration file. Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self, GoresError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Angular width of one gore in degrees.
    pub fn gore_angle(&self) -> f64 {
        360.0 / self.num_gores as f64
    }

    /// Checks that the values describe a renderable map.
    pub fn validate(&self) -> Result<(), GoresError> {
        if self.num_gores == 0 {
            return Err(GoresError::Config("at least one gore is required".into()));
        }
        if self.map_height == 0 {
            return Err(GoresError::Config("map height must be positive".into()));
        }
        if !self.prime_meridian.is_finite() {
            return Err(GoresError::Config("prime meridian must be finite".into()));
        }
        if self.gutter_ratio.is_nan() || self.gutter_ratio < 0.0 {
            return Err(GoresError::Config("gutter ratio must not be negative".into()));
        }
        if self.font_size_px.is_nan() || self.font_size_px <= 0.0 {
            return Err(GoresError::Config("font size must be positive".into()));
        }
        if self.label_rotation_delta.is_nan() || self.label_rotation_delta <= 0.0 {
            return Err(GoresError::Config(
                "label rotation delta must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Directory for intermediate files.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
