//! Polygon layers loaded from GeoJSON.

use geo::Polygon;

use crate::coloring::FeatureColoring;
use crate::color::Color;
use crate::config::VectorLayerConfig;
use crate::driver::RenderContext;
use crate::error::GoresError;
use crate::feature::{load_features, Feature};
use crate::labels::{collect_label_candidate, LabelCandidate};
use crate::layer::Layer;
use crate::render::{ring_path, Canvas, RenderStyle, TextMeasurer};
use crate::repair::{polygon_area, project_polygon, repair_polygon, ProjectedPolygon, Repair};
use crate::tessellation::tessellate;

/// What happened to the polygons of a feature in one gore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureStats {
    /// Polygons drawn.
    pub drawn: usize,
    /// Polygons below the area threshold.
    pub too_small: usize,
    /// Polygons with a vertex that cannot be projected.
    pub unprojectable: usize,
    /// Polygons dropped because of kinks or a failed tessellation.
    pub invalid: usize,
}

impl std::ops::AddAssign for FeatureStats {
    fn add_assign(&mut self, rhs: Self) {
        self.drawn += rhs.drawn;
        self.too_small += rhs.too_small;
        self.unprojectable += rhs.unprojectable;
        self.invalid += rhs.invalid;
    }
}

/// Draws the polygons of a feature into the gore of the context.
///
/// Polygons that are too small, cannot be projected or stay self-intersecting after one
/// simplification pass are skipped. The rest are filled (holes are cut out by tessellation) and
/// outlined along the outer ring.
pub fn render_feature<C: Canvas + ?Sized>(
    feature: &Feature,
    ctx: &RenderContext,
    style: &RenderStyle,
    canvas: &mut C,
) -> FeatureStats {
    let mut stats = FeatureStats::default();
    for polygon in feature.geometry.polygons() {
        match prepare_polygon(feature, polygon, ctx) {
            Prepared::Ready(projected) => {
                if draw_polygon(feature, &projected, style, canvas) {
                    stats.drawn += 1;
                } else {
                    stats.invalid += 1;
                }
            }
            Prepared::TooSmall => stats.too_small += 1,
            Prepared::Unprojectable => stats.unprojectable += 1,
            Prepared::Kinked => stats.invalid += 1,
        }
    }

    stats
}

enum Prepared {
    Ready(ProjectedPolygon),
    TooSmall,
    Unprojectable,
    Kinked,
}

fn prepare_polygon(feature: &Feature, polygon: &Polygon<f64>, ctx: &RenderContext) -> Prepared {
    let area = polygon_area(polygon);
    if area < ctx.config.min_area_m2 {
        return Prepared::TooSmall;
    }

    let Some(projected) = project_polygon(polygon, ctx.projector) else {
        log::debug!(
            "Polygon of {} cannot be projected in gore {}",
            feature.label(),
            ctx.gore.index()
        );
        return Prepared::Unprojectable;
    };

    match repair_polygon(projected, ctx.config.simplify_tolerance_px) {
        Repair::Clean(projected) => Prepared::Ready(projected),
        Repair::Simplified(projected) => {
            log::debug!(
                "Removed kinks from a polygon of {} in gore {}",
                feature.label(),
                ctx.gore.index()
            );
            Prepared::Ready(projected)
        }
        Repair::Kinked { before, after } => {
            log::warn!(
                "Skipping polygon of {} ({area:.0} m²) in gore {}: {after} kinks left of {before}",
                feature.label(),
                ctx.gore.index()
            );
            Prepared::Kinked
        }
    }
}

fn draw_polygon<C: Canvas + ?Sized>(
    feature: &Feature,
    polygon: &ProjectedPolygon,
    style: &RenderStyle,
    canvas: &mut C,
) -> bool {
    if let Some(fill) = style.fill {
        if polygon.has_holes() {
            let triangles = match tessellate(polygon) {
                Ok(triangles) => triangles,
                Err(err) => {
                    log::warn!("Skipping polygon of {}: {err}", feature.label());
                    return false;
                }
            };

            for triangle in triangles {
                if let Some(path) = ring_path(canvas, &triangle) {
                    canvas.fill_path(&path, fill, false);
                }
            }
        } else if let Some(path) = ring_path(canvas, polygon.exterior()) {
            canvas.fill_path(&path, fill, true);
        }
    }

    if let Some(stroke) = style.stroke {
        if let Some(path) = ring_path(canvas, polygon.exterior()) {
            canvas.stroke_path(&path, stroke, style.stroke_width);
        }
    }

    true
}

/// Features of one GeoJSON file with their resolved styles.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    name: String,
    features: Vec<Feature>,
    fills: Vec<Option<Color>>,
    stroke: Option<Color>,
    labels: bool,
}

impl VectorLayer {
    /// Creates a layer. The fill of every feature is, in order of preference: the fill of the
    /// layer, the `fill` property of the feature, the color assigned by `coloring`.
    pub fn new(
        name: impl Into<String>,
        features: Vec<Feature>,
        config: &VectorLayerConfig,
        coloring: Option<&dyn FeatureColoring>,
    ) -> Self {
        let assigned = match (config.fill, coloring) {
            (None, Some(coloring)) => Some(coloring.assign(&features)),
            _ => None,
        };

        let fills = features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                config
                    .fill
                    .or_else(|| {
                        feature
                            .properties
                            .fill_key
                            .as_deref()
                            .and_then(Color::try_from_hex)
                    })
                    .or_else(|| assigned.as_ref().map(|colors| colors[index]))
            })
            .collect();

        Self {
            name: name.into(),
            features,
            fills,
            stroke: config.stroke,
            labels: config.labels,
        }
    }

    /// Reads the layer's GeoJSON file.
    pub fn load(
        config: &VectorLayerConfig,
        coloring: Option<&dyn FeatureColoring>,
    ) -> Result<Self, GoresError> {
        let features = load_features(&config.path)?;
        Ok(Self::new(
            config.path.display().to_string(),
            features,
            config,
            coloring,
        ))
    }

    /// Style the feature with the given index is drawn with.
    pub fn style(&self, index: usize) -> RenderStyle {
        RenderStyle {
            fill: self.fills.get(index).copied().flatten(),
            stroke: self.stroke,
            ..Default::default()
        }
    }

    /// Whether the layer's features are labeled.
    pub fn has_labels(&self) -> bool {
        self.labels
    }
}

impl<C: Canvas> Layer<C> for VectorLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &RenderContext, canvas: &mut C) -> Result<(), GoresError> {
        let mut stats = FeatureStats::default();
        let mut culled = 0;
        for (index, feature) in self.features.iter().enumerate() {
            let visible = feature
                .geometry
                .bounding_rect()
                .is_some_and(|bbox| ctx.gore.overlaps_longitudes(&bbox));
            if !visible {
                culled += 1;
                continue;
            }

            stats += render_feature(feature, ctx, &self.style(index), canvas);
        }

        log::debug!(
            "Layer {} in gore {}: {stats:?}, {culled} features outside",
            self.name,
            ctx.gore.index()
        );

        Ok(())
    }

    fn label_candidates(
        &self,
        ctx: &RenderContext,
        measurer: &dyn TextMeasurer,
    ) -> Vec<LabelCandidate> {
        if !self.labels {
            return Vec::new();
        }

        self.features
            .iter()
            .filter_map(|feature| collect_label_candidate(feature, ctx, measurer))
            .collect()
    }
}
