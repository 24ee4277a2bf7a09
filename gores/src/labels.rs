//! Label placement.
//!
//! Every labeled feature proposes at most one [`LabelCandidate`] per gore. Candidates of a gore
//! are then resolved together: larger features win, and a label is dropped if its box collides
//! with a label that was already accepted.

use geo::{coord, InteriorPoint, Polygon};
use gores_types::cartesian::{Point2d, Rect};

use crate::color::Color;
use crate::driver::RenderContext;
use crate::feature::Feature;
use crate::projector::Projector;
use crate::render::{Canvas, TextMeasurer};
use crate::repair::{polygon_area, project_polygon};

/// A label proposed for one feature in one gore.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    /// Text to draw.
    pub text: String,
    /// Center of the label in pixels.
    pub anchor: Point2d,
    /// Rotation around the anchor in radians, clockwise.
    pub rotation: f64,
    /// Axis-aligned box the label occupies, including the buffer around it.
    pub bbox: Rect,
    /// Labels with larger priority are placed first.
    pub priority: f64,
}

/// Proposes a label for the feature in the gore of the context.
///
/// The label is attached to the largest polygon of the feature, and only if the representative
/// point of that polygon lies inside the gore.
pub fn collect_label_candidate(
    feature: &Feature,
    ctx: &RenderContext,
    measurer: &(impl TextMeasurer + ?Sized),
) -> Option<LabelCandidate> {
    let name = feature.properties.name.as_deref()?;
    let (polygon, area) = largest_polygon(feature, ctx.config.min_area_m2)?;

    let anchor = polygon.interior_point()?;
    if !ctx.gore.contains_longitude(anchor.x()) {
        return None;
    }

    let anchor_px = ctx.projector.project(anchor.0)?;
    let rotation = label_rotation(ctx.projector, anchor.0, ctx.config.label_rotation_delta)?;

    let text = match (&feature.properties.abbrev, projected_width(polygon, ctx)) {
        (Some(abbrev), Some(width)) if measurer.measure(name).width > width => abbrev.as_str(),
        _ => name,
    };

    let metrics = measurer.measure(text);
    let bbox = Rect::centered(anchor_px, metrics.width, metrics.height())
        .expand(ctx.config.label_buffer_px);

    Some(LabelCandidate {
        text: text.to_string(),
        anchor: anchor_px,
        rotation,
        bbox,
        priority: area,
    })
}

fn largest_polygon(feature: &Feature, min_area: f64) -> Option<(&Polygon<f64>, f64)> {
    feature
        .geometry
        .polygons()
        .into_iter()
        .map(|polygon| (polygon, polygon_area(polygon)))
        .filter(|(_, area)| *area >= min_area)
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn label_rotation(projector: &impl Projector, anchor: geo::Coord<f64>, delta: f64) -> Option<f64> {
    let west = projector.project(coord! { x: anchor.x - delta, y: anchor.y })?;
    let east = projector.project(coord! { x: anchor.x + delta, y: anchor.y })?;
    Some((east.y - west.y).atan2(east.x - west.x))
}

fn projected_width(polygon: &Polygon<f64>, ctx: &RenderContext) -> Option<f64> {
    let projected = project_polygon(polygon, ctx.projector)?;
    Some(projected.bounding_rect()?.width())
}

/// Selects non-overlapping labels, highest priority first. Candidates of equal priority keep
/// their input order.
pub fn resolve(mut candidates: Vec<LabelCandidate>) -> Vec<LabelCandidate> {
    candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));

    let mut accepted: Vec<LabelCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.iter().any(|label| label.bbox.intersects(&candidate.bbox)) {
            log::debug!("Label '{}' collides with a larger label", candidate.text);
            continue;
        }

        accepted.push(candidate);
    }

    accepted
}

/// Resolves collisions and draws the accepted labels. Returns the number of drawn labels.
pub fn resolve_and_draw<C: Canvas + ?Sized>(
    candidates: Vec<LabelCandidate>,
    canvas: &mut C,
    color: Color,
) -> usize {
    let accepted = resolve(candidates);
    for label in &accepted {
        canvas.draw_text(&label.text, label.anchor, label.rotation, color);
    }

    accepted.len()
}
