//! Fill colors for features that do not have one of their own.
//!
//! Colors are assigned once per layer, before any gore is drawn, so a feature keeps its color in
//! every gore it appears in.

use geo::Intersects;

use crate::color::Color;
use crate::feature::Feature;

/// Assigns a fill color to every feature of a layer.
pub trait FeatureColoring {
    /// Returns one color per feature, in the order of `features`.
    fn assign(&self, features: &[Feature]) -> Vec<Color>;
}

/// Greedy graph coloring: features are visited from the most connected one and get the first
/// palette color none of their neighbours has. Two features are neighbours if their polygons
/// intersect or touch.
///
/// With five colors every planar map can be colored without conflicts, but the greedy order
/// does not guarantee it. When the palette runs out, the color least used among the neighbours
/// is taken.
#[derive(Debug, Clone)]
pub struct GreedyColoring {
    palette: Vec<Color>,
}

impl GreedyColoring {
    /// Muted palette that keeps black labels readable.
    pub const DEFAULT_PALETTE: [Color; 5] = [
        Color::rgba(0xE8, 0xD4, 0xA2, 0xFF),
        Color::rgba(0xB9, 0xD7, 0xA8, 0xFF),
        Color::rgba(0xF2, 0xB8, 0xA0, 0xFF),
        Color::rgba(0xC6, 0xC0, 0xE0, 0xFF),
        Color::rgba(0xF5, 0xE6, 0xA8, 0xFF),
    ];

    /// Creates coloring with the given palette. Returns `None` for an empty palette.
    pub fn new(palette: Vec<Color>) -> Option<Self> {
        if palette.is_empty() {
            None
        } else {
            Some(Self { palette })
        }
    }

    /// Colors of the palette.
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }
}

impl Default for GreedyColoring {
    fn default() -> Self {
        Self {
            palette: Self::DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl FeatureColoring for GreedyColoring {
    fn assign(&self, features: &[Feature]) -> Vec<Color> {
        let neighbours = adjacency(features);

        let mut order: Vec<usize> = (0..features.len()).collect();
        order.sort_by(|a, b| neighbours[*b].len().cmp(&neighbours[*a].len()));

        let mut assigned: Vec<Option<usize>> = vec![None; features.len()];
        for index in order {
            let mut usage = vec![0usize; self.palette.len()];
            for neighbour in &neighbours[index] {
                if let Some(color) = assigned[*neighbour] {
                    usage[color] += 1;
                }
            }

            let color = usage
                .iter()
                .position(|count| *count == 0)
                .or_else(|| {
                    usage
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, count)| **count)
                        .map(|(color, _)| color)
                })
                .unwrap_or(0);
            assigned[index] = Some(color);
        }

        log::debug!(
            "Assigned {} colors to {} features",
            self.palette.len(),
            features.len()
        );

        assigned
            .into_iter()
            .map(|color| self.palette[color.unwrap_or(0)])
            .collect()
    }
}

fn adjacency(features: &[Feature]) -> Vec<Vec<usize>> {
    let bboxes: Vec<_> = features
        .iter()
        .map(|feature| feature.geometry.bounding_rect())
        .collect();

    let mut neighbours = vec![Vec::new(); features.len()];
    for i in 0..features.len() {
        let Some(a) = bboxes[i] else {
            continue;
        };

        for j in i + 1..features.len() {
            let Some(b) = bboxes[j] else {
                continue;
            };

            if a.intersects(&b) && geometries_touch(&features[i], &features[j]) {
                neighbours[i].push(j);
                neighbours[j].push(i);
            }
        }
    }

    neighbours
}

fn geometries_touch(a: &Feature, b: &Feature) -> bool {
    let b_polygons = b.geometry.polygons();
    a.geometry
        .polygons()
        .into_iter()
        .any(|pa| b_polygons.iter().any(|pb| pa.intersects(*pb)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureGeometry;
    use geo::polygon;

    fn cell(x: f64, y: f64) -> Feature {
        Feature::new(
            FeatureGeometry::Polygon(polygon![
                (x: x, y: y),
                (x: x + 1.0, y: y),
                (x: x + 1.0, y: y + 1.0),
                (x: x, y: y + 1.0),
                (x: x, y: y),
            ]),
            None,
        )
    }

    #[test]
    fn neighbours_get_different_colors() {
        // 4x4 grid: cells sharing an edge or a corner touch.
        let features: Vec<_> = (0..4)
            .flat_map(|x| (0..4).map(move |y| cell(x as f64, y as f64)))
            .collect();
        let colors = GreedyColoring::default().assign(&features);
        let neighbours = adjacency(&features);

        assert_eq!(colors.len(), features.len());
        for (i, list) in neighbours.iter().enumerate() {
            for j in list {
                assert_ne!(colors[i], colors[*j], "cells {i} and {j}");
            }
        }
    }

    #[test]
    fn separate_features_share_the_first_color() {
        let features = vec![cell(0.0, 0.0), cell(10.0, 0.0), cell(20.0, 0.0)];
        let colors = GreedyColoring::default().assign(&features);
        assert!(colors.iter().all(|c| *c == GreedyColoring::DEFAULT_PALETTE[0]));
    }

    #[test]
    fn small_palette_still_colors_everything() {
        let features = vec![cell(0.0, 0.0), cell(1.0, 0.0), cell(0.0, 1.0)];
        let coloring = GreedyColoring::new(vec![Color::WHITE]).expect("palette");
        assert_eq!(coloring.assign(&features), vec![Color::WHITE; 3]);
        assert!(GreedyColoring::new(vec![]).is_none());
    }
}
