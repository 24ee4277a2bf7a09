//! Triangulation of polygons with holes.
//!
//! Canvas fills are driven by single closed paths, so a polygon with holes is split into
//! triangles which are filled one by one.

use gores_types::cartesian::Point2d;
use lyon::lyon_tessellation::{BuffersBuilder, FillOptions, FillVertex, FillVertexConstructor};
use lyon::math::point;
use lyon::path::{FillRule, Path};
use lyon::tessellation::{FillTessellator, VertexBuffers};

use crate::error::GoresError;
use crate::repair::ProjectedPolygon;

/// Triangle in pixel coordinates.
pub type Triangle = [Point2d; 3];

/// Splits the polygon into triangles covering its area minus the holes.
pub fn tessellate(polygon: &ProjectedPolygon) -> Result<Vec<Triangle>, GoresError> {
    let mut path_builder = Path::builder();
    for ring in polygon.rings() {
        let Some((first, rest)) = ring.split_first() else {
            continue;
        };

        path_builder.begin(point(first.x as f32, first.y as f32));
        for p in rest {
            path_builder.line_to(point(p.x as f32, p.y as f32));
        }
        path_builder.end(true);
    }
    let path = path_builder.build();

    let mut buffers: VertexBuffers<Point2d, u32> = VertexBuffers::new();
    FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
        &mut BuffersBuilder::new(&mut buffers, PixelVertexConstructor),
    )?;

    Ok(buffers
        .indices
        .chunks_exact(3)
        .map(|triangle| {
            [
                buffers.vertices[triangle[0] as usize],
                buffers.vertices[triangle[1] as usize],
                buffers.vertices[triangle[2] as usize],
            ]
        })
        .collect())
}

struct PixelVertexConstructor;

impl FillVertexConstructor<Point2d> for PixelVertexConstructor {
    fn new_vertex(&mut self, vertex: FillVertex) -> Point2d {
        Point2d::new(vertex.position().x as f64, vertex.position().y as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(min: f64, max: f64) -> Vec<Point2d> {
        [(min, min), (max, min), (max, max), (min, max), (min, min)]
            .iter()
            .map(|(x, y)| Point2d::new(*x, *y))
            .collect()
    }

    fn triangle_area(triangle: &Triangle) -> f64 {
        let [a, b, c] = triangle;
        ((b - a).perp(&(c - a)) / 2.0).abs()
    }

    #[test]
    fn triangles_cover_polygon_minus_hole() {
        let polygon = ProjectedPolygon::new(square(0.0, 10.0), vec![square(2.0, 4.0)]);
        let triangles = tessellate(&polygon).expect("tessellates");

        assert!(!triangles.is_empty());
        let area: f64 = triangles.iter().map(triangle_area).sum();
        assert_abs_diff_eq!(area, 96.0, epsilon = 1e-3);
    }

    #[test]
    fn triangles_stay_outside_the_hole() {
        let polygon = ProjectedPolygon::new(square(0.0, 10.0), vec![square(2.0, 8.0)]);
        let triangles = tessellate(&polygon).expect("tessellates");

        for triangle in &triangles {
            let center = (triangle[0].coords + triangle[1].coords + triangle[2].coords) / 3.0;
            let inside_hole = center.x > 2.0 && center.x < 8.0 && center.y > 2.0 && center.y < 8.0;
            assert!(!inside_hole, "triangle {triangle:?} is inside the hole");
        }
    }
}
