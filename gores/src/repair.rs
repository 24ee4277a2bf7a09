//! Validation and repair of polygons after projection.
//!
//! Projection distortion near the gore edges can fold a ring over itself. Such rings cannot be
//! filled reliably, so every projected polygon is checked for kinks (crossing or overlapping
//! segments). A kinked polygon gets one simplification pass; if it still has kinks it is dropped.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::orient::Direction;
use geo::{Coord, GeodesicArea, Line, LineString, Orient, Polygon, Simplify};
use gores_types::cartesian::{Point2d, Rect};

use crate::projector::Projector;

/// Points closer than this (pixels) are treated as one vertex.
const VERTEX_EPSILON: f64 = 1e-9;

/// Polygon in pixel coordinates. The first ring is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    rings: Vec<Vec<Point2d>>,
}

impl ProjectedPolygon {
    /// Creates a polygon from its outer ring and holes.
    pub fn new(exterior: Vec<Point2d>, interiors: Vec<Vec<Point2d>>) -> Self {
        let mut rings = Vec::with_capacity(interiors.len() + 1);
        rings.push(exterior);
        rings.extend(interiors);
        Self { rings }
    }

    /// Outer ring.
    pub fn exterior(&self) -> &[Point2d] {
        &self.rings[0]
    }

    /// Holes.
    pub fn interiors(&self) -> &[Vec<Point2d>] {
        &self.rings[1..]
    }

    /// All rings, outer ring first.
    pub fn rings(&self) -> &[Vec<Point2d>] {
        &self.rings
    }

    /// Whether the polygon has holes.
    pub fn has_holes(&self) -> bool {
        self.rings.len() > 1
    }

    /// Bounding box of the outer ring.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.exterior().iter())
    }

    /// Number of kinks of the polygon. See [`find_kinks`].
    pub fn kinks(&self) -> usize {
        find_kinks(&self.rings)
    }

    /// Ramer-Douglas-Peucker simplification of every ring. Holes that collapse are removed.
    /// Returns `None` if the outer ring collapses.
    pub fn simplify(&self, tolerance: f64) -> Option<Self> {
        let mut rings = self
            .rings
            .iter()
            .map(|ring| simplify_ring(ring, tolerance));

        let exterior = rings.next().flatten()?;
        Some(Self::new(exterior, rings.flatten().collect()))
    }
}

/// Result of [`repair_polygon`].
#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    /// The polygon had no kinks.
    Clean(ProjectedPolygon),
    /// The polygon had kinks which were removed by simplification.
    Simplified(ProjectedPolygon),
    /// Kinks are still there after simplification (or the polygon collapsed while simplifying).
    Kinked {
        /// Kinks found before simplification.
        before: usize,
        /// Kinks found after simplification.
        after: usize,
    },
}

/// Checks the polygon and simplifies it once if it has kinks.
pub fn repair_polygon(polygon: ProjectedPolygon, tolerance: f64) -> Repair {
    let before = polygon.kinks();
    if before == 0 {
        return Repair::Clean(polygon);
    }

    match polygon.simplify(tolerance) {
        Some(simplified) => match simplified.kinks() {
            0 => Repair::Simplified(simplified),
            after => Repair::Kinked { before, after },
        },
        None => Repair::Kinked { before, after: before },
    }
}

/// Projects every vertex of a geographic polygon. Returns `None` if any vertex cannot be
/// projected.
pub fn project_polygon(polygon: &Polygon<f64>, projector: &impl Projector) -> Option<ProjectedPolygon> {
    let project_ring = |ring: &LineString<f64>| -> Option<Vec<Point2d>> {
        ring.coords().map(|c| projector.project(*c)).collect()
    };

    let exterior = project_ring(polygon.exterior())?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(project_ring)
        .collect::<Option<Vec<_>>>()?;

    Some(ProjectedPolygon::new(exterior, interiors))
}

/// Geodesic area of a geographic polygon on the WGS84 ellipsoid, in square meters.
///
/// Rings are reoriented first (outer ring counter-clockwise, holes clockwise), so the result does
/// not depend on the winding of the source data.
pub fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    polygon
        .orient(Direction::Default)
        .geodesic_area_unsigned()
        .max(0.0)
}

/// Counts crossings and overlaps between the segments of the rings.
///
/// Segments of the same ring that share a vertex are not compared. Rings touching at a vertex
/// are not kinks. Consecutive duplicate vertices are ignored, so zero-length segments (for example
/// the samples of a meridian at a pole) never count.
pub fn find_kinks(rings: &[Vec<Point2d>]) -> usize {
    let mut segments = Vec::new();
    for (ring_index, ring) in rings.iter().enumerate() {
        let vertices = dedup_vertices(ring);
        let count = vertices.len().saturating_sub(1);
        for (position, pair) in vertices.windows(2).enumerate() {
            segments.push(Segment {
                ring: ring_index,
                position,
                ring_len: count,
                line: Line::new(to_coord(pair[0]), to_coord(pair[1])),
            });
        }
    }

    segments.sort_by(|a, b| a.min_x().total_cmp(&b.min_x()));

    let mut kinks = 0;
    for (i, segment) in segments.iter().enumerate() {
        let max_x = segment.max_x();
        for other in segments[i + 1..].iter().take_while(|s| s.min_x() <= max_x) {
            if segment.is_adjacent(other) {
                continue;
            }

            match line_intersection(segment.line, other.line) {
                Some(LineIntersection::SinglePoint { is_proper: true, .. })
                | Some(LineIntersection::Collinear { .. }) => kinks += 1,
                _ => {}
            }
        }
    }

    kinks
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    ring: usize,
    position: usize,
    ring_len: usize,
    line: Line<f64>,
}

impl Segment {
    fn min_x(&self) -> f64 {
        self.line.start.x.min(self.line.end.x)
    }

    fn max_x(&self) -> f64 {
        self.line.start.x.max(self.line.end.x)
    }

    fn is_adjacent(&self, other: &Segment) -> bool {
        if self.ring != other.ring {
            return false;
        }

        let (a, b) = if self.position < other.position {
            (self.position, other.position)
        } else {
            (other.position, self.position)
        };

        b - a == 1 || (a == 0 && b + 1 == self.ring_len)
    }
}

fn dedup_vertices(ring: &[Point2d]) -> Vec<Point2d> {
    let mut vertices: Vec<Point2d> = Vec::with_capacity(ring.len() + 1);
    for point in ring {
        if vertices
            .last()
            .map_or(true, |last| (last - point).norm() > VERTEX_EPSILON)
        {
            vertices.push(*point);
        }
    }

    // Rings are compared as closed, whatever the input says.
    if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
        if vertices.len() > 1 && (first - last).norm() <= VERTEX_EPSILON {
            vertices.pop();
        }
        if vertices.len() > 2 {
            vertices.push(first);
        }
    }

    vertices
}

fn simplify_ring(ring: &[Point2d], tolerance: f64) -> Option<Vec<Point2d>> {
    let line_string: LineString<f64> = ring.iter().map(|p| to_coord(*p)).collect();
    let simplified = line_string.simplify(&tolerance);
    if simplified.0.len() < 4 {
        return None;
    }

    Some(
        simplified
            .coords()
            .map(|c| Point2d::new(c.x, c.y))
            .collect(),
    )
}

fn to_coord(point: Point2d) -> Coord<f64> {
    Coord {
        x: point.x,
        y: point.y,
    }
}
