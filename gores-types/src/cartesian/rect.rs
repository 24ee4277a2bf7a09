use crate::cartesian::Point2d;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x.
    pub x_min: f64,
    /// Minimum y.
    pub y_min: f64,
    /// Maximum x.
    pub x_max: f64,
    /// Maximum y.
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Creates a rectangle of the given size centered on `center`.
    pub fn centered(center: Point2d, width: f64, height: f64) -> Self {
        Self {
            x_min: center.x - width / 2.0,
            y_min: center.y - height / 2.0,
            x_max: center.x + width / 2.0,
            y_max: center.y + height / 2.0,
        }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns a rectangle with every side moved outwards by `amount`.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            x_min: self.x_min - amount,
            x_max: self.x_max + amount,
            y_min: self.y_min - amount,
            y_max: self.y_max + amount,
        }
    }

    /// Bounding rectangle of the points. Returns `None` for an empty iterator.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2d>) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);

        for p in points {
            rect.x_min = rect.x_min.min(p.x);
            rect.y_min = rect.y_min.min(p.y);
            rect.x_max = rect.x_max.max(p.x);
            rect.y_max = rect.y_max.max(p.y);
        }

        Some(rect)
    }

    /// True if the point lies inside or on the border of the rectangle.
    pub fn contains(&self, point: &Point2d) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// True if the rectangles share at least one point. Touching rectangles intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 5.0),
            Point2d::new(-2.0, 3.0),
            Point2d::new(4.0, -1.0),
        ];
        assert_eq!(
            Rect::from_points(points.iter()),
            Some(Rect::new(-2.0, -1.0, 4.0, 5.0))
        );
        assert_eq!(Rect::from_points([].iter()), None);
    }

    #[test]
    fn intersects() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects(&rect));
        assert!(rect.intersects(&Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(rect.intersects(&Rect::new(10.0, 0.0, 12.0, 1.0)));
        assert!(!rect.intersects(&Rect::new(10.5, 0.0, 12.0, 1.0)));
        assert!(!rect.intersects(&Rect::new(0.0, -3.0, 10.0, -0.1)));
    }

    #[test]
    fn centered_and_expand() {
        let rect = Rect::centered(Point2d::new(5.0, 5.0), 4.0, 2.0).expand(1.0);
        assert_eq!(rect, Rect::new(2.0, 3.0, 8.0, 7.0));
    }
}
