//! Conversion of geographic coordinates into pixels of the output canvas.
//!
//! Every gore is drawn with its own [`LambertAzimuthalEqualArea`] projection centered on the
//! gore's central meridian. Projected coordinates are then normalized by the projected height of
//! the whole sphere and shifted horizontally by the gore index, so gores end up side by side with
//! a gutter between them. The same mapping places reprojected raster tiles, which is what keeps
//! raster and vector content aligned.

use geo::Coord;
use gores_types::cartesian::{Point2d, Size};
use gores_types::geo::{Datum, GeoPoint2d, LambertAzimuthalEqualArea, Projection};

use crate::config::GoresConfig;
use crate::error::GoresError;

/// Longitude used instead of 180° when measuring the projected width, as the antipode of the
/// projection center cannot be projected.
pub(crate) const MAX_LONGITUDE_OFFSET: f64 = 179.9999;

/// Converts geographic coordinates (`x` is longitude, `y` is latitude, degrees) into pixels.
pub trait Projector {
    /// Projects the point. Returns `None` if the point cannot be projected.
    fn project(&self, point: Coord<f64>) -> Option<Point2d>;
}

/// Extents of the projection in projected units, computed once per render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConstants {
    /// Projected distance between the poles.
    pub full_height: f64,
    /// Projected width of the whole sphere (the equator from -180° to 180°).
    pub full_width: f64,
    /// Projected width of one gore at the equator.
    pub gore_width: f64,
}

impl ProjectionConstants {
    /// Measures the projection for gores `gore_angle` degrees wide.
    pub fn new(gore_angle: f64, datum: Datum) -> Result<Self, GoresError> {
        let projection = LambertAzimuthalEqualArea::new(0.0, datum)?;
        let project = |lon: f64, lat: f64| {
            projection
                .project(&GeoPoint2d::lonlat(lon, lat))
                .ok_or_else(|| GoresError::Config(format!("cannot project ({lon}, {lat})")))
        };

        let half_gore = (gore_angle / 2.0).min(MAX_LONGITUDE_OFFSET);

        Ok(Self {
            full_height: project(0.0, 90.0)?.y * 2.0,
            full_width: project(MAX_LONGITUDE_OFFSET, 0.0)?.x * 2.0,
            gore_width: project(half_gore, 0.0)?.x * 2.0,
        })
    }

    /// Width of one gore relative to the height of the map.
    pub fn gore_ratio(&self) -> f64 {
        self.gore_width / self.full_height
    }
}

/// Placement of all gores on the output canvas.
#[derive(Debug, Clone, Copy)]
pub struct GoreLayout {
    constants: ProjectionConstants,
    datum: Datum,
    num_gores: u32,
    map_height: f64,
    gutter_ratio: f64,
}

impl GoreLayout {
    /// Creates the layout for the configuration, using the unit WGS84 ellipsoid.
    pub fn from_config(config: &GoresConfig) -> Result<Self, GoresError> {
        config.validate()?;
        let datum = Datum::UNIT_WGS84;

        Ok(Self {
            constants: ProjectionConstants::new(config.gore_angle(), datum)?,
            datum,
            num_gores: config.num_gores,
            map_height: config.map_height as f64,
            gutter_ratio: config.gutter_ratio,
        })
    }

    /// Projection extents.
    pub fn constants(&self) -> ProjectionConstants {
        self.constants
    }

    /// Number of gores.
    pub fn num_gores(&self) -> u32 {
        self.num_gores
    }

    /// Height of a gore in pixels.
    pub fn map_height(&self) -> f64 {
        self.map_height
    }

    /// Size of the canvas holding all gores and their gutters, truncated to whole pixels.
    pub fn canvas_size(&self) -> Result<Size<u32>, GoresError> {
        let ratio = self.constants.gore_ratio();
        let width = self.map_height * ratio * (1.0 + self.gutter_ratio) * self.num_gores as f64;
        let height = self.map_height + self.map_height * ratio * self.gutter_ratio;

        Size::new(width, height)
            .cast()
            .ok_or_else(|| GoresError::Config(format!("invalid canvas size {width}x{height}")))
    }

    /// Projector for the gore with the given index and central meridian.
    pub fn projector(&self, index: u32, central_meridian: f64) -> Result<GoreProjector, GoresError> {
        Ok(GoreProjector {
            projection: LambertAzimuthalEqualArea::new(central_meridian, self.datum)?,
            constants: self.constants,
            index,
            map_height: self.map_height,
            gutter_ratio: self.gutter_ratio,
        })
    }
}

/// [`Projector`] of a single gore.
#[derive(Debug, Clone, Copy)]
pub struct GoreProjector {
    projection: LambertAzimuthalEqualArea,
    constants: ProjectionConstants,
    index: u32,
    map_height: f64,
    gutter_ratio: f64,
}

impl GoreProjector {
    /// Underlying projection.
    pub fn projection(&self) -> &LambertAzimuthalEqualArea {
        &self.projection
    }

    /// Projection extents shared by all gores.
    pub fn constants(&self) -> ProjectionConstants {
        self.constants
    }

    /// Converts projected units of this gore into canvas pixels.
    pub fn to_pixels(&self, projected: Point2d) -> Point2d {
        let ratio = self.constants.gore_ratio();
        let gutter = ratio * self.gutter_ratio / 2.0;

        let x = projected.x / self.constants.full_height
            + ratio / 2.0
            + gutter
            + ratio * (1.0 + self.gutter_ratio) * self.index as f64;
        let y = -projected.y / self.constants.full_height + 0.5 + gutter;

        Point2d::new(x * self.map_height, y * self.map_height)
    }
}

impl Projector for GoreProjector {
    fn project(&self, point: Coord<f64>) -> Option<Point2d> {
        let projected = self
            .projection
            .project(&GeoPoint2d::lonlat(point.x, point.y))?;
        Some(self.to_pixels(projected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::coord;

    fn layout() -> GoreLayout {
        GoreLayout::from_config(&GoresConfig::default()).expect("valid layout")
    }

    #[test]
    fn constants() {
        let constants =
            ProjectionConstants::new(360.0 / 13.0, Datum::UNIT_WGS84).expect("valid constants");
        assert!(constants.full_height > 2.8 && constants.full_height < 2f64.sqrt() * 2.0);
        assert!(constants.full_width > constants.full_height);
        assert!(constants.gore_width < constants.full_width);
        assert!(constants.gore_ratio() > 0.16 && constants.gore_ratio() < 0.18);
    }

    #[test]
    fn single_gore_has_finite_width() {
        let constants = ProjectionConstants::new(360.0, Datum::UNIT_WGS84).expect("valid constants");
        assert_abs_diff_eq!(constants.gore_width, constants.full_width);
    }

    #[test]
    fn canvas_fits_all_gores() {
        let layout = layout();
        let size = layout.canvas_size().expect("valid size");
        let ratio = layout.constants().gore_ratio();

        assert_eq!(size.height(), (512.0 + 512.0 * ratio * 0.075) as u32);
        assert_eq!(size.width(), (512.0 * ratio * (1.0 + 0.075) * 13.0) as u32);
    }

    #[test]
    fn equator_center_lands_in_the_middle_of_its_gore() {
        let layout = layout();
        let ratio = layout.constants().gore_ratio();
        let projector = layout.projector(2, 40.0).expect("valid projector");
        let center = projector.project(coord! { x: 40.0, y: 0.0 }).expect("projects");

        let gore_pitch = ratio * 1.075 * 512.0;
        let gutter = ratio * 0.075 / 2.0 * 512.0;
        assert_abs_diff_eq!(center.x, gore_pitch * 2.0 + gutter + ratio * 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 256.0 + gutter, epsilon = 1e-9);
    }

    #[test]
    fn poles_span_the_map_height() {
        let layout = layout();
        let projector = layout.projector(0, 10.0).expect("valid projector");
        let north = projector.project(coord! { x: 10.0, y: 90.0 }).expect("projects");
        let south = projector.project(coord! { x: 10.0, y: -90.0 }).expect("projects");

        assert_abs_diff_eq!(south.y - north.y, 512.0, epsilon = 1e-9);
        assert_abs_diff_eq!(north.x, south.x, epsilon = 1e-9);
    }

    #[test]
    fn gore_edges_are_one_gore_width_apart() {
        let layout = layout();
        let half = 360.0 / 13.0 / 2.0;
        let projector = layout.projector(0, 0.0).expect("valid projector");
        let west = projector.project(coord! { x: -half, y: 0.0 }).expect("projects");
        let east = projector.project(coord! { x: half, y: 0.0 }).expect("projects");

        assert_abs_diff_eq!(
            east.x - west.x,
            layout.constants().gore_ratio() * 512.0,
            epsilon = 1e-9
        );
    }
}
