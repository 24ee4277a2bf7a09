use std::f64::consts::FRAC_PI_2;

use crate::cartesian::Point2d;
use crate::error::GoresTypesError;
use crate::geo::datum::Datum;
use crate::geo::point::{wrap_longitude, GeoPoint2d};
use crate::geo::projection::Projection;

const EPSILON: f64 = 1e-12;
/// Authalic ratios this close to 1 are treated as a pole.
const POLE_EPSILON: f64 = 1e-12;

/// Lambert azimuthal equal-area projection in its equatorial aspect (`lat_0 = 0`).
///
/// Input coordinates are used as-is on the projection's own ellipsoid: no datum shift is applied
/// between the source geographic coordinates and the target ellipsoid. This is the behaviour of
/// PROJ with `+nadgrids=@null`, and it is what rasters warped with [`Self::proj_string`] end up
/// with, so vector and raster output stay pixel aligned.
#[derive(Debug, Clone, Copy)]
pub struct LambertAzimuthalEqualArea {
    central_meridian: f64,
    datum: Datum,
    e: f64,
    e_sq: f64,
    qp: f64,
    rq: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    /// Creates a projection centered on the equator at `central_meridian` (degrees).
    pub fn new(central_meridian: f64, datum: Datum) -> Result<Self, GoresTypesError> {
        if !central_meridian.is_finite() {
            return Err(GoresTypesError::InvalidProjection(format!(
                "central meridian {central_meridian} is not finite"
            )));
        }

        let e_sq = datum.eccentricity_sq();
        if datum.semimajor() <= 0.0 || !(0.0..1.0).contains(&e_sq) {
            return Err(GoresTypesError::InvalidProjection(format!(
                "unsupported ellipsoid {datum:?}"
            )));
        }

        let e = e_sq.sqrt();
        let qp = authalic_q(1.0, e, e_sq);
        let a = datum.semimajor();
        let rq = a * (qp / 2.0).sqrt();

        Ok(Self {
            central_meridian: wrap_longitude(central_meridian),
            datum,
            e,
            e_sq,
            qp,
            rq,
            d: a / rq,
        })
    }

    /// PROJ definition of the same projection, for external tools such as `gdalwarp`.
    pub fn proj_string(&self) -> String {
        format!(
            "+proj=laea +lat_0=0 +lon_0={} +x_0=0 +y_0=0 +a={} +b={} +no_defs",
            self.central_meridian,
            self.datum.semimajor(),
            self.datum.semiminor()
        )
    }

    fn authalic_latitude(&self, lat_rad: f64) -> f64 {
        // Computed for the northern hemisphere and mirrored, so both poles land exactly on ±π/2.
        let sin_lat = lat_rad.sin();
        let ratio = authalic_q(sin_lat.abs(), self.e, self.e_sq) / self.qp;
        let beta = if ratio >= 1.0 - POLE_EPSILON {
            FRAC_PI_2
        } else {
            ratio.asin()
        };

        beta.copysign(sin_lat)
    }

    fn geodetic_latitude(&self, beta: f64) -> f64 {
        let e2 = self.e_sq;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        beta + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin()
    }
}

fn authalic_q(sin_lat: f64, e: f64, e_sq: f64) -> f64 {
    if e < EPSILON {
        return 2.0 * sin_lat;
    }

    let e_sin = e * sin_lat;
    (1.0 - e_sq)
        * (sin_lat / (1.0 - e_sin * e_sin) - 1.0 / (2.0 * e) * ((1.0 - e_sin) / (1.0 + e_sin)).ln())
}

impl Projection for LambertAzimuthalEqualArea {
    type InPoint = GeoPoint2d;
    type OutPoint = Point2d;

    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        let d_lon = wrap_longitude(input.lon() - self.central_meridian).to_radians();
        let beta = self.authalic_latitude(input.lat_rad());

        let denominator = 1.0 + beta.cos() * d_lon.cos();
        if denominator < EPSILON {
            return None;
        }

        let b = self.rq * (2.0 / denominator).sqrt();
        let x = b * self.d * beta.cos() * d_lon.sin();
        let y = b / self.d * beta.sin();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        let xs = input.x / self.d;
        let ys = input.y * self.d;
        let rho = xs.hypot(ys);
        if rho < EPSILON {
            return Some(GeoPoint2d::lonlat(self.central_meridian, 0.0));
        }

        let half_chord = rho / (2.0 * self.rq);
        if half_chord > 1.0 + EPSILON {
            return None;
        }

        let ce = 2.0 * half_chord.min(1.0).asin();
        let beta = (ys * ce.sin() / rho).clamp(-1.0, 1.0).asin();
        let d_lon = (input.x * ce.sin()).atan2(self.d * rho * ce.cos());

        let lat = self.geodetic_latitude(beta).to_degrees();
        let lon = wrap_longitude(self.central_meridian + d_lon.to_degrees());
        Some(GeoPoint2d::lonlat(lon, lat))
    }
}
