/// Ellipsoid of revolution described by its semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 flattening applied to an ellipsoid with unit semi-major axis. Projected coordinates
    /// on this datum are in "Earth radii", which is what gore layout is computed in.
    pub const UNIT_WGS84: Self = Datum {
        semimajor: 1.0,
        inv_flattening: 298.257223563,
    };

    /// Creates a new datum. `inv_flattening` of `f64::INFINITY` describes a sphere.
    pub const fn new(semimajor: f64, inv_flattening: f64) -> Self {
        Self {
            semimajor,
            inv_flattening,
        }
    }

    /// Semi-major (equatorial) axis.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Flattening `f = (a - b) / a`.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inv_flattening
    }

    /// Semi-minor (polar) axis.
    pub fn semiminor(&self) -> f64 {
        self.semimajor * (1.0 - self.flattening())
    }

    /// First eccentricity squared.
    pub fn eccentricity_sq(&self) -> f64 {
        let f = self.flattening();
        2.0 * f - f * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_datum_minor_axis() {
        assert_abs_diff_eq!(
            Datum::UNIT_WGS84.semiminor(),
            1.0 - 1.0 / 298.257223563,
            epsilon = 1e-15
        );
    }

    #[test]
    fn sphere_has_no_eccentricity() {
        let sphere = Datum::new(1.0, f64::INFINITY);
        assert_eq!(sphere.eccentricity_sq(), 0.0);
        assert_eq!(sphere.semiminor(), 1.0);
    }
}
