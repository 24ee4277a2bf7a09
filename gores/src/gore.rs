//! Gore geometry: central meridians and clip boundaries.

use geo::{coord, Coord, LineString, Rect};
use gores_types::cartesian::Point2d;
use gores_types::geo::wrap_longitude;

use crate::config::GoresConfig;
use crate::error::GoresError;
use crate::projector::{GoreLayout, Projector, MAX_LONGITUDE_OFFSET};

/// One lune-shaped strip of the map, bounded by two meridians `gore_angle / 2` degrees to either
/// side of its central meridian.
#[derive(Debug, Clone, PartialEq)]
pub struct Gore {
    index: u32,
    central_meridian: f64,
    half_angle: f64,
    clip_ring: LineString<f64>,
}

impl Gore {
    /// Position of the gore from the left edge of the canvas.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Longitude the gore's projection is centered on, in `[-180, 180)`.
    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    /// Angular width of the gore in degrees.
    pub fn angle(&self) -> f64 {
        self.half_angle * 2.0
    }

    /// Closed geographic ring along the two bounding meridians.
    pub fn clip_ring(&self) -> &LineString<f64> {
        &self.clip_ring
    }

    /// True if the longitude lies between the bounding meridians of the gore.
    pub fn contains_longitude(&self, lon: f64) -> bool {
        wrap_longitude(lon - self.central_meridian).abs() <= self.half_angle
    }

    /// True if a geographic bounding rectangle can intersect the gore, taking the wrap-around at
    /// the antimeridian into account.
    pub fn overlaps_longitudes(&self, bbox: &Rect<f64>) -> bool {
        if bbox.width() >= 360.0 - 2.0 * self.half_angle {
            return true;
        }

        let west = self.central_meridian - self.half_angle;
        let east = self.central_meridian + self.half_angle;
        [-360.0, 0.0, 360.0].iter().any(|shift| {
            bbox.min().x + shift <= east && bbox.max().x + shift >= west
        })
    }

    /// Projects the clip ring into pixels. Returns `None` if a sample cannot be projected.
    pub fn projected_clip_ring(&self, projector: &impl Projector) -> Option<Vec<Point2d>> {
        self.clip_ring
            .coords()
            .map(|c| projector.project(*c))
            .collect()
    }
}

/// Builds [`Gore`]s of one render.
#[derive(Debug, Clone, Copy)]
pub struct GoreBuilder {
    gore_angle: f64,
    prime_meridian: f64,
    clip_steps: u32,
}

impl GoreBuilder {
    /// Builder for the configured gores. The clip ring gets one sample per pixel row of the
    /// canvas.
    pub fn new(config: &GoresConfig, layout: &GoreLayout) -> Result<Self, GoresError> {
        Ok(Self {
            gore_angle: config.gore_angle(),
            prime_meridian: config.prime_meridian,
            clip_steps: layout.canvas_size()?.height().max(1),
        })
    }

    /// Builds the gore with the given index.
    pub fn build_gore(&self, index: u32) -> Gore {
        let central_meridian = wrap_longitude(
            self.gore_angle * index as f64 + 180.0 + self.prime_meridian + self.gore_angle / 2.0,
        );
        let half_angle = self.gore_angle / 2.0;

        Gore {
            index,
            central_meridian,
            half_angle,
            clip_ring: self.clip_ring(central_meridian, half_angle),
        }
    }

    /// Builds `count` consecutive gores starting from index 0.
    pub fn build_all(&self, count: u32) -> Vec<Gore> {
        (0..count).map(|index| self.build_gore(index)).collect()
    }

    fn clip_ring(&self, central_meridian: f64, half_angle: f64) -> LineString<f64> {
        let steps = self.clip_steps;
        let lat_step = 180.0 / steps as f64;
        // A single gore would otherwise be bounded by the antipode of its center.
        let offset = half_angle.min(MAX_LONGITUDE_OFFSET);
        let west = central_meridian - offset;
        let east = central_meridian + offset;

        let west_side = (0..=steps).map(|i| coord! { x: west, y: -90.0 + i as f64 * lat_step });
        let east_side = (0..=steps).map(|i| coord! { x: east, y: 90.0 - i as f64 * lat_step });
        let mut coords: Vec<Coord<f64>> = west_side.chain(east_side).collect();
        coords.push(coords[0]);

        LineString::new(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::find_kinks;
    use approx::assert_abs_diff_eq;

    fn builder(config: &GoresConfig) -> (GoreBuilder, GoreLayout) {
        let layout = GoreLayout::from_config(config).expect("valid layout");
        let builder = GoreBuilder::new(config, &layout).expect("valid builder");
        (builder, layout)
    }

    #[test]
    fn meridians_are_evenly_spaced() {
        for num_gores in [1, 2, 5, 12, 13, 24] {
            let config = GoresConfig {
                num_gores,
                map_height: 64,
                ..Default::default()
            };
            let (builder, _) = builder(&config);
            let gores = builder.build_all(num_gores);
            let angle = 360.0 / num_gores as f64;

            let mut total = 0.0;
            for pair in gores.windows(2) {
                let step = (pair[1].central_meridian() - pair[0].central_meridian()).rem_euclid(360.0);
                assert_abs_diff_eq!(step, angle, epsilon = 1e-9);
                total += step;
            }
            let closing = (gores[0].central_meridian()
                - gores[gores.len() - 1].central_meridian())
            .rem_euclid(360.0);
            let closing = if closing == 0.0 { 360.0 } else { closing };
            assert_abs_diff_eq!(total + closing, 360.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn middle_gore_is_centered_on_the_prime_meridian() {
        let config = GoresConfig {
            num_gores: 13,
            prime_meridian: -77.036366,
            ..Default::default()
        };
        let (builder, _) = builder(&config);
        let gores = builder.build_all(13);

        assert_abs_diff_eq!(gores[6].angle(), 27.6923, epsilon = 1e-4);
        let nearest = gores
            .iter()
            .min_by(|a, b| {
                let da = wrap_longitude(a.central_meridian() + 77.036366).abs();
                let db = wrap_longitude(b.central_meridian() + 77.036366).abs();
                da.total_cmp(&db)
            })
            .expect("gores");
        assert_eq!(nearest.index(), 6);
        assert!(wrap_longitude(gores[6].central_meridian() + 77.036366).abs() <= 27.6923 / 2.0);
    }

    #[test]
    fn clip_ring_is_closed_and_sampled_per_row() {
        let config = GoresConfig {
            map_height: 100,
            ..Default::default()
        };
        let (builder, layout) = builder(&config);
        let gore = builder.build_gore(3);
        let steps = layout.canvas_size().expect("size").height() as usize;

        assert!(gore.clip_ring().is_closed());
        assert_eq!(gore.clip_ring().0.len(), (steps + 1) * 2 + 1);
        assert_eq!(gore.clip_ring().0[0], coord! { x: gore.central_meridian() - gore.angle() / 2.0, y: -90.0 });
    }

    #[test]
    fn projected_clip_ring_is_simple() {
        for num_gores in [5, 9, 13] {
            let config = GoresConfig {
                num_gores,
                map_height: 128,
                ..Default::default()
            };
            let (builder, layout) = builder(&config);
            for gore in builder.build_all(num_gores) {
                let projector = layout
                    .projector(gore.index(), gore.central_meridian())
                    .expect("valid projector");
                let ring = gore.projected_clip_ring(&projector).expect("projects");

                assert_eq!(ring.first(), ring.last());
                assert_eq!(find_kinks(&[ring]), 0);
            }
        }
    }

    #[test]
    fn longitude_tests_wrap_around() {
        let config = GoresConfig {
            num_gores: 12,
            prime_meridian: 0.0,
            map_height: 32,
            ..Default::default()
        };
        let (builder, _) = builder(&config);
        // 30° wide gore centered on the antimeridian
        let gore = builder.build_gore(0);
        assert_abs_diff_eq!(gore.central_meridian(), -165.0);

        assert!(gore.contains_longitude(-170.0));
        assert!(!gore.contains_longitude(179.0));
        assert!(!gore.overlaps_longitudes(&Rect::new(
            coord! { x: 170.0, y: 0.0 },
            coord! { x: 179.0, y: 10.0 }
        )));
        assert!(gore.overlaps_longitudes(&Rect::new(
            coord! { x: -179.0, y: 0.0 },
            coord! { x: -175.0, y: 10.0 }
        )));
        assert!(!gore.overlaps_longitudes(&Rect::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 }
        )));
        assert!(gore.overlaps_longitudes(&Rect::new(
            coord! { x: -180.0, y: -90.0 },
            coord! { x: 180.0, y: -60.0 }
        )));
    }

    #[test]
    fn single_gore_clip_ring_can_be_projected() {
        let mut crosses_equator = false;
        for map_height in 500..504 {
            let config = GoresConfig {
                num_gores: 1,
                map_height,
                ..Default::default()
            };
            let (builder, layout) = builder(&config);
            // An even number of steps puts a sample on the equator.
            crosses_equator |= layout.canvas_size().expect("size").height() % 2 == 0;

            let gore = builder.build_gore(0);
            let projector = layout
                .projector(gore.index(), gore.central_meridian())
                .expect("projector");
            let ring = gore.projected_clip_ring(&projector).expect("projects");

            let min_x = ring.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let max_x = ring.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let width = layout.constants().gore_ratio() * layout.map_height();
            assert_abs_diff_eq!(max_x - min_x, width, epsilon = 0.05);
        }

        assert!(crosses_equator);
    }
}
