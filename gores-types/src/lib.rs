//! Geometric primitives used by the `gores` renderer.
//!
//! The crate is split into two coordinate spaces:
//! * [`geo`] contains points on the surface of the Earth, the ellipsoid [`Datum`](geo::Datum) and
//!   the [`Projection`](geo::Projection) trait together with the Lambert azimuthal equal-area
//!   projection every gore is drawn with.
//! * [`cartesian`] contains planar points, rectangles and sizes in projected or pixel units.

pub mod cartesian;
pub mod error;
pub mod geo;
