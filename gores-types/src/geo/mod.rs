//! Geometries in geographic coordinates (latitude and longitude) (see [`GeoPoint2d`]) and conversion
//! into planar coordinates (see [`Projection`]).

mod datum;
mod laea;
mod point;
mod projection;

pub use datum::Datum;
pub use laea::LambertAzimuthalEqualArea;
pub use point::{wrap_longitude, GeoPoint2d};
pub use projection::Projection;
