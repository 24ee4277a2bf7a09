//! Vector features and their loading from GeoJSON.

use std::path::Path;

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::{GeoJson, PolygonType, Value};

use crate::error::GoresError;

/// Geometry of a feature. Only areal geometries can be drawn as gores.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// Single polygon.
    Polygon(Polygon<f64>),
    /// Several polygons.
    MultiPolygon(MultiPolygon<f64>),
}

impl FeatureGeometry {
    /// Flattens the geometry into simple polygons, in source order.
    pub fn polygons(&self) -> Vec<&Polygon<f64>> {
        match self {
            FeatureGeometry::Polygon(polygon) => vec![polygon],
            FeatureGeometry::MultiPolygon(multi) => multi.0.iter().collect(),
        }
    }

    /// Geographic bounding rectangle.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            FeatureGeometry::Polygon(polygon) => polygon.bounding_rect(),
            FeatureGeometry::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }
}

/// Properties of a feature the renderer knows about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureProperties {
    /// Display name.
    pub name: Option<String>,
    /// Short name, used when the display name does not fit.
    pub abbrev: Option<String>,
    /// Requested fill color (`#RRGGBB`).
    pub fill_key: Option<String>,
}

/// An areal feature with its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry in geographic coordinates (`x` is longitude, `y` is latitude).
    pub geometry: FeatureGeometry,
    /// Properties.
    pub properties: FeatureProperties,
}

impl Feature {
    /// Creates a feature with the given geometry and display name.
    pub fn new(geometry: FeatureGeometry, name: Option<&str>) -> Self {
        Self {
            geometry,
            properties: FeatureProperties {
                name: name.map(String::from),
                ..Default::default()
            },
        }
    }

    /// Name used in log messages.
    pub fn label(&self) -> &str {
        self.properties.name.as_deref().unwrap_or("<unnamed>")
    }

    fn from_geojson(feature: geojson::Feature, index: usize) -> Result<Self, GoresError> {
        let properties = FeatureProperties {
            name: string_property(&feature, &["name", "NAME"]),
            abbrev: string_property(&feature, &["abbrev", "ABBREV"]),
            fill_key: string_property(&feature, &["fill"]),
        };

        let Some(geometry) = feature.geometry else {
            return Err(GoresError::MalformedInput(format!(
                "feature {index} has no geometry"
            )));
        };

        let geometry = match geometry.value {
            Value::Polygon(rings) => FeatureGeometry::Polygon(convert_polygon(rings, index)?),
            Value::MultiPolygon(polygons) => FeatureGeometry::MultiPolygon(MultiPolygon::new(
                polygons
                    .into_iter()
                    .map(|rings| convert_polygon(rings, index))
                    .collect::<Result<_, _>>()?,
            )),
            other => {
                return Err(GoresError::UnsupportedGeometry(
                    geometry_type_name(&other).to_string(),
                ))
            }
        };

        Ok(Self {
            geometry,
            properties,
        })
    }
}

/// Parses a GeoJSON `FeatureCollection` of polygonal features.
pub fn parse_features(json: &str) -> Result<Vec<Feature>, GoresError> {
    let GeoJson::FeatureCollection(collection) = json.parse::<GeoJson>()? else {
        return Err(GoresError::MalformedInput(
            "top-level object is not a FeatureCollection".into(),
        ));
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| Feature::from_geojson(feature, index))
        .collect()
}

/// Reads a GeoJSON `FeatureCollection` file.
pub fn load_features(path: &Path) -> Result<Vec<Feature>, GoresError> {
    let json = std::fs::read_to_string(path)?;
    let features = parse_features(&json)?;
    log::info!("Loaded {} features from {}", features.len(), path.display());

    Ok(features)
}

fn string_property(feature: &geojson::Feature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| feature.property(key)?.as_str())
        .map(String::from)
}

fn convert_polygon(rings: PolygonType, index: usize) -> Result<Polygon<f64>, GoresError> {
    let mut rings = rings
        .into_iter()
        .map(|ring| convert_ring(ring, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    let Some(exterior) = rings.next() else {
        return Err(GoresError::MalformedInput(format!(
            "feature {index} has a polygon without rings"
        )));
    };

    Ok(Polygon::new(exterior, rings.collect()))
}

fn convert_ring(ring: Vec<Vec<f64>>, index: usize) -> Result<LineString<f64>, GoresError> {
    ring.into_iter()
        .map(|position| match position[..] {
            [x, y, ..] => Ok(Coord { x, y }),
            _ => Err(GoresError::MalformedInput(format!(
                "feature {index} has a position with less than two coordinates"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
