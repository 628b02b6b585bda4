//! Feature collections tagged with a single CRS.

use super::geometry::{Crs, Geometry};
use crate::error::{PropriskError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute mapping attached to a feature
pub type Attributes = Map<String, Value>;

/// A geometry with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry, attributes: Attributes::new() }
    }

    pub fn with_attributes(geometry: Geometry, attributes: Attributes) -> Self {
        Self { geometry, attributes }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Ordered features sharing one coordinate reference system.
///
/// The CRS is stored once for the whole collection so every geometry is in
/// the same CRS by construction. A collection without a CRS is allowed (it is
/// what untagged input looks like) and gets one assigned by `ensure_crs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryCollection {
    pub crs: Option<Crs>,
    pub features: Vec<Feature>,
}

impl GeometryCollection {
    pub fn new(crs: Crs) -> Self {
        Self { crs: Some(crs), features: Vec::new() }
    }

    /// Collection with no CRS information
    pub fn untagged(features: Vec<Feature>) -> Self {
        Self { crs: None, features }
    }

    pub fn from_features(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs: Some(crs), features }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.features.iter().map(|f| &f.geometry)
    }

    /// CRS of the collection, or a validation error naming the operation
    pub fn require_crs(&self, operation: &str) -> Result<&Crs> {
        self.crs.as_ref().ok_or_else(|| {
            PropriskError::validation(
                "crs",
                format!("{} requires a collection with a CRS; call ensure_crs first", operation),
            )
        })
    }

    /// Parse a GeoJSON document (FeatureCollection, Feature or bare Geometry).
    ///
    /// A legacy `crs` member naming an EPSG code is honoured; without one the
    /// collection is left untagged.
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: geojson::GeoJson = content
            .parse()
            .map_err(|e| PropriskError::Serialization(format!("Invalid GeoJSON: {}", e)))?;

        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                let crs = fc
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(extract_epsg_from_crs)
                    .map(Crs::from_epsg);

                let features = fc
                    .features
                    .iter()
                    .filter_map(convert_feature)
                    .collect::<Result<Vec<_>>>()?;

                Ok(Self { crs, features })
            }
            geojson::GeoJson::Feature(feature) => {
                let features = convert_feature(&feature).into_iter().collect::<Result<_>>()?;
                Ok(Self::untagged(features))
            }
            geojson::GeoJson::Geometry(geom) => {
                let geometry = convert_geometry(&geom)?;
                Ok(Self::untagged(vec![Feature::new(geometry)]))
            }
        }
    }

    /// Convert to a GeoJSON FeatureCollection for map rendering
    pub fn to_geojson(&self) -> Result<geojson::FeatureCollection> {
        let features = self
            .features
            .iter()
            .map(|feature| {
                let geometry: geojson::Geometry =
                    serde_json::from_value(feature.geometry.to_geojson())?;
                Ok(geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(feature.attributes.clone()),
                    foreign_members: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let foreign_members = self.crs.as_ref().map(|crs| {
            let mut members = Map::new();
            members.insert(
                "crs".to_string(),
                serde_json::json!({
                    "type": "name",
                    "properties": { "name": crs.authority() }
                }),
            );
            members
        });

        Ok(geojson::FeatureCollection { bbox: None, features, foreign_members })
    }
}

impl<'a> IntoIterator for &'a GeometryCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Features without geometry are skipped
fn convert_feature(feature: &geojson::Feature) -> Option<Result<Feature>> {
    let geom = feature.geometry.as_ref()?;
    Some(convert_geometry(geom).map(|geometry| {
        Feature::with_attributes(geometry, feature.properties.clone().unwrap_or_default())
    }))
}

fn convert_geometry(geom: &geojson::Geometry) -> Result<Geometry> {
    let value = serde_json::to_value(geom)?;
    Geometry::from_geojson(&value).ok_or_else(|| {
        PropriskError::Serialization(format!(
            "Unsupported GeoJSON geometry type: {}",
            value.get("type").and_then(Value::as_str).unwrap_or("unknown")
        ))
    })
}

/// Extract EPSG code from a legacy GeoJSON CRS object
fn extract_epsg_from_crs(crs: &Value) -> Option<u32> {
    // "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326"
    let name = crs.get("properties")?.get("name")?.as_str()?;
    name.split(':').next_back()?.parse().ok()
}

/// Axis-aligned bounding box expressed in a CRS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: Option<Crs>,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y, crs: None }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// `(minx, miny, maxx, maxy)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
            crs: self.crs.clone(),
        }
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::rectangle(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}
