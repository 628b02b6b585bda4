//! Canonical geometry types used across all proprisk crates.
//!
//! These types provide a bridge between GeoJSON serialization and the
//! computational geo crate types.

use crate::error::{PropriskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EPSG codes of the geographic (degree based) CRS we recognise
const GEOGRAPHIC_EPSG: &[u32] = &[4326, 4283, 7844, 4269, 4258];

/// Whether a CRS measures in degrees or in projected linear units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsKind {
    Geographic,
    Projected,
}

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.epsg == other.epsg
    }
}

impl Eq for Crs {}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// Build a CRS from a bare EPSG code, filling in the name when known
    pub fn from_epsg(epsg: u32) -> Self {
        let name = match epsg {
            4326 => "WGS 84",
            4283 => "GDA94",
            7844 => "GDA2020",
            4269 => "NAD83",
            4258 => "ETRS89",
            3857 => "WGS 84 / Pseudo-Mercator",
            3577 => "GDA94 / Australian Albers",
            9473 => "GDA2020 / Australian Albers",
            7854..=7856 => "GDA2020 / MGA",
            28354..=28356 => "GDA94 / MGA",
            _ => "",
        };
        Self::new(epsg, name)
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// GDA2020 geographic (EPSG:7844)
    pub fn gda2020() -> Self {
        Self::from_epsg(7844)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857)
    }

    /// GDA94 / Australian Albers (EPSG:3577)
    pub fn australian_albers() -> Self {
        Self::from_epsg(3577)
    }

    pub fn kind(&self) -> CrsKind {
        if GEOGRAPHIC_EPSG.contains(&self.epsg) {
            CrsKind::Geographic
        } else {
            CrsKind::Projected
        }
    }

    pub fn is_geographic(&self) -> bool {
        self.kind() == CrsKind::Geographic
    }

    /// Authority string understood by PROJ, e.g. `EPSG:4326`
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }

    /// Parse `EPSG:<code>` (any case) or a bare integer code
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some((authority, _)) => {
                return Err(PropriskError::InvalidCrs {
                    input: input.to_string(),
                    reason: format!(
                        "unsupported authority '{}', only EPSG is supported",
                        authority
                    ),
                })
            }
            None => trimmed,
        };

        let epsg = code.trim().parse::<u32>().map_err(|_| PropriskError::InvalidCrs {
            input: input.to_string(),
            reason: "expected an integer EPSG code".to_string(),
        })?;
        if epsg == 0 {
            return Err(PropriskError::InvalidCrs {
                input: input.to_string(),
                reason: "EPSG code must be positive".to_string(),
            });
        }

        Ok(Self::from_epsg(epsg))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "EPSG:{}", self.epsg)
        } else {
            write!(f, "EPSG:{} ({})", self.epsg, self.name)
        }
    }
}

impl FromStr for Crs {
    type Err = PropriskError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Distance units for spatial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    /// Convert a distance value to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Kilometers => value * 1000.0,
            DistanceUnit::Miles => value * 1609.34,
            DistanceUnit::Feet => value * 0.3048,
        }
    }
}

/// Distance with unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn to_meters(&self) -> f64 {
        self.unit.to_meters(self.value)
    }

    /// Parse strings like `2km`, `500m`, `1.5mi`, `300ft` or a bare number of meters
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim().to_lowercase();
        let split = s.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);

        let value = number.trim().parse::<f64>().map_err(|_| {
            PropriskError::validation("distance", format!("'{}' is not a number", input))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(PropriskError::validation(
                "distance",
                format!("'{}' must be a non-negative finite value", input),
            ));
        }

        let unit = match suffix.trim() {
            "" | "m" | "meters" => DistanceUnit::Meters,
            "km" | "kilometers" => DistanceUnit::Kilometers,
            "mi" | "miles" => DistanceUnit::Miles,
            "ft" | "feet" => DistanceUnit::Feet,
            other => {
                return Err(PropriskError::validation(
                    "distance",
                    format!("unknown unit '{}'. Use m, km, mi, or ft", other),
                ))
            }
        };

        Ok(Self::new(value, unit))
    }
}

impl FromStr for Distance {
    type Err = PropriskError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Feet => "ft",
        };
        write!(f, "{}{}", self.value, suffix)
    }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

/// GeoJSON-compatible geometry representation
///
/// This enum directly maps to GeoJSON geometry types with coordinate arrays.
/// It can be serialized/deserialized as GeoJSON and converted to/from `geo` crate types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Closed rectangle ring from min/max corners
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Geometry::polygon(vec![vec![
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
            [min_x, min_y],
        ]])
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
        }
    }

    /// Coordinates of a Point geometry
    pub fn as_point(&self) -> Option<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            _ => None,
        }
    }

    /// Apply `f` to every coordinate, preserving structure
    pub fn try_map_coords<F>(&self, mut f: F) -> Result<Geometry>
    where
        F: FnMut([f64; 2]) -> Result<[f64; 2]>,
    {
        fn ring<F>(coords: &[[f64; 2]], f: &mut F) -> Result<Vec<[f64; 2]>>
        where
            F: FnMut([f64; 2]) -> Result<[f64; 2]>,
        {
            coords.iter().map(|c| f(*c)).collect()
        }

        let mapped = match self {
            Geometry::Point { coordinates } => Geometry::Point { coordinates: f(*coordinates)? },
            Geometry::LineString { coordinates } => {
                Geometry::LineString { coordinates: ring(coordinates, &mut f)? }
            }
            Geometry::MultiPoint { coordinates } => {
                Geometry::MultiPoint { coordinates: ring(coordinates, &mut f)? }
            }
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates
                    .iter()
                    .map(|r| ring(r, &mut f))
                    .collect::<Result<_>>()?,
            },
            Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
                coordinates: coordinates
                    .iter()
                    .map(|r| ring(r, &mut f))
                    .collect::<Result<_>>()?,
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|poly| poly.iter().map(|r| ring(r, &mut f)).collect::<Result<_>>())
                    .collect::<Result<_>>()?,
            },
        };

        Ok(mapped)
    }

    /// Iterate over every coordinate in the geometry
    pub fn coords(&self) -> Box<dyn Iterator<Item = [f64; 2]> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(*coordinates)),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                Box::new(coordinates.iter().copied())
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                Box::new(coordinates.iter().flatten().copied())
            }
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().flatten().flatten().copied())
            }
        }
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
