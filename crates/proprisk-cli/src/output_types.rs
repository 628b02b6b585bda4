use proprisk_core::models::{Bounds, Feature, IndexationResult};
use proprisk_geo::DistanceMethod;
use proprisk_index::GrowthSummary;
use serde::Serialize;
use tabled::Tabled;

/// Output for distance command
#[derive(Debug, Serialize)]
pub struct DistanceOutput {
    pub method: DistanceMethod,
    pub meters: f64,
    pub kilometers: f64,
}

/// Output for bounds command
#[derive(Debug, Serialize)]
pub struct BoundsOutput {
    pub crs: String,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub point_count: usize,
}

impl BoundsOutput {
    pub fn new(bounds: &Bounds, point_count: usize) -> Self {
        Self {
            crs: bounds.crs.as_ref().map(|c| c.authority()).unwrap_or_default(),
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            max_x: bounds.max_x,
            max_y: bounds.max_y,
            width_m: bounds.width(),
            height_m: bounds.height(),
            point_count,
        }
    }
}

/// Output for index command
#[derive(Debug, Serialize)]
pub struct IndexOutput {
    #[serde(flatten)]
    pub result: IndexationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthSummary>,
    pub series_points: usize,
}

/// One row of the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// One feature of a GeoJSON-producing command
#[derive(Debug, Serialize, Tabled)]
pub struct FeatureRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Type")]
    pub geometry_type: String,
    #[tabled(rename = "Attributes")]
    pub attributes: String,
}

impl FeatureRow {
    pub fn new(index: usize, feature: &Feature) -> Self {
        Self {
            index,
            geometry_type: format!("{:?}", feature.geometry.geometry_type()),
            attributes: feature.attributes.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Output for centroid command
#[derive(Debug, Serialize)]
pub struct CentroidOutput {
    pub crs: String,
    pub x: f64,
    pub y: f64,
    pub feature_count: usize,
}
