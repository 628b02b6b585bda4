//! Buffering, centroids, and distance joins.
//!
//! All three work in a metric CRS so that distances are in meters wherever
//! the data sits, and hand results back in the caller's CRS.

use crate::models::{from_geo_geometry, from_multi_polygon, to_geo_geometry, GeometryExt};
use crate::transform::{reproject_collection, CrsTransform};
use crate::validation::validate_geometry;
use geo::algorithm::centroid::Centroid;
use geo::algorithm::contains::Contains;
use geo::{BooleanOps, Buffer, Geometry as GeoGeometry, LineString, MultiPolygon, Polygon};
use proprisk_core::error::{PropriskError, Result};
use proprisk_core::models::{Crs, Feature, Geometry, GeometryCollection};
use rstar::{RTree, RTreeObject, AABB};
use serde_json::Value;
use std::f64::consts::PI;

/// Segments used to approximate a buffered point when none is configured
pub const DEFAULT_BUFFER_SEGMENTS: usize = 32;

fn check_distance(distance_m: f64) -> Result<()> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(PropriskError::validation(
            "distance_m",
            format!("{} must be a non-negative finite number of meters", distance_m),
        ));
    }
    Ok(())
}

/// Circle around a point approximated by `segments` edges
fn circle(center: [f64; 2], radius: f64, segments: usize) -> Polygon {
    let n = segments.max(4);
    let mut coords: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (center[0] + radius * angle.cos(), center[1] + radius * angle.sin())
        })
        .collect();
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

fn union_all(polygons: impl IntoIterator<Item = Polygon>) -> MultiPolygon {
    polygons.into_iter().fold(MultiPolygon::new(vec![]), |acc, polygon| {
        acc.union(&MultiPolygon::new(vec![polygon]))
    })
}

/// Grow one geometry (already in a metric CRS) by `distance_m`.
///
/// Points have no area to keep, so a zero distance turns them into an empty
/// multipolygon.
fn buffer_geometry(geometry: &Geometry, distance_m: f64, segments: usize) -> Geometry {
    match geometry {
        Geometry::Point { .. } | Geometry::MultiPoint { .. } if distance_m == 0.0 => {
            Geometry::MultiPolygon { coordinates: vec![] }
        }
        Geometry::Point { coordinates } => {
            from_geo_geometry(&GeoGeometry::Polygon(circle(*coordinates, distance_m, segments)))
        }
        Geometry::MultiPoint { coordinates } => from_multi_polygon(&union_all(
            coordinates.iter().map(|c| circle(*c, distance_m, segments)),
        )),
        other => from_multi_polygon(&to_geo_geometry(other).buffer(distance_m)),
    }
}

/// Buffer every geometry in `collection` by `distance_m` meters.
///
/// The collection is reprojected to `metric_crs`, buffered there and
/// reprojected back, so the result carries the input's CRS and attributes.
pub fn buffer(
    collection: &GeometryCollection,
    distance_m: f64,
    metric_crs: &Crs,
) -> Result<GeometryCollection> {
    buffer_with_segments(collection, distance_m, metric_crs, DEFAULT_BUFFER_SEGMENTS)
}

/// `buffer` with an explicit number of segments per point circle
pub fn buffer_with_segments(
    collection: &GeometryCollection,
    distance_m: f64,
    metric_crs: &Crs,
    segments: usize,
) -> Result<GeometryCollection> {
    check_distance(distance_m)?;
    let original_crs = collection.require_crs("buffer")?;

    let metric = reproject_collection(collection, metric_crs)?;
    let mut buffered = GeometryCollection::new(metric_crs.clone());
    for feature in metric.iter() {
        validate_geometry(&feature.geometry).into_result("geometry")?;
        buffered.push(Feature::with_attributes(
            buffer_geometry(&feature.geometry, distance_m, segments),
            feature.attributes.clone(),
        ));
    }

    reproject_collection(&buffered, original_crs)
}

/// Centroid of the union of every geometry in `collection`.
///
/// Computed in `metric_crs` and returned as a Point in the collection's CRS.
pub fn centroid(collection: &GeometryCollection, metric_crs: &Crs) -> Result<Geometry> {
    if collection.is_empty() {
        return Err(PropriskError::validation("collection", "centroid of an empty collection"));
    }
    let original_crs = collection.require_crs("centroid")?;
    let metric = reproject_collection(collection, metric_crs)?;

    let geo_geometries: Vec<GeoGeometry> = metric.geometries().map(to_geo_geometry).collect();
    let polygons: Vec<Polygon> = geo_geometries
        .iter()
        .flat_map(|g| match g {
            GeoGeometry::Polygon(p) => vec![p.clone()],
            GeoGeometry::MultiPolygon(mp) => mp.0.clone(),
            _ => vec![],
        })
        .collect();

    // Areal members dominate the union's centroid, as they would in the union itself
    let center = if polygons.is_empty() {
        geo::GeometryCollection(geo_geometries).centroid()
    } else {
        union_all(polygons).centroid()
    };
    let center = center.ok_or_else(|| {
        PropriskError::validation("collection", "geometries have no centroid")
    })?;

    let transform = CrsTransform::new(metric_crs, original_crs)?;
    let [x, y] = transform.convert([center.x(), center.y()])?;
    Ok(Geometry::point(x, y))
}

/// A buffered right-hand feature in the join's R-tree
struct BufferedFeature {
    index: usize,
    geometry: GeoGeometry,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BufferedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(geometry: &Geometry) -> Option<AABB<[f64; 2]>> {
    geometry.bbox().map(|[min_x, min_y, max_x, max_y]| {
        AABB::from_corners([min_x, min_y], [max_x, max_y])
    })
}

/// Rows of `left` lying within `distance_m` meters of a `right` feature.
///
/// `right` is buffered by `distance_m` in `metric_crs` and every left feature
/// contained by a buffer is emitted, once per containing right feature,
/// ordered by left then right position. Output rows keep the left geometry
/// (in the left CRS) and left attributes, add the right attributes (keys
/// already present on the left get a `_right` suffix) and `index_right`.
pub fn spatial_join_within_distance(
    left: &GeometryCollection,
    right: &GeometryCollection,
    distance_m: f64,
    metric_crs: &Crs,
) -> Result<GeometryCollection> {
    check_distance(distance_m)?;
    let left_crs = left.require_crs("spatial join")?;
    let left_metric = reproject_collection(left, metric_crs)?;
    let right_metric = reproject_collection(right, metric_crs)?;

    let buffered: Vec<BufferedFeature> = right_metric
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let grown = buffer_geometry(&feature.geometry, distance_m, DEFAULT_BUFFER_SEGMENTS);
            envelope_of(&grown).map(|envelope| BufferedFeature {
                index,
                geometry: to_geo_geometry(&grown),
                envelope,
            })
        })
        .collect();
    let tree = RTree::bulk_load(buffered);

    let mut joined = GeometryCollection::new(left_crs.clone());
    for (left_index, feature) in left_metric.iter().enumerate() {
        let Some(envelope) = envelope_of(&feature.geometry) else {
            continue;
        };
        let candidate = to_geo_geometry(&feature.geometry);

        let mut matches: Vec<usize> = tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|b| b.geometry.contains(&candidate))
            .map(|b| b.index)
            .collect();
        matches.sort_unstable();

        for right_index in matches {
            let mut attributes = left.features[left_index].attributes.clone();
            for (key, value) in &right.features[right_index].attributes {
                let name = if attributes.contains_key(key) {
                    format!("{}_right", key)
                } else {
                    key.clone()
                };
                attributes.insert(name, value.clone());
            }
            attributes.insert("index_right".to_string(), Value::from(right_index));

            joined.push(Feature::with_attributes(
                left.features[left_index].geometry.clone(),
                attributes,
            ));
        }
    }

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        matches = joined.len(),
        distance_m,
        "Spatial join within distance"
    );

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_circle_area() {
        let polygon = circle([0.0, 0.0], 10.0, 64);
        let expected = PI * 100.0;
        let error = (polygon.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.01, "Circle area error {:.2}%", error * 100.0);
        assert_eq!(polygon.exterior().0.len(), 65);
    }

    #[test]
    fn test_buffer_point_in_metric_crs() {
        let buffered = buffer_geometry(&Geometry::point(1000.0, 1000.0), 50.0, 16);
        assert!(matches!(buffered, Geometry::Polygon { .. }));
        let [min_x, min_y, max_x, max_y] = buffered.bbox().unwrap();
        assert!((min_x - 950.0).abs() < 1e-6 && (max_x - 1050.0).abs() < 1e-6);
        assert!((min_y - 950.0).abs() < 1.0 && (max_y - 1050.0).abs() < 1.0);
    }

    #[test]
    fn test_zero_distance_point_buffer_is_empty() {
        let empty = Geometry::MultiPolygon { coordinates: vec![] };
        assert_eq!(buffer_geometry(&Geometry::point(5.0, 5.0), 0.0, 32), empty);

        let points = Geometry::MultiPoint { coordinates: vec![[0.0, 0.0], [1.0, 1.0]] };
        assert_eq!(buffer_geometry(&points, 0.0, 32), empty);
        assert!(buffer_geometry(&Geometry::point(5.0, 5.0), 0.0, 32).bbox().is_none());
    }

    #[test]
    fn test_buffer_overlapping_multipoint_merges() {
        let points = Geometry::MultiPoint { coordinates: vec![[0.0, 0.0], [10.0, 0.0]] };
        assert!(matches!(buffer_geometry(&points, 20.0, 32), Geometry::Polygon { .. }));

        let apart = Geometry::MultiPoint { coordinates: vec![[0.0, 0.0], [100.0, 0.0]] };
        assert!(matches!(buffer_geometry(&apart, 20.0, 32), Geometry::MultiPolygon { .. }));
    }

    #[test]
    fn test_buffer_polygon_grows() {
        let square = Geometry::rectangle(0.0, 0.0, 100.0, 100.0);
        let grown = buffer_geometry(&square, 10.0, 32);
        let [min_x, min_y, max_x, max_y] = grown.bbox().unwrap();
        assert!((min_x + 10.0).abs() < 0.5 && (max_x - 110.0).abs() < 0.5);
        assert!((min_y + 10.0).abs() < 0.5 && (max_y - 110.0).abs() < 0.5);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let collection = GeometryCollection::new(Crs::web_mercator());
        assert!(buffer(&collection, -1.0, &Crs::web_mercator()).is_err());
        assert!(buffer(&collection, f64::NAN, &Crs::web_mercator()).is_err());
    }

    #[test]
    fn test_centroid_in_same_crs() {
        let crs = Crs::australian_albers();
        let collection = GeometryCollection::from_features(
            crs.clone(),
            vec![
                Feature::new(Geometry::rectangle(0.0, 0.0, 10.0, 10.0)),
                Feature::new(Geometry::rectangle(10.0, 0.0, 20.0, 10.0)),
                // Points do not shift the centroid of an areal union
                Feature::new(Geometry::point(1000.0, 1000.0)),
            ],
        );
        let center = centroid(&collection, &crs).unwrap().as_point().unwrap();
        assert!((center[0] - 10.0).abs() < 1e-6);
        assert!((center[1] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_of_points() {
        let crs = Crs::web_mercator();
        let collection = GeometryCollection::from_features(
            crs.clone(),
            vec![
                Feature::new(Geometry::point(0.0, 0.0)),
                Feature::new(Geometry::point(4.0, 0.0)),
                Feature::new(Geometry::point(2.0, 6.0)),
            ],
        );
        let center = centroid(&collection, &crs).unwrap().as_point().unwrap();
        assert!((center[0] - 2.0).abs() < 1e-9);
        assert!((center[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_computed_in_metric_crs_returns_to_input_crs() {
        let collection = GeometryCollection::from_features(
            Crs::wgs84(),
            vec![
                Feature::new(Geometry::rectangle(151.0, -34.0, 151.1, -33.9)),
                Feature::new(Geometry::rectangle(151.1, -34.0, 151.2, -33.9)),
            ],
        );
        let center = centroid(&collection, &Crs::australian_albers()).unwrap();
        let [lon, lat] = center.as_point().unwrap();

        // Degrees, not Albers meters
        assert!((lon - 151.1).abs() < 0.01, "lon {}", lon);
        assert!((lat + 33.95).abs() < 0.01, "lat {}", lat);
    }

    #[test]
    fn test_centroid_of_empty_collection_fails() {
        let collection = GeometryCollection::new(Crs::wgs84());
        assert!(centroid(&collection, &Crs::web_mercator()).is_err());
    }
}
