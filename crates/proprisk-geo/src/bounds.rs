//! Map extents and clipping

use crate::models::{from_multi_line_string, from_multi_polygon, to_geo_geometry, GeometryExt};
use crate::transform::{reproject_collection, CrsTransform};
use geo::{BooleanOps, Geometry as GeoGeometry, Intersects, MultiLineString, MultiPolygon};
use proprisk_core::error::{PropriskError, Result};
use proprisk_core::models::{Bounds, Crs, Feature, Geometry, GeometryCollection};

// Points inserted along each rectangle edge before reprojection
const EDGE_DENSITY: usize = 16;

/// Bounding box of every geometry in a collection, in its own CRS.
///
/// `None` when the collection has no features.
pub fn collection_bounds(collection: &GeometryCollection) -> Option<Bounds> {
    let bounds = collection
        .geometries()
        .filter_map(|geometry| geometry.bbox())
        .map(|[min_x, min_y, max_x, max_y]| Bounds::new(min_x, min_y, max_x, max_y))
        .reduce(|acc, b| acc.union(&b))?;

    Some(match &collection.crs {
        Some(crs) => bounds.with_crs(crs.clone()),
        None => bounds,
    })
}

/// Combined extent of `collections` in `metric_crs`, padded on every side.
///
/// Each axis grows by `margin_percent` of its own extent. An axis with no
/// extent (a single point, or points on one line) grows by `min_margin_m`
/// instead so the box always has an area.
pub fn bounds_with_margin(
    collections: &[&GeometryCollection],
    margin_percent: f64,
    min_margin_m: f64,
    metric_crs: &Crs,
) -> Result<Bounds> {
    if !margin_percent.is_finite() || margin_percent < 0.0 {
        return Err(PropriskError::validation(
            "margin_percent",
            format!("{} must be a non-negative percentage", margin_percent),
        ));
    }
    if !min_margin_m.is_finite() || min_margin_m <= 0.0 {
        return Err(PropriskError::validation(
            "min_margin_m",
            format!("{} must be a positive number of meters", min_margin_m),
        ));
    }

    let mut combined: Option<Bounds> = None;
    for collection in collections.iter().filter(|c| !c.is_empty()) {
        let metric = reproject_collection(collection, metric_crs)?;
        if let Some(b) = collection_bounds(&metric) {
            combined = Some(match combined {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
    }

    let Some(b) = combined else {
        return Err(PropriskError::validation(
            "collections",
            "at least one non-empty collection is required",
        ));
    };

    let pad = |extent: f64| {
        if extent > 0.0 {
            extent * margin_percent / 100.0
        } else {
            min_margin_m
        }
    };
    let dx = pad(b.width());
    let dy = pad(b.height());

    Ok(Bounds::new(b.min_x - dx, b.min_y - dy, b.max_x + dx, b.max_y + dy)
        .with_crs(metric_crs.clone()))
}

/// Closed ring along the edges of `bounds`, with intermediate points so
/// the edges survive reprojection into a curved CRS.
fn densified_ring(bounds: &Bounds) -> Vec<[f64; 2]> {
    let corners = [
        [bounds.min_x, bounds.min_y],
        [bounds.max_x, bounds.min_y],
        [bounds.max_x, bounds.max_y],
        [bounds.min_x, bounds.max_y],
    ];

    let mut ring = Vec::with_capacity(corners.len() * EDGE_DENSITY + 1);
    for (i, start) in corners.iter().enumerate() {
        let end = corners[(i + 1) % corners.len()];
        for step in 0..EDGE_DENSITY {
            let t = step as f64 / EDGE_DENSITY as f64;
            ring.push([start[0] + (end[0] - start[0]) * t, start[1] + (end[1] - start[1]) * t]);
        }
    }
    ring.push(corners[0]);
    ring
}

/// Part of `geometry` inside `clip`, or `None` when nothing is left
fn clip_geometry(geometry: &Geometry, clip: &MultiPolygon) -> Option<Geometry> {
    match to_geo_geometry(geometry) {
        GeoGeometry::Point(p) => clip.intersects(&p).then(|| geometry.clone()),
        GeoGeometry::MultiPoint(mp) => {
            let kept: Vec<[f64; 2]> = mp
                .iter()
                .filter(|p| clip.intersects(*p))
                .map(|p| [p.x(), p.y()])
                .collect();
            match kept.as_slice() {
                [] => None,
                [single] => Some(Geometry::point(single[0], single[1])),
                _ => Some(Geometry::MultiPoint { coordinates: kept }),
            }
        }
        GeoGeometry::LineString(ls) => clip_lines(clip, &MultiLineString::new(vec![ls])),
        GeoGeometry::MultiLineString(mls) => clip_lines(clip, &mls),
        GeoGeometry::Polygon(p) => clip_polygons(clip, &MultiPolygon::new(vec![p])),
        GeoGeometry::MultiPolygon(mp) => clip_polygons(clip, &mp),
        // to_geo_geometry only produces the six simple kinds
        _ => None,
    }
}

fn clip_lines(clip: &MultiPolygon, lines: &MultiLineString) -> Option<Geometry> {
    let clipped = clip.clip(lines, false);
    (!clipped.0.is_empty()).then(|| from_multi_line_string(&clipped))
}

fn clip_polygons(clip: &MultiPolygon, polygons: &MultiPolygon) -> Option<Geometry> {
    let clipped = clip.intersection(polygons);
    (!clipped.0.is_empty()).then(|| from_multi_polygon(&clipped))
}

/// Cut a collection down to a rectangle.
///
/// The rectangle is read in `bounds_crs` if given, otherwise in the CRS
/// carried by `bounds`, otherwise in the collection's own CRS. It is
/// reprojected to the collection's CRS before intersecting. Features that
/// miss the rectangle are dropped; the rest keep their attributes.
pub fn clip_to_bounds(
    collection: &GeometryCollection,
    bounds: &Bounds,
    bounds_crs: Option<&Crs>,
) -> Result<GeometryCollection> {
    let collection_crs = collection.require_crs("clipping")?;
    let source_crs = bounds_crs.or(bounds.crs.as_ref()).unwrap_or(collection_crs);

    let ring = Geometry::polygon(vec![densified_ring(bounds)]);
    let ring = CrsTransform::new(source_crs, collection_crs)?.geometry(&ring)?;
    let clip = match to_geo_geometry(&ring) {
        GeoGeometry::Polygon(p) => MultiPolygon::new(vec![p]),
        _ => MultiPolygon::new(vec![]),
    };

    let features: Vec<Feature> = collection
        .iter()
        .filter_map(|feature| {
            clip_geometry(&feature.geometry, &clip)
                .map(|geometry| Feature::with_attributes(geometry, feature.attributes.clone()))
        })
        .collect();

    tracing::debug!(
        input = collection.len(),
        kept = features.len(),
        bounds_crs = %source_crs,
        "Clipped collection to bounds"
    );

    Ok(GeometryCollection::from_features(collection_crs.clone(), features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use proprisk_core::models::Attributes;
    use serde_json::json;

    fn named(name: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), json!(name));
        attributes
    }

    #[test]
    fn test_collection_bounds() {
        let collection = GeometryCollection::from_features(
            Crs::australian_albers(),
            vec![
                Feature::new(Geometry::point(10.0, 20.0)),
                Feature::new(Geometry::line_string(vec![[-5.0, 0.0], [3.0, 40.0]])),
            ],
        );
        let bounds = collection_bounds(&collection).unwrap();
        assert_eq!(bounds.as_tuple(), (-5.0, 0.0, 10.0, 40.0));
        assert_eq!(bounds.crs, Some(Crs::australian_albers()));

        assert!(collection_bounds(&GeometryCollection::new(Crs::wgs84())).is_none());
    }

    #[test]
    fn test_margin_is_a_share_of_each_axis() {
        let crs = Crs::australian_albers();
        let collection = GeometryCollection::from_features(
            crs.clone(),
            vec![Feature::new(Geometry::rectangle(0.0, 0.0, 1000.0, 200.0))],
        );
        let bounds = bounds_with_margin(&[&collection], 10.0, 100.0, &crs).unwrap();
        assert_eq!(bounds.as_tuple(), (-100.0, -20.0, 1100.0, 220.0));
        assert_eq!(bounds.crs, Some(crs));
    }

    #[test]
    fn test_single_point_gets_minimum_margin() {
        let crs = Crs::australian_albers();
        let point = GeometryCollection::from_features(
            crs.clone(),
            vec![Feature::new(Geometry::point(500.0, 500.0))],
        );
        let bounds = bounds_with_margin(&[&point], 10.0, 100.0, &crs).unwrap();
        assert!(bounds.min_x < bounds.max_x && bounds.min_y < bounds.max_y);
        assert_eq!(bounds.as_tuple(), (400.0, 400.0, 600.0, 600.0));
    }

    #[test]
    fn test_geographic_point_bounds_are_in_metric_crs() {
        let metric = Crs::australian_albers();
        let point = GeometryCollection::from_features(
            Crs::wgs84(),
            vec![Feature::new(Geometry::point(151.2093, -33.8688))],
        );
        let bounds = bounds_with_margin(&[&point], 10.0, 100.0, &metric).unwrap();

        assert_eq!(bounds.crs, Some(metric.clone()));
        assert!((bounds.width() - 200.0).abs() < 1e-6);
        assert!((bounds.height() - 200.0).abs() < 1e-6);

        let projected = reproject_collection(&point, &metric).unwrap();
        let [x, y] = projected.features[0].geometry.as_point().unwrap();
        assert!((bounds.min_x + 100.0 - x).abs() < 1e-6);
        assert!((bounds.min_y + 100.0 - y).abs() < 1e-6);
        // Albers meters, far outside any degree range
        assert!(x.abs() > 1000.0 || y.abs() > 1000.0);
    }

    #[test]
    fn test_empty_collections_are_skipped() {
        let crs = Crs::australian_albers();
        let empty = GeometryCollection::new(crs.clone());
        assert!(bounds_with_margin(&[&empty], 10.0, 100.0, &crs).is_err());
        assert!(bounds_with_margin(&[], 10.0, 100.0, &crs).is_err());

        let point = GeometryCollection::from_features(
            crs.clone(),
            vec![Feature::new(Geometry::point(0.0, 0.0))],
        );
        assert!(bounds_with_margin(&[&empty, &point], 10.0, 100.0, &crs).is_ok());
    }

    #[test]
    fn test_negative_margin_rejected() {
        let crs = Crs::australian_albers();
        let point = GeometryCollection::from_features(
            crs.clone(),
            vec![Feature::new(Geometry::point(0.0, 0.0))],
        );
        let err = bounds_with_margin(&[&point], -1.0, 100.0, &crs).unwrap_err();
        assert!(matches!(err, PropriskError::Validation { .. }));
    }

    #[test]
    fn test_densified_ring_is_closed() {
        let ring = densified_ring(&Bounds::new(0.0, 0.0, 4.0, 2.0));
        assert_eq!(ring.len(), 4 * EDGE_DENSITY + 1);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_clip_keeps_attributes_and_drops_outside() {
        let crs = Crs::australian_albers();
        let collection = GeometryCollection::from_features(
            crs.clone(),
            vec![
                Feature::with_attributes(Geometry::point(5.0, 5.0), named("inside")),
                Feature::with_attributes(Geometry::point(50.0, 50.0), named("outside")),
                Feature::with_attributes(
                    Geometry::rectangle(5.0, 5.0, 15.0, 15.0),
                    named("overlap"),
                ),
                Feature::with_attributes(
                    Geometry::line_string(vec![[-10.0, 5.0], [20.0, 5.0]]),
                    named("road"),
                ),
            ],
        );

        let clipped =
            clip_to_bounds(&collection, &Bounds::new(0.0, 0.0, 10.0, 10.0), None).unwrap();
        let names: Vec<_> =
            clipped.iter().map(|f| f.attribute("name").unwrap().as_str().unwrap()).collect();
        assert_eq!(names, vec!["inside", "overlap", "road"]);
        assert_eq!(clipped.crs, Some(crs));

        let overlap = to_geo_geometry(&clipped.features[1].geometry);
        assert!((overlap.unsigned_area() - 25.0).abs() < 1e-6);

        let [min_x, _, max_x, _] = clipped.features[2].geometry.bbox().unwrap();
        assert!((min_x - 0.0).abs() < 1e-9 && (max_x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_multipoint_filters_members() {
        let crs = Crs::australian_albers();
        let collection = GeometryCollection::from_features(
            crs,
            vec![Feature::new(Geometry::MultiPoint {
                coordinates: vec![[1.0, 1.0], [2.0, 2.0], [30.0, 30.0]],
            })],
        );
        let clipped =
            clip_to_bounds(&collection, &Bounds::new(0.0, 0.0, 10.0, 10.0), None).unwrap();
        assert_eq!(
            clipped.features[0].geometry,
            Geometry::MultiPoint { coordinates: vec![[1.0, 1.0], [2.0, 2.0]] }
        );
    }
}
