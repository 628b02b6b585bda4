//! Conversions between canonical geometries and the `geo` crate.

use geo::Geometry as GeoGeometry;
use proprisk_core::models::Geometry;

fn to_line_string(coords: &[[f64; 2]]) -> geo::LineString {
    geo::LineString::new(coords.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

fn from_line_string(ls: &geo::LineString) -> Vec<[f64; 2]> {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn from_polygon(p: &geo::Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(p.exterior()).chain(p.interiors()).map(from_line_string).collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => {
            GeoGeometry::LineString(to_line_string(coordinates))
        }
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| to_line_string(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| to_polygon(p)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry
pub fn from_geo_geometry(geom: &GeoGeometry) -> Geometry {
    match geom {
        GeoGeometry::Point(p) => Geometry::Point { coordinates: [p.x(), p.y()] },
        GeoGeometry::Line(l) => Geometry::LineString {
            coordinates: vec![[l.start.x, l.start.y], [l.end.x, l.end.y]],
        },
        GeoGeometry::LineString(ls) => Geometry::LineString { coordinates: from_line_string(ls) },
        GeoGeometry::Polygon(p) => Geometry::Polygon { coordinates: from_polygon(p) },
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(from_line_string).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => from_multi_polygon(mp),
        GeoGeometry::GeometryCollection(gc) => {
            // Take the first geometry or return an empty point
            gc.iter()
                .next()
                .map(from_geo_geometry)
                .unwrap_or_else(|| Geometry::Point { coordinates: [0.0, 0.0] })
        }
        GeoGeometry::Rect(r) => Geometry::Polygon { coordinates: from_polygon(&r.to_polygon()) },
        GeoGeometry::Triangle(t) => {
            Geometry::Polygon { coordinates: from_polygon(&t.to_polygon()) }
        }
    }
}

/// A multipolygon with one member collapses to a plain polygon
pub fn from_multi_polygon(mp: &geo::MultiPolygon) -> Geometry {
    match mp.0.as_slice() {
        [single] => Geometry::Polygon { coordinates: from_polygon(single) },
        polygons => {
            Geometry::MultiPolygon { coordinates: polygons.iter().map(from_polygon).collect() }
        }
    }
}

/// A multilinestring with one member collapses to a plain linestring
pub fn from_multi_line_string(mls: &geo::MultiLineString) -> Geometry {
    match mls.0.as_slice() {
        [single] => Geometry::LineString { coordinates: from_line_string(single) },
        lines => Geometry::MultiLineString {
            coordinates: lines.iter().map(from_line_string).collect(),
        },
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<[f64; 2]>;

    /// `[min_x, min_y, max_x, max_y]`, `None` for empty geometries
    fn bbox(&self) -> Option<[f64; 4]>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<[f64; 2]> {
        use geo::algorithm::centroid::Centroid;
        self.to_geo().centroid().map(|p| [p.x(), p.y()])
    }

    fn bbox(&self) -> Option<[f64; 4]> {
        use geo::algorithm::bounding_rect::BoundingRect;
        self.to_geo().bounding_rect().map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_roundtrip() {
        let geom = Geometry::point(151.2093, -33.8688);
        let back = from_geo_geometry(&to_geo_geometry(&geom));
        assert_eq!(geom, back);
    }

    #[test]
    fn test_polygon_with_hole_roundtrip() {
        let geom = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ]);
        let back = from_geo_geometry(&to_geo_geometry(&geom));
        assert_eq!(geom, back);
    }

    #[test]
    fn test_single_member_multipolygon_collapses() {
        let square = Geometry::rectangle(0.0, 0.0, 1.0, 1.0);
        let multi = match to_geo_geometry(&square) {
            GeoGeometry::Polygon(p) => geo::MultiPolygon::new(vec![p]),
            other => panic!("expected polygon, got {:?}", other),
        };
        assert_eq!(from_multi_polygon(&multi), square);
    }

    #[test]
    fn test_centroid_and_bbox() {
        let geom = Geometry::rectangle(0.0, 0.0, 2.0, 4.0);
        let centroid = geom.centroid_coords().unwrap();
        assert!((centroid[0] - 1.0).abs() < 1e-10);
        assert!((centroid[1] - 2.0).abs() < 1e-10);
        assert_eq!(geom.bbox(), Some([0.0, 0.0, 2.0, 4.0]));
    }
}
