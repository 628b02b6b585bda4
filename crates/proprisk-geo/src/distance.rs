//! Point-to-point distances and latitude clamping

use geo::{Distance as _, Euclidean, Geodesic, Point};
use proprisk_core::config::WEB_MERCATOR_MAX_LATITUDE;
use proprisk_core::error::Result;
use proprisk_core::models::{Feature, GeometryCollection};
use serde::{Deserialize, Serialize};

/// How `distance_meters` interprets its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceMethod {
    /// Inputs are `(latitude, longitude)` in degrees; distance is measured on
    /// the WGS84 ellipsoid.
    #[default]
    Geodesic,
    /// Inputs are `(x, y)` in one projected CRS; distance is a straight line
    /// in that CRS's units.
    Euclidean,
}

/// Distance in meters between two points.
///
/// The two methods expect differently ordered and differently projected
/// inputs. Passing projected coordinates with `Geodesic`, or degrees with
/// `Euclidean`, gives a meaningless number; nothing here can detect that.
pub fn distance_meters(a: (f64, f64), b: (f64, f64), method: DistanceMethod) -> f64 {
    match method {
        DistanceMethod::Geodesic => {
            let p1 = Point::new(a.1, a.0);
            let p2 = Point::new(b.1, b.0);
            Geodesic.distance(p1, p2)
        }
        DistanceMethod::Euclidean => {
            Euclidean.distance(Point::new(a.0, a.1), Point::new(b.0, b.1))
        }
    }
}

/// Clamp a latitude to `±max_lat`.
///
/// Web Mercator cannot represent the poles, so latitudes headed for a
/// basemap are pulled back to the closest value it can draw. A NaN
/// `max_lat` leaves `lat` unchanged.
pub fn clamp_latitude(lat: f64, max_lat: f64) -> f64 {
    if max_lat.is_nan() {
        return lat;
    }
    let limit = max_lat.abs();
    lat.clamp(-limit, limit)
}

/// `clamp_latitude` with the Web Mercator limit
pub fn clamp_latitude_default(lat: f64) -> f64 {
    clamp_latitude(lat, WEB_MERCATOR_MAX_LATITUDE)
}

/// Clamp every latitude of a geographic collection.
///
/// Projected collections are returned as a copy without changes since their
/// y values are not latitudes.
pub fn clamp_collection_latitudes(
    collection: &GeometryCollection,
    max_lat: f64,
) -> Result<GeometryCollection> {
    let crs = collection.require_crs("latitude clamping")?;
    if !crs.is_geographic() {
        return Ok(collection.clone());
    }

    let features = collection
        .iter()
        .map(|feature| {
            let geometry = feature
                .geometry
                .try_map_coords(|[lon, lat]| Ok([lon, clamp_latitude(lat, max_lat)]))?;
            Ok(Feature::with_attributes(geometry, feature.attributes.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GeometryCollection::from_features(crs.clone(), features))
}
