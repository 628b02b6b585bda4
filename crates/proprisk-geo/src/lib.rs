//! Proprisk Geo - CRS handling, distances, and geometric aggregation
//!
//! Every operation here is a pure function over in-memory collections. Work
//! that needs meaningful lengths (buffering, bounds margins, joins by
//! distance) happens in a projected metric CRS and results are converted back
//! to the caller's CRS.

pub mod bounds;
pub mod distance;
pub mod models;
pub mod spatial;
pub mod toolkit;
pub mod transform;
pub mod validation;

pub use bounds::{bounds_with_margin, clip_to_bounds, collection_bounds};
pub use distance::{
    clamp_collection_latitudes, clamp_latitude, clamp_latitude_default, distance_meters,
    DistanceMethod,
};
pub use models::{from_geo_geometry, to_geo_geometry, GeometryExt};
pub use spatial::{buffer, buffer_with_segments, centroid, spatial_join_within_distance};
pub use toolkit::GisToolkit;
pub use transform::{
    create_point, crs_match, ensure_crs, reproject_collection, reproject_geometry, CrsTransform,
};
pub use validation::{validate_geometry, validate_lon_lat, ValidationError, ValidationResult};
