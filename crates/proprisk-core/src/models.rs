pub mod collection;
pub mod geometry;
pub mod series;

pub use collection::{Attributes, Bounds, Feature, GeometryCollection};
pub use geometry::{Crs, CrsKind, Distance, DistanceUnit, Geometry, GeometryType};
pub use series::{
    IndexMatch, IndexPoint, IndexSeries, IndexationResult, IndexationStatus, MatchMethod,
};
