//! CRS transformation and normalization

use crate::validation::validate_lon_lat;
use proj::Proj;
use proprisk_core::error::{PropriskError, Result};
use proprisk_core::models::{Attributes, Crs, Feature, Geometry, GeometryCollection};

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// A prepared transformation between two CRS.
///
/// Building the PROJ pipeline is the expensive part, so one transform is
/// created per collection rather than per coordinate.
pub struct CrsTransform {
    from: Crs,
    to: Crs,
    // None when both sides are the same CRS
    proj: Option<Proj>,
}

impl CrsTransform {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        let proj = if crs_match(from, to) {
            None
        } else {
            let proj = Proj::new_known_crs(&from.authority(), &to.authority(), None).map_err(
                |e| PropriskError::Projection {
                    from: from.authority(),
                    to: to.authority(),
                    reason: format!("Failed to create projection: {}", e),
                },
            )?;
            Some(proj)
        };

        Ok(Self { from: from.clone(), to: to.clone(), proj })
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    pub fn convert(&self, coord: [f64; 2]) -> Result<[f64; 2]> {
        let Some(proj) = &self.proj else {
            return Ok(coord);
        };

        let (x, y) = proj.convert((coord[0], coord[1])).map_err(|e| self.error(e.to_string()))?;
        if !x.is_finite() || !y.is_finite() {
            return Err(self.error(format!(
                "({}, {}) has no finite representation in the target CRS",
                coord[0], coord[1]
            )));
        }
        Ok([x, y])
    }

    pub fn geometry(&self, geometry: &Geometry) -> Result<Geometry> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|c| self.convert(c))
    }

    fn error(&self, reason: String) -> PropriskError {
        PropriskError::Projection { from: self.from.authority(), to: self.to.authority(), reason }
    }
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry, from_crs: &Crs, to_crs: &Crs) -> Result<Geometry> {
    CrsTransform::new(from_crs, to_crs)?.geometry(geometry)
}

/// Reproject every feature of a collection into `target_crs`.
///
/// Always returns a new collection. Fails when the collection has no CRS.
pub fn reproject_collection(
    collection: &GeometryCollection,
    target_crs: &Crs,
) -> Result<GeometryCollection> {
    let source_crs = collection.require_crs("reprojection")?;
    let transform = CrsTransform::new(source_crs, target_crs)?;

    let features = collection
        .iter()
        .map(|feature| {
            Ok(Feature::with_attributes(
                transform.geometry(&feature.geometry)?,
                feature.attributes.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        from = %source_crs,
        to = %target_crs,
        features = features.len(),
        "Reprojected collection"
    );

    Ok(GeometryCollection::from_features(target_crs.clone(), features))
}

/// Make sure a collection is expressed in `target_crs`.
///
/// - no CRS: `target_crs` is assigned without touching coordinates. The
///   coordinates are assumed to already be in `target_crs`; nothing checks
///   their magnitudes, so degrees labelled as meters (or the reverse) pass
///   through unnoticed.
/// - different CRS: the collection is reprojected.
/// - same CRS: the collection is handed back unchanged.
pub fn ensure_crs(
    mut collection: GeometryCollection,
    target_crs: &Crs,
) -> Result<GeometryCollection> {
    if collection.crs.is_none() {
        tracing::warn!(
            crs = %target_crs,
            features = collection.len(),
            "Collection has no CRS; assuming coordinates are already in the target CRS"
        );
        collection.crs = Some(target_crs.clone());
        return Ok(collection);
    }

    let already_matches = collection.crs.as_ref().is_some_and(|crs| crs_match(crs, target_crs));
    if already_matches {
        Ok(collection)
    } else {
        reproject_collection(&collection, target_crs)
    }
}

/// Build a one-point collection from a longitude/latitude pair.
///
/// The pair must be within geographic ranges. When `target_crs` is given and
/// differs from `source_crs` the point is reprojected before it is returned.
pub fn create_point(
    longitude: f64,
    latitude: f64,
    attributes: Attributes,
    source_crs: &Crs,
    target_crs: Option<&Crs>,
) -> Result<GeometryCollection> {
    validate_lon_lat(longitude, latitude)?;

    let feature = Feature::with_attributes(Geometry::point(longitude, latitude), attributes);
    let collection = GeometryCollection::from_features(source_crs.clone(), vec![feature]);

    match target_crs {
        Some(target) if !crs_match(source_crs, target) => reproject_collection(&collection, target),
        _ => Ok(collection),
    }
}
