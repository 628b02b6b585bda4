//! Configured entry point over the free functions.
//!
//! `GisToolkit` holds a resolved [`GisConfig`] so callers do not thread CRS
//! codes and margins through every call.

use crate::bounds::{bounds_with_margin, clip_to_bounds};
use crate::distance::clamp_collection_latitudes;
use crate::spatial::{buffer_with_segments, centroid, spatial_join_within_distance};
use crate::transform::{create_point, ensure_crs, reproject_collection};
use proprisk_core::config::GisConfig;
use proprisk_core::error::Result;
use proprisk_core::models::{Attributes, Bounds, Crs, Geometry, GeometryCollection};

#[derive(Debug, Clone, Default)]
pub struct GisToolkit {
    config: GisConfig,
}

impl GisToolkit {
    pub fn new(config: GisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GisConfig {
        &self.config
    }

    /// Point from a lon/lat pair in the geographic CRS, optionally reprojected
    pub fn create_point(
        &self,
        longitude: f64,
        latitude: f64,
        attributes: Attributes,
        target_crs: Option<&Crs>,
    ) -> Result<GeometryCollection> {
        create_point(longitude, latitude, attributes, &self.config.geographic_crs, target_crs)
    }

    pub fn ensure_geographic(&self, collection: GeometryCollection) -> Result<GeometryCollection> {
        ensure_crs(collection, &self.config.geographic_crs)
    }

    pub fn buffer(
        &self,
        collection: &GeometryCollection,
        distance_m: f64,
    ) -> Result<GeometryCollection> {
        buffer_with_segments(
            collection,
            distance_m,
            &self.config.metric_crs,
            self.config.buffer_segments,
        )
    }

    pub fn centroid(&self, collection: &GeometryCollection) -> Result<Geometry> {
        centroid(collection, &self.config.metric_crs)
    }

    pub fn spatial_join_within_distance(
        &self,
        left: &GeometryCollection,
        right: &GeometryCollection,
        distance_m: f64,
    ) -> Result<GeometryCollection> {
        spatial_join_within_distance(left, right, distance_m, &self.config.metric_crs)
    }

    /// Padded extent in the metric CRS using the configured margins
    pub fn bounds_with_margin(&self, collections: &[&GeometryCollection]) -> Result<Bounds> {
        bounds_with_margin(
            collections,
            self.config.margin_percent,
            self.config.min_margin_m,
            &self.config.metric_crs,
        )
    }

    pub fn clip_to_bounds(
        &self,
        collection: &GeometryCollection,
        bounds: &Bounds,
        bounds_crs: Option<&Crs>,
    ) -> Result<GeometryCollection> {
        clip_to_bounds(collection, bounds, bounds_crs)
    }

    /// Basemap-ready copy: latitudes clamped, then reprojected to the display CRS
    pub fn to_display(&self, collection: &GeometryCollection) -> Result<GeometryCollection> {
        let clamped = clamp_collection_latitudes(collection, self.config.max_latitude)?;
        reproject_collection(&clamped, &self.config.display_crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proprisk_core::models::Feature;

    #[test]
    fn test_point_uses_configured_geographic_crs() {
        let toolkit =
            GisToolkit::new(GisConfig { geographic_crs: Crs::gda2020(), ..GisConfig::default() });
        let point = toolkit.create_point(151.0, -33.0, Attributes::new(), None).unwrap();
        assert_eq!(point.crs, Some(Crs::gda2020()));
    }

    #[test]
    fn test_bounds_use_configured_margins() {
        let config = GisConfig {
            metric_crs: Crs::australian_albers(),
            margin_percent: 50.0,
            min_margin_m: 7.0,
            ..GisConfig::default()
        };
        let toolkit = GisToolkit::new(config);
        let collection = GeometryCollection::from_features(
            Crs::australian_albers(),
            vec![Feature::new(Geometry::line_string(vec![
                [0.0, 0.0],
                [100.0, 0.0],
            ]))],
        );

        let bounds = toolkit.bounds_with_margin(&[&collection]).unwrap();
        assert_eq!(bounds.as_tuple(), (-50.0, -7.0, 150.0, 7.0));
    }

    #[test]
    fn test_to_display_clamps_before_projecting() {
        let toolkit = GisToolkit::default();
        let polar = toolkit.create_point(0.0, 89.9, Attributes::new(), None).unwrap();
        let edge = toolkit.create_point(0.0, 85.0511, Attributes::new(), None).unwrap();

        let polar = toolkit.to_display(&polar).unwrap();
        let edge = toolkit.to_display(&edge).unwrap();

        assert_eq!(polar.crs, Some(Crs::web_mercator()));
        let [_, polar_y] = polar.features[0].geometry.as_point().unwrap();
        let [_, edge_y] = edge.features[0].geometry.as_point().unwrap();
        assert!((polar_y - edge_y).abs() < 1e-6);
    }

    fn sydney_sites() -> GeometryCollection {
        let site = |name: &str, lon: f64, lat: f64| {
            let mut attributes = Attributes::new();
            attributes.insert("site".to_string(), name.into());
            Feature::with_attributes(Geometry::point(lon, lat), attributes)
        };
        GeometryCollection::from_features(
            Crs::wgs84(),
            vec![site("cbd", 151.2093, -33.8688), site("parramatta", 151.0036, -33.8150)],
        )
    }

    #[test]
    fn test_ensure_geographic_tags_and_reprojects() {
        let toolkit = GisToolkit::default();
        let untagged = GeometryCollection::untagged(vec![Feature::new(Geometry::point(1.0, 2.0))]);
        let tagged = toolkit.ensure_geographic(untagged).unwrap();
        assert_eq!(tagged.crs, Some(Crs::wgs84()));
        assert_eq!(tagged.features[0].geometry.as_point(), Some([1.0, 2.0]));

        let mercator = toolkit
            .create_point(10.0, 20.0, Attributes::new(), Some(&Crs::web_mercator()))
            .unwrap();
        let back = toolkit.ensure_geographic(mercator).unwrap();
        let [x, y] = back.features[0].geometry.as_point().unwrap();
        assert!((x - 10.0).abs() < 1e-6 && (y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_buffer_uses_configured_segments() {
        let toolkit = GisToolkit::new(GisConfig { buffer_segments: 8, ..GisConfig::default() });
        let buffered = toolkit.buffer(&sydney_sites(), 1000.0).unwrap();

        assert_eq!(buffered.crs, Some(Crs::wgs84()));
        assert_eq!(buffered.features[0].attribute("site"), Some(&"cbd".into()));
        match &buffered.features[0].geometry {
            Geometry::Polygon { coordinates } => assert_eq!(coordinates[0].len(), 9),
            other => panic!("expected a polygon, got {:?}", other.geometry_type()),
        }
    }

    #[test]
    fn test_centroid_and_join_use_metric_crs() {
        let toolkit = GisToolkit::default();
        let sites = sydney_sites();

        let [x, y] = toolkit.centroid(&sites).unwrap().as_point().unwrap();
        assert!((x - 151.106).abs() < 0.01 && (y + 33.842).abs() < 0.01);

        let hazard = GeometryCollection::from_features(
            Crs::wgs84(),
            vec![Feature::new(Geometry::point(151.2100, -33.8700))],
        );
        let near = toolkit.spatial_join_within_distance(&sites, &hazard, 500.0).unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near.features[0].attribute("site"), Some(&"cbd".into()));

        let none = toolkit.spatial_join_within_distance(&sites, &hazard, 50.0).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_clip_to_geographic_bounds() {
        let toolkit = GisToolkit::default();
        let bounds = Bounds::new(151.1, -33.95, 151.3, -33.80);

        let clipped =
            toolkit.clip_to_bounds(&sydney_sites(), &bounds, Some(&Crs::wgs84())).unwrap();
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped.features[0].attribute("site"), Some(&"cbd".into()));
    }
}
