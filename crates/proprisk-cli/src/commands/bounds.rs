//! Bounds command implementation

use crate::cli::BoundsArgs;
use crate::output::OutputWriter;
use crate::output_types::BoundsOutput;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_core::models::{Feature, Geometry, GeometryCollection};
use proprisk_geo::{validate_lon_lat, GisToolkit};

pub fn execute(args: BoundsArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);

    let features = args
        .points
        .iter()
        .map(|&(lon, lat)| {
            validate_lon_lat(lon, lat)?;
            Ok(Feature::new(Geometry::point(lon, lat)))
        })
        .collect::<proprisk_core::Result<Vec<_>>>()?;
    let points =
        GeometryCollection::from_features(toolkit.config().geographic_crs.clone(), features);

    let bounds = toolkit
        .bounds_with_margin(&[&points])
        .context("Failed to compute bounds")?;
    let result = BoundsOutput::new(&bounds, points.len());

    if output.is_json() {
        output.result(result)?;
    } else {
        output.section("Bounds");
        output.kv("CRS", &result.crs);
        output.kv("Min", format!("{:.2}, {:.2}", result.min_x, result.min_y));
        output.kv("Max", format!("{:.2}, {:.2}", result.max_x, result.max_y));
        output.kv("Size", format!("{:.0} m x {:.0} m", result.width_m, result.height_m));
        output.kv("Margin", format!("{}%", toolkit.config().margin_percent));
    }
    Ok(())
}
