//! Centroid command implementation

use super::geojson::load_layer;
use crate::cli::CentroidArgs;
use crate::output::OutputWriter;
use crate::output_types::CentroidOutput;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_geo::GisToolkit;

pub fn execute(args: CentroidArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);
    let layer = load_layer(&args.input, &toolkit)?;

    let center = toolkit.centroid(&layer).context("Failed to compute centroid")?;
    let [x, y] = center.as_point().context("Centroid is not a point")?;
    let result = CentroidOutput {
        crs: layer.crs.as_ref().map(|c| c.authority()).unwrap_or_default(),
        x,
        y,
        feature_count: layer.len(),
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.section("Centroid");
        output.kv("CRS", &result.crs);
        output.kv("X", format!("{:.6}", result.x));
        output.kv("Y", format!("{:.6}", result.y));
        output.kv("Features", result.feature_count);
    }
    Ok(())
}
