//! Point command implementation

use crate::cli::PointArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_core::models::Attributes;
use proprisk_geo::GisToolkit;

pub fn execute(args: PointArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);

    let point = toolkit
        .create_point(args.lon, args.lat, Attributes::new(), args.to.as_ref())
        .context("Failed to create point")?;
    let point = if args.display { toolkit.to_display(&point)? } else { point };

    let geojson = point.to_geojson()?;
    if output.is_json() {
        output.result(geojson)?;
    } else {
        if let Some(crs) = &point.crs {
            output.kv("CRS", crs);
        }
        if let Some([x, y]) = point.features.first().and_then(|f| f.geometry.as_point()) {
            output.kv("X", format!("{:.6}", x));
            output.kv("Y", format!("{:.6}", y));
        }
        output.section("GeoJSON");
        println!("{}", serde_json::to_string_pretty(&geojson)?);
    }
    Ok(())
}
