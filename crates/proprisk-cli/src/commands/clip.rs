//! Clip command implementation

use super::geojson::{load_layer, print_layer};
use crate::cli::ClipArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_core::models::Bounds;
use proprisk_geo::GisToolkit;

pub fn execute(args: ClipArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);
    let layer = load_layer(&args.input, &toolkit)?;

    let (min_x, min_y, max_x, max_y) = args.bbox;
    let bbox_crs = args.bbox_crs.unwrap_or_else(|| toolkit.config().geographic_crs.clone());
    let bounds = Bounds::new(min_x, min_y, max_x, max_y).with_crs(bbox_crs);

    let clipped = toolkit
        .clip_to_bounds(&layer, &bounds, None)
        .context("Failed to clip features")?;

    if !output.is_json() {
        output.info(format!("Kept {} of {} features", clipped.len(), layer.len()));
    }
    print_layer(output, "Clipped", &clipped)
}
