//! Buffer command implementation

use super::geojson::{load_layer, print_layer};
use crate::cli::BufferArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_geo::GisToolkit;

pub fn execute(args: BufferArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);
    let layer = load_layer(&args.input, &toolkit)?;

    let buffered = toolkit
        .buffer(&layer, args.radius.to_meters())
        .context("Failed to buffer features")?;

    if !output.is_json() {
        output.info(format!("Buffered {} features by {}", buffered.len(), args.radius));
    }
    print_layer(output, "Buffered", &buffered)
}
