//! Join command implementation

use super::geojson::{load_layer, print_layer};
use crate::cli::JoinArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_geo::GisToolkit;

pub fn execute(args: JoinArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let toolkit = GisToolkit::new(config.gis_config()?);
    let left = load_layer(&args.left, &toolkit)?;
    let right = load_layer(&args.right, &toolkit)?;

    let joined = toolkit
        .spatial_join_within_distance(&left, &right, args.within.to_meters())
        .context("Failed to join layers")?;

    if !output.is_json() {
        if joined.is_empty() {
            output.warning(format!("No features within {}", args.within));
        } else {
            output.info(format!("{} matches within {}", joined.len(), args.within));
        }
    }
    print_layer(output, "Joined", &joined)
}
