//! Command implementations

mod bounds;
mod buffer;
mod centroid;
mod clip;
mod config;
mod distance;
mod geojson;
mod index;
mod join;
mod point;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;
use proprisk_core::config::CliConfigOverrides;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();
    let mut overrides = CliConfigOverrides {
        metric_crs: cli.metric_crs,
        display_crs: cli.display_crs,
        ..Default::default()
    };

    match cli.command {
        Commands::Distance(args) => distance::execute(args, &output),
        Commands::Point(args) => {
            let config = load_config(config_file, overrides)?;
            point::execute(args, &config, &output)
        }
        Commands::Bounds(args) => {
            overrides.margin_percent = args.margin;
            let config = load_config(config_file, overrides)?;
            bounds::execute(args, &config, &output)
        }
        Commands::Index(args) => {
            overrides.max_gap_days = args.max_gap_days;
            let config = load_config(config_file, overrides)?;
            index::execute(args, &config, &output)
        }
        Commands::Buffer(args) => {
            let config = load_config(config_file, overrides)?;
            buffer::execute(args, &config, &output)
        }
        Commands::Centroid(args) => {
            let config = load_config(config_file, overrides)?;
            centroid::execute(args, &config, &output)
        }
        Commands::Join(args) => {
            let config = load_config(config_file, overrides)?;
            join::execute(args, &config, &output)
        }
        Commands::Clip(args) => {
            let config = load_config(config_file, overrides)?;
            clip::execute(args, &config, &output)
        }
        Commands::Config => {
            let config = load_config(config_file, overrides)?;
            config::execute(&config, &output)
        }
    }
}
