//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use proprisk_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no --config is given
const DEFAULT_CONFIG_FILE: &str = "proprisk.toml";

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.is_file().then_some(local)
        }
    }
}

/// Defaults, then the config file, then `PROPRISK_*` variables, then CLI flags
pub fn load_config(
    explicit: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = config_path(explicit) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    tracing::debug!(
        metric_crs = config.metric_crs.value,
        margin_percent = config.margin_percent.value,
        max_gap_days = config.max_gap_days.value,
        "Resolved configuration"
    );
    Ok(config)
}
