use crate::error::{PropriskError, Result};
use crate::models::Crs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Web Mercator cannot represent latitudes beyond this value
pub const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.0511;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings consumed by the GIS utility functions
#[derive(Debug, Clone, PartialEq)]
pub struct GisConfig {
    /// CRS of incoming lat/lon data
    pub geographic_crs: Crs,
    /// Length-preserving projected CRS used for buffering and bounds
    pub metric_crs: Crs,
    /// CRS of the web basemap
    pub display_crs: Crs,
    pub max_latitude: f64,
    pub margin_percent: f64,
    /// Margin applied to an axis whose extent is zero
    pub min_margin_m: f64,
    /// Segments used to approximate a buffered point's circle
    pub buffer_segments: usize,
}

impl Default for GisConfig {
    fn default() -> Self {
        Self {
            geographic_crs: Crs::wgs84(),
            metric_crs: Crs::australian_albers(),
            display_crs: Crs::web_mercator(),
            max_latitude: WEB_MERCATOR_MAX_LATITUDE,
            margin_percent: 10.0,
            min_margin_m: 100.0,
            buffer_segments: 32,
        }
    }
}

/// Settings consumed by the indexation routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexationOptions {
    /// Largest distance in days between a requested date and the series
    /// entry used for it. `None` accepts any gap.
    pub max_gap_days: Option<i64>,
}

impl Default for IndexationOptions {
    fn default() -> Self {
        Self { max_gap_days: Some(366) }
    }
}

/// Layered configuration for proprisk
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub geographic_crs: ConfigValue<u32>,
    pub metric_crs: ConfigValue<u32>,
    pub display_crs: ConfigValue<u32>,
    pub max_latitude: ConfigValue<f64>,
    pub margin_percent: ConfigValue<f64>,
    pub min_margin_m: ConfigValue<f64>,
    pub buffer_segments: ConfigValue<usize>,
    pub max_gap_days: ConfigValue<i64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let gis = GisConfig::default();
        let indexation = IndexationOptions::default();
        Self {
            geographic_crs: ConfigValue::new(gis.geographic_crs.epsg, ConfigSource::Default),
            metric_crs: ConfigValue::new(gis.metric_crs.epsg, ConfigSource::Default),
            display_crs: ConfigValue::new(gis.display_crs.epsg, ConfigSource::Default),
            max_latitude: ConfigValue::new(gis.max_latitude, ConfigSource::Default),
            margin_percent: ConfigValue::new(gis.margin_percent, ConfigSource::Default),
            min_margin_m: ConfigValue::new(gis.min_margin_m, ConfigSource::Default),
            buffer_segments: ConfigValue::new(gis.buffer_segments, ConfigSource::Default),
            max_gap_days: ConfigValue::new(
                indexation.max_gap_days.unwrap_or(0),
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| PropriskError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.geographic_crs {
            self.geographic_crs.update(crs.resolve("geographic_crs")?, ConfigSource::File);
        }
        if let Some(crs) = file_config.metric_crs {
            self.metric_crs.update(crs.resolve("metric_crs")?, ConfigSource::File);
        }
        if let Some(crs) = file_config.display_crs {
            self.display_crs.update(crs.resolve("display_crs")?, ConfigSource::File);
        }
        if let Some(max_latitude) = file_config.max_latitude {
            self.max_latitude.update(max_latitude, ConfigSource::File);
        }
        if let Some(margin_percent) = file_config.margin_percent {
            self.margin_percent.update(margin_percent, ConfigSource::File);
        }
        if let Some(min_margin_m) = file_config.min_margin_m {
            self.min_margin_m.update(min_margin_m, ConfigSource::File);
        }
        if let Some(buffer_segments) = file_config.buffer_segments {
            self.buffer_segments.update(buffer_segments, ConfigSource::File);
        }
        if let Some(max_gap_days) = file_config.max_gap_days {
            self.max_gap_days.update(max_gap_days, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        for (var, target) in [
            ("PROPRISK_GEOGRAPHIC_CRS", &mut self.geographic_crs),
            ("PROPRISK_METRIC_CRS", &mut self.metric_crs),
            ("PROPRISK_DISPLAY_CRS", &mut self.display_crs),
        ] {
            if let Ok(raw) = env::var(var) {
                match parse_crs_code(var, &raw) {
                    Ok(code) => target.update(code, ConfigSource::Environment),
                    Err(_) => tracing::warn!(
                        "Invalid {} value '{}': expected an EPSG code such as EPSG:3577",
                        var,
                        raw
                    ),
                }
            }
        }

        for (var, target) in [
            ("PROPRISK_MAX_LATITUDE", &mut self.max_latitude),
            ("PROPRISK_MARGIN_PERCENT", &mut self.margin_percent),
            ("PROPRISK_MIN_MARGIN_M", &mut self.min_margin_m),
        ] {
            if let Ok(raw) = env::var(var) {
                match raw.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() => {
                        target.update(value, ConfigSource::Environment)
                    }
                    _ => tracing::warn!("Invalid {} value '{}': expected a number", var, raw),
                }
            }
        }

        if let Ok(raw) = env::var("PROPRISK_BUFFER_SEGMENTS") {
            match raw.trim().parse::<usize>() {
                Ok(segments) => self.buffer_segments.update(segments, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROPRISK_BUFFER_SEGMENTS value '{}': expected a positive integer",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("PROPRISK_MAX_GAP_DAYS") {
            match raw.trim().parse::<i64>() {
                Ok(days) => self.max_gap_days.update(days, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROPRISK_MAX_GAP_DAYS value '{}': expected an integer",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.metric_crs {
            self.metric_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(crs) = overrides.display_crs {
            self.display_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(margin_percent) = overrides.margin_percent {
            self.margin_percent.update(margin_percent, ConfigSource::Cli);
        }
        if let Some(max_gap_days) = overrides.max_gap_days {
            self.max_gap_days.update(max_gap_days, ConfigSource::Cli);
        }
    }

    /// Resolve the values the GIS functions need, checking ranges
    pub fn gis_config(&self) -> Result<GisConfig> {
        let max_latitude = self.max_latitude.value;
        if !(0.0..=90.0).contains(&max_latitude) {
            return Err(PropriskError::ConfigInvalid {
                key: "max_latitude".to_string(),
                reason: format!("{} is outside 0..=90", max_latitude),
            });
        }
        if self.margin_percent.value < 0.0 {
            return Err(PropriskError::ConfigInvalid {
                key: "margin_percent".to_string(),
                reason: "margin must not be negative".to_string(),
            });
        }
        if self.min_margin_m.value <= 0.0 {
            return Err(PropriskError::ConfigInvalid {
                key: "min_margin_m".to_string(),
                reason: "minimum margin must be positive".to_string(),
            });
        }
        if self.buffer_segments.value < 4 {
            return Err(PropriskError::ConfigInvalid {
                key: "buffer_segments".to_string(),
                reason: "at least 4 segments are needed to approximate a circle".to_string(),
            });
        }

        Ok(GisConfig {
            geographic_crs: Crs::from_epsg(self.geographic_crs.value),
            metric_crs: Crs::from_epsg(self.metric_crs.value),
            display_crs: Crs::from_epsg(self.display_crs.value),
            max_latitude,
            margin_percent: self.margin_percent.value,
            min_margin_m: self.min_margin_m.value,
            buffer_segments: self.buffer_segments.value,
        })
    }

    /// A zero or negative gap disables the limit
    pub fn indexation_options(&self) -> IndexationOptions {
        let days = self.max_gap_days.value;
        IndexationOptions { max_gap_days: (days > 0).then_some(days) }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "geographic_crs".to_string(),
            (format!("EPSG:{}", self.geographic_crs.value), self.geographic_crs.source),
        );
        map.insert(
            "metric_crs".to_string(),
            (format!("EPSG:{}", self.metric_crs.value), self.metric_crs.source),
        );
        map.insert(
            "display_crs".to_string(),
            (format!("EPSG:{}", self.display_crs.value), self.display_crs.source),
        );
        map.insert(
            "max_latitude".to_string(),
            (self.max_latitude.value.to_string(), self.max_latitude.source),
        );
        map.insert(
            "margin_percent".to_string(),
            (self.margin_percent.value.to_string(), self.margin_percent.source),
        );
        map.insert(
            "min_margin_m".to_string(),
            (self.min_margin_m.value.to_string(), self.min_margin_m.source),
        );
        map.insert(
            "buffer_segments".to_string(),
            (self.buffer_segments.value.to_string(), self.buffer_segments.source),
        );
        map.insert(
            "max_gap_days".to_string(),
            (self.max_gap_days.value.to_string(), self.max_gap_days.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    geographic_crs: Option<CrsSetting>,
    metric_crs: Option<CrsSetting>,
    display_crs: Option<CrsSetting>,
    max_latitude: Option<f64>,
    margin_percent: Option<f64>,
    min_margin_m: Option<f64>,
    buffer_segments: Option<usize>,
    max_gap_days: Option<i64>,
}

/// A CRS written either as a bare code or as an authority string
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum CrsSetting {
    Code(u32),
    Name(String),
}

impl CrsSetting {
    fn resolve(&self, key: &str) -> Result<u32> {
        match self {
            CrsSetting::Code(code) => parse_crs_code(key, &code.to_string()),
            CrsSetting::Name(name) => parse_crs_code(key, name),
        }
    }
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub metric_crs: Option<u32>,
    pub display_crs: Option<u32>,
    pub margin_percent: Option<f64>,
    pub max_gap_days: Option<i64>,
}

/// Parse a CRS setting (`EPSG:3577` or `3577`) into its EPSG code
pub fn parse_crs_code(key: &str, s: &str) -> Result<u32> {
    Crs::parse(s).map(|crs| crs.epsg).map_err(|e| PropriskError::ConfigInvalid {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
