//! Reading and printing GeoJSON layers

use crate::output::OutputWriter;
use crate::output_types::FeatureRow;
use anyhow::{Context, Result};
use proprisk_core::models::GeometryCollection;
use proprisk_geo::GisToolkit;
use std::fs;
use std::path::Path;

/// Load a GeoJSON file into the toolkit's geographic CRS.
///
/// Files without a `crs` member are taken to be in the geographic CRS.
pub fn load_layer(path: &Path, toolkit: &GisToolkit) -> Result<GeometryCollection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let collection = GeometryCollection::from_geojson_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let collection = toolkit.ensure_geographic(collection)?;

    tracing::debug!(path = %path.display(), features = collection.len(), "Loaded layer");
    Ok(collection)
}

/// JSON mode prints the FeatureCollection, human mode a feature table
pub fn print_layer(output: &OutputWriter, title: &str, layer: &GeometryCollection) -> Result<()> {
    if output.is_json() {
        return output.result(layer.to_geojson()?);
    }

    output.section(title);
    if let Some(crs) = &layer.crs {
        output.kv("CRS", crs);
    }
    output.kv("Features", layer.len());
    if !layer.is_empty() {
        let rows = layer.iter().enumerate().map(|(i, f)| FeatureRow::new(i, f)).collect();
        output.table(rows)?;
    }
    Ok(())
}
