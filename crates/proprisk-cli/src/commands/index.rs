//! Index command implementation

use crate::cli::IndexArgs;
use crate::output::OutputWriter;
use crate::output_types::IndexOutput;
use anyhow::{bail, Context, Result};
use proprisk_core::config::LayeredConfig;
use proprisk_core::fields::{get_field, FieldValue};
use proprisk_core::models::{IndexMatch, IndexPoint, IndexSeries};
use proprisk_index::{index_value_to_date, GrowthSummary};
use serde_json::Value;
use std::fs;

pub fn execute(args: IndexArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let content = fs::read_to_string(&args.series)
        .with_context(|| format!("Failed to read index series {}", args.series.display()))?;
    let payload: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.series.display()))?;

    let points = match &args.path {
        Some(path) => match get_field::<Vec<IndexPoint>>(&payload, path, Vec::new()) {
            FieldValue::Present(points) => points,
            FieldValue::Fallback { value, reason } => {
                output.warning(format!("No index series at '{}': {}", path, reason));
                value
            }
        },
        None => serde_json::from_value(payload)
            .context("Index series must be a list of {date, value}")?,
    };
    let series = IndexSeries::from_unsorted(points);

    let result =
        index_value_to_date(args.value, args.from, args.to, &series, &config.indexation_options());
    let growth = GrowthSummary::from_result(&result, args.from, args.to);
    let report = IndexOutput { result, growth, series_points: series.len() };

    if !report.result.is_success() {
        let message =
            report.result.message.clone().unwrap_or_else(|| "Indexation failed".to_string());
        output.failure(&message, &report)?;
        bail!(message);
    }

    if output.is_json() {
        return output.result(report);
    }

    let result = &report.result;
    output.section("Indexation");
    if let (Some(indexed), Some(ratio)) = (result.indexed_value, result.index_ratio) {
        output.success(format!(
            "{:.2} on {} is {:.2} on {}",
            args.value, args.from, indexed, args.to
        ));
        output.kv("Index ratio", format!("{:.4}", ratio));
    }
    let describe =
        |m: &IndexMatch| format!("{} ({}, {} days away)", m.value, m.matched, m.gap_days);
    if let Some(m) = &result.transaction_match {
        output.kv("Transaction index", describe(m));
    }
    if let Some(m) = &result.target_match {
        output.kv("Target index", describe(m));
    }
    if let Some(method) = result.method {
        output.kv("Method", method.as_str());
    }

    if let Some(growth) = &report.growth {
        output.section("Growth");
        output.kv("Total", format!("{:.2}%", growth.growth_percent));
        match growth.annualized_percent {
            Some(annual) => output.kv("Annualized", format!("{:.2}%", annual)),
            None => output.kv("Annualized", "n/a (same day)"),
        }
    }
    Ok(())
}
