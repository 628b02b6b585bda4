//! Growth figures derived from an index ratio, for reporting

use chrono::NaiveDate;
use proprisk_core::error::{PropriskError, Result};
use proprisk_core::models::IndexationResult;
use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.25;

/// Total growth as a percentage, `(ratio - 1) * 100`
pub fn growth_percent(index_ratio: f64) -> f64 {
    (index_ratio - 1.0) * 100.0
}

/// Compound yearly growth rate implied by `index_ratio` between two dates.
///
/// Returned as a fraction (0.05 is 5% a year). The span is counted in whole
/// days and must not be zero.
pub fn annualized_growth(index_ratio: f64, from: NaiveDate, to: NaiveDate) -> Result<f64> {
    if !index_ratio.is_finite() || index_ratio <= 0.0 {
        return Err(PropriskError::validation(
            "index_ratio",
            format!("{} must be a positive number", index_ratio),
        ));
    }

    let days_elapsed = (to - from).num_days();
    if days_elapsed == 0 {
        return Err(PropriskError::validation(
            "days_elapsed",
            format!("{} and {} are the same day", from, to),
        ));
    }

    Ok(index_ratio.powf(DAYS_PER_YEAR / days_elapsed as f64) - 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub growth_percent: f64,
    /// `None` when both dates fall on the same day
    pub annualized_percent: Option<f64>,
    pub days_elapsed: i64,
}

impl GrowthSummary {
    /// Growth figures for a successful indexation, `None` otherwise
    pub fn from_result(result: &IndexationResult, from: NaiveDate, to: NaiveDate) -> Option<Self> {
        let ratio = result.index_ratio?;
        Some(Self {
            growth_percent: growth_percent(ratio),
            annualized_percent: annualized_growth(ratio, from, to).ok().map(|g| g * 100.0),
            days_elapsed: (to - from).num_days(),
        })
    }
}
