//! Adjusting a transaction value to another date with an index series

use chrono::NaiveDate;
use proprisk_core::config::IndexationOptions;
use proprisk_core::models::{IndexMatch, IndexSeries, IndexationResult, MatchMethod};

/// Series entry closest to `requested`.
///
/// An entry on the requested date is an exact match. Otherwise the closer
/// neighbour wins, and the earlier one when both are equally far. `None`
/// only for an empty series.
pub fn nearest_entry(series: &IndexSeries, requested: NaiveDate) -> Option<IndexMatch> {
    let points = series.points();
    let split = points.partition_point(|p| p.date < requested);

    let before = split.checked_sub(1).and_then(|i| points.get(i));
    let after = points.get(split);

    let chosen = match (before, after) {
        (_, Some(p)) if p.date == requested => p,
        (Some(b), Some(a)) => {
            if (a.date - requested).num_days() < (requested - b.date).num_days() {
                a
            } else {
                b
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    let gap_days = (chosen.date - requested).num_days().abs();
    Some(IndexMatch {
        requested,
        matched: chosen.date,
        value: chosen.value,
        gap_days,
        method: if gap_days == 0 { MatchMethod::ExactDate } else { MatchMethod::NearestAvailable },
    })
}

fn lookup(
    series: &IndexSeries,
    requested: NaiveDate,
    label: &str,
    options: &IndexationOptions,
) -> Result<IndexMatch, String> {
    let found = nearest_entry(series, requested)
        .ok_or_else(|| "index series has no usable values".to_string())?;

    match options.max_gap_days {
        Some(max_gap) if found.gap_days > max_gap => Err(format!(
            "no index value within {} days of the {} date {} (nearest is {}, {} days away)",
            max_gap, label, requested, found.matched, found.gap_days
        )),
        _ => Ok(found),
    }
}

/// Index `transaction_value`, observed on `transaction_date`, to `target_date`.
///
/// The value is scaled by the ratio of the index at the target date to the
/// index at the transaction date, each taken from the nearest series entry.
/// Problems with the inputs or the series come back as an error result
/// rather than an `Err`.
pub fn index_value_to_date(
    transaction_value: f64,
    transaction_date: NaiveDate,
    target_date: NaiveDate,
    series: &IndexSeries,
    options: &IndexationOptions,
) -> IndexationResult {
    if !transaction_value.is_finite() || transaction_value <= 0.0 {
        return IndexationResult::error(format!(
            "transaction value {} must be a positive number",
            transaction_value
        ));
    }
    if series.is_empty() {
        return IndexationResult::error("index series has no usable values");
    }

    let transaction_match = match lookup(series, transaction_date, "transaction", options) {
        Ok(m) => m,
        Err(message) => return IndexationResult::error(message),
    };
    let target_match = match lookup(series, target_date, "target", options) {
        Ok(m) => m,
        Err(message) => return IndexationResult::error(message),
    };

    let result = IndexationResult::success(transaction_value, transaction_match, target_match);
    tracing::debug!(
        transaction_date = %transaction_date,
        target_date = %target_date,
        ratio = result.index_ratio,
        method = result.method.map(|m| m.as_str()),
        "Indexed transaction value"
    );
    result
}

/// `index_value_to_date` taking `YYYY-MM-DD` strings
pub fn index_value_to_date_str(
    transaction_value: f64,
    transaction_date: &str,
    target_date: &str,
    series: &IndexSeries,
    options: &IndexationOptions,
) -> IndexationResult {
    let parse = |label: &str, s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid {} date '{}': {}", label, s, e))
    };

    let dates = parse("transaction", transaction_date)
        .and_then(|from| parse("target", target_date).map(|to| (from, to)));
    match dates {
        Ok((from, to)) => index_value_to_date(transaction_value, from, to, series, options),
        Err(message) => IndexationResult::error(message),
    }
}
