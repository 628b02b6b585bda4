//! Market value index series and indexation results.

use crate::error::{PropriskError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation of a market value index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl IndexPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// Date-ordered index observations.
///
/// Dates are strictly increasing and every value is positive and finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IndexPoint>", into = "Vec<IndexPoint>")]
pub struct IndexSeries {
    points: Vec<IndexPoint>,
}

impl IndexSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series, rejecting unordered dates and non-positive values
    pub fn new(points: Vec<IndexPoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.is_usable() {
                return Err(PropriskError::validation(
                    "index_series",
                    format!("value {} at {} must be positive and finite", point.value, point.date),
                ));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(PropriskError::validation(
                    "index_series",
                    format!(
                        "dates must be strictly increasing, found {} after {}",
                        point.date,
                        points[i - 1].date
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    /// Build a series from raw market data, sorting by date and dropping
    /// unusable points. For duplicate dates the first observation wins.
    pub fn from_unsorted(mut points: Vec<IndexPoint>) -> Self {
        points.sort_by_key(|p| p.date);

        let mut kept: Vec<IndexPoint> = Vec::with_capacity(points.len());
        for point in points {
            if !point.is_usable() {
                tracing::warn!(
                    date = %point.date,
                    value = point.value,
                    "Dropping unusable index value"
                );
                continue;
            }
            if kept.last().is_some_and(|last| last.date == point.date) {
                tracing::warn!(date = %point.date, "Dropping duplicate index date");
                continue;
            }
            kept.push(point);
        }

        Self { points: kept }
    }

    pub fn points(&self) -> &[IndexPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&IndexPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&IndexPoint> {
        self.points.last()
    }
}

impl TryFrom<Vec<IndexPoint>> for IndexSeries {
    type Error = PropriskError;

    fn try_from(points: Vec<IndexPoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<IndexSeries> for Vec<IndexPoint> {
    fn from(series: IndexSeries) -> Self {
        series.points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexationStatus {
    Success,
    Error,
}

/// How an index value was matched to a requested date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ExactDate,
    NearestAvailable,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::ExactDate => "exact_date",
            MatchMethod::NearestAvailable => "nearest_available",
        }
    }
}

/// The series entry used for one side of an indexation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub requested: NaiveDate,
    pub matched: NaiveDate,
    pub value: f64,
    pub gap_days: i64,
    pub method: MatchMethod,
}

/// Outcome of indexing a value to a target date.
///
/// Failures are carried in `status`/`message` rather than as an error so
/// missing market data can be reported without aborting the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexationResult {
    pub status: IndexationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MatchMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_match: Option<IndexMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_match: Option<IndexMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IndexationResult {
    /// Successful result from both lookups, or an error result when the
    /// ratio or the indexed value overflows.
    pub fn success(
        transaction_value: f64,
        transaction_match: IndexMatch,
        target_match: IndexMatch,
    ) -> Self {
        let index_ratio = target_match.value / transaction_match.value;
        let indexed_value = transaction_value * index_ratio;
        if !index_ratio.is_finite() || !indexed_value.is_finite() {
            return Self::error(format!(
                "indexing {} by {} / {} does not give a finite value",
                transaction_value, target_match.value, transaction_match.value
            ));
        }
        let method = if transaction_match.method == MatchMethod::ExactDate
            && target_match.method == MatchMethod::ExactDate
        {
            MatchMethod::ExactDate
        } else {
            MatchMethod::NearestAvailable
        };

        Self {
            status: IndexationStatus::Success,
            indexed_value: Some(indexed_value),
            index_ratio: Some(index_ratio),
            transaction_index: Some(transaction_match.value),
            target_index: Some(target_match.value),
            method: Some(method),
            transaction_match: Some(transaction_match),
            target_match: Some(target_match),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: IndexationStatus::Error,
            indexed_value: None,
            index_ratio: None,
            transaction_index: None,
            target_index: None,
            method: None,
            transaction_match: None,
            target_match: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == IndexationStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let points = vec![
            IndexPoint::new(date(2023, 1, 1), 110.0),
            IndexPoint::new(date(2022, 1, 1), 100.0),
        ];
        assert!(IndexSeries::new(points).is_err());
    }

    #[test]
    fn test_series_rejects_non_positive_values() {
        let points = vec![IndexPoint::new(date(2022, 1, 1), 0.0)];
        assert!(IndexSeries::new(points).is_err());
    }

    #[test]
    fn test_from_unsorted_sorts_and_drops() {
        let series = IndexSeries::from_unsorted(vec![
            IndexPoint::new(date(2023, 1, 1), 110.0),
            IndexPoint::new(date(2022, 1, 1), 100.0),
            IndexPoint::new(date(2022, 6, 1), f64::NAN),
            IndexPoint::new(date(2022, 1, 1), 99.0),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().value, 100.0);
        assert_eq!(series.last().unwrap().date, date(2023, 1, 1));
    }

    #[test]
    fn test_series_deserializes_with_validation() {
        let json = r#"[{"date":"2022-01-01","value":100.0},{"date":"2023-01-01","value":110.0}]"#;
        let series: IndexSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.len(), 2);

        let bad = r#"[{"date":"2023-01-01","value":100.0},{"date":"2022-01-01","value":110.0}]"#;
        assert!(serde_json::from_str::<IndexSeries>(bad).is_err());
    }

    #[test]
    fn test_error_result_serialization() {
        let result = IndexationResult::error("no index data");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "no index data");
        assert!(json.get("indexed_value").is_none());
    }

    fn exact(day: NaiveDate, value: f64) -> IndexMatch {
        IndexMatch {
            requested: day,
            matched: day,
            value,
            gap_days: 0,
            method: MatchMethod::ExactDate,
        }
    }

    #[test]
    fn test_success_computes_ratio() {
        let result = IndexationResult::success(
            200.0,
            exact(date(2022, 1, 1), 100.0),
            exact(date(2023, 1, 1), 110.0),
        );
        assert!(result.is_success());
        assert_eq!(result.method, Some(MatchMethod::ExactDate));
        assert!((result.indexed_value.unwrap() - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_value_is_an_error() {
        let result = IndexationResult::success(
            f64::MAX,
            exact(date(2022, 1, 1), 100.0),
            exact(date(2023, 1, 1), 110.0),
        );
        assert_eq!(result.status, IndexationStatus::Error);
        assert!(result.indexed_value.is_none());

        let tiny_base = IndexationResult::success(
            1.0,
            exact(date(2022, 1, 1), f64::MIN_POSITIVE),
            exact(date(2023, 1, 1), f64::MAX),
        );
        assert_eq!(tiny_base.status, IndexationStatus::Error);
    }
}
