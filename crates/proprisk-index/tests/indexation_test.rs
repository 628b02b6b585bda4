use chrono::NaiveDate;
use proprisk_core::config::IndexationOptions;
use proprisk_core::models::{IndexPoint, IndexSeries, IndexationStatus, MatchMethod};
use proprisk_index::{index_value_to_date, GrowthSummary};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn yearly_series() -> IndexSeries {
    serde_json::from_str(
        r#"[
            { "date": "2022-01-01", "value": 100.0 },
            { "date": "2023-01-01", "value": 110.0 }
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_value_indexed_across_a_year() {
    let result = index_value_to_date(
        500_000.0,
        date(2022, 1, 15),
        date(2023, 1, 15),
        &yearly_series(),
        &IndexationOptions::default(),
    );

    assert_eq!(result.status, IndexationStatus::Success);
    assert!((result.index_ratio.unwrap() - 1.10).abs() < 1e-9);
    assert!((result.indexed_value.unwrap() - 550_000.0).abs() < 1e-6);
    assert_eq!(result.transaction_index, Some(100.0));
    assert_eq!(result.target_index, Some(110.0));
    assert_eq!(result.method, Some(MatchMethod::NearestAvailable));
    assert_eq!(result.transaction_match.unwrap().gap_days, 14);

    let summary =
        GrowthSummary::from_result(&result, date(2022, 1, 15), date(2023, 1, 15)).unwrap();
    assert!((summary.growth_percent - 10.0).abs() < 1e-9);
    assert_eq!(summary.days_elapsed, 365);
}

#[test]
fn test_empty_series_is_an_error_result() {
    let result = index_value_to_date(
        500_000.0,
        date(2022, 1, 15),
        date(2023, 1, 15),
        &IndexSeries::empty(),
        &IndexationOptions::default(),
    );
    assert_eq!(result.status, IndexationStatus::Error);
    assert!(result.indexed_value.is_none());
    assert!(result.message.is_some());
}

#[test]
fn test_result_serializes_without_empty_fields() {
    let result = index_value_to_date(
        1.0,
        date(2022, 1, 1),
        date(2023, 1, 1),
        &IndexSeries::empty(),
        &IndexationOptions::default(),
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json.get("indexed_value").is_none());

    let ok = index_value_to_date(
        1.0,
        date(2022, 1, 1),
        date(2023, 1, 1),
        &yearly_series(),
        &IndexationOptions::default(),
    );
    let json = serde_json::to_value(&ok).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["method"], "exact_date");
}

#[test]
fn test_unordered_series_rejected_on_deserialize() {
    let parsed: Result<IndexSeries, _> = serde_json::from_str(
        r#"[
            { "date": "2023-01-01", "value": 110.0 },
            { "date": "2022-01-01", "value": 100.0 }
        ]"#,
    );
    assert!(parsed.is_err());
}

proptest! {
    #[test]
    fn indexing_to_the_same_date_is_identity(value in 1.0f64..1e9, offset in 0i64..730) {
        let series = IndexSeries::new(vec![
            IndexPoint::new(date(2022, 1, 1), 100.0),
            IndexPoint::new(date(2023, 1, 1), 110.0),
            IndexPoint::new(date(2024, 1, 1), 118.0),
        ]).unwrap();
        let day = date(2022, 1, 1) + chrono::Duration::days(offset);

        let result = index_value_to_date(value, day, day, &series, &IndexationOptions::default());
        prop_assert!(result.is_success());
        prop_assert!((result.indexed_value.unwrap() - value).abs() < 1e-6 * value);
    }
}
