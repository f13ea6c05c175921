//! Property tests for ledger cleansing, transformation and aggregation.

use polars::prelude::*;
use proptest::prelude::*;

use txn_etl::algorithms::summarize_periods;
use txn_etl::core::domain::default_epoch;
use txn_etl::core::VALID_TYPES;
use txn_etl::transformations::{cleanse_ledger, transform_ledger};

type Row = (Option<String>, Option<f64>, i64);

fn row() -> impl Strategy<Value = Row> {
    let kind = prop_oneof![
        4 => prop::sample::select(VALID_TYPES.to_vec()).prop_map(|s| Some(s.to_string())),
        1 => Just(Some("REFUND".to_string())),
        1 => Just(None),
    ];
    // Small domains so duplicate rows show up often.
    let amount = prop_oneof![
        6 => (-5i32..40).prop_map(|v| Some(v as f64 * 2.5)),
        1 => Just(None),
    ];
    (kind, amount, 0i64..2_000)
}

fn ledger(rows: &[Row]) -> DataFrame {
    let types: Vec<Option<&str>> = rows.iter().map(|r| r.0.as_deref()).collect();
    let amounts: Vec<Option<f64>> = rows.iter().map(|r| r.1).collect();
    let steps: Vec<i64> = rows.iter().map(|r| r.2).collect();
    df!("type" => types, "amount" => amounts, "step" => steps).unwrap()
}

fn sum(df: &DataFrame, column: &str) -> f64 {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .sum::<f64>()
        .unwrap_or(0.0)
}

proptest! {
    #[test]
    fn prop_cleansing_is_idempotent(rows in prop::collection::vec(row(), 0..60)) {
        let once = cleanse_ledger(&ledger(&rows)).unwrap();
        let twice = cleanse_ledger(&once).unwrap();
        prop_assert!(once.equals_missing(&twice));
    }

    #[test]
    fn prop_cleansed_rows_are_valid(rows in prop::collection::vec(row(), 0..60)) {
        let raw = ledger(&rows);
        let cleansed = cleanse_ledger(&raw).unwrap();

        prop_assert!(cleansed.height() <= raw.height());
        let nulls: usize = cleansed.get_columns().iter().map(|c| c.null_count()).sum();
        prop_assert_eq!(nulls, 0);

        let amounts = cleansed.column("amount").unwrap().f64().unwrap();
        prop_assert!(amounts.into_iter().all(|a| a.is_some_and(|v| v > 0.0)));

        let types = cleansed.column("type").unwrap().str().unwrap();
        prop_assert!(types.into_iter().all(|t| t.is_some_and(|v| VALID_TYPES.contains(&v))));

        let unique = cleansed
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .unwrap();
        prop_assert_eq!(unique.height(), cleansed.height());
    }

    #[test]
    fn prop_conversion_scales_amount(
        rows in prop::collection::vec(row(), 1..60),
        rate in 0.0f64..10.0,
    ) {
        let cleansed = cleanse_ledger(&ledger(&rows)).unwrap();
        let transformed = transform_ledger(&cleansed, rate, default_epoch()).unwrap();

        let amount = transformed.column("amount").unwrap().f64().unwrap();
        let converted = transformed.column("amount_converted").unwrap().f64().unwrap();
        for (a, c) in amount.into_iter().zip(converted.into_iter()) {
            let (a, c) = (a.unwrap(), c.unwrap());
            prop_assert!((c - a * rate).abs() <= 1e-9 * (a * rate).abs().max(1.0));
        }
    }

    #[test]
    fn prop_period_totals_reconcile(rows in prop::collection::vec(row(), 0..80)) {
        let cleansed = cleanse_ledger(&ledger(&rows)).unwrap();
        let transformed = transform_ledger(&cleansed, 1.1, default_epoch()).unwrap();
        let summaries = summarize_periods(&transformed).unwrap();

        let total = sum(&transformed, "amount");
        for summary in [&summaries.daily, &summaries.weekly, &summaries.monthly] {
            prop_assert!((sum(summary, "amount") - total).abs() < 1e-6);
        }

        let total_converted = sum(&transformed, "amount_converted");
        prop_assert!((sum(&summaries.monthly, "amount_converted") - total_converted).abs() < 1e-6);
    }
}
