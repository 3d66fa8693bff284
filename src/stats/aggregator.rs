//! Group-by aggregation: per-key sums and top-N ranking.

use crate::data::{numeric_column, text_values};
use polars::prelude::*;

/// Summed value for one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

impl GroupTotal {
    pub fn new(key: impl Into<String>, total: f64) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

/// Per-key sums sorted ascending by key. Rows with a missing key are dropped.
fn grouped_totals(df: &DataFrame, key_column: &str, value_column: &str) -> PolarsResult<LazyFrame> {
    df.column(key_column)?;
    numeric_column(df, value_column)?;

    Ok(df
        .clone()
        .lazy()
        .filter(col(key_column).is_not_null())
        .group_by([col(key_column)])
        .agg([col(value_column).sum()])
        .sort([key_column], SortMultipleOptions::default()))
}

fn collect_totals(
    grouped: DataFrame,
    key_column: &str,
    value_column: &str,
) -> PolarsResult<Vec<GroupTotal>> {
    let keys = text_values(grouped.column(key_column)?)?;
    let totals = grouped.column(value_column)?.cast(&DataType::Float64)?;

    Ok(keys
        .into_iter()
        .zip(totals.f64()?.into_iter())
        .filter_map(|(key, total)| Some(GroupTotal::new(key?, total.unwrap_or(0.0))))
        .collect())
}

/// Sum `value_column` per distinct `key_column` value, ascending by key.
///
/// Rows with a missing key are skipped. Missing values add nothing, so a key
/// whose values are all missing still appears with a total of 0.
pub fn sum_by(df: &DataFrame, key_column: &str, value_column: &str) -> PolarsResult<Vec<GroupTotal>> {
    let grouped = grouped_totals(df, key_column, value_column)?.collect()?;
    collect_totals(grouped, key_column, value_column)
}

/// The `n` groups with the largest totals, descending.
///
/// Ties keep the ascending key order of `sum_by`.
pub fn top_n(
    df: &DataFrame,
    key_column: &str,
    value_column: &str,
    n: usize,
) -> PolarsResult<Vec<GroupTotal>> {
    let ranked = grouped_totals(df, key_column, value_column)?
        .sort(
            [value_column],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?
        .head(Some(n));
    collect_totals(ranked, key_column, value_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{numeric_values, DataProcessor, BREAKDOWN_CATEGORY, RD_VALUE, YEAR};
    use std::collections::HashSet;

    fn scenario_cleaned() -> DataFrame {
        let raw = df!(
            YEAR => [2020i64, 2020, 2021],
            BREAKDOWN_CATEGORY => ["A", "B", "A"],
            RD_VALUE => ["100", "bad", "50"]
        )
        .unwrap();
        let (_, cleaned) = DataProcessor::clean(raw);
        cleaned.frame().clone()
    }

    fn category_frame(pairs: &[(&str, f64)]) -> DataFrame {
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
        df!(BREAKDOWN_CATEGORY => keys, RD_VALUE => values).unwrap()
    }

    #[test]
    fn test_scenario_sum_by_year() {
        let totals = sum_by(&scenario_cleaned(), YEAR, RD_VALUE).unwrap();
        assert_eq!(
            totals,
            vec![GroupTotal::new("2020", 100.0), GroupTotal::new("2021", 50.0)]
        );
    }

    #[test]
    fn test_scenario_top_one_category() {
        let top = top_n(&scenario_cleaned(), BREAKDOWN_CATEGORY, RD_VALUE, 1).unwrap();
        assert_eq!(top, vec![GroupTotal::new("A", 150.0)]);
    }

    #[test]
    fn test_sum_by_conserves_mass() {
        let df = category_frame(&[("x", 1.25), ("y", 2.5), ("x", 4.0), ("z", 8.0), ("y", 16.0)]);
        let groups = sum_by(&df, BREAKDOWN_CATEGORY, RD_VALUE).unwrap();
        let grouped: f64 = groups.iter().map(|g| g.total).sum();
        let direct: f64 = numeric_values(df.column(RD_VALUE).unwrap())
            .unwrap()
            .iter()
            .sum();
        assert!((grouped - direct).abs() < 1e-9);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_years_sort_numerically() {
        let df = df!(
            YEAR => [2010i64, 999, 2009],
            RD_VALUE => [1.0, 1.0, 1.0]
        )
        .unwrap();
        let keys: Vec<String> = sum_by(&df, YEAR, RD_VALUE)
            .unwrap()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["999", "2009", "2010"]);
    }

    #[test]
    fn test_all_missing_values_total_zero() {
        let df = df!(
            YEAR => [Some(2020i64), Some(2021), None],
            RD_VALUE => [None, Some(5.0), Some(7.0)]
        )
        .unwrap();
        let totals = sum_by(&df, YEAR, RD_VALUE).unwrap();
        assert_eq!(
            totals,
            vec![GroupTotal::new("2020", 0.0), GroupTotal::new("2021", 5.0)]
        );
    }

    #[test]
    fn test_top_n_descending_and_bounded() {
        let names: Vec<String> = (0..15).map(|i| format!("c{i:02}")).collect();
        let pairs: Vec<(&str, f64)> = names
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as f64))
            .collect();
        let df = category_frame(&pairs);

        let top = top_n(&df, BREAKDOWN_CATEGORY, RD_VALUE, 10).unwrap();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(top[0].key, "c14");

        let all: HashSet<&String> = names.iter().collect();
        assert!(top.iter().all(|g| all.contains(&g.key)));
    }

    #[test]
    fn test_top_n_larger_than_groups_returns_all() {
        let df = category_frame(&[("a", 1.0), ("b", 2.0)]);
        let top = top_n(&df, BREAKDOWN_CATEGORY, RD_VALUE, 10).unwrap();
        assert_eq!(top, vec![GroupTotal::new("b", 2.0), GroupTotal::new("a", 1.0)]);
    }

    #[test]
    fn test_top_n_ties_keep_key_order() {
        let df = category_frame(&[("b", 5.0), ("a", 5.0), ("c", 1.0)]);
        let top = top_n(&df, BREAKDOWN_CATEGORY, RD_VALUE, 2).unwrap();
        assert_eq!(top, vec![GroupTotal::new("a", 5.0), GroupTotal::new("b", 5.0)]);
    }

    #[test]
    fn test_empty_frame_yields_empty_results() {
        let df = category_frame(&[]);
        assert!(sum_by(&df, BREAKDOWN_CATEGORY, RD_VALUE).unwrap().is_empty());
        assert!(top_n(&df, BREAKDOWN_CATEGORY, RD_VALUE, 10).unwrap().is_empty());
    }

    #[test]
    fn test_missing_columns_are_lookup_errors() {
        let df = category_frame(&[("a", 1.0)]);
        assert!(matches!(
            sum_by(&df, YEAR, RD_VALUE),
            Err(PolarsError::ColumnNotFound(_))
        ));
        assert!(matches!(
            top_n(&df, BREAKDOWN_CATEGORY, BREAKDOWN_CATEGORY, 3),
            Err(PolarsError::SchemaMismatch(_))
        ));
    }
}
