//! Statistics Calculator Module
//! Handles descriptive statistics for numeric and categorical columns.

use crate::data::{is_numeric, numeric_values, text_values};
use polars::prelude::{Column, DataFrame, PolarsResult};
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for NumericSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Frequency statistics for a text column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> NumericSummary {
        let n = values.len();
        if n == 0 {
            return NumericSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // Sample standard deviation (n - 1); NaN for a single value
        let std = values.iter().std_dev();

        NumericSummary {
            count: n,
            mean: values.iter().mean(),
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Count, distinct values and the most frequent value of a text column.
    pub fn compute_categorical_stats(values: &[Option<String>]) -> CategoricalSummary {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for value in values.iter().flatten() {
            let count = counts.entry(value.as_str()).or_insert(0);
            if *count == 0 {
                order.push(value.as_str());
            }
            *count += 1;
        }

        // First-seen value wins ties
        let mut top: Option<(&str, usize)> = None;
        for &value in &order {
            let freq = counts[value];
            if top.map_or(true, |(_, best)| freq > best) {
                top = Some((value, freq));
            }
        }

        CategoricalSummary {
            count: counts.values().sum(),
            unique: order.len(),
            top: top.map(|(v, _)| v.to_string()),
            freq: top.map_or(0, |(_, f)| f),
        }
    }

    /// Numeric columns get descriptive statistics; everything else is categorical.
    pub fn describe_column(column: &Column) -> PolarsResult<ColumnSummary> {
        if is_numeric(column.dtype()) {
            let values = numeric_values(column)?;
            Ok(ColumnSummary::Numeric(Self::compute_descriptive_stats(&values)))
        } else {
            let values = text_values(column)?;
            Ok(ColumnSummary::Categorical(Self::compute_categorical_stats(&values)))
        }
    }

    /// Summaries for every column, in frame order.
    pub fn describe(df: &DataFrame) -> PolarsResult<Vec<(String, ColumnSummary)>> {
        df.get_columns()
            .iter()
            .map(|c| Ok((c.name().to_string(), Self::describe_column(c)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!(approx(stats.mean, 2.5));
        assert!(approx(stats.std, (5.0f64 / 3.0).sqrt()));
        assert!(approx(stats.min, 1.0));
        assert!(approx(stats.p25, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.p75, 3.25));
        assert!(approx(stats.max, 4.0));
    }

    #[test]
    fn test_single_value_has_nan_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert!(approx(stats.mean, 7.0));
        assert!(stats.std.is_nan());
        assert!(approx(stats.median, 7.0));
    }

    #[test]
    fn test_empty_is_all_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.max.is_nan());
    }

    #[test]
    fn test_categorical_stats_first_seen_wins_ties() {
        let values: Vec<Option<String>> = ["b", "a", "b", "a", "c"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();
        let stats = StatsCalculator::compute_categorical_stats(&values);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.unique, 3);
        assert_eq!(stats.top.as_deref(), Some("b"));
        assert_eq!(stats.freq, 2);
    }

    #[test]
    fn test_describe_dispatches_on_dtype() {
        let df = polars::df!(
            "Year" => [Some(2020i64), Some(2021)],
            "Breakdown_category" => [Some("A"), None]
        )
        .unwrap();
        let summaries = StatsCalculator::describe(&df).unwrap();
        assert_eq!(summaries[0].0, "Year");
        assert!(matches!(summaries[0].1, ColumnSummary::Numeric(ref s) if s.count == 2));
        assert!(matches!(summaries[1].1, ColumnSummary::Categorical(ref s) if s.count == 1));
    }
}
