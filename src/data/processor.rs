//! Data Processor Module
//! Handles numeric coercion and completeness filtering.

use crate::data::frame::{is_numeric, numeric_column, text_values};
use crate::data::{BREAKDOWN_CATEGORY, RD_VALUE, RELATIVE_SAMPLING_ERROR, YEAR};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Columns coerced to numbers before analysis.
pub const NUMERIC_COLUMNS: [&str; 2] = [RD_VALUE, RELATIVE_SAMPLING_ERROR];

/// Columns every analysed row must have.
pub const REQUIRED_COLUMNS: [&str; 3] = [RD_VALUE, YEAR, BREAKDOWN_CATEGORY];

/// Outcome of coercing one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionSummary {
    /// Values that parsed successfully.
    pub converted: usize,
    /// Present values that failed to parse and became missing.
    pub coerced_to_missing: usize,
}

/// One cleaned row, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: String,
    pub breakdown_category: String,
    pub rd_value: f64,
    pub relative_sampling_error: Option<f64>,
}

/// Rows with every required field present.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    frame: DataFrame,
}

impl CleanedTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Typed view of each row. The sampling error column is optional.
    #[allow(dead_code)]
    pub fn records(&self) -> PolarsResult<Vec<Record>> {
        let years = text_values(self.frame.column(YEAR)?)?;
        let categories = text_values(self.frame.column(BREAKDOWN_CATEGORY)?)?;
        let values = numeric_column(&self.frame, RD_VALUE)?.cast(&DataType::Float64)?;
        let errors: Vec<Option<f64>> = match self.frame.column(RELATIVE_SAMPLING_ERROR) {
            Ok(column) if is_numeric(column.dtype()) => column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .collect(),
            _ => vec![None; self.frame.height()],
        };

        Ok(years
            .into_iter()
            .zip(categories)
            .zip(values.f64()?.into_iter())
            .zip(errors)
            .filter_map(|(((year, category), value), error)| {
                Some(Record {
                    year: year?,
                    breakdown_category: category?,
                    rd_value: value?,
                    relative_sampling_error: error,
                })
            })
            .collect())
    }
}

/// Handles data cleaning operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Replace a text column with its numeric parse. Unparseable values become missing.
    ///
    /// Numeric columns are left untouched. An absent column is a no-op.
    pub fn coerce_numeric(df: &mut DataFrame, column: &str) -> CoercionSummary {
        let Ok(existing) = df.column(column) else {
            warn!("Cannot coerce '{}': column not present", column);
            return CoercionSummary::default();
        };

        if is_numeric(existing.dtype()) {
            return CoercionSummary {
                converted: existing.len() - existing.null_count(),
                coerced_to_missing: 0,
            };
        }

        let (coerced, summary) = match Self::parse_column(existing) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Cannot coerce '{}': {}", column, e);
                return CoercionSummary::default();
            }
        };

        debug!(
            "Coerced '{}' to {}: {} numeric, {} to missing",
            column,
            coerced.dtype(),
            summary.converted,
            summary.coerced_to_missing
        );

        if let Err(e) = df.with_column(coerced) {
            warn!("Failed to replace '{}': {}", column, e);
        }
        summary
    }

    /// Non-strict cast to Float64, with NaN read as missing.
    ///
    /// Integer literals with nothing coerced to missing give an Int64 column.
    fn parse_column(column: &Column) -> PolarsResult<(Column, CoercionSummary)> {
        let present = column.len() - column.null_count();
        let floats = column.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();

        let converted = values.iter().flatten().count();
        let summary = CoercionSummary {
            converted,
            coerced_to_missing: present - converted,
        };

        let text = column.cast(&DataType::String)?;
        let integral = summary.coerced_to_missing == 0
            && converted > 0
            && text
                .str()?
                .into_iter()
                .flatten()
                .all(|cell| cell.trim().parse::<i64>().is_ok());

        let parsed = if integral {
            floats.cast(&DataType::Int64)?
        } else {
            Column::new(column.name().clone(), values)
        };
        Ok((parsed, summary))
    }

    /// Keep rows where every required column is present, in original order.
    ///
    /// A required column absent from the table counts as missing in every row.
    pub fn drop_incomplete(df: &DataFrame, required: &[&str]) -> DataFrame {
        if let Some(absent) = required.iter().find(|name| df.column(name).is_err()) {
            warn!("Required column '{}' not present; no rows survive", absent);
            return df.head(Some(0));
        }

        let subset: Vec<String> = required.iter().map(|name| name.to_string()).collect();
        match df.drop_nulls(Some(subset.as_slice())) {
            Ok(kept) => kept,
            Err(e) => {
                warn!("Failed to drop incomplete rows: {}", e);
                df.head(Some(0))
            }
        }
    }

    /// Coerce the numeric columns and drop incomplete rows.
    ///
    /// Returns the coerced (uncleaned) table alongside the cleaned one.
    pub fn clean(mut df: DataFrame) -> (DataFrame, CleanedTable) {
        for column in NUMERIC_COLUMNS {
            let summary = Self::coerce_numeric(&mut df, column);
            if summary.coerced_to_missing > 0 {
                info!(
                    "{} non-numeric value(s) in '{}' treated as missing",
                    summary.coerced_to_missing, column
                );
            }
        }

        let cleaned = Self::drop_incomplete(&df, &REQUIRED_COLUMNS);
        info!(
            "Cleaned table: {} of {} rows kept ({} dropped)",
            cleaned.height(),
            df.height(),
            df.height() - cleaned.height()
        );

        (df, CleanedTable { frame: cleaned })
    }
}
