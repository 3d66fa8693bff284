//! Text Report Module
//! Prints dataset info, missing-value counts and summary statistics.

use crate::data::dtype_name;
use crate::stats::{ColumnSummary, StatsCalculator};
use polars::prelude::{DataFrame, PolarsError};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to summarise columns: {0}")]
    Data(#[from] PolarsError),
}

/// Writes the diagnostic report for the uncleaned table.
pub struct Reporter;

impl Reporter {
    /// Info, missing values, then summary statistics.
    pub fn write_report<W: Write>(df: &DataFrame, out: &mut W) -> Result<(), ReportError> {
        writeln!(out, "📌 Dataset Info:\n")?;
        Self::write_info(df, out)?;
        writeln!(out, "\n📌 Missing values per column:\n")?;
        Self::write_missing(df, out)?;
        writeln!(out, "\n📌 Summary statistics:\n")?;
        Self::write_summary(df, out)?;
        Ok(())
    }

    /// Column index, name, non-null count and dtype.
    pub fn write_info<W: Write>(df: &DataFrame, out: &mut W) -> io::Result<()> {
        let name_w = Self::name_width(df, "Column");

        writeln!(out, "DataFrame: {} entries", df.height())?;
        writeln!(out, "Data columns (total {} columns):", df.width())?;
        writeln!(
            out,
            " {:>3}  {:<name_w$}  {:>14}  {}",
            "#", "Column", "Non-Null Count", "Dtype"
        )?;
        for (i, column) in df.get_columns().iter().enumerate() {
            let non_null = format!("{} non-null", column.len() - column.null_count());
            writeln!(
                out,
                " {:>3}  {:<name_w$}  {:>14}  {}",
                i,
                column.name(),
                non_null,
                dtype_name(column.dtype())
            )?;
        }
        Ok(())
    }

    pub fn write_missing<W: Write>(df: &DataFrame, out: &mut W) -> io::Result<()> {
        let name_w = Self::name_width(df, "");
        for column in df.get_columns() {
            writeln!(out, "{:<name_w$}  {:>8}", column.name(), column.null_count())?;
        }
        Ok(())
    }

    /// One line per column; numeric and text columns get different fields.
    pub fn write_summary<W: Write>(df: &DataFrame, out: &mut W) -> Result<(), ReportError> {
        let name_w = Self::name_width(df, "");
        for (name, summary) in StatsCalculator::describe(df)? {
            match summary {
                ColumnSummary::Numeric(s) => writeln!(
                    out,
                    "{:<name_w$}  count={} mean={} std={} min={} 25%={} 50%={} 75%={} max={}",
                    name,
                    s.count,
                    Self::fmt_stat(s.mean),
                    Self::fmt_stat(s.std),
                    Self::fmt_stat(s.min),
                    Self::fmt_stat(s.p25),
                    Self::fmt_stat(s.median),
                    Self::fmt_stat(s.p75),
                    Self::fmt_stat(s.max),
                )?,
                ColumnSummary::Categorical(s) => writeln!(
                    out,
                    "{:<name_w$}  count={} unique={} top={} freq={}",
                    name,
                    s.count,
                    s.unique,
                    s.top.as_deref().unwrap_or("NaN"),
                    s.freq,
                )?,
            }
        }
        Ok(())
    }

    fn fmt_stat(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else {
            format!("{:.6}", value)
        }
    }

    fn name_width(df: &DataFrame, header: &str) -> usize {
        df.get_columns()
            .iter()
            .map(|c| c.name().chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0)
    }
}
