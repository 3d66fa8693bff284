//! CSV Data Loader Module
//! Handles CSV file loading into a Polars DataFrame.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Cell contents read as missing.
pub const NA_TOKENS: [&str; 16] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>", "-1.#IND", "1.#QNAN",
];

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with a header row.
    ///
    /// Column types are inferred over the whole file. A column with any
    /// non-numeric cell stays a string column.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }
        // Surface permission problems as I/O errors rather than parse errors
        File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Reading {}", path.display());

        let null_values = NA_TOKENS.iter().map(|token| (*token).into()).collect();
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_null_values(Some(NullValues::AllColumns(null_values)))
            .with_ignore_errors(false)
            .finish()?
            .collect()?;

        for column in df.get_columns() {
            debug!("Column '{}' read as {}", column.name(), column.dtype());
        }
        info!("Loaded {} rows, {} columns", df.height(), df.width());
        Ok(df)
    }
}
