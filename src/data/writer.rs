//! CSV export of a DataFrame through Polars' `CsvWriter`.

use polars::prelude::{CsvWriter, DataFrame, PolarsError, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Writes frames as comma-delimited CSV with a header row.
pub struct CsvExporter;

impl CsvExporter {
    /// Write `df` to `path`. No index column is written.
    pub fn export_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
        let mut file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut out = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut out)?;

        info!("Exported {} rows to {}", df.height(), path.display());
        Ok(())
    }
}
