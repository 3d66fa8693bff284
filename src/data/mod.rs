//! Data module - CSV loading, cleaning and export

mod frame;
mod loader;
mod processor;
mod writer;

pub use frame::{dtype_name, is_numeric, numeric_column, numeric_values, text_values};
pub use loader::DataLoader;
pub use processor::{CleanedTable, DataProcessor};
pub use writer::CsvExporter;

/// Source column names.
pub const YEAR: &str = "Year";
pub const BREAKDOWN_CATEGORY: &str = "Breakdown_category";
pub const RD_VALUE: &str = "RD_Value";
pub const RELATIVE_SAMPLING_ERROR: &str = "Relative_Sampling_Error";
