//! Column helpers over Polars DataFrames.

use polars::prelude::*;

/// True for integer and float dtypes.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Type name as shown in the info report.
pub fn dtype_name(dtype: &DataType) -> String {
    match dtype {
        DataType::Int8 => "int8".to_string(),
        DataType::Int16 => "int16".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::UInt8 => "uint8".to_string(),
        DataType::UInt16 => "uint16".to_string(),
        DataType::UInt32 => "uint32".to_string(),
        DataType::UInt64 => "uint64".to_string(),
        DataType::Float32 => "float32".to_string(),
        DataType::Float64 => "float64".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::String => "object".to_string(),
        other => other.to_string(),
    }
}

/// Look up a column that must hold numbers.
pub fn numeric_column<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a Column> {
    let column = df.column(name)?;
    if is_numeric(column.dtype()) {
        Ok(column)
    } else {
        Err(PolarsError::SchemaMismatch(
            format!("column '{}' is not numeric", name).into(),
        ))
    }
}

/// Non-missing values of a numeric column, in row order. NaN counts as missing.
pub fn numeric_values(column: &Column) -> PolarsResult<Vec<f64>> {
    let floats = column.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Every cell rendered as text, `None` where missing.
pub fn text_values(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}
