//! CSV Dataset Loader Module
//! Handles CSV file loading and feature/label extraction using Polars.

use super::dataset::Dataset;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the binary outcome column.
pub const TARGET_COLUMN: &str = "Outcome";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV content does not fit the inferred schema: {0}")]
    UnparseableValue(PolarsError),
    #[error("Missing target column '{0}'")]
    MissingTarget(String),
    #[error("No feature columns besides '{0}'")]
    NoFeatures(String),
    #[error("Feature column '{column}' is not numeric ({dtype})")]
    NonNumericFeature { column: String, dtype: String },
    #[error("Target column '{column}' is not integer-valued ({dtype})")]
    NonIntegerTarget { column: String, dtype: String },
    #[error("Column '{column}' has {count} missing value(s)")]
    MissingValues { column: String, count: usize },
    #[error("Shape mismatch: {rows}x{cols} matrix, {labels} labels, {names} names")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        labels: usize,
        names: usize,
    },
}

impl LoaderError {
    /// True when the file was read but its columns do not fit the expected layout.
    pub fn is_schema_error(&self) -> bool {
        !matches!(self, LoaderError::FileNotFound(_) | LoaderError::CsvError(_))
    }
}

/// Loads CSV files into a [`Dataset`], splitting off the target column.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a CSV file using Polars and extract features and labels.
    pub fn load_csv(file_path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        // Infer column types from every row, not a leading sample
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(Self::read_error)?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "CSV loaded"
        );

        Self::from_dataframe(&df)
    }

    /// Split a DataFrame into a feature matrix and the target label vector.
    pub fn from_dataframe(df: &DataFrame) -> Result<Dataset, LoaderError> {
        let target = df
            .column(TARGET_COLUMN)
            .map_err(|_| LoaderError::MissingTarget(TARGET_COLUMN.to_string()))?;

        let feature_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name != TARGET_COLUMN)
            .collect();
        if feature_names.is_empty() {
            return Err(LoaderError::NoFeatures(TARGET_COLUMN.to_string()));
        }

        let labels = Self::extract_labels(target)?;

        let mut features = Array2::<f64>::zeros((df.height(), feature_names.len()));
        for (j, name) in feature_names.iter().enumerate() {
            let values = Self::extract_feature(df.column(name)?)?;
            features.column_mut(j).assign(&values);
        }

        Dataset::new(feature_names, features, labels)
    }

    /// Classify a failure raised while reading: I/O stays I/O, everything else is content.
    fn read_error(err: PolarsError) -> LoaderError {
        match err {
            PolarsError::IO { .. } => LoaderError::CsvError(err),
            other => LoaderError::UnparseableValue(other),
        }
    }

    /// Check whether a dtype can be used as a feature.
    pub fn is_numeric(dtype: &DataType) -> bool {
        Self::is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
    }

    fn is_integer(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    fn check_nulls(col: &Column) -> Result<(), LoaderError> {
        match col.null_count() {
            0 => Ok(()),
            count => Err(LoaderError::MissingValues {
                column: col.name().to_string(),
                count,
            }),
        }
    }

    fn extract_feature(col: &Column) -> Result<Array1<f64>, LoaderError> {
        if !Self::is_numeric(col.dtype()) {
            return Err(LoaderError::NonNumericFeature {
                column: col.name().to_string(),
                dtype: col.dtype().to_string(),
            });
        }
        Self::check_nulls(col)?;

        let value_f64 = col.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;
        Ok(value_ca.into_iter().flatten().collect())
    }

    fn extract_labels(col: &Column) -> Result<Array1<i64>, LoaderError> {
        let non_integer = || LoaderError::NonIntegerTarget {
            column: col.name().to_string(),
            dtype: col.dtype().to_string(),
        };
        if !Self::is_numeric(col.dtype()) {
            return Err(non_integer());
        }
        Self::check_nulls(col)?;

        // Float labels are accepted when every value is a whole number (e.g. `1.0`)
        if !Self::is_integer(col.dtype()) {
            let as_f64 = col.cast(&DataType::Float64)?;
            let whole = as_f64
                .f64()?
                .into_iter()
                .flatten()
                .all(|v| v.is_finite() && v.fract() == 0.0);
            if !whole {
                return Err(non_integer());
            }
        }

        let value_i64 = col.cast(&DataType::Int64)?;
        let value_ca = value_i64.i64()?;
        Ok(value_ca.into_iter().flatten().collect())
    }
}
