//! Dataset Preparer Module
//! Load, stratified split and standardization composed into one call.

use crate::data::{DatasetLoader, LoaderError};
use crate::split::{SplitError, StratifiedSplitter};
use crate::stats::{ScalerError, StandardScaler};
use ndarray::{Array1, Array2};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Dataset location used when the caller gives no path.
pub const DEFAULT_DATA_PATH: &str = "data/diabetes.csv";

/// Broad failure category of a [`PrepareError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing or unreadable.
    Io,
    /// Expected column absent, wrong type, or missing values.
    Schema,
    /// A class or partition too small to stratify.
    InsufficientData,
}

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Scale(#[from] ScalerError),
}

impl PrepareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrepareError::Load(e) if e.is_schema_error() => ErrorKind::Schema,
            PrepareError::Load(_) => ErrorKind::Io,
            PrepareError::Split(_) | PrepareError::Scale(ScalerError::EmptyInput(..)) => {
                ErrorKind::InsufficientData
            }
            PrepareError::Scale(ScalerError::WidthMismatch { .. }) => ErrorKind::Schema,
            PrepareError::Scale(ScalerError::Json(_)) => ErrorKind::Io,
        }
    }
}

/// Scaled train/test partitions and the scaler fitted on the training rows.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<i64>,
    pub y_test: Array1<i64>,
    pub scaler: StandardScaler,
    /// Feature column names, in matrix column order.
    pub feature_names: Vec<String>,
    /// Source row of each `x_train` row.
    pub train_indices: Vec<usize>,
    /// Source row of each `x_test` row.
    pub test_indices: Vec<usize>,
}

impl PreparedData {
    /// `(x_train, x_test, y_train, y_test, scaler)`
    pub fn into_parts(
        self,
    ) -> (
        Array2<f64>,
        Array2<f64>,
        Array1<i64>,
        Array1<i64>,
        StandardScaler,
    ) {
        (
            self.x_train,
            self.x_test,
            self.y_train,
            self.y_test,
            self.scaler,
        )
    }
}

/// Turns a CSV file into scaled, stratified train/test arrays.
#[derive(Debug, Clone, Default)]
pub struct DatasetPreparer {
    splitter: StratifiedSplitter,
}

impl DatasetPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the dataset at `file_path`.
    pub fn prepare(&self, file_path: impl AsRef<Path>) -> Result<PreparedData, PrepareError> {
        let path = file_path.as_ref();
        let dataset = DatasetLoader::load_csv(path)?;
        info!(
            path = %path.display(),
            rows = dataset.n_rows(),
            features = dataset.n_features(),
            "Dataset loaded"
        );

        let split = self.splitter.split(&dataset.labels().to_vec())?;
        let (x_train_raw, y_train) = dataset.select_rows(&split.train);
        let (x_test_raw, y_test) = dataset.select_rows(&split.test);
        debug!(
            train = split.train.len(),
            test = split.test.len(),
            "Rows partitioned"
        );

        // Fit on train only; test reuses the same parameters
        let (scaler, x_train) = StandardScaler::fit_transform(&x_train_raw)?;
        let x_test = scaler.transform(&x_test_raw)?;

        let (feature_names, _, _) = dataset.into_parts();

        Ok(PreparedData {
            x_train,
            x_test,
            y_train,
            y_test,
            scaler,
            feature_names,
            train_indices: split.train,
            test_indices: split.test,
        })
    }

    /// Prepare the dataset at [`DEFAULT_DATA_PATH`].
    pub fn prepare_default(&self) -> Result<PreparedData, PrepareError> {
        self.prepare(DEFAULT_DATA_PATH)
    }
}

/// Shorthand for `DatasetPreparer::new().prepare(file_path)`.
pub fn prepare(file_path: impl AsRef<Path>) -> Result<PreparedData, PrepareError> {
    DatasetPreparer::new().prepare(file_path)
}

/// Shorthand for `DatasetPreparer::new().prepare_default()`.
pub fn prepare_default() -> Result<PreparedData, PrepareError> {
    DatasetPreparer::new().prepare_default()
}
