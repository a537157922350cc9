//! Diabetes Prep - dataset preparation for model training
//!
//! Loads a CSV dataset with a binary `Outcome` column, splits it into
//! stratified train/test partitions and standardizes the features with a
//! scaler fitted on the training rows only.

pub mod data;
pub mod preparer;
pub mod split;
pub mod stats;

pub use data::{Dataset, DatasetLoader, LoaderError, TARGET_COLUMN};
pub use preparer::{
    prepare, prepare_default, DatasetPreparer, ErrorKind, PrepareError, PreparedData,
    DEFAULT_DATA_PATH,
};
pub use split::{SplitError, SplitIndices, StratifiedSplitter, RANDOM_STATE, TEST_SIZE};
pub use stats::{column_summary, ScalerError, StandardScaler};
