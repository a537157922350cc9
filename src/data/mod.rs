//! Data module - CSV loading into an in-memory dataset

mod dataset;
mod loader;

pub use dataset::Dataset;
pub use loader::{DatasetLoader, LoaderError, TARGET_COLUMN};
