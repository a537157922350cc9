//! Statistics module - feature standardization

mod scaler;

pub use scaler::{column_summary, ScalerError, StandardScaler};
