//! Diabetes Prep - prepares the default dataset and reports the result.

use anyhow::Context;
use diabetes_prep::{DatasetPreparer, DEFAULT_DATA_PATH};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let prepared = DatasetPreparer::new()
        .prepare_default()
        .with_context(|| format!("Failed to prepare {DEFAULT_DATA_PATH}"))?;

    let positives = |y: &ndarray::Array1<i64>| y.iter().filter(|&&v| v == 1).count();
    info!(
        train_rows = prepared.x_train.nrows(),
        test_rows = prepared.x_test.nrows(),
        train_positive = positives(&prepared.y_train),
        test_positive = positives(&prepared.y_test),
        "Split complete"
    );

    let scaler = &prepared.scaler;
    for (j, name) in prepared.feature_names.iter().enumerate() {
        info!(
            feature = %name,
            mean = scaler.mean()[j],
            scale = scaler.scale()[j],
            "Scaler parameters"
        );
    }

    Ok(())
}
