//! Dataset Module
//! In-memory feature matrix with its aligned label vector.

use super::loader::LoaderError;
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;

/// A fully loaded table: numeric features plus one integer label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    labels: Array1<i64>,
}

impl Dataset {
    /// Build a dataset, checking that names, matrix and labels line up.
    pub fn new(
        feature_names: Vec<String>,
        features: Array2<f64>,
        labels: Array1<i64>,
    ) -> Result<Self, LoaderError> {
        let (rows, cols) = features.dim();
        if rows != labels.len() || cols != feature_names.len() {
            return Err(LoaderError::ShapeMismatch {
                rows,
                cols,
                labels: labels.len(),
                names: feature_names.len(),
            });
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Feature column names in file order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<i64> {
        &self.labels
    }

    /// Row count per label, ordered by label.
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Gather the given rows (in the given order) into a new matrix and label vector.
    pub fn select_rows(&self, indices: &[usize]) -> (Array2<f64>, Array1<i64>) {
        (
            self.features.select(Axis(0), indices),
            self.labels.select(Axis(0), indices),
        )
    }

    /// Consume the dataset, returning its parts.
    pub fn into_parts(self) -> (Vec<String>, Array2<f64>, Array1<i64>) {
        (self.feature_names, self.features, self.labels)
    }
}
