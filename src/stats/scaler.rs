//! Standard Scaler Module
//! Per-column standardization (zero mean, unit variance) fitted on a reference matrix.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("Cannot fit a scaler on an empty {0}x{1} matrix")]
    EmptyInput(usize, usize),
    #[error("Expected {expected} feature column(s), got {found}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("Scaler serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fitted per-column standardization parameters.
///
/// `transform` maps each value to `(x - mean) / scale`. The scale is the
/// population standard deviation of the fitted column, or `1.0` for columns
/// that are constant within floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    var: Vec<f64>,
    scale: Vec<f64>,
    n_samples_seen: usize,
}

impl StandardScaler {
    /// Fit column statistics on `x` (rows are samples), one column per rayon task.
    pub fn fit(x: &Array2<f64>) -> Result<Self, ScalerError> {
        let (n_rows, n_cols) = x.dim();
        if n_rows == 0 || n_cols == 0 {
            return Err(ScalerError::EmptyInput(n_rows, n_cols));
        }

        let moments: Vec<(f64, f64)> = (0..n_cols)
            .into_par_iter()
            .map(|j| Self::column_moments(x.column(j)))
            .collect();

        let (mean, var): (Vec<f64>, Vec<f64>) = moments.into_iter().unzip();
        let scale = mean
            .iter()
            .zip(&var)
            .map(|(&m, &v)| Self::scale_for(m, v, n_rows))
            .collect();

        debug!(rows = n_rows, columns = n_cols, "Scaler fitted");

        Ok(Self {
            mean,
            var,
            scale,
            n_samples_seen: n_rows,
        })
    }

    /// Fit on `x` and return it transformed alongside the fitted scaler.
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>), ScalerError> {
        let scaler = Self::fit(x)?;
        let transformed = scaler.transform(x)?;
        Ok((scaler, transformed))
    }

    /// Standardize a matrix with the fitted parameters.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        self.check_width(x.ncols())?;
        Ok((x - &self.mean_view()) / &self.scale_view())
    }

    /// Standardize a single row, e.g. an inference input.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect())
    }

    /// Map standardized values back to the original units.
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        self.check_width(x.ncols())?;
        Ok(x * &self.scale_view() + &self.mean_view())
    }

    /// Per-column means of the fitted data.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-column population variances of the fitted data.
    pub fn var(&self) -> &[f64] {
        &self.var
    }

    /// Per-column divisors applied by `transform`.
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn to_json(&self) -> Result<String, ScalerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScalerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Mean and population variance (ddof = 0) of one column.
    fn column_moments(column: ArrayView1<f64>) -> (f64, f64) {
        let mean = column.iter().mean();
        let var = column.iter().population_variance();
        (mean, var)
    }

    /// Standard deviation, falling back to 1.0 when the column is effectively constant.
    fn scale_for(mean: f64, var: f64, n_rows: usize) -> f64 {
        let n = n_rows as f64;
        let eps = f64::EPSILON;
        // Variance below the accumulated rounding error of its own computation
        let upper_bound = n * eps * var + (n * mean * eps).powi(2);
        if var <= upper_bound || !var.is_finite() {
            1.0
        } else {
            var.sqrt()
        }
    }

    fn check_width(&self, found: usize) -> Result<(), ScalerError> {
        if found != self.n_features() {
            return Err(ScalerError::WidthMismatch {
                expected: self.n_features(),
                found,
            });
        }
        Ok(())
    }

    fn mean_view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.mean[..])
    }

    fn scale_view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.scale[..])
    }
}

/// Column means and population standard deviations of an arbitrary matrix.
pub fn column_summary(x: ArrayView2<f64>) -> Vec<(f64, f64)> {
    x.columns()
        .into_iter()
        .map(|column| {
            let (mean, var) = StandardScaler::column_moments(column);
            (mean, var.sqrt())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_fit_uses_population_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        assert_abs_diff_eq!(scaler.mean()[0], 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.var()[0], 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.scale()[1], 125.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(scaler.n_samples_seen(), 4);
    }

    #[test]
    fn test_fit_transform_standardizes_columns() {
        let x = array![[1.0, -5.0], [4.0, 0.5], [9.0, 2.0], [16.0, 7.5], [25.0, 3.0]];
        let (_, z) = StandardScaler::fit_transform(&x).unwrap();

        for (mean, std) in column_summary(z.view()) {
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_column_keeps_unit_scale() {
        let x = array![[3.3, 1.0], [3.3, 2.0], [3.3, 3.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);

        let z = scaler.transform(&x).unwrap();
        for v in z.column(0) {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let train = array![[1.0, 100.0], [3.0, 300.0], [5.0, 200.0]];
        let scaler = StandardScaler::fit(&train).unwrap();

        let unseen = array![[7.0, 50.0]];
        let z = scaler.transform(&unseen).unwrap();
        let row = scaler.transform_row(&[7.0, 50.0]).unwrap();
        assert_eq!(z.row(0).to_vec(), row);
    }

    #[test]
    fn test_inverse_transform_recovers_input() {
        let x = array![[1.0, 2.0], [3.0, 5.0], [8.0, 13.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let back = scaler
            .inverse_transform(&scaler.transform(&x).unwrap())
            .unwrap();

        for (a, b) in x.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [2.0, 3.0]]).unwrap();
        let err = scaler.transform(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, ScalerError::WidthMismatch { expected: 2, found: 3 }));
        assert!(scaler.transform_row(&[1.0]).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            StandardScaler::fit(&x),
            Err(ScalerError::EmptyInput(0, 3))
        ));
    }

    #[test]
    fn test_json_restores_identical_scaler() {
        let scaler = StandardScaler::fit(&array![[0.5, 1.0], [1.5, 4.0], [2.5, 9.0]]).unwrap();
        let restored = StandardScaler::from_json(&scaler.to_json().unwrap()).unwrap();
        assert_eq!(restored, scaler);
    }
}
