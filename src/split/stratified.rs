//! Stratified Split Module
//! Deterministic train/test partitioning that preserves class proportions.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Fraction of rows assigned to the test partition.
pub const TEST_SIZE: f64 = 0.2;

/// Seed for the split's random number generator.
pub const RANDOM_STATE: u64 = 42;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error("Cannot split an empty dataset")]
    Empty,
    #[error("test_size must lie strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),
    #[error("Class {label} has {count} row(s); at least 2 are needed to stratify")]
    ClassTooSmall { label: i64, count: usize },
    #[error("{partition} partition of {size} row(s) cannot hold all {classes} classes")]
    PartitionTooSmall {
        partition: &'static str,
        size: usize,
        classes: usize,
    },
}

/// Row indices assigned to each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified shuffle split with a fixed test fraction and seed.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSplitter {
    test_size: f64,
    seed: u64,
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        Self {
            test_size: TEST_SIZE,
            seed: RANDOM_STATE,
        }
    }
}

impl StratifiedSplitter {
    /// Splitter with a custom test fraction and seed.
    pub fn new(test_size: f64, seed: u64) -> Result<Self, SplitError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(SplitError::InvalidTestSize(test_size));
        }
        Ok(Self { test_size, seed })
    }

    /// Partition sizes `(n_train, n_test)` for `n_rows` rows; the test side rounds up.
    pub fn split_sizes(&self, n_rows: usize) -> (usize, usize) {
        let n_test = ((self.test_size * n_rows as f64).ceil() as usize).min(n_rows);
        (n_rows - n_test, n_test)
    }

    /// Assign every row index to train or test according to its label.
    pub fn split(&self, labels: &[i64]) -> Result<SplitIndices, SplitError> {
        if labels.is_empty() {
            return Err(SplitError::Empty);
        }

        // Row indices per class, classes in ascending label order
        let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (row, &label) in labels.iter().enumerate() {
            classes.entry(label).or_default().push(row);
        }

        if let Some((&label, rows)) = classes.iter().find(|(_, rows)| rows.len() < 2) {
            return Err(SplitError::ClassTooSmall {
                label,
                count: rows.len(),
            });
        }

        let (n_train, n_test) = self.split_sizes(labels.len());
        let n_classes = classes.len();
        for (partition, size) in [("Train", n_train), ("Test", n_test)] {
            if size < n_classes {
                return Err(SplitError::PartitionTooSmall {
                    partition,
                    size,
                    classes: n_classes,
                });
            }
        }

        let class_counts: Vec<usize> = classes.values().map(Vec::len).collect();
        let train_counts = approximate_mode(&class_counts, n_train);
        let remaining: Vec<usize> = class_counts
            .iter()
            .zip(&train_counts)
            .map(|(total, train)| total - train)
            .collect();
        let test_counts = approximate_mode(&remaining, n_test);

        debug!(
            ?class_counts,
            ?train_counts,
            ?test_counts,
            "Stratified allocation"
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);

        for (i, mut rows) in classes.into_values().enumerate() {
            rows.shuffle(&mut rng);
            let (n_i, t_i) = (train_counts[i], test_counts[i]);
            train.extend_from_slice(&rows[..n_i]);
            test.extend_from_slice(&rows[n_i..n_i + t_i]);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok(SplitIndices { train, test })
    }
}

/// Allocate `n_draws` rows across classes proportionally to `class_counts`.
///
/// Each class first gets the floor of its exact share; leftover draws go to the
/// classes with the largest remainders, lower class index first on ties.
pub(crate) fn approximate_mode(class_counts: &[usize], n_draws: usize) -> Vec<usize> {
    let total: usize = class_counts.iter().sum();
    if total == 0 {
        return vec![0; class_counts.len()];
    }

    let mut allocated: Vec<usize> = class_counts
        .iter()
        .map(|&c| c * n_draws / total)
        .collect();

    let mut need = n_draws.saturating_sub(allocated.iter().sum());
    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    // Stable sort keeps index order among equal remainders
    order.sort_by_key(|&i| std::cmp::Reverse(class_counts[i] * n_draws % total));

    for i in order {
        if need == 0 {
            break;
        }
        if allocated[i] < class_counts[i] {
            allocated[i] += 1;
            need -= 1;
        }
    }

    allocated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(zeros: usize, ones: usize) -> Vec<i64> {
        // Interleave so class membership is not sorted by row
        let n = zeros + ones;
        (0..n).map(|i| i64::from((i * ones) % n < ones)).collect()
    }

    fn count(labels: &[i64], rows: &[usize], label: i64) -> usize {
        rows.iter().filter(|&&r| labels[r] == label).count()
    }

    #[test]
    fn test_approximate_mode_largest_remainder() {
        // 500 * 614 / 768 = 399.74, 268 * 614 / 768 = 214.26
        assert_eq!(approximate_mode(&[500, 268], 614), vec![400, 214]);
        assert_eq!(approximate_mode(&[100, 54], 154), vec![100, 54]);
    }

    #[test]
    fn test_approximate_mode_ties_prefer_lower_index() {
        assert_eq!(approximate_mode(&[1, 1, 1], 2), vec![1, 1, 0]);
    }

    #[test]
    fn test_split_sizes_round_test_up() {
        let splitter = StratifiedSplitter::default();
        assert_eq!(splitter.split_sizes(768), (614, 154));
        assert_eq!(splitter.split_sizes(10), (8, 2));
        assert_eq!(splitter.split_sizes(11), (8, 3));
    }

    #[test]
    fn test_diabetes_sized_split() {
        let y = labels(500, 268);
        assert_eq!(y.iter().filter(|&&l| l == 1).count(), 268);

        let split = StratifiedSplitter::default().split(&y).unwrap();
        assert_eq!(split.train.len(), 614);
        assert_eq!(split.test.len(), 154);
        assert_eq!(count(&y, &split.test, 0), 100);
        assert_eq!(count(&y, &split.test, 1), 54);
        assert_eq!(count(&y, &split.train, 0), 400);
        assert_eq!(count(&y, &split.train, 1), 214);
    }

    #[test]
    fn test_partitions_are_disjoint_and_cover_all_rows() {
        let y = labels(37, 23);
        let split = StratifiedSplitter::default().split(&y).unwrap();

        let train: HashSet<_> = split.train.iter().copied().collect();
        let test: HashSet<_> = split.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), y.len());
    }

    /// Every class in every partition stays within one row of its exact share.
    fn assert_within_one_row(y: &[i64], split: &SplitIndices) {
        let n = y.len() as f64;
        let mut labels: Vec<i64> = y.to_vec();
        labels.sort_unstable();
        labels.dedup();

        for rows in [&split.train, &split.test] {
            for &label in &labels {
                let total = y.iter().filter(|&&l| l == label).count() as f64;
                let share = total * rows.len() as f64 / n;
                let got = count(y, rows, label) as f64;
                assert!(
                    (got - share).abs() <= 1.0,
                    "label {label}: {got} rows against share {share:.2} of {}",
                    rows.len()
                );
            }
        }
    }

    #[test]
    fn test_uneven_classes_stay_within_one_row() {
        for (zeros, ones) in [(37, 23), (101, 9), (55, 45), (13, 7), (250, 3), (64, 63)] {
            let y = labels(zeros, ones);
            let split = StratifiedSplitter::default().split(&y).unwrap();
            assert_within_one_row(&y, &split);
        }
    }

    #[test]
    fn test_three_classes_stay_within_one_row() {
        let y: Vec<i64> = [(0, 50), (1, 31), (2, 17)]
            .into_iter()
            .flat_map(|(label, n)| std::iter::repeat(label).take(n))
            .collect();
        let split = StratifiedSplitter::default().split(&y).unwrap();

        assert_eq!(split.train.len() + split.test.len(), y.len());
        assert_within_one_row(&y, &split);
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels(50, 30);
        let a = StratifiedSplitter::default().split(&y).unwrap();
        let b = StratifiedSplitter::default().split(&y).unwrap();
        assert_eq!(a, b);

        let c = StratifiedSplitter::new(TEST_SIZE, 7).unwrap().split(&y).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_singleton_class_rejected() {
        let y = vec![0, 0, 0, 0, 1];
        let err = StratifiedSplitter::default().split(&y).unwrap_err();
        assert_eq!(err, SplitError::ClassTooSmall { label: 1, count: 1 });
    }

    #[test]
    fn test_partition_too_small_for_classes() {
        // 4 rows -> 1 test row, two classes
        let y = vec![0, 0, 1, 1];
        let err = StratifiedSplitter::default().split(&y).unwrap_err();
        assert!(matches!(err, SplitError::PartitionTooSmall { partition: "Test", size: 1, classes: 2 }));
    }

    #[test]
    fn test_empty_and_invalid_inputs() {
        assert_eq!(
            StratifiedSplitter::default().split(&[]).unwrap_err(),
            SplitError::Empty
        );
        assert!(StratifiedSplitter::new(1.0, RANDOM_STATE).is_err());
        assert!(StratifiedSplitter::new(0.0, RANDOM_STATE).is_err());
    }
}
