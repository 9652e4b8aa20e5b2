//! Train/test partitioning of a dataset.

use crate::features::Dataset;
use crate::rng::RngHierarchy;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("test ratio must be strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),

    #[error("{rows} row(s) cannot be split into non-empty train and test sets at ratio {ratio}")]
    TooFewRows { rows: usize, ratio: f64 },
}

/// How rows are assigned to the partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Oldest rows train, newest rows test.
    #[default]
    Chronological,
    /// Rows are shuffled with a seeded RNG before cutting.
    Shuffled { seed: u64 },
}

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Rows reserved for testing: ceil(ratio * rows), ignoring float noise in the product.
pub fn test_size(rows: usize, test_ratio: f64) -> usize {
    (test_ratio * rows as f64 - 1e-9).ceil().max(0.0) as usize
}

/// Split `dataset` so that `ceil(test_ratio * len)` rows land in the test set.
///
/// Both partitions keep date order, whatever the policy.
pub fn train_test_split(
    dataset: &Dataset,
    test_ratio: f64,
    policy: SplitPolicy,
) -> Result<TrainTestSplit, SplitError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(SplitError::InvalidRatio(test_ratio));
    }
    let rows = dataset.len();
    let n_test = test_size(rows, test_ratio);
    if n_test == 0 || n_test >= rows {
        return Err(SplitError::TooFewRows {
            rows,
            ratio: test_ratio,
        });
    }

    let mut order: Vec<usize> = (0..rows).collect();
    if let SplitPolicy::Shuffled { seed } = policy {
        let mut rng = RngHierarchy::new(seed).rng_for("split", "rows");
        order.shuffle(&mut rng);
    }

    let (train_idx, test_idx) = order.split_at(rows - n_test);
    let mut train_idx = train_idx.to_vec();
    let mut test_idx = test_idx.to_vec();
    train_idx.sort_unstable();
    test_idx.sort_unstable();

    Ok(TrainTestSplit {
        train: dataset.select(&train_idx),
        test: dataset.select(&test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn dataset(n: usize) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Dataset {
            feature_names: vec!["x".into()],
            dates: (0..n).map(|i| start + Duration::days(i as i64)).collect(),
            features: (0..n).map(|i| vec![i as f64]).collect(),
            target: (0..n).map(|i| i as f64 * 2.0).collect(),
        }
    }

    #[test]
    fn chronological_holds_out_the_newest_rows() {
        let split = train_test_split(&dataset(10), 0.2, SplitPolicy::Chronological).unwrap();
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.target, vec![16.0, 18.0]);
        assert!(split.train.dates.last() < split.test.dates.first());
    }

    #[test]
    fn shuffled_is_reproducible_and_partitions_everything() {
        let ds = dataset(50);
        let policy = SplitPolicy::Shuffled { seed: 42 };
        let a = train_test_split(&ds, 0.2, policy).unwrap();
        let b = train_test_split(&ds, 0.2, policy).unwrap();
        assert_eq!(a.test.dates, b.test.dates);
        assert_eq!(a.test.len(), 10);

        let mut all: Vec<_> = a.train.dates.iter().chain(&a.test.dates).copied().collect();
        all.sort();
        assert_eq!(all, ds.dates);
        assert!(a.test.dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_bad_ratios() {
        for ratio in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                train_test_split(&dataset(10), ratio, SplitPolicy::Chronological),
                Err(SplitError::InvalidRatio(_))
            ));
        }
    }

    #[test]
    fn rejects_degenerate_partitions() {
        assert!(matches!(
            train_test_split(&dataset(1), 0.5, SplitPolicy::Chronological),
            Err(SplitError::TooFewRows { rows: 1, .. })
        ));
        assert!(train_test_split(&dataset(0), 0.2, SplitPolicy::Chronological).is_err());
    }

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(10, 0.2), 2);
        assert_eq!(test_size(11, 0.2), 3);
        assert_eq!(test_size(10, 0.3), 3);
    }
}
