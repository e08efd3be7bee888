//! Min-max feature whitening
//!
//! Statistics are computed once from the training set and retained so
//! that future query vectors go through the exact same transform. A
//! vector is never whitened twice: training features are stored in
//! whitened form and queries are whitened exactly once at entry.

use serde::{Deserialize, Serialize};

/// Per-dimension (min, max) statistics for min-max whitening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteningStats {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl WhiteningStats {
    /// Compute per-dimension min and max over a training set.
    ///
    /// Callers must have validated that `features` is non-empty and
    /// that all vectors share the same dimension.
    pub fn fit(features: &[Vec<f64>]) -> Self {
        let dim = features[0].len();
        let mut min = vec![f64::INFINITY; dim];
        let mut max = vec![f64::NEG_INFINITY; dim];

        for row in features {
            for (j, &v) in row.iter().enumerate() {
                if v < min[j] {
                    min[j] = v;
                }
                if v > max[j] {
                    max[j] = v;
                }
            }
        }

        Self { min, max }
    }

    /// Map each component into [0, 1] using the fitted range.
    ///
    /// A zero-range dimension (max == min) carries no information for
    /// the classifier, so it maps to 0 instead of dividing by zero.
    pub fn apply(&self, v: &[f64]) -> Vec<f64> {
        v.iter()
            .enumerate()
            .map(|(j, &x)| {
                let range = self.max[j] - self.min[j];
                if range == 0.0 {
                    0.0
                } else {
                    (x - self.min[j]) / range
                }
            })
            .collect()
    }

    /// Whiten a whole set of vectors
    pub fn apply_all(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>> {
        features.iter().map(|v| self.apply(v)).collect()
    }

    /// Number of dimensions the stats were fitted on
    pub fn dim(&self) -> usize {
        self.min.len()
    }
}
