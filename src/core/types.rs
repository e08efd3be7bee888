//! Core type definitions for SVM training and prediction

use serde::{Deserialize, Serialize};

use crate::kernel::KernelKind;

/// Prediction result containing label and decision margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub margin: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, margin: f64) -> Self {
        Self { label, margin }
    }

    /// Get confidence as absolute value of the margin
    pub fn confidence(&self) -> f64 {
        self.margin.abs()
    }
}

/// A training example retained after pruning.
///
/// Features are stored in whitened form when whitening is enabled, so
/// the dual decision function can use them directly at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    /// Feature vector (whitened if whitening was enabled)
    pub features: Vec<f64>,
    /// Class label (+1 or -1)
    pub label: f64,
    /// Lagrange multiplier
    pub alpha: f64,
    /// Index of the example in the original training set
    pub index: usize,
}

/// Configuration for the SMO trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Numerical tolerance for the optimality check
    pub tol: f64,
    /// Retention tolerance: examples with alpha above this survive pruning
    pub alpha_tol: f64,
    /// Minimum change in a multiplier for a pair update to count
    pub min_alpha_step: f64,
    /// Number of consecutive stalled sweeps required for convergence
    pub max_passes: usize,
    /// Hard cap on total sweeps before training fails
    pub max_iterations: usize,
    /// Kernel used for training and prediction
    pub kernel: KernelKind,
    /// Apply min-max whitening to features before training
    pub whitening: bool,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 10.0,
            tol: 0.1,
            alpha_tol: 1e-6,
            min_alpha_step: 1e-3,
            max_passes: 100,
            max_iterations: 10_000,
            kernel: KernelKind::Linear,
            whitening: false,
        }
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    /// Total number of sweeps over the training set
    pub sweeps: usize,
    /// Number of examples retained as support vectors
    pub n_support_vectors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(1.0, 2.5);
        assert_eq!(pred.label, 1.0);
        assert_eq!(pred.margin, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::new(-1.0, -1.8);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_params_default() {
        let params = SvmParams::default();
        assert_eq!(params.c, 10.0);
        assert_eq!(params.tol, 0.1);
        assert_eq!(params.alpha_tol, 1e-6);
        assert_eq!(params.min_alpha_step, 1e-3);
        assert_eq!(params.max_passes, 100);
        assert_eq!(params.max_iterations, 10_000);
        assert_eq!(params.kernel, KernelKind::Linear);
        assert!(!params.whitening);
    }

    #[test]
    fn test_support_vector_fields() {
        let sv = SupportVector {
            features: vec![1.0, 2.0],
            label: -1.0,
            alpha: 0.5,
            index: 3,
        };
        assert_eq!(sv.features.len(), 2);
        assert_eq!(sv.index, 3);
    }
}
