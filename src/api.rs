//! High-level classifier API
//!
//! An [`Svm`] starts out untrained, becomes `Trained` through
//! [`Svm::train`], or `Loaded` through [`Svm::load`] from an exported
//! [`Model`]. Both terminal states permit prediction; a failed training
//! run leaves the previous state untouched.
//!
//! # Quick start
//!
//! ```rust
//! use smosvm::{Svm, RandomPair};
//!
//! # fn main() -> smosvm::Result<()> {
//! let x = vec![vec![0.0, 1.0], vec![4.0, 6.0], vec![2.0, 0.0]];
//! let y = vec![-1.0, 1.0, -1.0];
//!
//! let mut svm = Svm::new().with_tol(0.01);
//! svm.train_with(&x, &y, &mut RandomPair::seeded(1))?;
//!
//! let prediction = svm.predict(&[2.0, 6.0])?;
//! assert_eq!(prediction.label, 1.0);
//! # Ok(())
//! # }
//! ```

use log::info;

use crate::core::{Prediction, Result, SupportVector, SvmError, SvmParams, TrainReport};
use crate::kernel::{dot, KernelKind};
use crate::persistence::{Model, ModelMetadata, Representation};
use crate::solver::{PairSelector, RandomPair, SmoSolver};
use crate::whitening::WhiteningStats;

/// Lifecycle phase of a classifier instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Untrained,
    Trained,
    Loaded,
}

/// Decision surface: explicit weights for the linear kernel, the
/// retained dual form for everything else.
#[derive(Debug, Clone)]
enum Decider {
    Weights(Vec<f64>),
    Dual(Vec<SupportVector>),
}

/// Everything needed to evaluate the decision function
#[derive(Debug, Clone)]
struct Decision {
    bias: f64,
    whitening: Option<WhiteningStats>,
    decider: Decider,
    /// Support vectors of a freshly trained linear model. A loaded
    /// linear model carries none; querying them is an error.
    trained_vectors: Option<Vec<SupportVector>>,
}

impl Decision {
    fn query_dim(&self) -> Option<usize> {
        match &self.decider {
            Decider::Weights(w) => Some(w.len()),
            Decider::Dual(svs) => svs.first().map(|sv| sv.features.len()),
        }
    }

    fn margin(&self, kernel: KernelKind, x: &[f64]) -> Result<f64> {
        let expected = self
            .query_dim()
            .or_else(|| self.whitening.as_ref().map(WhiteningStats::dim));
        if let Some(dim) = expected {
            if x.len() != dim {
                return Err(SvmError::InvalidInput(format!(
                    "query has dimension {}, model expects {dim}",
                    x.len()
                )));
            }
        }

        let whitened;
        let x: &[f64] = match &self.whitening {
            Some(stats) => {
                whitened = stats.apply(x);
                &whitened
            }
            None => x,
        };

        Ok(match &self.decider {
            Decider::Weights(w) => self.bias + dot(w, x),
            Decider::Dual(svs) => {
                let mut sum = self.bias;
                for sv in svs {
                    sum += sv.alpha * sv.label * kernel.compute(x, &sv.features);
                }
                sum
            }
        })
    }

    fn support_vectors(&self) -> Option<&[SupportVector]> {
        match &self.decider {
            Decider::Dual(svs) => Some(svs),
            Decider::Weights(_) => self.trained_vectors.as_deref(),
        }
    }
}

/// Binary SVM classifier driven by simplified SMO
#[derive(Debug, Clone)]
pub struct Svm {
    params: SvmParams,
    state: State,
}

#[derive(Debug, Clone)]
enum State {
    Untrained,
    Trained(Decision),
    Loaded(Decision),
}

impl State {
    fn decision(&self) -> Result<&Decision> {
        match self {
            State::Trained(d) | State::Loaded(d) => Ok(d),
            State::Untrained => Err(SvmError::InvalidState(
                "model is neither trained nor loaded",
            )),
        }
    }
}

impl Default for Svm {
    fn default() -> Self {
        Self::new()
    }
}

impl Svm {
    /// Create an untrained classifier with default parameters
    pub fn new() -> Self {
        Self::with_params(SvmParams::default())
    }

    /// Create an untrained classifier with explicit parameters
    pub fn with_params(params: SvmParams) -> Self {
        Self {
            params,
            state: State::Untrained,
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.params.c = c;
        self
    }

    /// Set the optimality tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.params.tol = tol;
        self
    }

    /// Set the alpha-retention tolerance used by pruning
    pub fn with_alpha_tol(mut self, alpha_tol: f64) -> Self {
        self.params.alpha_tol = alpha_tol;
        self
    }

    /// Set the stalled-pass target for convergence
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.params.max_passes = max_passes;
        self
    }

    /// Set the hard sweep cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.params.max_iterations = max_iterations;
        self
    }

    /// Select the kernel
    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.params.kernel = kernel;
        self
    }

    /// Enable or disable min-max whitening
    pub fn with_whitening(mut self, whitening: bool) -> Self {
        self.params.whitening = whitening;
        self
    }

    /// Current parameters
    pub fn params(&self) -> &SvmParams {
        &self.params
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Untrained => Phase::Untrained,
            State::Trained(_) => Phase::Trained,
            State::Loaded(_) => Phase::Loaded,
        }
    }

    /// Train with an entropy-seeded random pair selector.
    ///
    /// See [`Svm::train_with`] for the reproducible variant.
    pub fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainReport> {
        self.train_with(x, y, &mut RandomPair::from_entropy())
    }

    /// Train on a feature matrix and labels in {-1, +1}.
    ///
    /// On success the instance moves to `Trained`, replacing any prior
    /// state wholesale. On failure the prior state is left untouched.
    pub fn train_with<S: PairSelector>(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        selector: &mut S,
    ) -> Result<TrainReport> {
        validate_training_set(x, y)?;

        let (whitening, x_whitened) = if self.params.whitening {
            let stats = WhiteningStats::fit(x);
            let whitened = stats.apply_all(x);
            (Some(stats), whitened)
        } else {
            (None, x.to_vec())
        };

        let solved = SmoSolver::new(&x_whitened, y, &self.params).solve(selector)?;

        let vectors: Vec<SupportVector> = solved
            .alpha
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > self.params.alpha_tol)
            .map(|(i, &a)| SupportVector {
                features: x_whitened[i].clone(),
                label: y[i],
                alpha: a,
                index: i,
            })
            .collect();
        let n_support_vectors = vectors.len();

        // The linear kernel collapses the dual form into an explicit
        // weight vector, summed over all examples, pruned or not.
        let (decider, trained_vectors) = if self.params.kernel.is_linear() {
            let dim = x_whitened[0].len();
            let mut weights = vec![0.0; dim];
            for (row, (&a, &label)) in x_whitened.iter().zip(solved.alpha.iter().zip(y)) {
                for (w, &v) in weights.iter_mut().zip(row) {
                    *w += label * a * v;
                }
            }
            (Decider::Weights(weights), Some(vectors))
        } else {
            (Decider::Dual(vectors), None)
        };

        info!(
            "training converged after {} sweeps with {} support vectors",
            solved.sweeps, n_support_vectors
        );

        self.state = State::Trained(Decision {
            bias: solved.bias,
            whitening,
            decider,
            trained_vectors,
        });

        Ok(TrainReport {
            sweeps: solved.sweeps,
            n_support_vectors,
        })
    }

    /// Decision margin for a single query vector
    pub fn margin(&self, x: &[f64]) -> Result<f64> {
        self.state.decision()?.margin(self.params.kernel, x)
    }

    /// Decision margins for a collection of query vectors
    pub fn margin_batch(&self, xs: &[Vec<f64>]) -> Result<Vec<f64>> {
        xs.iter().map(|x| self.margin(x)).collect()
    }

    /// Predict the class of a single query vector.
    ///
    /// A margin of exactly zero maps to +1; zero is not a distinct
    /// class.
    pub fn predict(&self, x: &[f64]) -> Result<Prediction> {
        let margin = self.margin(x)?;
        let label = if margin >= 0.0 { 1.0 } else { -1.0 };
        Ok(Prediction::new(label, margin))
    }

    /// Predict the classes of a collection of query vectors
    pub fn predict_batch(&self, xs: &[Vec<f64>]) -> Result<Vec<Prediction>> {
        xs.iter().map(|x| self.predict(x)).collect()
    }

    /// Fraction of labeled examples this model classifies correctly
    pub fn evaluate(&self, xs: &[Vec<f64>], ys: &[f64]) -> Result<f64> {
        if xs.len() != ys.len() {
            return Err(SvmError::InvalidInput(format!(
                "feature and label counts differ: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(SvmError::InvalidInput("empty evaluation set".to_string()));
        }

        let predictions = self.predict_batch(xs)?;
        let correct = predictions
            .iter()
            .zip(ys)
            .filter(|(pred, &label)| pred.label == label)
            .count();
        Ok(correct as f64 / ys.len() as f64)
    }

    /// Threshold of the decision function
    pub fn bias(&self) -> Result<f64> {
        Ok(self.state.decision()?.bias)
    }

    /// Explicit weight vector, present for linear-kernel models only
    pub fn weights(&self) -> Option<&[f64]> {
        match &self.state {
            State::Trained(d) | State::Loaded(d) => match &d.decider {
                Decider::Weights(w) => Some(w),
                Decider::Dual(_) => None,
            },
            State::Untrained => None,
        }
    }

    /// Retained support vectors.
    ///
    /// Available on any trained model and on loaded dual-form models.
    /// A loaded linear model was persisted as a weight vector and has
    /// no support vectors to return.
    pub fn support_vectors(&self) -> Result<&[SupportVector]> {
        self.state.decision()?.support_vectors().ok_or(
            SvmError::InvalidState("linear model loaded without support vectors"),
        )
    }

    /// Alphas of the retained support vectors
    pub fn alphas(&self) -> Result<Vec<f64>> {
        Ok(self.support_vectors()?.iter().map(|sv| sv.alpha).collect())
    }

    /// Original training-set indices of the retained support vectors
    pub fn support_vector_indices(&self) -> Result<Vec<usize>> {
        Ok(self.support_vectors()?.iter().map(|sv| sv.index).collect())
    }

    /// Snapshot the minimal state needed to predict without retraining.
    ///
    /// Linear models export their weight vector; all other kernels
    /// export the retained support-vector set.
    pub fn export(&self) -> Result<Model> {
        let decision = self.state.decision()?;

        let (representation, n_support_vectors) = match &decision.decider {
            Decider::Weights(w) => (
                Representation::Weights(w.clone()),
                decision.trained_vectors.as_ref().map_or(0, Vec::len),
            ),
            Decider::Dual(svs) => (Representation::SupportVectors(svs.clone()), svs.len()),
        };

        Ok(Model {
            options: self.params.clone(),
            bias: decision.bias,
            whitening: decision.whitening.clone(),
            representation,
            metadata: ModelMetadata::current(n_support_vectors),
        })
    }

    /// Reconstruct a classifier in `Loaded` state from an exported
    /// model, without the original training set.
    pub fn load(model: Model) -> Self {
        let decider = match model.representation {
            Representation::Weights(w) => Decider::Weights(w),
            Representation::SupportVectors(svs) => Decider::Dual(svs),
        };

        Self {
            params: model.options,
            state: State::Loaded(Decision {
                bias: model.bias,
                whitening: model.whitening,
                decider,
                trained_vectors: None,
            }),
        }
    }
}

fn validate_training_set(x: &[Vec<f64>], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(SvmError::InvalidInput(format!(
            "feature and label counts differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(SvmError::InvalidInput(format!(
            "training needs at least 2 examples, got {}",
            x.len()
        )));
    }

    let dim = x[0].len();
    if dim == 0 {
        return Err(SvmError::InvalidInput(
            "feature vectors must not be empty".to_string(),
        ));
    }
    for (i, row) in x.iter().enumerate() {
        if row.len() != dim {
            return Err(SvmError::InvalidInput(format!(
                "example {i} has dimension {}, expected {dim}",
                row.len()
            )));
        }
    }

    for (i, &label) in y.iter().enumerate() {
        if label != 1.0 && label != -1.0 {
            return Err(SvmError::InvalidInput(format!(
                "label {i} is {label}, expected -1 or +1"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            vec![vec![0.0, 1.0], vec![4.0, 6.0], vec![2.0, 0.0]],
            vec![-1.0, 1.0, -1.0],
        )
    }

    #[test]
    fn test_builder_pattern() {
        let svm = Svm::new()
            .with_c(2.0)
            .with_tol(0.01)
            .with_max_passes(50)
            .with_max_iterations(5000)
            .with_whitening(true);

        assert_eq!(svm.params().c, 2.0);
        assert_eq!(svm.params().tol, 0.01);
        assert_eq!(svm.params().max_passes, 50);
        assert_eq!(svm.params().max_iterations, 5000);
        assert!(svm.params().whitening);
        assert_eq!(svm.phase(), Phase::Untrained);
    }

    #[test]
    fn test_linear_separability() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01);
        let report = svm
            .train_with(&x, &y, &mut RandomPair::seeded(1))
            .expect("training should succeed");

        assert_eq!(svm.phase(), Phase::Trained);
        assert!(report.n_support_vectors > 0);
        assert_eq!(svm.predict(&[2.0, 6.0]).unwrap().label, 1.0);
    }

    #[test]
    fn test_trained_linear_model_exposes_support_vectors() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01);
        svm.train_with(&x, &y, &mut RandomPair::seeded(1)).unwrap();

        assert!(svm.weights().is_some());
        let indices = svm.support_vector_indices().unwrap();
        assert!(!indices.is_empty());
        assert!(indices.iter().all(|&i| i < x.len()));
        assert_eq!(svm.alphas().unwrap().len(), indices.len());
    }

    #[test]
    fn test_predict_before_training_fails() {
        let svm = Svm::new();
        assert!(matches!(
            svm.predict(&[1.0, 2.0]).unwrap_err(),
            SvmError::InvalidState(_)
        ));
        assert!(matches!(
            svm.margin(&[1.0, 2.0]).unwrap_err(),
            SvmError::InvalidState(_)
        ));
        assert!(matches!(svm.export().unwrap_err(), SvmError::InvalidState(_)));
    }

    #[test]
    fn test_train_rejects_invalid_input() {
        let mut svm = Svm::new();

        // Length mismatch
        let err = svm
            .train_with(
                &[vec![1.0], vec![2.0]],
                &[1.0],
                &mut RandomPair::seeded(0),
            )
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidInput(_)));

        // Too few examples
        let err = svm
            .train_with(&[vec![1.0]], &[1.0], &mut RandomPair::seeded(0))
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidInput(_)));

        // Ragged dimensions
        let err = svm
            .train_with(
                &[vec![1.0, 2.0], vec![3.0]],
                &[1.0, -1.0],
                &mut RandomPair::seeded(0),
            )
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidInput(_)));

        // Label outside {-1, +1}
        let err = svm
            .train_with(
                &[vec![1.0], vec![2.0]],
                &[1.0, 0.0],
                &mut RandomPair::seeded(0),
            )
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidInput(_)));

        assert_eq!(svm.phase(), Phase::Untrained);
    }

    #[test]
    fn test_failed_training_preserves_prior_state() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01);
        svm.train_with(&x, &y, &mut RandomPair::seeded(1)).unwrap();
        let before = svm.margin(&[2.0, 6.0]).unwrap();

        // Sweep cap of 1 cannot reach the stalled-pass target.
        svm.params.max_iterations = 1;
        let err = svm
            .train_with(&x, &y, &mut RandomPair::seeded(1))
            .unwrap_err();
        assert!(matches!(err, SvmError::NonConvergent { .. }));

        // Previous trained state is still installed and unchanged.
        assert_eq!(svm.phase(), Phase::Trained);
        assert_eq!(svm.margin(&[2.0, 6.0]).unwrap(), before);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01);
        svm.train_with(&x, &y, &mut RandomPair::seeded(1)).unwrap();

        assert!(matches!(
            svm.predict(&[1.0]).unwrap_err(),
            SvmError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01).with_whitening(true);
        svm.train_with(&x, &y, &mut RandomPair::seeded(1)).unwrap();

        let query = [2.0, 6.0];
        let first = svm.margin(&query).unwrap();
        let second = svm.margin(&query).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_determinism_across_instances() {
        let (x, y) = separable();

        let mut a = Svm::new().with_tol(0.01);
        a.train_with(&x, &y, &mut RandomPair::seeded(42)).unwrap();
        let mut b = Svm::new().with_tol(0.01);
        b.train_with(&x, &y, &mut RandomPair::seeded(42)).unwrap();

        assert_eq!(a.bias().unwrap(), b.bias().unwrap());
        assert_eq!(a.alphas().unwrap(), b.alphas().unwrap());
        assert_eq!(a.weights(), b.weights());
        for row in &x {
            assert_eq!(a.margin(row).unwrap(), b.margin(row).unwrap());
        }
    }

    #[test]
    fn test_evaluate_accuracy() {
        let (x, y) = separable();
        let mut svm = Svm::new().with_tol(0.01);
        svm.train_with(&x, &y, &mut RandomPair::seeded(1)).unwrap();

        let accuracy = svm.evaluate(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert!(accuracy >= 2.0 / 3.0);
    }
}
