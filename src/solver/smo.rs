//! Simplified Sequential Minimal Optimization
//!
//! Coordinate ascent on the SVM dual problem, two multipliers at a
//! time. The first index comes from a sweep over every example; the
//! second is drawn through the injected [`PairSelector`]. Each pair
//! update preserves the dual equality constraint
//! `alpha_i * y_i + alpha_j * y_j = const`, and every multiplier stays
//! inside the box `[0, C]` after clipping.

use log::{debug, trace};

use crate::core::{Result, SvmError, SvmParams};
use crate::kernel::Gram;
use crate::solver::PairSelector;

/// Bounds closer than this leave no feasible move for a pair.
const BOUND_EPS: f64 = 1e-4;

/// Raw optimizer output, before pruning
#[derive(Debug, Clone)]
pub struct SmoResult {
    /// One Lagrange multiplier per training example, each in `[0, C]`
    pub alpha: Vec<f64>,
    /// Threshold of the decision function
    pub bias: f64,
    /// Total sweeps performed over the training set
    pub sweeps: usize,
}

/// SMO solver over a fixed training set
pub struct SmoSolver<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a SvmParams,
}

impl<'a> SmoSolver<'a> {
    /// Create a solver over already-validated (and whitened) features.
    pub fn new(x: &'a [Vec<f64>], y: &'a [f64], params: &'a SvmParams) -> Self {
        Self { x, y, params }
    }

    /// Run the optimizer until `max_passes` consecutive sweeps change
    /// no pair.
    ///
    /// Fails with `NonConvergent` when the total sweep count reaches
    /// `max_iterations` first; no partial result is returned.
    pub fn solve<S: PairSelector>(&self, selector: &mut S) -> Result<SmoResult> {
        let n = self.y.len();
        let gram = Gram::compute(self.x, self.params.kernel);

        let mut alpha = vec![0.0; n];
        let mut bias = 0.0;
        let mut stalled = 0;
        let mut sweeps = 0;

        while stalled < self.params.max_passes {
            if sweeps >= self.params.max_iterations {
                return Err(SvmError::NonConvergent { sweeps });
            }

            let changed = self.sweep(&gram, &mut alpha, &mut bias, selector);
            sweeps += 1;
            if changed == 0 {
                stalled += 1;
            } else {
                stalled = 0;
            }
            trace!("sweep {sweeps}: {changed} pairs changed, {stalled} stalled");
        }

        debug!("converged after {sweeps} sweeps, bias = {bias:.6}");
        Ok(SmoResult {
            alpha,
            bias,
            sweeps,
        })
    }

    /// Dual-form decision value for training example `i`
    fn dual_margin(&self, gram: &Gram, alpha: &[f64], bias: f64, i: usize) -> f64 {
        let mut sum = bias;
        for t in 0..alpha.len() {
            sum += alpha[t] * self.y[t] * gram.at(t, i);
        }
        sum
    }

    /// One full pass over the training set; returns the number of pairs
    /// that actually moved.
    fn sweep<S: PairSelector>(
        &self,
        gram: &Gram,
        alpha: &mut [f64],
        bias: &mut f64,
        selector: &mut S,
    ) -> usize {
        let n = alpha.len();
        let c = self.params.c;
        let mut changed = 0;

        for i in 0..n {
            let e_i = self.dual_margin(gram, alpha, *bias, i) - self.y[i];
            let r_i = self.y[i] * e_i;
            let violates = (r_i < -self.params.tol && alpha[i] < c)
                || (r_i > self.params.tol && alpha[i] > 0.0);
            if !violates {
                continue;
            }

            let j = selector.pick(n, i);
            let e_j = self.dual_margin(gram, alpha, *bias, j) - self.y[j];
            let a_i = alpha[i];
            let a_j = alpha[j];

            let (low, high) = if self.y[i] == self.y[j] {
                ((a_i + a_j - c).max(0.0), (a_i + a_j).min(c))
            } else {
                ((a_j - a_i).max(0.0), (c + a_j - a_i).min(c))
            };
            if (low - high).abs() < BOUND_EPS {
                trace!("pair ({i}, {j}): degenerate bounds, skipped");
                continue;
            }

            // eta must be negative for a valid ascent step; a
            // non-negative value is a local numeric degeneracy.
            let eta = 2.0 * gram.at(i, j) - gram.at(i, i) - gram.at(j, j);
            if eta >= 0.0 {
                trace!("pair ({i}, {j}): eta = {eta:.3e}, skipped");
                continue;
            }

            let new_a_j = (a_j - self.y[j] * (e_i - e_j) / eta).clamp(low, high);
            if (new_a_j - a_j).abs() < self.params.min_alpha_step {
                continue;
            }

            // The equality constraint ties the two multipliers together.
            let new_a_i = a_i + self.y[i] * self.y[j] * (a_j - new_a_j);
            alpha[i] = new_a_i;
            alpha[j] = new_a_j;

            let d_i = new_a_i - a_i;
            let d_j = new_a_j - a_j;
            let b1 = *bias
                - e_i
                - self.y[i] * d_i * gram.at(i, i)
                - self.y[j] * d_j * gram.at(i, j);
            let b2 = *bias
                - e_j
                - self.y[i] * d_i * gram.at(i, j)
                - self.y[j] * d_j * gram.at(j, j);

            // Prefer the stationarity condition at whichever multiplier
            // is strictly interior, i first; otherwise average.
            *bias = if new_a_i > 0.0 && new_a_i < c {
                b1
            } else if new_a_j > 0.0 && new_a_j < c {
                b2
            } else {
                (b1 + b2) / 2.0
            };

            changed += 1;
        }

        changed
    }
}
