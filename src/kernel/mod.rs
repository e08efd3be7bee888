//! Kernel functions for SVM
//!
//! The kernel is a closed set of similarity functions resolved once at
//! configuration time and invoked uniformly by the trainer and the
//! predictor. All evaluations are pure and safe to run concurrently on
//! disjoint data.

use serde::{Deserialize, Serialize};

use crate::core::{Result, SvmError};

/// Kernel selection with its parameter baked in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelKind {
    /// K(x, y) = x . y
    Linear,
    /// K(x, y) = (x . y + 1)^degree
    Polynomial { degree: f64 },
    /// K(x, y) = exp(-||x - y||^2 / (2 * sigma^2))
    Radial { sigma: f64 },
}

impl Default for KernelKind {
    fn default() -> Self {
        Self::Linear
    }
}

impl KernelKind {
    /// Default parameter for the polynomial and radial kernels
    pub const DEFAULT_PARAM: f64 = 2.0;

    /// Resolve a kernel by name, with an optional parameter.
    ///
    /// Accepted names are `linear`, `polynomial` and `radial` (alias
    /// `rbf`). Anything else fails with `UnknownKernel`. The parameter
    /// defaults to 2 for both parameterized kernels.
    pub fn parse(name: &str, param: Option<f64>) -> Result<Self> {
        let param = param.unwrap_or(Self::DEFAULT_PARAM);
        match name {
            "linear" => Ok(Self::Linear),
            "polynomial" => Ok(Self::Polynomial { degree: param }),
            "radial" | "rbf" => Ok(Self::Radial { sigma: param }),
            other => Err(SvmError::UnknownKernel(other.to_string())),
        }
    }

    /// Whether this kernel admits an explicit weight vector
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Linear)
    }

    /// The kernel parameter, if the kind has one
    pub fn param(&self) -> Option<f64> {
        match *self {
            Self::Linear => None,
            Self::Polynomial { degree } => Some(degree),
            Self::Radial { sigma } => Some(sigma),
        }
    }

    /// Evaluate K(x1, x2)
    pub fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        match *self {
            Self::Linear => dot(x1, x2),
            Self::Polynomial { degree } => (dot(x1, x2) + 1.0).powf(degree),
            Self::Radial { sigma } => {
                let norm_sq: f64 = x1
                    .iter()
                    .zip(x2.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (-norm_sq / (2.0 * sigma * sigma)).exp()
            }
        }
    }
}

/// Dot product between two dense vectors
pub fn dot(x1: &[f64], x2: &[f64]) -> f64 {
    x1.iter().zip(x2.iter()).map(|(a, b)| a * b).sum()
}

/// Dense symmetric matrix of pairwise kernel evaluations.
///
/// Training-transient: built once at the start of the SMO loop and
/// dropped with it, never persisted in a model.
#[derive(Debug, Clone)]
pub struct Gram {
    n: usize,
    values: Vec<f64>,
}

impl Gram {
    /// Compute the full N x N matrix over a training set.
    ///
    /// Every entry, diagonal included, goes through the same pairwise
    /// formula as a direct `KernelKind::compute` call, so matrix lookups
    /// and fresh evaluations agree bit for bit. The upper triangle is
    /// mirrored; kernel symmetry makes the two orders identical.
    pub fn compute(x: &[Vec<f64>], kernel: KernelKind) -> Self {
        let n = x.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let k = kernel.compute(&x[i], &x[j]);
                values[i * n + j] = k;
                values[j * n + i] = k;
            }
        }
        Self { n, values }
    }

    /// Kernel value between training examples `i` and `j`
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Number of training examples
    pub fn n(&self) -> usize {
        self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const X1: [f64; 5] = [0.0, 1.0, 4.0, 6.0, 2.0];
    const X2: [f64; 5] = [0.0, 2.0, 5.0, 6.0, 7.0];

    #[test]
    fn test_linear_kernel_exact() {
        assert_relative_eq!(KernelKind::Linear.compute(&X1, &X2), 72.0);
    }

    #[test]
    fn test_polynomial_kernel_exact() {
        let quadratic = KernelKind::Polynomial { degree: 2.0 };
        assert_relative_eq!(quadratic.compute(&X1, &X2), 5329.0, epsilon = 1e-9);

        let cubic = KernelKind::Polynomial { degree: 3.0 };
        assert_relative_eq!(cubic.compute(&X1, &X2), 389_017.0, epsilon = 1e-6);
    }

    #[test]
    fn test_radial_kernel_exact() {
        let radial = KernelKind::Radial { sigma: 2.0 };
        assert_relative_eq!(radial.compute(&X1, &X2), 0.0342, epsilon = 1e-4);
    }

    #[test]
    fn test_radial_kernel_identical_vectors() {
        let radial = KernelKind::Radial { sigma: 0.7 };
        assert_relative_eq!(radial.compute(&X1, &X1), 1.0);
    }

    #[test]
    fn test_kernel_symmetry() {
        for kernel in [
            KernelKind::Linear,
            KernelKind::Polynomial { degree: 3.0 },
            KernelKind::Radial { sigma: 1.5 },
        ] {
            assert_eq!(kernel.compute(&X1, &X2), kernel.compute(&X2, &X1));
        }
    }

    #[test]
    fn test_parse_known_kernels() {
        assert_eq!(
            KernelKind::parse("linear", None).unwrap(),
            KernelKind::Linear
        );
        assert_eq!(
            KernelKind::parse("polynomial", Some(3.0)).unwrap(),
            KernelKind::Polynomial { degree: 3.0 }
        );
        assert_eq!(
            KernelKind::parse("radial", Some(0.5)).unwrap(),
            KernelKind::Radial { sigma: 0.5 }
        );
        assert_eq!(
            KernelKind::parse("rbf", None).unwrap(),
            KernelKind::Radial { sigma: 2.0 }
        );
    }

    #[test]
    fn test_parse_unknown_kernel() {
        let err = KernelKind::parse("sigmoid", None).unwrap_err();
        assert!(matches!(err, SvmError::UnknownKernel(name) if name == "sigmoid"));
    }

    #[test]
    fn test_gram_matches_pairwise_calls() {
        let x = vec![
            vec![0.0, 1.0],
            vec![4.0, 6.0],
            vec![2.0, 0.0],
            vec![1.0, 1.0],
        ];
        let kernel = KernelKind::Radial { sigma: 1.0 };
        let gram = Gram::compute(&x, kernel);

        assert_eq!(gram.n(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(gram.at(i, j), kernel.compute(&x[i], &x[j]));
                assert_eq!(gram.at(i, j), gram.at(j, i));
            }
        }
    }

    #[test]
    fn test_gram_diagonal_uses_same_formula() {
        let x = vec![vec![3.0, 4.0], vec![-1.0, 2.0]];
        let kernel = KernelKind::Polynomial { degree: 2.0 };
        let gram = Gram::compute(&x, kernel);

        assert_eq!(gram.at(0, 0), kernel.compute(&x[0], &x[0]));
        assert_eq!(gram.at(1, 1), kernel.compute(&x[1], &x[1]));
    }
}
