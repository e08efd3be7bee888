//! Binary SVM classification via simplified Sequential Minimal Optimization
//!
//! Trains a two-class support vector machine with a randomized
//! pair-selection SMO loop, prunes the result down to its support
//! vectors (or an explicit weight vector for the linear kernel), and
//! round-trips the decision function through JSON without the original
//! training set.

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod persistence;
pub mod solver;
pub mod whitening;

// Re-export main types for convenience
pub use crate::api::{Phase, Svm};
pub use crate::core::error::{Result, SvmError};
pub use crate::core::types::{Prediction, SupportVector, SvmParams, TrainReport};
pub use crate::data::CsvDataset;
pub use crate::kernel::{Gram, KernelKind};
pub use crate::persistence::{Model, ModelMetadata, Representation};
pub use crate::solver::{PairSelector, RandomPair, SmoResult, SmoSolver};
pub use crate::whitening::WhiteningStats;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
