//! Model serialization and persistence
//!
//! A [`Model`] is the immutable snapshot of everything prediction
//! needs: the training options, the bias, the whitening statistics and
//! exactly one decision representation. The representation is a tagged
//! enum, so a model structurally carries either weights or support
//! vectors, never both and never neither.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::core::{Result, SupportVector, SvmError, SvmParams};
use crate::whitening::WhiteningStats;

/// Persisted decision function of a trained classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Options the model was trained with
    pub options: SvmParams,
    /// Threshold of the decision function
    pub bias: f64,
    /// Whitening statistics, present iff whitening was enabled
    pub whitening: Option<WhiteningStats>,
    /// Weight vector (linear kernel) or support-vector set (otherwise)
    pub representation: Representation,
    /// Versioning and bookkeeping
    pub metadata: ModelMetadata,
}

/// The linear-or-dual decision representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Explicit weight vector; exists iff the kernel is linear
    Weights(Vec<f64>),
    /// Pruned support-vector set for non-linear kernels
    SupportVectors(Vec<SupportVector>),
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors retained at training time
    pub n_support_vectors: usize,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl ModelMetadata {
    pub(crate) fn current(n_support_vectors: usize) -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            n_support_vectors,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Model {
    /// Save the model as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvmError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Load a model from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model =
            serde_json::from_reader(reader).map_err(|e| SvmError::Serialization(e.to_string()))?;
        Ok(model)
    }

    /// Name of the persisted representation
    pub fn kernel_name(&self) -> &'static str {
        use crate::kernel::KernelKind;
        match self.options.kernel {
            KernelKind::Linear => "linear",
            KernelKind::Polynomial { .. } => "polynomial",
            KernelKind::Radial { .. } => "radial",
        }
    }

    /// Print a human-readable summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {}", self.kernel_name());
        if let Some(param) = self.options.kernel.param() {
            println!("Kernel parameter: {param}");
        }
        match &self.representation {
            Representation::Weights(w) => println!("Representation: weights ({} dims)", w.len()),
            Representation::SupportVectors(svs) => {
                println!("Representation: {} support vectors", svs.len())
            }
        }
        println!("Bias: {:.6}", self.bias);
        println!("Whitening: {}", self.whitening.is_some());
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.options.c);
        println!("  tol: {}", self.options.tol);
        println!("  alpha_tol: {}", self.options.alpha_tol);
        println!("  max_passes: {}", self.options.max_passes);
        println!("  max_iterations: {}", self.options.max_iterations);
    }
}
