//! Error types for the SVM implementation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Training did not converge within {sweeps} sweeps")]
    NonConvergent { sweeps: usize },

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SvmError>;
