//! Core types, traits and error handling

pub mod error;
pub mod types;

pub use error::{Result, SvmError};
pub use types::*;
