//! Global error handling.
//!
//! Each sub-crate of the project defines its own error type. Their types can
//! be unified, for example in a main function, when winding results at the
//! top-level.

use ag_fusion::FusionError;
use ag_model::errors::ModelError;
use std::io;
use thiserror::Error;

/// An alias for result that can be an [`AgError`].
pub type AgResult<T> = Result<T, AgError>;

/// The main error type for error winding at the top-level.
/// It mainly consists of transparent wrappers over error types that are
/// defined in the sub-crates.
#[derive(Debug, Error)]
pub enum AgError {
    /// Custom error for reporting bad command line arguments usage.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// Error that can be returned from [I/O operations](std::io).
    #[error(transparent)]
    IO(#[from] io::Error),

    /// Error that can be returned from regex compilation.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Error that can be returned from [`ag_model`] functions.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Error that can be returned from [`ag_fusion`] functions.
    #[error(transparent)]
    Fusion(#[from] FusionError),
}
