//! Error types for registry wiring and pipeline execution.

use thiserror::Error;

use crate::mode::Mode;
use crate::transform::TransformError;

/// Errors raised while wiring the operation registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No transform modes configured")]
    NoModes,

    #[error("No capability registered for mode '{0}'")]
    MissingCapability(Mode),

    #[error("Setup for mode '{mode}' failed: {source}")]
    Setup {
        mode: Mode,
        #[source]
        source: TransformError,
    },
}

/// A failed pipeline stage.
#[derive(Error, Debug)]
#[error("{mode} failed for '{file_name}': {source}")]
pub struct StageError {
    pub mode: Mode,
    pub file_name: String,
    #[source]
    pub source: TransformError,
}
