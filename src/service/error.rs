//! Error types for the service lifecycle.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::watcher::WatchError;

use super::ServiceState;

/// Errors that stop the service from starting or running.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Source directory path is empty")]
    EmptySource,

    #[error("Target directory path is empty")]
    EmptyTarget,

    #[error("Source directory {path} does not exist or is not a directory")]
    SourceNotDirectory { path: PathBuf },

    #[error("Source and target are the same directory ({path})")]
    SameDirectory { path: PathBuf },

    #[error("Cannot create target directory {path}: {source}")]
    TargetDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {action} while the service is {state}")]
    InvalidState {
        action: &'static str,
        state: ServiceState,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Watch(#[from] WatchError),
}
