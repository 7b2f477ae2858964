//! Error types for transform operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`TransformManager`](super::TransformManager).
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error for {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("Archive entry '{entry}' escapes the output directory")]
    UnsafeEntry { entry: String },

    #[error("Encryption failed for {path}")]
    Encrypt { path: PathBuf },

    #[error("Decryption failed for {path}: {reason}")]
    Decrypt { path: PathBuf, reason: String },

    #[error("No passphrase configured; set [crypto] passphrase to use {operation}")]
    MissingPassphrase { operation: &'static str },

    #[error("Invalid name for {operation}: {reason}")]
    InvalidName {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} was used before its name was configured")]
    NotConfigured { operation: &'static str },

    #[error("{0}")]
    Other(String),
}
