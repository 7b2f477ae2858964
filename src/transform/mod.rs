//! File transform capability.
//!
//! The dispatch engine only knows the [`TransformManager`] trait: a set of
//! naming setters called once at startup and processors called once per
//! observed file. [`ArchiveCryptManager`] is the implementation shipped with
//! the service.

mod archive;
mod crypt;
mod error;
mod manager;
#[cfg(test)]
pub(crate) mod testing;

pub use archive::{unzip_into, zip_bytes};
pub use crypt::Cipher;
pub use error::TransformError;
pub use manager::ArchiveCryptManager;

/// Capability for transforming files from a source into a target directory.
///
/// Implementations are shared by every in-flight file task, so every method
/// takes `&self` and must be safe to call concurrently. Setters run only
/// during wiring, strictly before any processor.
pub trait TransformManager: Send + Sync {
    fn set_archive_name(&self, name: &str) -> Result<(), TransformError>;
    fn set_dearchive_name(&self, name: &str) -> Result<(), TransformError>;
    fn set_encrypt_name(&self, name: &str) -> Result<(), TransformError>;
    fn set_decrypt_name(&self, name: &str) -> Result<(), TransformError>;
    fn set_compress_and_encrypt_name(&self, name: &str) -> Result<(), TransformError>;

    /// Each processor receives the file name relative to the source directory.
    fn compress(&self, file_name: &str) -> Result<(), TransformError>;
    fn decompress(&self, file_name: &str) -> Result<(), TransformError>;
    fn encrypt(&self, file_name: &str) -> Result<(), TransformError>;
    fn decrypt(&self, file_name: &str) -> Result<(), TransformError>;
    fn compress_and_encrypt(&self, file_name: &str) -> Result<(), TransformError>;
}
