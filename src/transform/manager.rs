//! Zip and ChaCha20-Poly1305 backed transform manager.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::archive::{unzip_into, zip_bytes};
use super::crypt::Cipher;
use super::{TransformError, TransformManager};

/// Output names configured per operation.
#[derive(Debug, Default, Clone)]
struct OutputNames {
    archive: Option<String>,
    dearchive: Option<String>,
    encrypt: Option<String>,
    decrypt: Option<String>,
    compress_and_encrypt: Option<String>,
}

/// Transform manager writing zip archives and sealed files into the target directory.
///
/// Output names are written only while the registry is being wired and are
/// read by every processor afterwards.
#[derive(Debug)]
pub struct ArchiveCryptManager {
    source_dir: PathBuf,
    target_dir: PathBuf,
    cipher: Option<Cipher>,
    names: RwLock<OutputNames>,
}

impl ArchiveCryptManager {
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            cipher: None,
            names: RwLock::new(OutputNames::default()),
        }
    }

    /// Enable the encrypting operations with the given passphrase.
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        if !passphrase.is_empty() {
            self.cipher = Some(Cipher::from_passphrase(passphrase));
        }
        self
    }

    fn cipher(&self, operation: &'static str) -> Result<&Cipher, TransformError> {
        self.cipher
            .as_ref()
            .ok_or(TransformError::MissingPassphrase { operation })
    }

    fn name(
        &self,
        operation: &'static str,
        pick: impl Fn(&OutputNames) -> &Option<String>,
    ) -> Result<String, TransformError> {
        pick(&self.names.read())
            .clone()
            .ok_or(TransformError::NotConfigured { operation })
    }

    fn read_source(&self, file_name: &str) -> Result<Vec<u8>, TransformError> {
        let path = self.source_dir.join(file_name);
        std::fs::read(&path).map_err(|source| TransformError::Read { path, source })
    }

    fn write_target(&self, output_name: &str, data: &[u8]) -> Result<PathBuf, TransformError> {
        let path = self.target_dir.join(output_name);
        std::fs::write(&path, data).map_err(|source| TransformError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn seal(
        &self,
        operation: &'static str,
        file_name: &str,
        data: &[u8],
    ) -> Result<Vec<u8>, TransformError> {
        self.cipher(operation)?
            .seal(data)
            .map_err(|_| TransformError::Encrypt {
                path: self.source_dir.join(file_name),
            })
    }
}

fn validate_name(operation: &'static str, name: &str) -> Result<String, TransformError> {
    let name = name.trim();
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name must not be a relative directory")
    } else if name.contains(['/', '\\']) {
        Some("name must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TransformError::InvalidName {
            operation,
            reason: reason.to_string(),
        }),
        None => Ok(name.to_string()),
    }
}

impl TransformManager for ArchiveCryptManager {
    fn set_archive_name(&self, name: &str) -> Result<(), TransformError> {
        let name = validate_name("compress", name)?;
        self.names.write().archive = Some(name);
        Ok(())
    }

    fn set_dearchive_name(&self, name: &str) -> Result<(), TransformError> {
        let name = validate_name("decompress", name)?;
        self.names.write().dearchive = Some(name);
        Ok(())
    }

    fn set_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.cipher("encrypt")?;
        let name = validate_name("encrypt", name)?;
        self.names.write().encrypt = Some(name);
        Ok(())
    }

    fn set_decrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.cipher("decrypt")?;
        let name = validate_name("decrypt", name)?;
        self.names.write().decrypt = Some(name);
        Ok(())
    }

    fn set_compress_and_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.cipher("compress-and-encrypt")?;
        let name = validate_name("compress-and-encrypt", name)?;
        self.names.write().compress_and_encrypt = Some(name);
        Ok(())
    }

    fn compress(&self, file_name: &str) -> Result<(), TransformError> {
        let name = self.name("compress", |n| &n.archive)?;
        let data = self.read_source(file_name)?;
        let archive = zip_bytes(file_name, &data)?;
        let out = self.write_target(&format!("{name}_{file_name}.zip"), &archive)?;
        crate::debug_event!("compress", "wrote", "{}", out.display());
        Ok(())
    }

    fn decompress(&self, file_name: &str) -> Result<(), TransformError> {
        let name = self.name("decompress", |n| &n.dearchive)?;
        let data = self.read_source(file_name)?;
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());

        let dest = self.target_dir.join(format!("{name}_{stem}"));
        std::fs::create_dir_all(&dest).map_err(|source| TransformError::Write {
            path: dest.clone(),
            source,
        })?;

        let count = unzip_into(Cursor::new(data), &dest)?;
        crate::debug_event!("decompress", "extracted", "{count} files into {}", dest.display());
        Ok(())
    }

    fn encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        let name = self.name("encrypt", |n| &n.encrypt)?;
        let data = self.read_source(file_name)?;
        let sealed = self.seal("encrypt", file_name, &data)?;
        let out = self.write_target(&format!("{name}_{file_name}.enc"), &sealed)?;
        crate::debug_event!("encrypt", "wrote", "{}", out.display());
        Ok(())
    }

    fn decrypt(&self, file_name: &str) -> Result<(), TransformError> {
        let name = self.name("decrypt", |n| &n.decrypt)?;
        let data = self.read_source(file_name)?;
        let plain = self
            .cipher("decrypt")?
            .open(&data)
            .map_err(|reason| TransformError::Decrypt {
                path: self.source_dir.join(file_name),
                reason,
            })?;

        let base = file_name.strip_suffix(".enc").unwrap_or(file_name);
        let out = self.write_target(&format!("{name}_{base}"), &plain)?;
        crate::debug_event!("decrypt", "wrote", "{}", out.display());
        Ok(())
    }

    fn compress_and_encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        let name = self.name("compress-and-encrypt", |n| &n.compress_and_encrypt)?;
        let data = self.read_source(file_name)?;
        let archive = zip_bytes(file_name, &data)?;
        let sealed = self.seal("compress-and-encrypt", file_name, &archive)?;
        let out = self.write_target(&format!("{name}_{file_name}.zip.enc"), &sealed)?;
        crate::debug_event!("compress-and-encrypt", "wrote", "{}", out.display());
        Ok(())
    }
}
