//! Recording manager for unit tests.

use parking_lot::Mutex;

use super::{TransformError, TransformManager};

/// Records every call as `"<method>:<argument>"` and fails for one chosen argument.
#[derive(Debug, Default)]
pub struct RecordingManager {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingManager {
    pub fn failing_on(arg: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(arg.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, method: &str, arg: &str) -> Result<(), TransformError> {
        self.calls.lock().push(format!("{method}:{arg}"));
        if self.fail_on.as_deref() == Some(arg) {
            return Err(TransformError::Other(format!("{method} refused {arg}")));
        }
        Ok(())
    }
}

impl TransformManager for RecordingManager {
    fn set_archive_name(&self, name: &str) -> Result<(), TransformError> {
        self.record("set_archive_name", name)
    }
    fn set_dearchive_name(&self, name: &str) -> Result<(), TransformError> {
        self.record("set_dearchive_name", name)
    }
    fn set_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.record("set_encrypt_name", name)
    }
    fn set_decrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.record("set_decrypt_name", name)
    }
    fn set_compress_and_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.record("set_compress_and_encrypt_name", name)
    }
    fn compress(&self, file_name: &str) -> Result<(), TransformError> {
        self.record("compress", file_name)
    }
    fn decompress(&self, file_name: &str) -> Result<(), TransformError> {
        self.record("decompress", file_name)
    }
    fn encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.record("encrypt", file_name)
    }
    fn decrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.record("decrypt", file_name)
    }
    fn compress_and_encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.record("compress_and_encrypt", file_name)
    }
}
