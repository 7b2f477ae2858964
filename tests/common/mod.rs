//! Shared helpers for service integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use ftp_watcher::{TransformError, TransformManager};
use parking_lot::Mutex;

/// Records every call as `"<method>:<argument>"`.
///
/// Fails processing for `fail_on`, panics for `panic_on`, and can drop a
/// file into `touch_dir` while its setters run.
#[derive(Debug, Default)]
pub struct RecordingManager {
    calls: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
    pub panic_on: Option<String>,
    pub touch_dir: Option<PathBuf>,
}

impl RecordingManager {
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn panicking_on(name: &str) -> Self {
        Self {
            panic_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn touching(dir: &Path) -> Self {
        Self {
            touch_dir: Some(dir.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, file_name: &str) -> Vec<String> {
        let suffix = format!(":{file_name}");
        self.calls()
            .into_iter()
            .filter(|call| call.ends_with(&suffix))
            .collect()
    }

    fn setup(&self, method: &str, param: &str) -> Result<(), TransformError> {
        if let Some(dir) = &self.touch_dir {
            std::fs::write(dir.join(format!("during_{method}.txt")), b"early").map_err(|e| {
                TransformError::Other(e.to_string())
            })?;
            // Give the OS time to deliver an event if anyone were listening.
            std::thread::sleep(Duration::from_millis(100));
        }
        self.calls.lock().push(format!("{method}:{param}"));
        Ok(())
    }

    fn process(&self, method: &str, file_name: &str) -> Result<(), TransformError> {
        self.calls.lock().push(format!("{method}:{file_name}"));
        if self.panic_on.as_deref() == Some(file_name) {
            panic!("{method} exploded on {file_name}");
        }
        if self.fail_on.as_deref() == Some(file_name) {
            return Err(TransformError::Other(format!(
                "The process cannot access the file '{file_name}'"
            )));
        }
        Ok(())
    }
}

impl TransformManager for RecordingManager {
    fn set_archive_name(&self, name: &str) -> Result<(), TransformError> {
        self.setup("set_archive_name", name)
    }
    fn set_dearchive_name(&self, name: &str) -> Result<(), TransformError> {
        self.setup("set_dearchive_name", name)
    }
    fn set_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.setup("set_encrypt_name", name)
    }
    fn set_decrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.setup("set_decrypt_name", name)
    }
    fn set_compress_and_encrypt_name(&self, name: &str) -> Result<(), TransformError> {
        self.setup("set_compress_and_encrypt_name", name)
    }
    fn compress(&self, file_name: &str) -> Result<(), TransformError> {
        self.process("compress", file_name)
    }
    fn decompress(&self, file_name: &str) -> Result<(), TransformError> {
        self.process("decompress", file_name)
    }
    fn encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.process("encrypt", file_name)
    }
    fn decrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.process("decrypt", file_name)
    }
    fn compress_and_encrypt(&self, file_name: &str) -> Result<(), TransformError> {
        self.process("compress_and_encrypt", file_name)
    }
}

/// Poll `condition` for up to five seconds.
pub async fn wait_for(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

/// File names in `dir`, sorted.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Error artifacts written for `file_name`.
pub fn artifacts_for(dir: &Path, file_name: &str) -> Vec<String> {
    let prefix = format!("{file_name}_");
    list_names(dir)
        .into_iter()
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".txt"))
        .collect()
}
