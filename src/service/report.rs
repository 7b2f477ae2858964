//! Error artifacts for failed files.
//!
//! A failed file leaves `<file_name>_<HH.mm.ss>.txt` in the target directory
//! holding the failure message as ASCII text. Two failures for the same name
//! within one second share an artifact name; the later write wins.

use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Writes one text artifact per failed file into the target directory.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    target_dir: PathBuf,
}

impl ErrorSink {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Artifact file name for `file_name` failing at `at`.
    pub fn artifact_name(file_name: &str, at: &DateTime<Local>) -> String {
        format!("{file_name}_{}.txt", at.format("%H.%M.%S"))
    }

    pub fn artifact_path(&self, file_name: &str, at: &DateTime<Local>) -> PathBuf {
        self.target_dir.join(Self::artifact_name(file_name, at))
    }

    /// Write the artifact, replacing any existing file of the same name.
    pub fn report(
        &self,
        file_name: &str,
        at: &DateTime<Local>,
        message: &str,
    ) -> std::io::Result<PathBuf> {
        let path = self.artifact_path(file_name, at);
        std::fs::write(&path, to_ascii(message))?;
        Ok(path)
    }
}

/// Single-byte encoding of `message`; anything outside ASCII becomes `?`.
fn to_ascii(message: &str) -> Vec<u8> {
    message
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_name_uses_24_hour_clock() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 2).unwrap();
        assert_eq!(
            ErrorSink::artifact_name("locked.txt", &at),
            "locked.txt_14.05.02.txt"
        );

        let morning = Local.with_ymd_and_hms(2026, 3, 9, 9, 7, 0).unwrap();
        assert_eq!(
            ErrorSink::artifact_name("a.pdf", &morning),
            "a.pdf_09.07.00.txt"
        );
    }

    #[test]
    fn test_report_writes_message() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ErrorSink::new(temp_dir.path());
        let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 2).unwrap();

        let path = sink
            .report("locked.txt", &at, "The process cannot access the file")
            .unwrap();

        assert_eq!(path, temp_dir.path().join("locked.txt_14.05.02.txt"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "The process cannot access the file"
        );
    }

    #[test]
    fn test_report_replaces_non_ascii() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ErrorSink::new(temp_dir.path());
        let at = Local.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();

        let path = sink.report("f.txt", &at, "Zugriff verweigert: Größe").unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"Zugriff verweigert: Gr??e");
    }

    #[test]
    fn test_same_second_failure_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ErrorSink::new(temp_dir.path());
        let at = Local.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();

        sink.report("f.txt", &at, "first failure, longer text").unwrap();
        let path = sink.report("f.txt", &at, "second").unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_report_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ErrorSink::new(temp_dir.path().join("missing"));
        let at = Local::now();
        assert!(sink.report("f.txt", &at, "boom").is_err());
    }
}
