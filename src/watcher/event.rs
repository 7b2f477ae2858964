//! File-created notification.

use chrono::{DateTime, Local};

/// A file that appeared in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Name relative to the source directory.
    pub file_name: String,
    /// When the notification was received.
    pub received_at: DateTime<Local>,
}

impl FileEvent {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self::at(file_name, Local::now())
    }

    pub fn at(file_name: impl Into<String>, received_at: DateTime<Local>) -> Self {
        Self {
            file_name: file_name.into(),
            received_at,
        }
    }
}
