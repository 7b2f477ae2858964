//! Non-recursive directory watcher with an explicit intake switch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::event::CreateKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;
use super::event::FileEvent;
use super::filter::CreationFilter;

/// Receiving end of the watcher's event channel.
pub type WatchReceiver = mpsc::UnboundedReceiver<Result<FileEvent, WatchError>>;

/// Watches one directory for newly created files.
///
/// Nothing is reported until [`enable`](Self::enable) is called, and nothing
/// after [`disable`](Self::disable).
pub struct DirectoryWatcher {
    source_dir: PathBuf,
    /// Intake gate checked by the notify callback.
    enabled: Arc<AtomicBool>,
    /// Whether the OS-level watch is currently registered.
    watching: bool,
    watcher: notify::RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Create the watcher and the channel it reports on.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        dedup_window_ms: u64,
    ) -> Result<(Self, WatchReceiver), WatchError> {
        let source_dir = source_dir.into();
        let enabled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();

        let gate = enabled.clone();
        let watched = source_dir.clone();
        let mut filter = CreationFilter::new(dedup_window_ms);

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if !gate.load(Ordering::Acquire) {
                return;
            }

            match res {
                Ok(event) => {
                    for item in translate(&watched, event, &mut filter) {
                        let _ = tx.send(item);
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(WatchError::EventError {
                        details: e.to_string(),
                    }));
                }
            }
        })?;

        Ok((
            Self {
                source_dir,
                enabled,
                watching: false,
                watcher,
            },
            rx,
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Register the OS watch and start reporting creations.
    pub fn enable(&mut self) -> Result<(), WatchError> {
        if !self.watching {
            self.watcher
                .watch(&self.source_dir, RecursiveMode::NonRecursive)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: self.source_dir.clone(),
                    reason: e.to_string(),
                })?;
            self.watching = true;
        }

        self.enabled.store(true, Ordering::Release);
        crate::debug_event!("watcher", "enabled", "{}", self.source_dir.display());
        Ok(())
    }

    /// Stop reporting immediately, then drop the OS watch.
    pub fn disable(&mut self) {
        self.enabled.store(false, Ordering::Release);

        if self.watching {
            if let Err(e) = self.watcher.unwatch(&self.source_dir) {
                tracing::warn!(
                    "[watcher] failed to unwatch {}: {e}",
                    self.source_dir.display()
                );
            }
            self.watching = false;
        }
        crate::debug_event!("watcher", "disabled", "{}", self.source_dir.display());
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.enabled.store(false, Ordering::Release);
    }
}

/// Convert a raw notify event into zero or more file events.
fn translate(
    source_dir: &Path,
    event: Event,
    filter: &mut CreationFilter,
) -> Vec<Result<FileEvent, WatchError>> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .filter(|path| !path.is_dir())
            .filter_map(|path| {
                let file_name = path.file_name()?.to_string_lossy().into_owned();
                if !filter.admit(&path) {
                    crate::debug_event!("watcher", "duplicate", "{}", path.display());
                    return None;
                }
                Some(Ok(FileEvent::new(file_name)))
            })
            .collect(),
        EventKind::Remove(_) if event.paths.iter().any(|p| p == source_dir) => {
            vec![Err(WatchError::SourceRemoved {
                path: source_dir.to_path_buf(),
            })]
        }
        _ => Vec::new(),
    }
}
