//! Per-file task dispatch.
//!
//! Every file event becomes one independent task that runs the composed
//! pipeline on a blocking thread. A failure (error or panic) inside that task
//! is turned into an error artifact and never reaches the dispatch loop or
//! any other task.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::registry::ComposedPipeline;
use crate::watcher::{FileEvent, WatchError, WatchReceiver};

use super::report::ErrorSink;

/// How a per-file task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Every stage succeeded.
    Processed,
    /// A stage failed; `artifact` is the error file, if it could be written.
    Failed {
        message: String,
        artifact: Option<PathBuf>,
    },
}

/// Spawns one isolated task per file event.
#[derive(Debug)]
pub struct Dispatcher {
    pipeline: Arc<ComposedPipeline>,
    sink: ErrorSink,
    tracker: TaskTracker,
    limiter: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<ComposedPipeline>, sink: ErrorSink) -> Self {
        Self {
            pipeline,
            sink,
            tracker: TaskTracker::new(),
            limiter: None,
        }
    }

    /// Cap how many files are processed at once.
    ///
    /// Events are still accepted immediately; tasks over the cap wait for a
    /// permit inside their own task.
    pub fn with_max_concurrent(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit
            .filter(|limit| *limit > 0)
            .map(|limit| Arc::new(Semaphore::new(limit)));
        self
    }

    /// Number of per-file tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Spawn the task for one event. Never blocks.
    pub fn dispatch(&self, event: FileEvent) -> JoinHandle<UnitOutcome> {
        let pipeline = self.pipeline.clone();
        let sink = self.sink.clone();
        let limiter = self.limiter.clone();

        crate::debug_event!("dispatch", "spawning", "{}", event.file_name);

        self.tracker.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let file_name = event.file_name.clone();
            let joined = tokio::task::spawn_blocking(move || pipeline.run(&file_name)).await;

            let message = match joined {
                Ok(Ok(())) => {
                    crate::log_event!("dispatch", "processed", "{}", event.file_name);
                    return UnitOutcome::Processed;
                }
                Ok(Err(stage)) => {
                    tracing::warn!("[dispatch] {stage}");
                    stage.source.to_string()
                }
                Err(join) if join.is_panic() => {
                    let message = panic_message(join.into_panic());
                    tracing::error!(
                        "[dispatch] processing {} panicked: {message}",
                        event.file_name
                    );
                    message
                }
                Err(join) => join.to_string(),
            };

            let artifact = write_artifact(sink, event, message.clone()).await;
            UnitOutcome::Failed { message, artifact }
        })
    }

    /// Receive events and dispatch them until cancelled.
    ///
    /// Events already queued when cancellation arrives are still dispatched;
    /// the watcher's gate is closed by then, so the queue is finite. A watcher
    /// error ends the loop and is returned.
    pub async fn run(
        &self,
        mut events: WatchReceiver,
        cancel: CancellationToken,
    ) -> Result<(), WatchError> {
        crate::debug_event!("dispatch", "loop started");
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    let accepted = self.dispatch_queued(&mut events);
                    crate::debug_event!(
                        "dispatch",
                        "loop cancelled",
                        "{accepted} queued event(s) dispatched"
                    );
                    return Ok(());
                }

                item = events.recv() => match item {
                    Some(Ok(event)) => {
                        self.dispatch(event);
                    }
                    Some(Err(e)) => {
                        tracing::error!("[dispatch] watcher failed: {e}");
                        return Err(e);
                    }
                    None => return Err(WatchError::ChannelClosed),
                },
            }
        }
    }

    /// Dispatch every event already sitting in the channel.
    fn dispatch_queued(&self, events: &mut WatchReceiver) -> usize {
        let mut accepted = 0;
        while let Ok(item) = events.try_recv() {
            match item {
                Ok(event) => {
                    self.dispatch(event);
                    accepted += 1;
                }
                Err(e) => {
                    tracing::warn!("[dispatch] ignoring watcher error during shutdown: {e}");
                }
            }
        }
        accepted
    }

    /// Stop accepting tasks and wait up to `grace` for running ones.
    ///
    /// Returns the number of tasks still running when the wait ended.
    pub async fn drain(&self, grace: Duration) -> usize {
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            let abandoned = self.tracker.len();
            tracing::warn!("[dispatch] {abandoned} task(s) still running after {grace:?}");
            return abandoned;
        }
        0
    }
}

async fn write_artifact(sink: ErrorSink, event: FileEvent, message: String) -> Option<PathBuf> {
    let written = tokio::task::spawn_blocking(move || {
        sink.report(&event.file_name, &event.received_at, &message)
    })
    .await;

    match written {
        Ok(Ok(path)) => {
            crate::log_event!("dispatch", "error artifact", "{}", path.display());
            Some(path)
        }
        Ok(Err(e)) => {
            tracing::error!("[dispatch] failed to write error artifact: {e}");
            None
        }
        Err(e) => {
            tracing::error!("[dispatch] error artifact task failed: {e}");
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "processing panicked".to_string()
    }
}
