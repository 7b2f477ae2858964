//! Service lifecycle: wiring, watching, and shutdown.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::mode::ModeConfig;
use crate::registry::OperationRegistry;
use crate::transform::{ArchiveCryptManager, TransformManager};
use crate::watcher::{DirectoryWatcher, WatchError};

use super::dispatch::Dispatcher;
use super::error::ServiceError;
use super::report::ErrorSink;

/// Lifecycle states. The service starts and ends in `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Stopped => "stopped",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Everything needed to start one service run.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub modes: ModeConfig,
    pub passphrase: Option<String>,
    /// Upper bound on how long `stop` waits for in-flight files.
    pub grace_period: Duration,
    pub dedup_window_ms: u64,
    pub max_concurrent_tasks: Option<usize>,
}

impl ServiceOptions {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        modes: ModeConfig,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            modes,
            passphrase: None,
            grace_period: Duration::from_secs(1),
            dedup_window_ms: 200,
            max_concurrent_tasks: None,
        }
    }

    /// Build options from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            source_dir: settings.source_dir.clone().unwrap_or_default(),
            target_dir: settings.target_dir.clone().unwrap_or_default(),
            modes: settings.mode_config(),
            passphrase: settings
                .crypto
                .passphrase
                .clone()
                .filter(|p| !p.is_empty()),
            grace_period: Duration::from_millis(settings.service.grace_period_ms),
            dedup_window_ms: settings.service.dedup_window_ms,
            max_concurrent_tasks: settings.service.max_concurrent_tasks,
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}

/// Live parts of a running service.
struct Running {
    watcher: DirectoryWatcher,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
    dispatch_loop: Option<JoinHandle<Result<(), WatchError>>>,
    /// Set when the dispatch loop ends on a watcher failure.
    fault: Arc<Mutex<Option<WatchError>>>,
}

/// Watches the source directory and processes every new file.
///
/// ```text
/// Stopped -> Starting -> Running -> Stopping -> Stopped
/// ```
pub struct FileWatchService {
    options: ServiceOptions,
    manager: Option<Arc<dyn TransformManager>>,
    state: ServiceState,
    running: Option<Running>,
}

impl FileWatchService {
    pub fn new(options: ServiceOptions) -> Self {
        Self {
            options,
            manager: None,
            state: ServiceState::Stopped,
            running: None,
        }
    }

    /// Use `manager` instead of an [`ArchiveCryptManager`].
    pub fn with_manager(mut self, manager: Arc<dyn TransformManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Watcher failure that ended dispatching while `Running`.
    ///
    /// New files are no longer picked up once this is set; `stop` returns it.
    pub fn fault(&self) -> Option<WatchError> {
        self.running
            .as_ref()
            .and_then(|running| running.fault.lock().clone())
    }

    /// Number of per-file tasks still running.
    pub fn in_flight(&self) -> usize {
        self.running
            .as_ref()
            .map_or(0, |running| running.dispatcher.in_flight())
    }

    /// Wire the registry, enable the watcher and start dispatching.
    ///
    /// Must be called from within a Tokio runtime. On error the service stays
    /// `Stopped`.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.state != ServiceState::Stopped {
            return Err(ServiceError::InvalidState {
                action: "start",
                state: self.state,
            });
        }

        self.state = ServiceState::Starting;
        match self.start_inner() {
            Ok(running) => {
                self.running = Some(running);
                self.state = ServiceState::Running;
                crate::log_event!(
                    "service",
                    "running",
                    "{} -> {}",
                    self.options.source_dir.display(),
                    self.options.target_dir.display()
                );
                Ok(())
            }
            Err(e) => {
                self.state = ServiceState::Stopped;
                tracing::error!("[service] failed to start: {e}");
                Err(e)
            }
        }
    }

    fn start_inner(&self) -> Result<Running, ServiceError> {
        let options = &self.options;
        validate_paths(options)?;

        let manager: Arc<dyn TransformManager> = match &self.manager {
            Some(manager) => manager.clone(),
            None => {
                let manager =
                    ArchiveCryptManager::new(&options.source_dir, &options.target_dir);
                let manager = match &options.passphrase {
                    Some(passphrase) => manager.with_passphrase(passphrase),
                    None => manager,
                };
                Arc::new(manager)
            }
        };

        // The watcher exists but stays disabled until every setup call is done.
        let (mut watcher, events) =
            DirectoryWatcher::new(&options.source_dir, options.dedup_window_ms)?;

        let pipeline = OperationRegistry::standard(manager).wire(&options.modes)?;
        crate::log_event!(
            "service",
            "wired",
            "{}",
            pipeline
                .modes()
                .iter()
                .map(|mode| mode.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let dispatcher = Arc::new(
            Dispatcher::new(Arc::new(pipeline), ErrorSink::new(&options.target_dir))
                .with_max_concurrent(options.max_concurrent_tasks),
        );

        watcher.enable()?;

        let cancel = CancellationToken::new();
        let fault = Arc::new(Mutex::new(None));
        let dispatch_loop = {
            let dispatcher = dispatcher.clone();
            let cancel = cancel.clone();
            let fault = fault.clone();
            tokio::spawn(async move {
                let result = dispatcher.run(events, cancel).await;
                if let Err(e) = &result {
                    *fault.lock() = Some(e.clone());
                }
                result
            })
        };

        Ok(Running {
            watcher,
            dispatcher,
            cancel,
            dispatch_loop: Some(dispatch_loop),
            fault,
        })
    }

    /// Disable intake, then give in-flight files up to the grace period.
    ///
    /// Returns the number of tasks abandoned when the grace period ran out,
    /// or the watcher failure that ended dispatching early. The service is
    /// `Stopped` afterwards in both cases.
    pub async fn stop(&mut self) -> Result<usize, ServiceError> {
        if self.state != ServiceState::Running {
            return Err(ServiceError::InvalidState {
                action: "stop",
                state: self.state,
            });
        }

        self.state = ServiceState::Stopping;
        crate::log_event!("service", "stopping");

        let mut abandoned = 0;
        let mut fault = None;
        if let Some(mut running) = self.running.take() {
            running.watcher.disable();
            running.cancel.cancel();

            if let Some(dispatch_loop) = running.dispatch_loop.take() {
                if let Err(e) = dispatch_loop.await {
                    tracing::error!("[service] dispatch loop failed: {e}");
                    fault = Some(WatchError::EventError {
                        details: e.to_string(),
                    });
                }
            }

            abandoned = running.dispatcher.drain(self.options.grace_period).await;
            fault = running.fault.lock().take().or(fault);
        }

        self.state = ServiceState::Stopped;
        match fault {
            Some(e) => {
                tracing::error!("[service] stopped after watcher failure: {e}");
                Err(ServiceError::Watch(e))
            }
            None => {
                crate::log_event!("service", "stopped");
                Ok(abandoned)
            }
        }
    }

    /// Start, run until `shutdown` resolves or the watcher fails, then stop.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()>,
    {
        self.start()?;

        if let Some(mut dispatch_loop) = self
            .running
            .as_mut()
            .and_then(|running| running.dispatch_loop.take())
        {
            let finished = tokio::select! {
                _ = shutdown => None,
                joined = &mut dispatch_loop => Some(joined),
            };

            if let Some(running) = self.running.as_mut() {
                match finished {
                    None => running.dispatch_loop = Some(dispatch_loop),
                    // A watcher error is already in the fault slot.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        *running.fault.lock() = Some(WatchError::EventError {
                            details: e.to_string(),
                        });
                    }
                }
            }
        }

        self.stop().await.map(|_| ())
    }
}

fn validate_paths(options: &ServiceOptions) -> Result<(), ServiceError> {
    if options.source_dir.as_os_str().is_empty() {
        return Err(ServiceError::EmptySource);
    }
    if options.target_dir.as_os_str().is_empty() {
        return Err(ServiceError::EmptyTarget);
    }
    if !options.source_dir.is_dir() {
        return Err(ServiceError::SourceNotDirectory {
            path: options.source_dir.clone(),
        });
    }
    std::fs::create_dir_all(&options.target_dir).map_err(|source| {
        ServiceError::TargetDirectory {
            path: options.target_dir.clone(),
            source,
        }
    })?;

    // Outputs written into the watched directory would be picked up as new files.
    let source = options
        .source_dir
        .canonicalize()
        .map_err(|_| ServiceError::SourceNotDirectory {
            path: options.source_dir.clone(),
        })?;
    let target = options
        .target_dir
        .canonicalize()
        .map_err(|source| ServiceError::TargetDirectory {
            path: options.target_dir.clone(),
            source,
        })?;
    if source == target {
        return Err(ServiceError::SameDirectory { path: source });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::transform::testing::RecordingManager;
    use tempfile::TempDir;

    fn options(source: &TempDir, target: &TempDir) -> ServiceOptions {
        ServiceOptions::new(
            source.path(),
            target.path(),
            ModeConfig::new().with(Mode::Compress, "archive"),
        )
        .with_grace_period(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_empty_source_never_reaches_running() {
        let target = TempDir::new().unwrap();
        let manager = Arc::new(RecordingManager::default());
        let mut service = FileWatchService::new(ServiceOptions::new(
            "",
            target.path(),
            ModeConfig::new().with(Mode::Compress, "archive"),
        ))
        .with_manager(manager.clone());

        let err = service.start().unwrap_err();

        assert!(matches!(err, ServiceError::EmptySource));
        assert_eq!(service.state(), ServiceState::Stopped);
        assert!(manager.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_target_is_rejected() {
        let source = TempDir::new().unwrap();
        let mut service = FileWatchService::new(ServiceOptions::new(
            source.path(),
            "",
            ModeConfig::new().with(Mode::Compress, "archive"),
        ));
        assert!(matches!(service.start(), Err(ServiceError::EmptyTarget)));
        assert_eq!(service.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_missing_source_is_rejected() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let mut service = FileWatchService::new(ServiceOptions::new(
            source.path().join("nope"),
            target.path(),
            ModeConfig::new().with(Mode::Compress, "archive"),
        ));
        assert!(matches!(
            service.start(),
            Err(ServiceError::SourceNotDirectory { .. })
        ));
    }

    #[tokio::test]
    async fn test_encrypt_without_passphrase_fails_to_start() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let mut service = FileWatchService::new(ServiceOptions::new(
            source.path(),
            target.path(),
            ModeConfig::new().with(Mode::Encrypt, "key1"),
        ));

        let err = service.start().unwrap_err();
        assert!(matches!(err, ServiceError::Registry(_)));
        assert_eq!(service.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_start_and_stop_transitions() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let manager = Arc::new(RecordingManager::default());
        let mut service =
            FileWatchService::new(options(&source, &target)).with_manager(manager.clone());

        service.start().unwrap();
        assert_eq!(service.state(), ServiceState::Running);
        assert_eq!(manager.calls(), vec!["set_archive_name:archive"]);
        assert!(matches!(
            service.start(),
            Err(ServiceError::InvalidState { .. })
        ));

        assert_eq!(service.stop().await.unwrap(), 0);
        assert_eq!(service.state(), ServiceState::Stopped);
        assert!(service.stop().await.is_err());
    }

    #[tokio::test]
    async fn test_target_equal_to_source_is_rejected() {
        let source = TempDir::new().unwrap();
        let manager = Arc::new(RecordingManager::default());
        // Same directory, spelled differently.
        let target = source.path().join(".");
        let mut service = FileWatchService::new(ServiceOptions::new(
            source.path(),
            &target,
            ModeConfig::new().with(Mode::Compress, "archive"),
        ))
        .with_manager(manager.clone());

        let err = service.start().unwrap_err();

        assert!(matches!(err, ServiceError::SameDirectory { .. }));
        assert_eq!(service.state(), ServiceState::Stopped);
        assert!(manager.calls().is_empty());
    }

    #[tokio::test]
    async fn test_target_directory_is_created() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let nested = target.path().join("out").join("today");
        let mut service = FileWatchService::new(ServiceOptions::new(
            source.path(),
            &nested,
            ModeConfig::new().with(Mode::Compress, "archive"),
        ))
        .with_manager(Arc::new(RecordingManager::default()));

        service.start().unwrap();
        assert!(nested.is_dir());
        service.stop().await.unwrap();
    }
}
