//! Drop-directory watch service.
//!
//! Watches a source directory and runs every newly created file through a
//! pipeline of configured transforms (compress, decompress, encrypt, decrypt,
//! compress-and-encrypt), writing results into a target directory. A file
//! that fails leaves a `<name>_<HH.mm.ss>.txt` error artifact instead of
//! stopping the service.

pub mod cli;
pub mod config;
pub mod logging;
pub mod mode;
pub mod registry;
pub mod service;
pub mod transform;
pub mod watcher;

pub use config::Settings;
pub use mode::{Mode, ModeConfig, ModeEntry};
pub use registry::{Capability, ComposedPipeline, OperationRegistry, RegistryError};
pub use service::{
    Dispatcher, ErrorSink, FileWatchService, ServiceError, ServiceOptions, ServiceState,
    UnitOutcome,
};
pub use transform::{ArchiveCryptManager, TransformError, TransformManager};
pub use watcher::{DirectoryWatcher, FileEvent, WatchError};
