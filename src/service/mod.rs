//! The watch service: lifecycle, per-file dispatch and error artifacts.
//!
//! # Architecture
//!
//! ```text
//! FileWatchService
//!   start: validate paths -> wire registry -> enable watcher -> spawn loop
//!         |
//!   Dispatcher::run (one task)
//!         |  one spawned task per FileEvent
//!         v
//!   ComposedPipeline::run  --error/panic-->  ErrorSink::report
//! ```

mod dispatch;
mod error;
mod lifecycle;
mod report;

pub use dispatch::{Dispatcher, UnitOutcome};
pub use error::ServiceError;
pub use lifecycle::{FileWatchService, ServiceOptions, ServiceState};
pub use report::ErrorSink;
