//! Directory watcher producing file-created events.
//!
//! # Architecture
//!
//! ```text
//! DirectoryWatcher
//!   - Single notify::RecommendedWatcher (non-recursive)
//!   - Intake gate (enable / disable)
//!   - CreationFilter (drops repeated creates)
//!         |
//!   mpsc channel of FileEvent
//!         |
//!    Dispatcher
//! ```

mod directory;
mod error;
mod event;
mod filter;

pub use directory::{DirectoryWatcher, WatchReceiver};
pub use error::WatchError;
pub use event::FileEvent;
pub use filter::CreationFilter;
