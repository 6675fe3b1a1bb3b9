//! Hegemon StatusWatch — polls a Statuspage-style `summary.json`, detects
//! real content changes, and reports active incidents and degraded
//! components.
//!
//! The poll loop uses conditional requests (`If-None-Match` /
//! `If-Modified-Since`), confirms changes with a content fingerprint, and
//! polls faster while the page is changing.

pub mod config;
pub mod error;
pub mod events;
pub mod watch;

pub use config::WatcherConfig;
pub use error::{ErrorKind, FetchError};
pub use events::sink::{ConsoleSink, EventSink, LogSink};
pub use events::{Event, EventExtractor};
pub use watch::{CycleReport, StatusWatcher, Verdict};
