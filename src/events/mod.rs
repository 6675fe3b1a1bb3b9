//! Turns a changed summary into reportable events.
//!
//! Ordering is fixed: active incidents in payload order, then non-nominal
//! components in payload order. No cross-call deduplication happens here;
//! the watcher only calls `extract` when the payload fingerprint moved.

pub mod sink;
pub mod summary;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::WatcherConfig;
use summary::Summary;

/// One line of news for a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Incident or component name.
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventExtractor {
    terminal_statuses: Vec<String>,
    nominal_component_status: String,
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self::from_config(&WatcherConfig::default())
    }
}

impl EventExtractor {
    pub fn from_config(config: &WatcherConfig) -> Self {
        Self {
            terminal_statuses: config.terminal_statuses.clone(),
            nominal_component_status: config.nominal_component_status.clone(),
        }
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses.iter().any(|s| s == status)
    }

    pub fn extract(&self, summary: &Summary) -> Vec<Event> {
        self.extract_at(summary, Utc::now())
    }

    /// Same as [`extract`](Self::extract) with a fixed clock.
    pub fn extract_at(&self, summary: &Summary, now: DateTime<Utc>) -> Vec<Event> {
        let incidents = summary
            .incidents
            .iter()
            .filter(|inc| !self.is_terminal(&inc.status))
            .map(|inc| {
                let message = match inc.latest_update() {
                    Some(update) => update.body.trim().to_string(),
                    None => inc.status.trim().to_string(),
                };
                Event {
                    subject: inc.name.clone(),
                    message,
                    timestamp: now,
                }
            });

        let components = summary
            .components
            .iter()
            .filter(|comp| comp.status != self.nominal_component_status)
            .map(|comp| Event {
                subject: comp.name.clone(),
                message: format!("Component {} is {}", comp.name, comp.status),
                timestamp: now,
            });

        incidents.chain(components).collect()
    }
}
