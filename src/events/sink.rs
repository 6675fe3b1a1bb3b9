//! Event sinks — where extracted events go.
//!
//! The watcher calls every registered sink once per event. A failing sink is
//! logged and skipped; it never stalls the poll loop.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::io::Write;
use tracing::info;

use super::Event;

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn emit(&self, event: &Event) -> Result<()>;
}

/// Human-readable block on stdout.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn render(event: &Event) -> String {
        format!(
            "[{}] Product: {}\nStatus: {}\n{}\n",
            event.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            event.subject,
            event.message,
            "-".repeat(60),
        )
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    fn name(&self) -> &str { "console" }

    async fn emit(&self, event: &Event) -> Result<()> {
        let block = Self::render(event);
        let mut out = std::io::stdout().lock();
        out.write_all(block.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Structured record through `tracing`.
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &str { "log" }

    async fn emit(&self, event: &Event) -> Result<()> {
        info!(
            subject = %event.subject,
            timestamp = %event.timestamp.to_rfc3339(),
            "📣 {}",
            event.message
        );
        Ok(())
    }
}
