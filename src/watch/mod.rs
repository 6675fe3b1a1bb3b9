//! Status watcher — the poll loop.
//!
//! Each cycle: conditional fetch → commit validators → fingerprint compare →
//! extract and emit events → adjust interval → cancellable sleep.
//!
//! The watcher exclusively owns its validator cache, detector and scheduler.
//! Nothing is shared, so nothing is locked. A cancelled fetch is dropped
//! before any of that state is touched.

pub mod detector;
pub mod fetch;
pub mod scheduler;
pub mod validators;

use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatcherConfig;
use crate::error::{ErrorKind, FetchError};
use crate::events::sink::EventSink;
use crate::events::{Event, EventExtractor};
use detector::ChangeDetector;
use fetch::{FetchClient, FetchOutcome, StatusPayload};
use scheduler::{Activity, PollScheduler};
use validators::ValidatorCache;

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 304 from the server.
    Unchanged,
    /// 200 whose content matched the last fingerprint.
    NoOp,
    RealChange,
    /// First payload, recorded without announcing it.
    Baseline,
    Failed(ErrorKind),
}

impl Verdict {
    fn activity(self) -> Activity {
        match self {
            Verdict::RealChange => Activity::RealChange,
            _ => Activity::Quiet,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub verdict: Verdict,
    pub events_emitted: usize,
    pub next_wait: Duration,
}

pub struct StatusWatcher {
    client: FetchClient,
    validators: ValidatorCache,
    detector: ChangeDetector,
    scheduler: PollScheduler,
    extractor: EventExtractor,
    sinks: Vec<Box<dyn EventSink>>,
    announce_baseline: bool,
}

impl StatusWatcher {
    pub fn new(config: &WatcherConfig, sinks: Vec<Box<dyn EventSink>>) -> Result<Self> {
        Ok(Self {
            client: FetchClient::new(config)?,
            validators: ValidatorCache::new(),
            detector: ChangeDetector::new(),
            scheduler: PollScheduler::new(config.initial_interval, config.min_interval),
            extractor: EventExtractor::from_config(config),
            sinks,
            announce_baseline: config.announce_baseline,
        })
    }

    pub fn validators(&self) -> &ValidatorCache {
        &self.validators
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Run until `shutdown` is cancelled. Cancellation is honoured while a
    /// fetch is in flight and while sleeping.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            url = %self.client.url(),
            interval_secs = self.scheduler.next_wait_secs(),
            floor_secs = self.scheduler.floor().as_secs_f64(),
            "📡 Status watcher starting"
        );

        loop {
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested during fetch — discarding in-flight request");
                    break;
                }
                outcome = self.client.fetch(&self.validators) => outcome,
            };

            let report = self.apply(outcome).await;
            debug!(
                verdict = ?report.verdict,
                events = report.events_emitted,
                next_wait_secs = report.next_wait.as_secs_f64(),
                "Cycle complete"
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested — stopping watcher");
                    break;
                }
                _ = tokio::time::sleep(report.next_wait) => {}
            }
        }
    }

    /// One full cycle without the trailing sleep.
    pub async fn poll_once(&mut self) -> CycleReport {
        let outcome = self.client.fetch(&self.validators).await;
        self.apply(outcome).await
    }

    async fn apply(&mut self, outcome: FetchOutcome) -> CycleReport {
        let (verdict, events_emitted) = match outcome {
            FetchOutcome::Unchanged => (Verdict::Unchanged, 0),
            FetchOutcome::Unreachable(err) => {
                log_failure(&err);
                (Verdict::Failed(err.kind()), 0)
            }
            FetchOutcome::Changed { payload, validators } => {
                // Decoded fine, so the server's validators describe content we hold
                self.validators.replace(validators);
                self.on_payload(payload).await
            }
        };

        let before = self.scheduler.next_wait();
        if self.scheduler.record(verdict.activity()) {
            info!(
                from_secs = before.as_secs_f64(),
                to_secs = self.scheduler.next_wait_secs(),
                "⏩ Activity detected — polling faster"
            );
        }

        CycleReport {
            verdict,
            events_emitted,
            next_wait: self.scheduler.next_wait(),
        }
    }

    async fn on_payload(&mut self, payload: StatusPayload) -> (Verdict, usize) {
        let evaluation = self.detector.evaluate(&payload.raw);
        if !evaluation.is_real_change {
            debug!(fingerprint = %evaluation.fingerprint, "200 with identical content");
            return (Verdict::NoOp, 0);
        }

        self.detector.commit(&evaluation);

        if evaluation.is_first {
            if let Some(page) = &payload.summary.page {
                info!(page = %page.name, "Monitoring {} status page", page.name);
            }
            if !self.announce_baseline {
                info!(fingerprint = %evaluation.fingerprint, "Baseline recorded");
                return (Verdict::Baseline, 0);
            }
        }

        let events = self.extractor.extract(&payload.summary);
        info!(
            fingerprint = %evaluation.fingerprint,
            events = events.len(),
            "Status page changed"
        );
        for event in &events {
            self.dispatch(event).await;
        }
        (Verdict::RealChange, events.len())
    }

    async fn dispatch(&self, event: &Event) {
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event).await {
                warn!(sink = sink.name(), subject = %event.subject, "Sink failed: {:#}", e);
            }
        }
    }
}

fn log_failure(err: &FetchError) {
    match err {
        FetchError::UnexpectedStatus { status } => {
            warn!(kind = ?err.kind(), "Status page returned: {}", status.as_u16());
        }
        _ => warn!(kind = ?err.kind(), "Fetch failed: {}", err),
    }
}
