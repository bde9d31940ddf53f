//! Daemon Loop
//!
//! Owns the polling interval, the exposition endpoint and the lifecycle:
//!
//! ```text
//! Starting ──open endpoint──► Running ──terminate flag──► Stopping ──► Stopped
//! ```
//!
//! Each iteration consumes a pending reread request, sleeps for the interval, runs
//! one collection cycle and then checks the termination flag. Termination is
//! cooperative: neither the sleep nor a running command is interrupted, so shutdown
//! takes at most one interval plus one cycle.

use crate::collectors::{collect_all, CollectionContext};
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::server::{self, AppState};
use crate::signals::SignalFlags;
use crate::source::ReportSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

type RereadHook = Box<dyn FnMut() + Send>;

pub struct Daemon<S> {
    config: Config,
    source: S,
    metrics: MetricsCollector,
    flags: Arc<SignalFlags>,
    healthy: Arc<AtomicBool>,
    interval: Duration,
    on_reread: RereadHook,
    state: DaemonState,
}

impl<S: ReportSource> Daemon<S> {
    pub fn new(
        config: Config,
        source: S,
        metrics: MetricsCollector,
        flags: Arc<SignalFlags>,
    ) -> Self {
        let interval = Duration::from_secs(config.collector.interval_seconds);
        Self {
            config,
            source,
            metrics,
            flags,
            healthy: Arc::new(AtomicBool::new(false)),
            interval,
            on_reread: Box::new(|| info!("Configuration reread requested; nothing to reload")),
            state: DaemonState::Starting,
        }
    }

    /// Override the polling interval taken from the configuration
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Hook run when a reread request is consumed
    pub fn on_reread(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_reread = Box::new(hook);
        self
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Run until termination is requested
    ///
    /// Returns the number of collection cycles performed. Only a failure to open the
    /// exposition endpoint is an error; collection failures are logged per report.
    pub async fn run(&mut self) -> anyhow::Result<u64> {
        let exposition = server::open(
            &self.config.server,
            AppState {
                metrics: self.metrics.clone(),
                healthy: self.healthy.clone(),
            },
        )
        .await?;

        self.transition(DaemonState::Running);
        info!("Service running, collecting every {:?}", self.interval);

        let mut cycles = 0;
        loop {
            if self.flags.take_reread() {
                (self.on_reread)();
            }

            tokio::time::sleep(self.interval).await;

            let ctx = CollectionContext {
                source: &self.source,
                sink: &self.metrics,
                config: &self.config.collector,
            };
            let summary = collect_all(&ctx).await;
            self.healthy.store(summary.any_success(), Ordering::Relaxed);
            cycles += 1;
            debug!("Cycle {} finished: {:?}", cycles, summary);

            if self.flags.terminate_requested() {
                break;
            }
        }

        self.transition(DaemonState::Stopping);
        info!("Shutting down due to user request");
        exposition.shutdown();
        self.transition(DaemonState::Stopped);

        Ok(cycles)
    }

    fn transition(&mut self, next: DaemonState) {
        debug!("Daemon state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
