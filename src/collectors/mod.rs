//! Metrics Collectors
//!
//! One collector per ZFS report. Each collector fetches its report from the
//! [`ReportSource`], runs the matching parser and writes the resulting measurements
//! to the [`MetricsSink`].
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Accept a `CollectionContext` containing shared state
//! - Fetch and parse one report
//! - Update metrics through the sink
//! - Return a `CollectionStatus`
//!
//! # Error Handling
//!
//! Individual collector failures are non-fatal - they log warnings and return
//! `CollectionStatus::Failed`. The other reports of the same cycle are still published.

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::metrics::MetricsSink;
use crate::source::{ReportKind, ReportSource};
use std::future::Future;
use tracing::{debug, info, warn};

/// Shared context passed to all collectors
///
/// All fields are immutable references, so no invariants can be violated.
pub struct CollectionContext<'a, S> {
    /// Provider of the raw report text
    pub source: &'a S,
    /// Destination for the parsed measurements
    pub sink: &'a dyn MetricsSink,
    /// Collector configuration (report toggles)
    pub config: &'a CollectorConfig,
}

impl<S> Clone for CollectionContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for CollectionContext<'_, S> {}

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Metrics were successfully collected and updated
    Success,
    /// Collection failed but is non-fatal (already logged as warning)
    Failed,
    /// Report disabled in configuration
    Skipped,
}

/// Outcome of one collection cycle, per report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub filesystems: CollectionStatus,
    pub iostat: CollectionStatus,
    pub status: CollectionStatus,
}

impl CycleSummary {
    /// True when at least one report was published
    pub fn any_success(&self) -> bool {
        [self.filesystems, self.iostat, self.status].contains(&CollectionStatus::Success)
    }
}

/// Helper to reduce boilerplate in collectors
///
/// Wraps a fetch-and-parse future with consistent error handling:
/// - On success: processes data, logs success, returns `CollectionStatus::Success`
/// - On error: logs warning, returns `CollectionStatus::Failed` (non-fatal)
///
/// # Arguments
///
/// * `report` - Report being collected (for logging)
/// * `query_future` - Future producing the parsed report
/// * `process` - Function to publish the data
pub async fn collect_with_handler<T, F, P, E>(
    report: ReportKind,
    query_future: F,
    process: P,
) -> CollectionStatus
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T),
{
    match query_future.await {
        Ok(data) => {
            process(data);
            debug!("Updated {} metrics", report);
            CollectionStatus::Success
        }
        Err(e) => {
            warn!("[{}] {}", report.log_tag(), e);
            CollectionStatus::Failed
        }
    }
}

/// Fetch one report and run its parser
pub async fn fetch_and_parse<S, T>(
    source: &S,
    report: ReportKind,
    parse: fn(&str) -> Result<T>,
) -> Result<T>
where
    S: ReportSource,
{
    let text = source.fetch(report).await?;
    parse(&text)
}

/// Run one collection cycle over every enabled report
///
/// Reports are collected one after the other; a failure in one never prevents the
/// others from being published.
pub async fn collect_all<S: ReportSource>(ctx: &CollectionContext<'_, S>) -> CycleSummary {
    info!("Collecting ZFS metrics");

    let filesystems = if ctx.config.collect_filesystems {
        collect_dataset_metrics(ctx).await
    } else {
        CollectionStatus::Skipped
    };

    let iostat = if ctx.config.collect_iostat {
        collect_iostat_metrics(ctx).await
    } else {
        CollectionStatus::Skipped
    };

    let status = if ctx.config.collect_status {
        collect_pool_metrics(ctx).await
    } else {
        CollectionStatus::Skipped
    };

    CycleSummary {
        filesystems,
        iostat,
        status,
    }
}

// Collector modules
pub mod dataset;
pub mod iostat;
pub mod pool;

// Re-export collector functions for convenient access
pub use dataset::{collect_dataset_metrics, publish_filesystems};
pub use iostat::{collect_iostat_metrics, publish_device_io};
pub use pool::{collect_pool_metrics, publish_status};
