//! Pool Status Metrics Collector
//!
//! Collects device error counters and scrub/resilver progress from `zpool status`.
//!
//! # Metrics Produced
//! - `zpool_errorread` / `zpool_errorwrite` / `zpool_errorchecksum` - Device error counts
//!   - Labels: vdev
//! - `zpool_resilvered_pct` / `zpool_resilvered_bytes` - Resilver progress
//!   - Labels: pool
//! - `zpool_scrub_scanned` / `zpool_scrub_rate` / `zpool_scrub_scanned_pct` - Scrub progress
//!   - Labels: pool

use super::{collect_with_handler, fetch_and_parse, CollectionContext, CollectionStatus};
use crate::metrics::{MetricsSink, Series};
use crate::parser::{parse_zpool_status, StatusReport};
use crate::source::{ReportKind, ReportSource};
use tracing::info;

/// Collects ZFS pool status metrics
///
/// A malformed status report fails only this collector; progress figures for pools
/// without scrub or resilver activity are published as zero.
pub async fn collect_pool_metrics<S: ReportSource>(
    ctx: &CollectionContext<'_, S>,
) -> CollectionStatus {
    collect_with_handler(
        ReportKind::PoolStatus,
        fetch_and_parse(ctx.source, ReportKind::PoolStatus, parse_zpool_status),
        |report: StatusReport| publish_status(ctx.sink, &report),
    )
    .await
}

/// Write a parsed `zpool status` report to the sink
pub fn publish_status(sink: &dyn MetricsSink, report: &StatusReport) {
    for dev in &report.devices {
        let figures = [
            (Series::ZpoolErrorRead, dev.read_errors),
            (Series::ZpoolErrorWrite, dev.write_errors),
            (Series::ZpoolErrorChecksum, dev.checksum_errors),
        ];
        for (series, value) in figures {
            if let Some(value) = value {
                sink.set_value(series, &dev.device, value);
            }
        }

        info!(
            "[ZPOOL-STATUS] {} ({}): {:?} read errors, {:?} write errors, {:?} checksum errors",
            dev.device, dev.state, dev.read_errors, dev.write_errors, dev.checksum_errors
        );
    }

    for pool in &report.pools {
        sink.set_value(Series::ZpoolResilveredPct, &pool.pool, pool.resilver_percent);
        sink.set_value(Series::ZpoolResilveredBytes, &pool.pool, pool.resilver_bytes);
        sink.set_value(Series::ZpoolScrubScanned, &pool.pool, pool.scrub_scanned);
        sink.set_value(Series::ZpoolScrubRate, &pool.pool, pool.scrub_rate);
        sink.set_value(Series::ZpoolScrubScannedPct, &pool.pool, pool.scrub_percent);

        info!(
            "[ZPOOL-STATUS] {} resilvered {}% ({} bytes)",
            pool.pool, pool.resilver_percent, pool.resilver_bytes
        );
        info!(
            "[ZPOOL-STATUS] {} scrubbed {}% ({} bytes) at {} bytes/sec",
            pool.pool, pool.scrub_percent, pool.scrub_scanned, pool.scrub_rate
        );
    }
}
