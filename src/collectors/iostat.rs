//! Pool I/O Metrics Collector
//!
//! Collects per-device capacity, operation and bandwidth figures from `zpool iostat -v`.
//!
//! # Metrics Produced
//! - `zpool_capacityallocated` / `zpool_capacityfree` - Allocated and free capacity
//!   - Labels: vdev
//! - `zpool_opread` / `zpool_opwrite` - Read and write operations
//!   - Labels: vdev
//! - `zpool_bwread` / `zpool_bwwrite` - Read and write bandwidth
//!   - Labels: vdev
//!
//! Figures printed as `-` are not published for that cycle.

use super::{collect_with_handler, fetch_and_parse, CollectionContext, CollectionStatus};
use crate::metrics::{MetricsSink, Series};
use crate::parser::{parse_zpool_iostat, DeviceIoMeasurement};
use crate::source::{ReportKind, ReportSource};
use tracing::info;

pub async fn collect_iostat_metrics<S: ReportSource>(
    ctx: &CollectionContext<'_, S>,
) -> CollectionStatus {
    collect_with_handler(
        ReportKind::PoolIostat,
        fetch_and_parse(ctx.source, ReportKind::PoolIostat, parse_zpool_iostat),
        |devices: Vec<DeviceIoMeasurement>| publish_device_io(ctx.sink, &devices),
    )
    .await
}

/// Write parsed `zpool iostat` rows to the sink
pub fn publish_device_io(sink: &dyn MetricsSink, devices: &[DeviceIoMeasurement]) {
    for dev in devices {
        let figures = [
            (Series::ZpoolCapacityAllocated, dev.capacity_alloc),
            (Series::ZpoolCapacityFree, dev.capacity_free),
            (Series::ZpoolOpRead, dev.ops_read),
            (Series::ZpoolOpWrite, dev.ops_write),
            (Series::ZpoolBwRead, dev.bw_read),
            (Series::ZpoolBwWrite, dev.bw_write),
        ];
        for (series, value) in figures {
            if let Some(value) = value {
                sink.set_value(series, &dev.device, value);
            }
        }

        info!(
            "[ZPOOL-IOSTAT] {}: {:?} allocated, {:?} free, {:?} op.read, {:?} op.write, {:?} bw.read, {:?} bw.write",
            dev.device,
            dev.capacity_alloc,
            dev.capacity_free,
            dev.ops_read,
            dev.ops_write,
            dev.bw_read,
            dev.bw_write
        );
    }
}
