//! Dataset Metrics Collector
//!
//! Collects ZFS dataset space accounting from `zfs list`.
//!
//! # Metrics Produced
//! - `zfs_used` - Used bytes of the dataset
//!   - Labels: filesystem
//! - `zfs_avail` - Available bytes for the dataset
//!   - Labels: filesystem
//! - `zfs_referred` - Bytes referred by the dataset
//!   - Labels: filesystem

use super::{collect_with_handler, fetch_and_parse, CollectionContext, CollectionStatus};
use crate::metrics::{MetricsSink, Series};
use crate::parser::{parse_zfs_list, FilesystemMeasurement};
use crate::source::{ReportKind, ReportSource};
use tracing::info;

/// Collects ZFS dataset metrics
///
/// # Returns
///
/// * `CollectionStatus::Success` - Report fetched, parsed and published
/// * `CollectionStatus::Failed` - Command or parse failure (non-fatal, logged as warning)
pub async fn collect_dataset_metrics<S: ReportSource>(
    ctx: &CollectionContext<'_, S>,
) -> CollectionStatus {
    collect_with_handler(
        ReportKind::FilesystemList,
        fetch_and_parse(ctx.source, ReportKind::FilesystemList, parse_zfs_list),
        |filesystems: Vec<FilesystemMeasurement>| publish_filesystems(ctx.sink, &filesystems),
    )
    .await
}

/// Write parsed `zfs list` rows to the sink
pub fn publish_filesystems(sink: &dyn MetricsSink, filesystems: &[FilesystemMeasurement]) {
    for fs in filesystems {
        let figures = [
            (Series::ZfsUsed, fs.used),
            (Series::ZfsAvail, fs.avail),
            (Series::ZfsReferred, fs.referred),
        ];
        for (series, value) in figures {
            if let Some(value) = value {
                sink.set_value(series, &fs.name, value);
            }
        }

        info!(
            "[ZFS-FS] {}: {:?} used, {:?} avail, {:?} referred (mounted at {})",
            fs.name, fs.used, fs.avail, fs.referred, fs.mountpoint
        );
    }
}
