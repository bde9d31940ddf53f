//! Prometheus Metrics Definitions
//!
//! This module defines every gauge series the exporter publishes and the [`MetricsSink`]
//! seam through which collectors write them.
//!
//! # Metric Categories
//!
//! ## Filesystem Metrics (`zfs list`)
//! - `zfs_used`, `zfs_avail`, `zfs_referred` - labeled by `filesystem`
//!
//! ## Device Metrics (`zpool iostat -v`, `zpool status`)
//! - `zpool_capacityallocated`, `zpool_capacityfree` - labeled by `vdev`
//! - `zpool_opread`, `zpool_opwrite`, `zpool_bwread`, `zpool_bwwrite` - labeled by `vdev`
//! - `zpool_errorread`, `zpool_errorwrite`, `zpool_errorchecksum` - labeled by `vdev`
//!
//! ## Pool Progress Metrics (`zpool status`)
//! - `zpool_resilvered_pct`, `zpool_resilvered_bytes` - labeled by `pool`
//! - `zpool_scrub_scanned`, `zpool_scrub_rate`, `zpool_scrub_scanned_pct` - labeled by `pool`
//!
//! Series names carry no namespace prefix; they match the names existing dashboards use.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Every gauge series the exporter publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Series {
    ZfsUsed,
    ZfsAvail,
    ZfsReferred,
    ZpoolCapacityAllocated,
    ZpoolCapacityFree,
    ZpoolOpRead,
    ZpoolOpWrite,
    ZpoolBwRead,
    ZpoolBwWrite,
    ZpoolErrorRead,
    ZpoolErrorWrite,
    ZpoolErrorChecksum,
    ZpoolResilveredPct,
    ZpoolResilveredBytes,
    ZpoolScrubScanned,
    ZpoolScrubRate,
    ZpoolScrubScannedPct,
}

impl Series {
    pub const ALL: [Series; 17] = [
        Series::ZfsUsed,
        Series::ZfsAvail,
        Series::ZfsReferred,
        Series::ZpoolCapacityAllocated,
        Series::ZpoolCapacityFree,
        Series::ZpoolOpRead,
        Series::ZpoolOpWrite,
        Series::ZpoolBwRead,
        Series::ZpoolBwWrite,
        Series::ZpoolErrorRead,
        Series::ZpoolErrorWrite,
        Series::ZpoolErrorChecksum,
        Series::ZpoolResilveredPct,
        Series::ZpoolResilveredBytes,
        Series::ZpoolScrubScanned,
        Series::ZpoolScrubRate,
        Series::ZpoolScrubScannedPct,
    ];

    /// Exposed metric name
    pub fn name(self) -> &'static str {
        match self {
            Series::ZfsUsed => "zfs_used",
            Series::ZfsAvail => "zfs_avail",
            Series::ZfsReferred => "zfs_referred",
            Series::ZpoolCapacityAllocated => "zpool_capacityallocated",
            Series::ZpoolCapacityFree => "zpool_capacityfree",
            Series::ZpoolOpRead => "zpool_opread",
            Series::ZpoolOpWrite => "zpool_opwrite",
            Series::ZpoolBwRead => "zpool_bwread",
            Series::ZpoolBwWrite => "zpool_bwwrite",
            Series::ZpoolErrorRead => "zpool_errorread",
            Series::ZpoolErrorWrite => "zpool_errorwrite",
            Series::ZpoolErrorChecksum => "zpool_errorchecksum",
            Series::ZpoolResilveredPct => "zpool_resilvered_pct",
            Series::ZpoolResilveredBytes => "zpool_resilvered_bytes",
            Series::ZpoolScrubScanned => "zpool_scrub_scanned",
            Series::ZpoolScrubRate => "zpool_scrub_rate",
            Series::ZpoolScrubScannedPct => "zpool_scrub_scanned_pct",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Series::ZfsUsed => "Used bytes",
            Series::ZfsAvail => "Available bytes",
            Series::ZfsReferred => "Referred bytes",
            Series::ZpoolCapacityAllocated => "Allocated capacity",
            Series::ZpoolCapacityFree => "Available (free) capacity",
            Series::ZpoolOpRead => "Operations read",
            Series::ZpoolOpWrite => "Operations write",
            Series::ZpoolBwRead => "Bandwidth read",
            Series::ZpoolBwWrite => "Bandwidth write",
            Series::ZpoolErrorRead => "Read errors",
            Series::ZpoolErrorWrite => "Write errors",
            Series::ZpoolErrorChecksum => "Checksum errors",
            Series::ZpoolResilveredPct => "Percentage of resilvering done",
            Series::ZpoolResilveredBytes => "Bytes resilvered",
            Series::ZpoolScrubScanned => "Bytes scanned during scrub",
            Series::ZpoolScrubRate => "Datarate of scrub",
            Series::ZpoolScrubScannedPct => "Percentage currently scanned",
        }
    }

    /// Name of the single label the series is keyed by
    pub fn label(self) -> &'static str {
        match self {
            Series::ZfsUsed | Series::ZfsAvail | Series::ZfsReferred => "filesystem",
            Series::ZpoolResilveredPct
            | Series::ZpoolResilveredBytes
            | Series::ZpoolScrubScanned
            | Series::ZpoolScrubRate
            | Series::ZpoolScrubScannedPct => "pool",
            _ => "vdev",
        }
    }
}

/// Destination for measurements
///
/// Setting the same series and label twice overwrites the earlier value.
/// Implementations must tolerate concurrent readers (the scrape endpoint).
pub trait MetricsSink: Send + Sync {
    fn set_value(&self, series: Series, label: &str, value: f64);
}

/// Metrics collector backed by a Prometheus registry
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // Filesystem metrics
    pub zfs_used: Arc<GaugeVec>,
    pub zfs_avail: Arc<GaugeVec>,
    pub zfs_referred: Arc<GaugeVec>,

    // Device I/O metrics
    pub zpool_capacity_allocated: Arc<GaugeVec>,
    pub zpool_capacity_free: Arc<GaugeVec>,
    pub zpool_op_read: Arc<GaugeVec>,
    pub zpool_op_write: Arc<GaugeVec>,
    pub zpool_bw_read: Arc<GaugeVec>,
    pub zpool_bw_write: Arc<GaugeVec>,

    // Device error metrics
    pub zpool_error_read: Arc<GaugeVec>,
    pub zpool_error_write: Arc<GaugeVec>,
    pub zpool_error_checksum: Arc<GaugeVec>,

    // Pool progress metrics
    pub zpool_resilvered_pct: Arc<GaugeVec>,
    pub zpool_resilvered_bytes: Arc<GaugeVec>,
    pub zpool_scrub_scanned: Arc<GaugeVec>,
    pub zpool_scrub_rate: Arc<GaugeVec>,
    pub zpool_scrub_scanned_pct: Arc<GaugeVec>,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let register = |series: Series| -> anyhow::Result<Arc<GaugeVec>> {
            let gauge = GaugeVec::new(
                Opts::new(series.name(), series.help()),
                &[series.label()],
            )?;
            registry.register(Box::new(gauge.clone()))?;
            Ok(Arc::new(gauge))
        };

        let zfs_used = register(Series::ZfsUsed)?;
        let zfs_avail = register(Series::ZfsAvail)?;
        let zfs_referred = register(Series::ZfsReferred)?;
        let zpool_capacity_allocated = register(Series::ZpoolCapacityAllocated)?;
        let zpool_capacity_free = register(Series::ZpoolCapacityFree)?;
        let zpool_op_read = register(Series::ZpoolOpRead)?;
        let zpool_op_write = register(Series::ZpoolOpWrite)?;
        let zpool_bw_read = register(Series::ZpoolBwRead)?;
        let zpool_bw_write = register(Series::ZpoolBwWrite)?;
        let zpool_error_read = register(Series::ZpoolErrorRead)?;
        let zpool_error_write = register(Series::ZpoolErrorWrite)?;
        let zpool_error_checksum = register(Series::ZpoolErrorChecksum)?;
        let zpool_resilvered_pct = register(Series::ZpoolResilveredPct)?;
        let zpool_resilvered_bytes = register(Series::ZpoolResilveredBytes)?;
        let zpool_scrub_scanned = register(Series::ZpoolScrubScanned)?;
        let zpool_scrub_rate = register(Series::ZpoolScrubRate)?;
        let zpool_scrub_scanned_pct = register(Series::ZpoolScrubScannedPct)?;

        Ok(Self {
            registry: Arc::new(registry),
            zfs_used,
            zfs_avail,
            zfs_referred,
            zpool_capacity_allocated,
            zpool_capacity_free,
            zpool_op_read,
            zpool_op_write,
            zpool_bw_read,
            zpool_bw_write,
            zpool_error_read,
            zpool_error_write,
            zpool_error_checksum,
            zpool_resilvered_pct,
            zpool_resilvered_bytes,
            zpool_scrub_scanned,
            zpool_scrub_rate,
            zpool_scrub_scanned_pct,
        })
    }

    /// Gauge family backing a series
    pub fn gauge(&self, series: Series) -> &GaugeVec {
        match series {
            Series::ZfsUsed => &self.zfs_used,
            Series::ZfsAvail => &self.zfs_avail,
            Series::ZfsReferred => &self.zfs_referred,
            Series::ZpoolCapacityAllocated => &self.zpool_capacity_allocated,
            Series::ZpoolCapacityFree => &self.zpool_capacity_free,
            Series::ZpoolOpRead => &self.zpool_op_read,
            Series::ZpoolOpWrite => &self.zpool_op_write,
            Series::ZpoolBwRead => &self.zpool_bw_read,
            Series::ZpoolBwWrite => &self.zpool_bw_write,
            Series::ZpoolErrorRead => &self.zpool_error_read,
            Series::ZpoolErrorWrite => &self.zpool_error_write,
            Series::ZpoolErrorChecksum => &self.zpool_error_checksum,
            Series::ZpoolResilveredPct => &self.zpool_resilvered_pct,
            Series::ZpoolResilveredBytes => &self.zpool_resilvered_bytes,
            Series::ZpoolScrubScanned => &self.zpool_scrub_scanned,
            Series::ZpoolScrubRate => &self.zpool_scrub_rate,
            Series::ZpoolScrubScannedPct => &self.zpool_scrub_scanned_pct,
        }
    }

    /// Set a labeled gauge
    pub fn set_gauge(&self, gauge: &GaugeVec, labels: &[&str], value: f64) {
        gauge.with_label_values(labels).set(value);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Drop every labeled series
    ///
    /// The collection cycle only overwrites; series of datasets or devices that
    /// disappear stay exported with their last value until this is called.
    pub fn reset(&self) {
        for series in Series::ALL {
            self.gauge(series).reset();
        }
    }
}

impl MetricsSink for MetricsCollector {
    fn set_value(&self, series: Series, label: &str, value: f64) {
        self.set_gauge(self.gauge(series), &[label], value);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics collector")
    }
}
