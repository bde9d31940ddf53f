//! Shared test doubles and sample reports

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zfs_exporter::error::{ExporterError, Result};
use zfs_exporter::metrics::{MetricsSink, Series};
use zfs_exporter::source::{ReportKind, ReportSource};

pub const ZFS_LIST: &str = "\
NAME         USED  AVAIL     REFER  MOUNTPOINT
tank           2T     3T       96K  /tank
tank/media   900G     3T      900G  /tank/media
tank/empty     0B     3T        0B  none
";

pub const ZPOOL_IOSTAT: &str = "\
              capacity     operations     bandwidth
pool        alloc   free   read  write   read  write
----------  -----  -----  -----  -----  -----  -----
tank           2T     3T     12     40   310K  1.5M
  mirror-0     2T     3T     12     40   310K  1.5M
    sda         -      -      6     20   155K   750K
    sdb         -      -      6     20   155K   750K
----------  -----  -----  -----  -----  -----  -----
";

pub const ZPOOL_STATUS: &str = "\
  pool: tank
 state: ONLINE
  scan: scrub in progress since Sun Oct 18 00:24:01 2026
        1T scanned out of 4T at 150M/s, 5h33m to go
        0B repaired, 25.00% done
config:

        NAME        STATE     READ WRITE CKSUM
        tank        ONLINE       0     0     0
          mirror-0  ONLINE       0     0     0
            sda     ONLINE       0     0     3
            sdb     ONLINE       1     0     0

errors: No known data errors

  pool: backup
 state: DEGRADED
status: One or more devices is currently being resilvered.
  scan: resilver in progress since Sun Oct 18 01:00:00 2026
        500G scanned out of 2T at 100M/s, 4h10m to go
        150G resilvered, 30.00% done
config:

        NAME             STATE     READ WRITE CKSUM
        backup           DEGRADED     0     0     0
          mirror-0       DEGRADED     0     0     0
            sdc          ONLINE       0     0     0
            replacing-1  DEGRADED     0     0     0
              sdd        OFFLINE      0     0     0
              sde        ONLINE       0     0     0  (resilvering)

errors: No known data errors
";

pub const ZPOOL_STATUS_IDLE: &str = "\
  pool: rpool
 state: ONLINE
  scan: none requested
config:

        NAME        STATE     READ WRITE CKSUM
        rpool       ONLINE       0     0     0
          nvme0n1   ONLINE       0     0     0

errors: No known data errors
";

/// Sink remembering the last value per series and label
#[derive(Default)]
pub struct RecordingSink {
    values: Mutex<BTreeMap<(Series, String), f64>>,
    calls: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, series: Series, label: &str) -> Option<f64> {
        self.values
            .lock()
            .unwrap()
            .get(&(series, label.to_string()))
            .copied()
    }

    pub fn snapshot(&self) -> BTreeMap<(Series, String), f64> {
        self.values.lock().unwrap().clone()
    }

    /// Number of distinct series/label pairs written
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn labels_of(&self, series: Series) -> Vec<String> {
        self.values
            .lock()
            .unwrap()
            .keys()
            .filter(|(s, _)| *s == series)
            .map(|(_, label)| label.clone())
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn set_value(&self, series: Series, label: &str, value: f64) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.values
            .lock()
            .unwrap()
            .insert((series, label.to_string()), value);
    }
}

/// Source serving canned report text
#[derive(Default)]
pub struct StaticSource {
    reports: HashMap<ReportKind, std::result::Result<String, String>>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source serving the three well-formed samples
    pub fn samples() -> Self {
        Self::new()
            .with(ReportKind::FilesystemList, ZFS_LIST)
            .with(ReportKind::PoolIostat, ZPOOL_IOSTAT)
            .with(ReportKind::PoolStatus, ZPOOL_STATUS)
    }

    pub fn with(mut self, kind: ReportKind, text: &str) -> Self {
        self.reports.insert(kind, Ok(text.to_string()));
        self
    }

    pub fn failing(mut self, kind: ReportKind, reason: &str) -> Self {
        self.reports.insert(kind, Err(reason.to_string()));
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ReportSource for StaticSource {
    async fn fetch(&self, kind: ReportKind) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.reports.get(&kind) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(reason)) => Err(ExporterError::CommandExecution {
                report: kind,
                reason: reason.clone(),
            }),
            None => Err(ExporterError::CommandExecution {
                report: kind,
                reason: "command not found".to_string(),
            }),
        }
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} but got {}",
        expected,
        actual
    );
}
