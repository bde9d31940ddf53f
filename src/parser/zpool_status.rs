//! `zpool status` parser
//!
//! ```text
//!   pool: tank
//!  state: ONLINE
//!   scan: scrub in progress since Sun Oct 18 00:24:01 2026
//!         1.20T scanned out of 2.40T at 150M/s, 2h13m to go
//!         0B repaired, 50.00% done
//! config:
//!
//!         NAME        STATE     READ WRITE CKSUM
//!         tank        ONLINE       0     0     0
//!           mirror-0  ONLINE       0     0     0
//!             sda     ONLINE       0     0     0
//!
//! errors: No known data errors
//! ```
//!
//! The report is a sequence of pool sections. Progress figures belong to the pool
//! whose `pool:` header was seen last; they are accumulated in a [`StatusScanner`]
//! and flushed as one [`PoolProgress`] when the next header arrives or the input ends.
//!
//! Only the `<scanned> scanned out of <total> at <rate>/s` progress line is understood.
//! Newer OpenZFS releases print `<scanned> scanned at <rate>/s, <issued> issued at
//! <rate>/s, <total> total` instead; such pools report zero scrub progress.

use super::figure;
use crate::error::{ExporterError, Result};
use crate::source::ReportKind;

const REPORT: ReportKind = ReportKind::PoolStatus;

const POOL_PREFIX: &str = "pool: ";
const SCRUB_MARKER: &str = "scanned out of";
const RESILVER_MARKER: &str = " resilvered, ";
const TABLE_HEADER: &str = "NAME";
const TABLE_END: &str = "errors:";

/// Error counters of one device row
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceErrorMeasurement {
    pub device: String,
    pub state: String,
    pub read_errors: Option<f64>,
    pub write_errors: Option<f64>,
    pub checksum_errors: Option<f64>,
}

/// Scrub and resilver progress of one pool
///
/// Figures the report does not mention stay at zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoolProgress {
    pub pool: String,
    pub scrub_scanned: f64,
    pub scrub_rate: f64,
    pub scrub_percent: f64,
    pub resilver_percent: f64,
    pub resilver_bytes: f64,
}

impl PoolProgress {
    pub fn new(pool: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            ..Default::default()
        }
    }
}

/// Everything one `zpool status` run yields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusReport {
    pub devices: Vec<DeviceErrorMeasurement>,
    pub pools: Vec<PoolProgress>,
}

/// Position inside the current pool section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    /// Before the `NAME` column header
    #[default]
    Preamble,
    /// Inside the device table
    Devices,
    /// After the `errors:` line
    Trailer,
}

/// Accumulator for a single pass over a status report
///
/// Feed lines in order with [`StatusScanner::feed`] and collect the result with
/// [`StatusScanner::finish`]. At most one pool is open at any time.
#[derive(Debug, Default)]
pub struct StatusScanner {
    open: Option<PoolProgress>,
    section: Section,
    report: StatusReport,
}

impl StatusScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool currently being accumulated
    pub fn open_pool(&self) -> Option<&PoolProgress> {
        self.open.as_ref()
    }

    /// Pools flushed so far
    pub fn flushed(&self) -> &[PoolProgress] {
        &self.report.pools
    }

    pub fn feed(mut self, line: &str) -> Result<Self> {
        let line = line.trim();

        if let Some(name) = line.strip_prefix(POOL_PREFIX) {
            self.flush();
            self.open = Some(PoolProgress::new(name.trim()));
            self.section = Section::Preamble;
            return Ok(self);
        }

        if let Some(pool) = self.open.as_mut() {
            if line.contains(SCRUB_MARKER) {
                apply_scrub_line(pool, line)?;
            }
            if line.contains(RESILVER_MARKER) {
                apply_resilver_line(pool, line)?;
            }
            self.device_line(line);
        }

        Ok(self)
    }

    pub fn finish(mut self) -> StatusReport {
        self.flush();
        self.report
    }

    fn flush(&mut self) {
        if let Some(pool) = self.open.take() {
            self.report.pools.push(pool);
        }
    }

    fn device_line(&mut self, line: &str) {
        match self.section {
            Section::Preamble => {
                if line.starts_with(TABLE_HEADER) {
                    self.section = Section::Devices;
                }
            }
            Section::Devices => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.first() == Some(&TABLE_END) {
                    self.section = Section::Trailer;
                    return;
                }
                if let Ok([device, state, read, write, checksum]) = <[&str; 5]>::try_from(fields)
                {
                    self.report.devices.push(DeviceErrorMeasurement {
                        device: device.to_string(),
                        state: state.to_string(),
                        read_errors: figure(REPORT, line, read),
                        write_errors: figure(REPORT, line, write),
                        checksum_errors: figure(REPORT, line, checksum),
                    });
                }
            }
            Section::Trailer => {}
        }
    }
}

/// Parse the output of `zpool status`
pub fn parse_zpool_status(text: &str) -> Result<StatusReport> {
    text.lines()
        .try_fold(StatusScanner::new(), StatusScanner::feed)
        .map(StatusScanner::finish)
}

/// `<scanned> scanned out of <total> at <rate>/s, <eta> to go`
fn apply_scrub_line(pool: &mut PoolProgress, line: &str) -> Result<()> {
    let malformed = |what: &str| {
        ExporterError::malformed_report(
            REPORT,
            format!("scrub progress line without {}: {:?}", what, line),
        )
    };

    let (scanned, rest) = line
        .split_once(SCRUB_MARKER)
        .ok_or_else(|| malformed("scanned amount"))?;
    let (total, rest) = rest.split_once(" at ").ok_or_else(|| malformed("rate"))?;
    let (rate, _) = rest.split_once('/').ok_or_else(|| malformed("rate unit"))?;

    let scanned = figure(REPORT, line, scanned.trim());
    let total = figure(REPORT, line, total.trim());

    if let Some(scanned) = scanned {
        pool.scrub_scanned = scanned;
    }
    if let Some(rate) = figure(REPORT, line, rate.trim()) {
        pool.scrub_rate = rate;
    }
    if let (Some(scanned), Some(total)) = (scanned, total) {
        pool.scrub_percent = if total > 0.0 {
            scanned / total * 100.0
        } else {
            0.0
        };
    }
    Ok(())
}

/// `<bytes> resilvered, <percent>% done`
fn apply_resilver_line(pool: &mut PoolProgress, line: &str) -> Result<()> {
    let (bytes, rest) = line.split_once(RESILVER_MARKER).ok_or_else(|| {
        ExporterError::malformed_report(REPORT, format!("unexpected resilver line: {:?}", line))
    })?;
    let (percent, _) = rest.split_once('%').ok_or_else(|| {
        ExporterError::malformed_report(
            REPORT,
            format!("resilver progress line without percentage: {:?}", line),
        )
    })?;

    if let Some(bytes) = figure(REPORT, line, bytes.trim()) {
        pool.resilver_bytes = bytes;
    }
    if let Some(percent) = figure(REPORT, line, percent.trim()) {
        pool.resilver_percent = percent;
    }
    Ok(())
}
