//! `zpool iostat -v` parser
//!
//! ```text
//!               capacity     operations     bandwidth
//! pool        alloc   free   read  write   read  write
//! ----------  -----  -----  -----  -----  -----  -----
//! tank        1.21T  2.41T     12     40   310K  1.20M
//!   mirror-0  1.21T  2.41T     12     40   310K  1.20M
//!     sda         -      -      6     20   155K   600K
//! ----------  -----  -----  -----  -----  -----  -----
//! ```
//!
//! Pools, vdevs and disks are all reported as independent devices; indentation is
//! not interpreted.

use super::figure;
use crate::error::Result;
use crate::source::ReportKind;

const REPORT: ReportKind = ReportKind::PoolIostat;

/// Number of header lines preceding the device rows
const HEADER_LINES: usize = 3;

/// Columns of a device row: name plus six figures
const DEVICE_COLUMNS: usize = 7;

/// Capacity, operation and bandwidth figures for one device
///
/// A `None` figure was printed as `-` (or failed to parse) and is not published.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceIoMeasurement {
    pub device: String,
    pub capacity_alloc: Option<f64>,
    pub capacity_free: Option<f64>,
    pub ops_read: Option<f64>,
    pub ops_write: Option<f64>,
    pub bw_read: Option<f64>,
    pub bw_write: Option<f64>,
}

/// Parse the output of `zpool iostat -v`
///
/// Rows that are not exactly seven columns wide carry no device figures and are
/// skipped, as are dash separator lines.
pub fn parse_zpool_iostat(text: &str) -> Result<Vec<DeviceIoMeasurement>> {
    Ok(text
        .lines()
        .skip(HEADER_LINES)
        .map(str::trim)
        .filter(|line| !is_separator(line))
        .filter_map(parse_line)
        .collect())
}

fn is_separator(line: &str) -> bool {
    line.chars().all(|c| c == '-' || c.is_whitespace())
}

fn parse_line(line: &str) -> Option<DeviceIoMeasurement> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [device, alloc, free, ops_read, ops_write, bw_read, bw_write] =
        <[&str; DEVICE_COLUMNS]>::try_from(fields).ok()?;

    Some(DeviceIoMeasurement {
        device: device.to_string(),
        capacity_alloc: figure(REPORT, line, alloc),
        capacity_free: figure(REPORT, line, free),
        ops_read: figure(REPORT, line, ops_read),
        ops_write: figure(REPORT, line, ops_write),
        bw_read: figure(REPORT, line, bw_read),
        bw_write: figure(REPORT, line, bw_write),
    })
}
