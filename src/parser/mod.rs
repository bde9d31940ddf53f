//! Report Parsers
//!
//! Line-oriented parsers turning the text output of the ZFS tools into measurement
//! records. Parsers are pure functions of their input: they hold no state between
//! calls and parsing the same text twice yields the same records.
//!
//! # Failure Isolation
//!
//! - A numeric token that does not parse only drops that one figure; it is logged
//!   as a warning and parsing continues.
//! - A line or section with the wrong shape fails the whole report with
//!   [`ExporterError::MalformedLine`](crate::error::ExporterError::MalformedLine) or
//!   [`ExporterError::MalformedReport`](crate::error::ExporterError::MalformedReport).

pub mod units;
pub mod zfs_list;
pub mod zpool_iostat;
pub mod zpool_status;

pub use zfs_list::{parse_zfs_list, FilesystemMeasurement};
pub use zpool_iostat::{parse_zpool_iostat, DeviceIoMeasurement};
pub use zpool_status::{parse_zpool_status, DeviceErrorMeasurement, PoolProgress, StatusReport};

use crate::source::ReportKind;
use tracing::warn;

/// Parse a figure, treating `-` as absent and logging tokens that do not parse
fn figure(report: ReportKind, line: &str, token: &str) -> Option<f64> {
    match units::parse_optional(token) {
        Ok(value) => value,
        Err(e) => {
            warn!("[{}] {} in line {:?}", report.log_tag(), e, line);
            None
        }
    }
}
