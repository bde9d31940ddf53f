//! `zfs list` parser
//!
//! ```text
//! NAME         USED  AVAIL     REFER  MOUNTPOINT
//! tank        1.21T  2.30T       96K  /tank
//! tank/media   900G  2.30T      900G  /tank/media
//! ```

use super::figure;
use crate::error::{ExporterError, Result};
use crate::source::ReportKind;

const REPORT: ReportKind = ReportKind::FilesystemList;

/// Space accounting for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct FilesystemMeasurement {
    pub name: String,
    pub used: Option<f64>,
    pub avail: Option<f64>,
    pub referred: Option<f64>,
    pub mountpoint: String,
}

/// Parse the output of `zfs list`
///
/// The first line is the column header. Blank lines are ignored; every other line
/// must carry at least the five columns, anything past the fourth column being the
/// mountpoint.
pub fn parse_zfs_list(text: &str) -> Result<Vec<FilesystemMeasurement>> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<FilesystemMeasurement> {
    let mut fields = line.split_whitespace();
    let (Some(name), Some(used), Some(avail), Some(referred)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ExporterError::malformed_line(REPORT, line, "expected 5 columns"));
    };

    let mountpoint = fields.collect::<Vec<_>>().join(" ");
    if mountpoint.is_empty() {
        return Err(ExporterError::malformed_line(REPORT, line, "missing mountpoint column"));
    }

    Ok(FilesystemMeasurement {
        name: name.to_string(),
        used: figure(REPORT, line, used),
        avail: figure(REPORT, line, avail),
        referred: figure(REPORT, line, referred),
        mountpoint,
    })
}
