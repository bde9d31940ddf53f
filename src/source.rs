//! Report Sources
//!
//! The exporter reads three textual reports produced by the ZFS command-line tools.
//! Where the text comes from is abstracted behind [`ReportSource`] so the collection
//! cycle can be driven by real commands in production and by canned text in tests.
//!
//! # Reports
//!
//! - [`ReportKind::FilesystemList`] - `zfs list`
//! - [`ReportKind::PoolIostat`] - `zpool iostat -v`
//! - [`ReportKind::PoolStatus`] - `zpool status`

use crate::config::CollectorConfig;
use crate::error::{ExporterError, Result};
use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// The three reports a collection cycle consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    FilesystemList,
    PoolIostat,
    PoolStatus,
}

impl ReportKind {
    /// Short tag used as a prefix in log lines
    pub fn log_tag(self) -> &'static str {
        match self {
            ReportKind::FilesystemList => "ZFS-FS",
            ReportKind::PoolIostat => "ZPOOL-IOSTAT",
            ReportKind::PoolStatus => "ZPOOL-STATUS",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::FilesystemList => "zfs list",
            ReportKind::PoolIostat => "zpool iostat",
            ReportKind::PoolStatus => "zpool status",
        };
        f.write_str(name)
    }
}

/// Provider of raw report text
///
/// Implementations return the full text of one report or a
/// [`ExporterError::CommandExecution`] when the report is unavailable.
pub trait ReportSource {
    fn fetch(&self, kind: ReportKind) -> impl Future<Output = Result<String>> + Send;
}

/// Runs the ZFS tools as child processes
///
/// Each invocation is bounded by the configured timeout; a child that outlives it is
/// killed when its handle is dropped.
#[derive(Debug, Clone)]
pub struct CommandSource {
    zfs_list: Vec<String>,
    zpool_iostat: Vec<String>,
    zpool_status: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            zfs_list: config.zfs_list_command.clone(),
            zpool_iostat: config.zpool_iostat_command.clone(),
            zpool_status: config.zpool_status_command.clone(),
            timeout: Duration::from_secs(config.command_timeout_seconds),
        }
    }

    fn argv(&self, kind: ReportKind) -> &[String] {
        match kind {
            ReportKind::FilesystemList => &self.zfs_list,
            ReportKind::PoolIostat => &self.zpool_iostat,
            ReportKind::PoolStatus => &self.zpool_status,
        }
    }

    async fn run(&self, kind: ReportKind) -> Result<String> {
        let failure = |reason: String| ExporterError::CommandExecution {
            report: kind,
            reason,
        };

        let (program, args) = self
            .argv(kind)
            .split_first()
            .ok_or_else(|| failure("no command configured".to_string()))?;

        debug!("[{}] running {} {:?}", kind.log_tag(), program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failure(format!("failed to spawn {}: {}", program, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| failure(format!("{} timed out after {:?}", program, self.timeout)))?
            .map_err(|e| failure(format!("failed to wait for {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| failure(format!("output of {} is not UTF-8: {}", program, e)))
    }
}

impl ReportSource for CommandSource {
    async fn fetch(&self, kind: ReportKind) -> Result<String> {
        self.run(kind).await
    }
}
