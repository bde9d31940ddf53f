use crate::error::ExporterError;
use anyhow::{Context, Result};
use nix::unistd::{Gid, Group, Uid, User};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub collect_filesystems: bool,
    #[serde(default = "default_true")]
    pub collect_iostat: bool,
    #[serde(default = "default_true")]
    pub collect_status: bool,
    #[serde(default = "default_zfs_list_command")]
    pub zfs_list_command: Vec<String>,
    #[serde(default = "default_zpool_iostat_command")]
    pub zpool_iostat_command: Vec<String>,
    #[serde(default = "default_zpool_status_command")]
    pub zpool_status_command: Vec<String>,
}

/// Process-level options
///
/// Forking, privilege drop and pidfile locking are left to the service manager; the
/// options are still validated at startup so a bad deployment fails before serving.
#[derive(Debug, Deserialize, Clone)]
pub struct DaemonConfig {
    #[serde(default)]
    pub foreground: bool,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub chroot: Option<PathBuf>,
    #[serde(default = "default_pidfile")]
    pub pidfile: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9249
}

fn default_interval() -> u64 {
    30
}

fn default_command_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_zfs_list_command() -> Vec<String> {
    vec!["zfs".to_string(), "list".to_string()]
}

fn default_zpool_iostat_command() -> Vec<String> {
    vec!["zpool".to_string(), "iostat".to_string(), "-v".to_string()]
}

fn default_zpool_status_command() -> Vec<String> {
    vec!["zpool".to_string(), "status".to_string()]
}

fn default_pidfile() -> PathBuf {
    PathBuf::from("/var/run/zfsexporter.pid")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("/var/log/zfsexporter.log"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            command_timeout_seconds: default_command_timeout(),
            collect_filesystems: true,
            collect_iostat: true,
            collect_status: true,
            zfs_list_command: default_zfs_list_command(),
            zpool_iostat_command: default_zpool_iostat_command(),
            zpool_status_command: default_zpool_status_command(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            foreground: false,
            uid: None,
            gid: None,
            chroot: None,
            pidfile: default_pidfile(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ZFS_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Check everything that must hold before the daemon enters its running state
    ///
    /// Returns the resolved log level and identity, or [`ExporterError::Config`]
    /// describing the first problem found.
    pub fn validate(&self) -> Result<ResolvedIdentity, ExporterError> {
        let log_level = self.daemon.log_level.parse::<LogLevel>()?;

        if self.collector.interval_seconds == 0 {
            return Err(ExporterError::Config(
                "interval_seconds must be greater than zero".to_string(),
            ));
        }

        for (name, argv) in [
            ("zfs_list_command", &self.collector.zfs_list_command),
            ("zpool_iostat_command", &self.collector.zpool_iostat_command),
            ("zpool_status_command", &self.collector.zpool_status_command),
        ] {
            if argv.is_empty() {
                return Err(ExporterError::Config(format!("{} must not be empty", name)));
            }
        }

        let uid = self.daemon.uid.as_deref().map(resolve_user).transpose()?;
        let gid = self.daemon.gid.as_deref().map(resolve_group).transpose()?;

        let chroot = match &self.daemon.chroot {
            Some(dir) if !dir.is_dir() => {
                return Err(ExporterError::Config(format!(
                    "Non existing chroot directory {}",
                    dir.display()
                )));
            }
            other => other.clone(),
        };

        Ok(ResolvedIdentity {
            log_level,
            uid,
            gid,
            chroot,
        })
    }
}

/// Startup options after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub log_level: LogLevel,
    pub uid: Option<Uid>,
    pub gid: Option<Gid>,
    pub chroot: Option<PathBuf>,
}

/// Accepted log level names
///
/// `critical` has no tracing counterpart and maps to `ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_tracing_level(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error | LogLevel::Critical => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(ExporterError::Config(format!("Unknown log level {}", other))),
        }
    }
}

/// Resolve a numeric uid or a user name
pub fn resolve_user(user: &str) -> Result<Uid, ExporterError> {
    if let Ok(raw) = user.parse::<u32>() {
        return Ok(Uid::from_raw(raw));
    }
    match User::from_name(user) {
        Ok(Some(entry)) => Ok(entry.uid),
        Ok(None) => Err(ExporterError::Config(format!("Unknown user {}", user))),
        Err(e) => Err(ExporterError::Config(format!(
            "Failed to look up user {}: {}",
            user, e
        ))),
    }
}

/// Resolve a numeric gid or a group name
pub fn resolve_group(group: &str) -> Result<Gid, ExporterError> {
    if let Ok(raw) = group.parse::<u32>() {
        return Ok(Gid::from_raw(raw));
    }
    match Group::from_name(group) {
        Ok(Some(entry)) => Ok(entry.gid),
        Ok(None) => Err(ExporterError::Config(format!("Unknown group {}", group))),
        Err(e) => Err(ExporterError::Config(format!(
            "Failed to look up group {}: {}",
            group, e
        ))),
    }
}

impl DaemonConfig {
    /// Log file to write to, `None` when logging to stderr
    pub fn log_target(&self) -> Option<&Path> {
        if self.foreground {
            None
        } else {
            self.log_file.as_deref()
        }
    }
}
