//! ZFS Prometheus Exporter
//!
//! Polls the ZFS command-line tools on a fixed interval, parses their textual reports
//! and republishes the figures as labeled Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   zfs list          ┌──────────────────────────┐
//! │  ZFS tools   │   zpool iostat -v   │         Exporter         │
//! │ (processes)  │ ──────────────────► │  ┌────────┐  ┌────────┐  │      HTTP      ┌────────────┐
//! └──────────────┘   zpool status      │  │Parsers │─►│Metrics │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────────────────┐  │
//!                                      │  │    Daemon loop     │  │
//!                                      │  └────────────────────┘  │
//!                                      └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`parser`] - Line-oriented parsers for the three reports
//! - [`source`] - Where report text comes from (child processes in production)
//! - [`collectors`] - Fetch, parse and publish, one collector per report
//! - [`metrics`] - Prometheus metric definitions and the sink seam
//! - [`daemon`] - Polling loop and lifecycle
//! - [`signals`] - Termination and reread flags driven by Unix signals
//! - [`server`] - HTTP exposition endpoint
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use zfs_exporter::{
//!     config::Config, daemon::Daemon, metrics::MetricsCollector, signals::SignalFlags,
//!     source::CommandSource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let source = CommandSource::new(&config.collector);
//!     let flags = Arc::new(SignalFlags::new());
//!     let mut daemon = Daemon::new(config, source, MetricsCollector::new()?, flags);
//!     daemon.run().await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod daemon;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod server;
pub mod signals;
pub mod source;
