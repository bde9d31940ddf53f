use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zfs_exporter::config::{Config, DaemonConfig, LogLevel};
use zfs_exporter::daemon::Daemon;
use zfs_exporter::metrics::MetricsCollector;
use zfs_exporter::signals::{self, SignalFlags};
use zfs_exporter::source::CommandSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "ZFS exporter daemon", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Stay in the foreground and log to the terminal
    #[arg(short, long)]
    foreground: bool,

    /// User (name or uid) the service is meant to run as
    #[arg(long)]
    uid: Option<String>,

    /// Group (name or gid) the service is meant to run as
    #[arg(long)]
    gid: Option<String>,

    /// Chroot directory the service is meant to run in
    #[arg(long)]
    chroot: Option<PathBuf>,

    /// PID file path
    #[arg(long)]
    pidfile: Option<PathBuf>,

    /// Log level (debug, info, warning, error, critical)
    #[arg(long)]
    loglevel: Option<String>,

    /// Log file used when not running in the foreground
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Interval in seconds in which data is gathered
    #[arg(short, long)]
    interval: Option<u64>,
}

impl Args {
    /// Override configuration values given on the command line
    fn apply(self, config: &mut Config) {
        if self.foreground {
            config.daemon.foreground = true;
        }
        if let Some(uid) = self.uid {
            config.daemon.uid = Some(uid);
        }
        if let Some(gid) = self.gid {
            config.daemon.gid = Some(gid);
        }
        if let Some(chroot) = self.chroot {
            config.daemon.chroot = Some(chroot);
        }
        if let Some(pidfile) = self.pidfile {
            config.daemon.pidfile = pidfile;
        }
        if let Some(level) = self.loglevel {
            config.daemon.log_level = level;
        }
        if let Some(logfile) = self.logfile {
            config.daemon.log_file = Some(logfile);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(addr) = self.addr {
            config.server.addr = addr;
        }
        if let Some(interval) = self.interval {
            config.collector.interval_seconds = interval;
        }
    }
}

fn init_tracing(daemon: &DaemonConfig, level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.as_tracing_level()).into())
        .from_env_lossy();

    let log_file = daemon.log_target().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    // Invalid configuration is fatal before anything starts
    let identity = match config.validate() {
        Ok(identity) => identity,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.daemon, identity.log_level);

    info!("Starting ZFS Prometheus Exporter v{}", env!("CARGO_PKG_VERSION"));
    debug!("Resolved identity: {:?}", identity);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    let flags = Arc::new(SignalFlags::new());
    signals::spawn_listener(flags.clone())?;

    let source = CommandSource::new(&config.collector);
    let mut daemon = Daemon::new(config, source, MetricsCollector::new()?, flags);

    if let Err(e) = daemon.run().await {
        error!("Daemon error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
