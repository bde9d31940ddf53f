//! Daemon loop and signal flag tests

mod common;

use common::{StaticSource, ZFS_LIST, ZPOOL_IOSTAT, ZPOOL_STATUS};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zfs_exporter::config::Config;
use zfs_exporter::daemon::{Daemon, DaemonState};
use zfs_exporter::error::Result;
use zfs_exporter::metrics::MetricsCollector;
use zfs_exporter::signals::SignalFlags;
use zfs_exporter::source::{ReportKind, ReportSource};

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.addr = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

fn daemon<S: ReportSource>(source: S, flags: Arc<SignalFlags>) -> Daemon<S> {
    Daemon::new(
        test_config(),
        source,
        MetricsCollector::new().expect("Failed to create metrics"),
        flags,
    )
    .with_interval(Duration::from_millis(5))
}

/// Serves the samples and requests termination once `stop_after` status reports were fetched
struct StoppingSource {
    flags: Arc<SignalFlags>,
    stop_after: usize,
    cycles: AtomicUsize,
}

impl ReportSource for StoppingSource {
    async fn fetch(&self, kind: ReportKind) -> Result<String> {
        Ok(match kind {
            ReportKind::FilesystemList => ZFS_LIST.to_string(),
            ReportKind::PoolIostat => ZPOOL_IOSTAT.to_string(),
            ReportKind::PoolStatus => {
                let seen = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
                if seen >= self.stop_after {
                    self.flags.request_terminate();
                }
                ZPOOL_STATUS.to_string()
            }
        })
    }
}

#[tokio::test]
async fn test_pending_terminate_runs_exactly_one_cycle() {
    // Given: Termination requested before the daemon starts
    let flags = Arc::new(SignalFlags::new());
    flags.request_terminate();
    let mut daemon = daemon(StaticSource::samples(), flags);
    assert_eq!(daemon.state(), DaemonState::Starting);

    // When: Running
    let cycles = daemon.run().await.unwrap();

    // Then: One full cycle is performed before stopping
    assert_eq!(cycles, 1);
    assert_eq!(daemon.state(), DaemonState::Stopped);
    assert!(daemon
        .metrics()
        .render()
        .unwrap()
        .contains("zfs_used{filesystem=\"tank\"}"));
}

#[tokio::test]
async fn test_terminate_after_nth_cycle() {
    let flags = Arc::new(SignalFlags::new());
    let source = StoppingSource {
        flags: flags.clone(),
        stop_after: 3,
        cycles: AtomicUsize::new(0),
    };
    let mut daemon = daemon(source, flags.clone());

    let cycles = daemon.run().await.unwrap();

    assert_eq!(cycles, 3);
    assert_eq!(daemon.state(), DaemonState::Stopped);
}

#[tokio::test]
async fn test_reread_does_not_lose_terminate() {
    // Given: Both a reread and a termination request pending
    let flags = Arc::new(SignalFlags::new());
    flags.request_reread();
    flags.request_terminate();
    let rereads = Arc::new(AtomicUsize::new(0));
    let counter = rereads.clone();
    let mut daemon = daemon(StaticSource::samples(), flags.clone()).on_reread(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // When: Running
    let cycles = daemon.run().await.unwrap();

    // Then: The reread was consumed once and termination still took effect
    assert_eq!(rereads.load(Ordering::SeqCst), 1);
    assert_eq!(cycles, 1);
    assert!(!flags.reread_requested());
    assert!(flags.terminate_requested());
}

#[tokio::test]
async fn test_failing_source_keeps_daemon_alive() {
    let flags = Arc::new(SignalFlags::new());
    flags.request_terminate();
    let source = StaticSource::new()
        .failing(ReportKind::FilesystemList, "exit status 1")
        .failing(ReportKind::PoolIostat, "exit status 1")
        .failing(ReportKind::PoolStatus, "exit status 1");
    let mut daemon = daemon(source, flags);

    let cycles = daemon.run().await.unwrap();

    assert_eq!(cycles, 1);
    assert_eq!(daemon.state(), DaemonState::Stopped);
    assert!(!daemon.metrics().render().unwrap().contains("zfs_used"));
}

#[tokio::test]
async fn test_unbindable_address_fails_before_running() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let flags = Arc::new(SignalFlags::new());
    let mut config = test_config();
    config.server.port = taken.local_addr().unwrap().port();
    let mut daemon = Daemon::new(
        config,
        StaticSource::samples(),
        MetricsCollector::new().unwrap(),
        flags,
    );

    assert!(daemon.run().await.is_err());
    assert_eq!(daemon.state(), DaemonState::Starting);
}

#[test]
fn test_signal_flags_are_independent() {
    let flags = SignalFlags::new();

    flags.request_terminate();
    flags.request_reread();
    assert!(flags.take_reread());
    assert!(!flags.take_reread());
    assert!(flags.terminate_requested());

    flags.clear_terminate();
    flags.request_reread();
    assert!(!flags.terminate_requested());
    assert!(flags.reread_requested());

    flags.clear_reread();
    assert!(!flags.reread_requested());
}
