//! Server integration tests
//!
//! Tests for HTTP endpoints and server functionality.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use zfs_exporter::config::ServerConfig;
use zfs_exporter::metrics::{MetricsCollector, MetricsSink, Series};
use zfs_exporter::server::{self, AppState, Exposition};

/// Helper to create a test metrics instance
fn create_test_metrics() -> MetricsCollector {
    MetricsCollector::new().expect("Failed to create metrics")
}

fn loopback() -> ServerConfig {
    ServerConfig {
        addr: "127.0.0.1".to_string(),
        port: 0,
    }
}

async fn start(metrics: MetricsCollector, healthy: bool) -> (Exposition, Arc<AtomicBool>) {
    let healthy = Arc::new(AtomicBool::new(healthy));
    let exposition = server::open(
        &loopback(),
        AppState {
            metrics,
            healthy: healthy.clone(),
        },
    )
    .await
    .expect("Failed to open exposition endpoint");
    (exposition, healthy)
}

/// Issue a GET request and return the status code and body
async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.expect("read");

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    // Given: A metrics collector with some metrics set
    let metrics = create_test_metrics();
    metrics.set_value(Series::ZfsUsed, "tank", 2e12);
    metrics.set_value(Series::ZpoolErrorChecksum, "sda", 3.0);
    let (exposition, _) = start(metrics, true).await;

    // When: Scraping the metrics endpoint
    let (status, body) = get(exposition.local_addr(), "/metrics").await;

    // Then: Output should be valid Prometheus format
    assert_eq!(status, 200);
    assert!(body.contains("# HELP"), "Missing HELP comment");
    assert!(body.contains("# TYPE zfs_used gauge"), "Missing TYPE comment");
    assert!(body.contains("zfs_used{filesystem=\"tank\"} 2000000000000"));
    assert!(body.contains("zpool_errorchecksum{vdev=\"sda\"} 3"));

    exposition.shutdown();
}

#[tokio::test]
async fn test_scrape_sees_later_updates() {
    // Given: A running endpoint sharing its registry with the collector
    let metrics = create_test_metrics();
    let (exposition, _) = start(metrics.clone(), true).await;
    let (_, before) = get(exposition.local_addr(), "/metrics").await;

    // When: A value is published after the server started
    metrics.set_value(Series::ZpoolScrubScannedPct, "tank", 25.0);

    // Then: The next scrape reflects it
    let (_, after) = get(exposition.local_addr(), "/metrics").await;
    assert!(!before.contains("zpool_scrub_scanned_pct"));
    assert!(after.contains("zpool_scrub_scanned_pct{pool=\"tank\"} 25"));

    exposition.shutdown();
}

#[tokio::test]
async fn test_health_follows_last_cycle() {
    let (exposition, healthy) = start(create_test_metrics(), false).await;

    let (status, body) = get(exposition.local_addr(), "/health").await;
    assert_eq!(status, 503);
    assert!(body.contains("No ZFS report"));

    healthy.store(true, Ordering::Relaxed);

    let (status, body) = get(exposition.local_addr(), "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body, "OK");

    exposition.shutdown();
}

#[tokio::test]
async fn test_root_links_to_metrics() {
    let (exposition, _) = start(create_test_metrics(), true).await;

    let (status, body) = get(exposition.local_addr(), "/").await;

    assert_eq!(status, 200);
    assert!(body.contains("href=\"/metrics\""));
    assert!(body.contains("href=\"/health\""));

    exposition.shutdown();
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (exposition, _) = start(create_test_metrics(), true).await;

    let (status, _) = get(exposition.local_addr(), "/nope").await;

    assert_eq!(status, 404);
    exposition.shutdown();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    // Given: An address that is already taken
    let (first, _) = start(create_test_metrics(), true).await;
    let taken = ServerConfig {
        addr: "127.0.0.1".to_string(),
        port: first.local_addr().port(),
    };

    // When: Opening a second endpoint on it
    let result = server::open(
        &taken,
        AppState {
            metrics: create_test_metrics(),
            healthy: Arc::new(AtomicBool::new(false)),
        },
    )
    .await;

    // Then: The error surfaces instead of panicking
    assert!(result.is_err());
    first.shutdown();
}

#[test]
fn test_metrics_rendering_is_stable() {
    // Given: A metrics collector with a metric set
    let metrics = create_test_metrics();
    metrics.set_value(Series::ZpoolOpRead, "tank", 12.0);

    // When: Rendering the same metrics twice
    let render1 = metrics.render().expect("First render failed");
    let render2 = metrics.render().expect("Second render failed");

    // Then: Both renderings should be identical
    assert_eq!(render1, render2, "Metrics rendering is not stable");
}

#[test]
fn test_multiple_pools_metrics() {
    let metrics = create_test_metrics();

    for (pool, pct) in [("tank", 25.0), ("backup", 30.0), ("rpool", 0.0)] {
        metrics.set_value(Series::ZpoolResilveredPct, pool, pct);
    }

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("zpool_resilvered_pct{pool=\"tank\"} 25"));
    assert!(rendered.contains("zpool_resilvered_pct{pool=\"backup\"} 30"));
    assert!(rendered.contains("zpool_resilvered_pct{pool=\"rpool\"} 0"));
}
