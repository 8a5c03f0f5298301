//! End-to-end harvests against an in-memory host

use std::sync::Arc;
use std::time::Duration;

use rtop_core::error::{ExecutionError, MonitoringError};
use rtop_core::monitoring::{Harvester, PROBES};

use super::fake_host::FakeHost;

fn harvester() -> Harvester {
    Harvester::new(4, Duration::from_secs(5))
}

#[tokio::test]
async fn test_healthy_host_fills_every_field() {
    let host = Arc::new(FakeHost::healthy());
    let harvest = harvester().harvest(&host).await;

    assert!(harvest.is_complete(), "unexpected error: {:?}", harvest.error);
    let snap = harvest.snapshot;

    assert_eq!(snap.hostname, "web1.example.com");
    assert_eq!(snap.uptime.as_secs(), 350_735);
    assert_eq!(snap.loads.load1, "0.10");
    assert_eq!(snap.loads.total_procs, "150");
    assert_eq!(snap.memory.total, 2048 * 1024);
    assert_eq!(snap.memory.used(), (2048 - 512 - 64 - 128) * 1024);
    assert_eq!(snap.memory.swap_total, 4096 * 1024);

    let mounts: Vec<_> = snap.filesystems.iter().map(|f| f.mount_point.as_str()).collect();
    assert_eq!(mounts, vec!["/", "/srv/My Files"]);
    assert_eq!(snap.filesystems[1].total, 1_048_576_000);

    assert!((snap.cpu.user - 25.0).abs() < 1e-9);
    assert!((snap.cpu.system - 25.0).abs() < 1e-9);
    assert!((snap.cpu.idle - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_interfaces_follow_address_table() {
    let host = Arc::new(FakeHost::healthy());
    let snap = harvester().harvest(&host).await.into_result().unwrap();

    let names: Vec<_> = snap.interfaces.keys().map(String::as_str).collect();
    // docker0 has counters but no address; wg0 has an address but no counters
    assert_eq!(names, vec!["eth0", "lo", "wg0"]);

    let eth0 = &snap.interfaces["eth0"];
    assert_eq!(eth0.addr.ipv4, "10.0.0.2/24");
    assert_eq!(eth0.addr.ipv6, "fe80::1/64");
    assert_eq!(eth0.dev.rx, 9_876_543);
    assert_eq!(eth0.dev.tx, 1_234_567);

    let wg0 = &snap.interfaces["wg0"];
    assert_eq!(wg0.addr.ipv6, "");
    assert_eq!((wg0.dev.rx, wg0.dev.tx), (0, 0));
}

#[tokio::test]
async fn test_fallback_commands_cover_missing_binaries() {
    let host = Arc::new(
        FakeHost::healthy()
            .without("/bin/hostname -f")
            .with("/bin/hostname", "web1\n")
            .without("/bin/ip -o addr")
            .with("/sbin/ip -o addr", "2: eth0    inet 10.0.0.9/24 scope global eth0\n"),
    );
    let snap = harvester().harvest(&host).await.into_result().unwrap();

    assert_eq!(snap.hostname, "web1");
    assert_eq!(snap.interfaces["eth0"].addr.ipv4, "10.0.0.9/24");

    let calls = host.calls();
    assert!(calls.iter().any(|c| c == "/bin/hostname"));
    assert!(calls.iter().any(|c| c == "/sbin/ip -o addr"));
    // Primary commands that worked never trigger their fallback
    assert!(!calls.iter().any(|c| c == "/bin/df"));
}

#[tokio::test]
async fn test_one_failing_probe_leaves_the_rest() {
    // Every probe must be in flight before the failure lands
    let host = Arc::new(
        FakeHost::healthy()
            .without("/bin/cat /proc/uptime")
            .with_delay(Duration::from_millis(10)),
    );
    let harvest = Harvester::new(PROBES.len(), Duration::from_secs(5))
        .harvest(&host)
        .await;

    let Some(MonitoringError::Execution { probe, source }) = &harvest.error else {
        panic!("expected an execution error, got {:?}", harvest.error);
    };
    assert_eq!(*probe, "uptime");
    assert!(matches!(source, ExecutionError::ExitStatus { status: 127, .. }));

    let snap = &harvest.snapshot;
    assert_eq!(snap.uptime, Duration::ZERO);
    assert_eq!(snap.hostname, "web1.example.com");
    assert_eq!(snap.loads.load15, "0.30");
    assert_eq!(snap.memory.free, 512 * 1024);
    assert_eq!(snap.filesystems.len(), 2);
    assert_eq!(snap.interfaces.len(), 3);
    assert!(snap.cpu.idle > 0.0);
}

#[tokio::test]
async fn test_malformed_output_is_a_format_error() {
    let host = Arc::new(FakeHost::healthy().with("/bin/cat /proc/stat", "intr 1 2 3\n"));
    let harvest = Harvester::new(PROBES.len(), Duration::from_secs(5))
        .harvest(&host)
        .await;

    let err = harvest.error.expect("cpu probe should fail");
    assert!(matches!(err, MonitoringError::Format { .. }));
    assert_eq!(err.probe(), "cpu");
    assert!(!host.calls().is_empty());
}

#[tokio::test]
async fn test_slow_host_times_out() {
    let host = Arc::new(FakeHost::healthy().with_delay(Duration::from_millis(200)));
    let harvest = Harvester::new(2, Duration::from_millis(20)).harvest(&host).await;

    assert!(matches!(
        harvest.error,
        Some(MonitoringError::Execution {
            source: ExecutionError::TimedOut { .. },
            ..
        })
    ));
}
