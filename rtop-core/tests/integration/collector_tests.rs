//! Collector event stream tests

use std::sync::Arc;
use std::time::Duration;

use rtop_core::monitoring::{MetricsEvent, MonitoringSettings, start_collector};
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;

use super::fake_host::FakeHost;

const WAIT: Duration = Duration::from_secs(5);

fn settings() -> MonitoringSettings {
    MonitoringSettings {
        interval_secs: 1,
        workers: Some(8),
        probe_timeout_secs: 2,
    }
}

async fn next_event(rx: &mut Receiver<MetricsEvent>) -> MetricsEvent {
    timeout(WAIT, rx.recv())
        .await
        .expect("collector produced no event in time")
        .expect("collector channel closed")
}

#[tokio::test]
async fn test_first_harvest_is_immediate() {
    let host = Arc::new(FakeHost::healthy());
    let (handle, mut rx) = start_collector(host, &settings());

    // Well under the one second interval
    let event = timeout(Duration::from_millis(500), rx.recv()).await.unwrap().unwrap();
    match event {
        MetricsEvent::Update(snapshot) => assert_eq!(snapshot.hostname, "web1.example.com"),
        other => panic!("expected an update, got {other:?}"),
    }

    handle.stop().await;
}

#[tokio::test]
async fn test_failures_are_reported_and_collection_continues() {
    let host = Arc::new(
        FakeHost::healthy()
            .without("/bin/cat /proc/meminfo")
            .with_delay(Duration::from_millis(5)),
    );
    let (handle, mut rx) = start_collector(Arc::clone(&host), &settings());

    for _ in 0..2 {
        match next_event(&mut rx).await {
            MetricsEvent::Degraded { snapshot, error } => {
                assert!(error.contains("memory"), "error should name the probe: {error}");
                assert_eq!(snapshot.memory.total, 0);
                assert_eq!(snapshot.hostname, "web1.example.com");
            }
            other => panic!("expected a degraded event, got {other:?}"),
        }
    }

    let meminfo_runs = host
        .calls()
        .iter()
        .filter(|c| c.as_str() == "/bin/cat /proc/meminfo")
        .count();
    assert_eq!(meminfo_runs, 2);

    handle.stop().await;
}

#[tokio::test]
async fn test_stop_emits_stopped_and_closes() {
    let host = Arc::new(FakeHost::healthy());
    let (handle, mut rx) = start_collector(host, &settings());

    assert!(matches!(next_event(&mut rx).await, MetricsEvent::Update(_)));
    handle.stop().await;

    assert!(matches!(next_event(&mut rx).await, MetricsEvent::Stopped));
    let closed = timeout(WAIT, rx.recv()).await.unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_dropping_receiver_ends_collection() {
    let host = Arc::new(FakeHost::healthy());
    let (handle, rx) = start_collector(Arc::clone(&host), &settings());
    drop(rx);

    // The loop exits after its first failed send; stopping afterwards is harmless
    tokio::time::sleep(Duration::from_millis(200)).await;
    let calls = host.calls().len();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(host.calls().len(), calls);

    handle.stop().await;
}
