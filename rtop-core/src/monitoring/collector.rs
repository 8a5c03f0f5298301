//! Metrics collector that harvests on a fixed interval
//!
//! The collector owns a [`Harvester`] and an executor, runs one harvest per
//! tick on a background task and emits [`MetricsEvent`]s.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use super::harvester::Harvester;
use super::metrics::Snapshot;
use super::settings::MonitoringSettings;
use crate::ssh::CommandExecutor;
use crate::tracing::span_names;

/// Events emitted by the metrics collector
#[derive(Debug, Clone)]
pub enum MetricsEvent {
    /// Every probe succeeded
    Update(Snapshot),
    /// At least one probe failed; the snapshot holds what could be collected
    Degraded {
        /// Partial snapshot
        snapshot: Snapshot,
        /// First probe failure, rendered
        error: String,
    },
    /// Collector stopped
    Stopped,
}

/// Handle to control a running collector
#[derive(Debug)]
pub struct CollectorHandle {
    /// Send to stop the collector
    stop_tx: mpsc::Sender<()>,
}

impl CollectorHandle {
    /// Signals the collector to stop
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(()).await;
    }
}

/// Starts a metrics collection loop.
///
/// The first harvest runs immediately; later ones follow every
/// `settings.interval()`. A tick that falls due while a harvest is still
/// running is delayed rather than bunched up. The loop ends when the handle
/// is stopped or the receiver is dropped.
///
/// Returns a handle to stop the collector and a receiver for events.
pub fn start_collector<E>(
    executor: Arc<E>,
    settings: &MonitoringSettings,
) -> (CollectorHandle, mpsc::Receiver<MetricsEvent>)
where
    E: CommandExecutor + ?Sized + 'static,
{
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    let (event_tx, event_rx) = mpsc::channel::<MetricsEvent>(8);

    let interval = settings.interval();
    let harvester = Harvester::from_settings(settings);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    let _ = event_tx.send(MetricsEvent::Stopped).await;
                    break;
                }
                _ = ticker.tick() => {
                    let harvest = harvester
                        .harvest(&executor)
                        .instrument(crate::trace_operation_debug!(span_names::HARVEST))
                        .await;
                    let event = match harvest.error {
                        None => MetricsEvent::Update(harvest.snapshot),
                        Some(err) => {
                            tracing::debug!(probe = err.probe(), error = %err, "Harvest degraded");
                            MetricsEvent::Degraded {
                                snapshot: harvest.snapshot,
                                error: err.to_string(),
                            }
                        }
                    };
                    if event_tx.send(event).await.is_err() {
                        break; // receiver dropped
                    }
                }
            }
        }
    });

    (CollectorHandle { stop_tx }, event_rx)
}
