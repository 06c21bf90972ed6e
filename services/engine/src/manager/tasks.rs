//! Background loops owned by the manager
//!
//! Both loops stop when the manager's cancellation token fires. The
//! persistence loop drains whatever is still queued before it exits so the
//! final snapshot is not raced by a stale incremental write.

use shared::ActorId;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::BoosterManager;

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn millis(value: i64) -> Duration {
    Duration::from_millis(u64::try_from(value).unwrap_or(0).max(1))
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

pub(super) fn spawn_sweep_loop(manager: BoosterManager, cancel: CancellationToken) -> JoinHandle<()> {
    let settings = manager.settings();
    let mut sweep = ticker(secs(settings.sweep_interval_seconds));
    let mut display = ticker(millis(settings.display_refresh_millis));

    tokio::spawn(async move {
        tracing::debug!("Booster sweep loop started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sweep.tick() => {
                    manager.sweep_expired().await;
                }
                _ = display.tick() => {
                    manager.refresh_displays().await;
                }
            }
        }
        tracing::debug!("Booster sweep loop stopped");
    })
}

pub(super) fn spawn_persistence_loop(
    manager: BoosterManager,
    mut queue: mpsc::Receiver<ActorId>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let settings = manager.settings();
    let mut save = ticker(secs(settings.save_interval_seconds));
    let mut delete_expired = ticker(secs(settings.delete_expired_interval_seconds));

    tokio::spawn(async move {
        tracing::debug!("Booster persistence loop started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    queue.close();
                    let pending = drain(&mut queue, None);
                    if !pending.is_empty() {
                        tracing::debug!(actors = pending.len(), "Draining persistence queue");
                    }
                    manager.persist_actors(&pending).await;
                    break;
                }
                Some(actor) = queue.recv() => {
                    let pending = drain(&mut queue, Some(actor));
                    manager.persist_actors(&pending).await;
                }
                _ = save.tick() => {
                    // Errors are logged inside; the next tick retries.
                    let _ = manager.save_snapshot().await;
                }
                _ = delete_expired.tick() => {
                    manager.delete_expired_rows().await;
                }
            }
        }
        tracing::debug!("Booster persistence loop stopped");
    })
}

/// Coalesce everything already queued into one batch of distinct actors
fn drain(queue: &mut mpsc::Receiver<ActorId>, first: Option<ActorId>) -> Vec<ActorId> {
    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    for actor in first.into_iter().chain(std::iter::from_fn(|| queue.try_recv().ok())) {
        if seen.insert(actor) {
            pending.push(actor);
        }
    }
    pending
}
