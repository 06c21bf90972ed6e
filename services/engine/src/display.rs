//! Status display seam
//!
//! The manager pushes each online actor's booster list to a `StatusDisplay`
//! whenever the list changes and, throttled, from the sweep loop. Rendering
//! is left to the collaborator.

use serde::Serialize;
use shared::{ActorId, Booster, BoosterType, TimeFormat, URGENT_THRESHOLD_SECS, WARNING_THRESHOLD_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Warning,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEntry {
    pub booster_type: BoosterType,
    pub label: String,
    pub multiplier: f64,
    pub remaining_seconds: u64,
    pub remaining: String,
    pub remaining_compact: String,
}

/// Snapshot of an actor's boosters, sorted by expiry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub entries: Vec<StatusEntry>,
    pub shortest_remaining_ratio: f64,
    pub urgency: Urgency,
}

impl StatusView {
    pub fn build(boosters: &[Booster], now_ms: i64) -> Self {
        let entries = boosters
            .iter()
            .map(|booster| StatusEntry {
                booster_type: booster.booster_type(),
                label: booster.booster_type().formatted_name(),
                multiplier: booster.multiplier(),
                remaining_seconds: booster.remaining_seconds_at(now_ms),
                remaining: booster.format_time_left_at(TimeFormat::Full, now_ms),
                remaining_compact: booster.format_time_left_at(TimeFormat::Compact, now_ms),
            })
            .collect();

        let shortest_remaining_ratio = boosters
            .iter()
            .min_by_key(|b| b.remaining_millis_at(now_ms))
            .map(|b| b.remaining_ratio_at(now_ms))
            .unwrap_or(0.0);

        let urgency = if boosters.iter().any(|b| b.is_expiring_soon_at(URGENT_THRESHOLD_SECS, now_ms)) {
            Urgency::Urgent
        } else if boosters.iter().any(|b| b.is_expiring_soon_at(WARNING_THRESHOLD_SECS, now_ms)) {
            Urgency::Warning
        } else {
            Urgency::Normal
        };

        Self {
            entries,
            shortest_remaining_ratio,
            urgency,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait StatusDisplay: Send + Sync {
    fn show(&self, actor: ActorId, view: &StatusView);

    fn clear(&self, actor: ActorId);
}

/// Emits status updates as debug events
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingStatusDisplay;

impl StatusDisplay for LoggingStatusDisplay {
    fn show(&self, actor: ActorId, view: &StatusView) {
        let summary = view
            .entries
            .iter()
            .map(|e| format!("{} x{:.1} ({})", e.label, e.multiplier, e.remaining_compact))
            .collect::<Vec<_>>()
            .join(" | ");

        tracing::debug!(
            %actor,
            boosters = view.entries.len(),
            urgency = ?view.urgency,
            progress = view.shortest_remaining_ratio,
            summary = %summary,
            "Booster status"
        );
    }

    fn clear(&self, actor: ActorId) {
        tracing::debug!(%actor, "Booster status cleared");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusDisplay;

impl StatusDisplay for NoopStatusDisplay {
    fn show(&self, _actor: ActorId, _view: &StatusView) {}

    fn clear(&self, _actor: ActorId) {}
}
