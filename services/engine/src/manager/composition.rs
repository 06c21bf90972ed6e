//! Multiplier composition and the read cache
//!
//! `total = clamp(personal * global + (permission - 1), 1.0, 2 * max)`.
//! The permission tier is added rather than multiplied so high tiers do not
//! compound with personal boosters.

use dashmap::DashMap;
use serde::Serialize;
use shared::{ActorId, Booster, BoosterType, MIN_TOTAL_MULTIPLIER};

/// Every layer of one channel's multiplier for one actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultiplierBreakdown {
    pub booster_type: BoosterType,
    pub personal: f64,
    pub global: f64,
    pub permission: f64,
    pub total: f64,
}

/// Product of the active boosters of one channel; 1.0 when there are none
pub(crate) fn personal_multiplier(boosters: &[Booster], booster_type: BoosterType, now_ms: i64) -> f64 {
    boosters
        .iter()
        .filter(|b| b.booster_type() == booster_type && !b.is_expired_at(now_ms))
        .map(Booster::multiplier)
        .product()
}

pub(crate) fn compose(personal: f64, global: f64, permission: f64, ceiling: f64) -> f64 {
    let total = personal * global + (permission - 1.0);
    if total.is_nan() {
        return MIN_TOTAL_MULTIPLIER;
    }
    total.clamp(MIN_TOTAL_MULTIPLIER, ceiling.max(MIN_TOTAL_MULTIPLIER))
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    computed_at_ms: i64,
}

/// Short-lived per (actor, channel) cache of composed multipliers
#[derive(Debug)]
pub(crate) struct MultiplierCache {
    entries: DashMap<(ActorId, BoosterType), CacheEntry>,
    ttl_ms: i64,
}

impl MultiplierCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX),
        }
    }

    pub fn get(&self, actor: ActorId, booster_type: BoosterType, now_ms: i64) -> Option<f64> {
        let entry = self.entries.get(&(actor, booster_type))?;
        (now_ms - entry.computed_at_ms < self.ttl_ms).then_some(entry.value)
    }

    pub fn insert(&self, actor: ActorId, booster_type: BoosterType, value: f64, now_ms: i64) {
        self.entries.insert(
            (actor, booster_type),
            CacheEntry {
                value,
                computed_at_ms: now_ms,
            },
        );
    }

    pub fn invalidate_actor(&self, actor: ActorId) {
        for booster_type in BoosterType::ALL {
            self.entries.remove(&(actor, booster_type));
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
