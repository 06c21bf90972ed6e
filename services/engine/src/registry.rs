//! Configurable half of the booster type registry
//!
//! `BoosterType` itself lives in `shared`; this module layers the configured
//! limits, the permission tier table and the server-wide event boosters on
//! top of it.

use serde::Serialize;
use shared::{ActorId, BoosterType, MIN_VALID_MULTIPLIER, TOTAL_CEILING_FACTOR};
use std::collections::HashMap;

use crate::config::{ChannelConfig, Config};
use crate::directory::ActorDirectory;

#[derive(Debug, Clone)]
pub struct BoosterTypeRegistry {
    channels: HashMap<BoosterType, ChannelConfig>,
    permission_prefix: String,
}

impl BoosterTypeRegistry {
    pub fn new(channels: HashMap<BoosterType, ChannelConfig>, permission_prefix: impl Into<String>) -> Self {
        Self {
            channels,
            permission_prefix: permission_prefix.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.channels.clone(), config.booster.permission_prefix.clone())
    }

    fn channel(&self, booster_type: BoosterType) -> ChannelConfig {
        self.channels
            .get(&booster_type)
            .cloned()
            .unwrap_or_else(|| ChannelConfig::fallback(booster_type))
    }

    /// Validation ceiling; configuration can raise but never lower the fallback
    pub fn max_multiplier(&self, booster_type: BoosterType) -> f64 {
        let fallback = booster_type.fallback_max_multiplier();
        match self.channel(booster_type).max_multiplier {
            Some(configured) if configured.is_finite() => configured.max(fallback),
            _ => fallback,
        }
    }

    pub fn default_multiplier(&self, booster_type: BoosterType) -> f64 {
        match self.channel(booster_type).default_multiplier {
            Some(configured) if configured.is_finite() && configured > 0.0 => configured,
            _ => booster_type.fallback_default_multiplier(),
        }
    }

    pub fn is_valid_multiplier(&self, booster_type: BoosterType, multiplier: f64) -> bool {
        multiplier.is_finite()
            && multiplier >= MIN_VALID_MULTIPLIER
            && multiplier <= self.max_multiplier(booster_type)
    }

    /// Upper bound applied to a composed multiplier
    pub fn total_ceiling(&self, booster_type: BoosterType) -> f64 {
        self.max_multiplier(booster_type) * TOTAL_CEILING_FACTOR
    }

    pub fn permission_levels(&self, booster_type: BoosterType) -> u32 {
        self.channel(booster_type).permission_levels
    }

    /// Permission node for one tier, e.g. `booster.permission.points.3`
    pub fn permission_node(&self, booster_type: BoosterType, level: u32) -> String {
        format!("{}.{}.{}", self.permission_prefix, booster_type.key(), level)
    }

    /// Multiplier of the highest tier the actor holds, or 1.0
    pub fn permission_multiplier(
        &self,
        directory: &dyn ActorDirectory,
        actor: ActorId,
        booster_type: BoosterType,
    ) -> f64 {
        (1..=self.permission_levels(booster_type))
            .rev()
            .find(|level| directory.has_permission(actor, &self.permission_node(booster_type, *level)))
            .map(f64::from)
            .unwrap_or(1.0)
    }

    /// Event boosters seeded from configuration
    pub fn configured_globals(&self) -> HashMap<BoosterType, GlobalBooster> {
        BoosterType::ALL
            .into_iter()
            .filter_map(|booster_type| {
                let channel = self.channel(booster_type);
                match (channel.global_multiplier, channel.global_end_ms) {
                    (Some(multiplier), Some(end_ms)) if multiplier.is_finite() && multiplier > 0.0 => {
                        Some((booster_type, GlobalBooster { multiplier, end_ms }))
                    }
                    _ => None,
                }
            })
            .collect()
    }
}

impl Default for BoosterTypeRegistry {
    fn default() -> Self {
        let channels = BoosterType::ALL
            .into_iter()
            .map(|booster_type| (booster_type, ChannelConfig::fallback(booster_type)))
            .collect();
        Self::new(channels, shared::DEFAULT_PERMISSION_PREFIX)
    }
}

/// Server-wide multiplier applied to every actor on one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalBooster {
    pub multiplier: f64,
    pub end_ms: i64,
}

impl GlobalBooster {
    pub fn is_active_at(&self, now_ms: i64) -> bool {
        now_ms < self.end_ms
    }
}
