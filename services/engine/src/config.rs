use serde::Deserialize;
use shared::{
    BoosterType, StackingStrategy, DEFAULT_CACHE_TTL_SECS, DEFAULT_DELETE_EXPIRED_INTERVAL_SECS,
    DEFAULT_DISPLAY_REFRESH_MILLIS, DEFAULT_MAX_BOOSTERS_PER_ACTOR, DEFAULT_PERMISSION_PREFIX,
    DEFAULT_PERSIST_QUEUE_CAPACITY, DEFAULT_SAVE_INTERVAL_SECS, DEFAULT_SWEEP_INTERVAL_SECS,
};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_port: u16,
    pub metrics_port: u16,
    pub storage: StorageConfig,
    pub redis: RedisConfig,
    pub booster: BoosterConfig,
    pub channels: HashMap<BoosterType, ChannelConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoosterConfig {
    pub max_per_actor: usize,
    pub default_strategy: StackingStrategy,
    pub cache_ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub save_interval_seconds: u64,
    pub delete_expired_interval_seconds: u64,
    pub display_refresh_millis: i64,
    pub persist_queue_capacity: usize,
    pub permission_prefix: String,
}

/// Per-channel limits, permission tiers and an optional global event booster
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub max_multiplier: Option<f64>,
    pub default_multiplier: Option<f64>,
    pub permission_levels: u32,
    pub global_multiplier: Option<f64>,
    pub global_end_ms: Option<i64>,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            max_per_actor: DEFAULT_MAX_BOOSTERS_PER_ACTOR,
            default_strategy: StackingStrategy::Smart,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECS,
            save_interval_seconds: DEFAULT_SAVE_INTERVAL_SECS,
            delete_expired_interval_seconds: DEFAULT_DELETE_EXPIRED_INTERVAL_SECS,
            display_refresh_millis: DEFAULT_DISPLAY_REFRESH_MILLIS,
            persist_queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
            permission_prefix: DEFAULT_PERMISSION_PREFIX.to_string(),
        }
    }
}

impl ChannelConfig {
    pub fn fallback(booster_type: BoosterType) -> Self {
        Self {
            max_multiplier: None,
            default_multiplier: None,
            permission_levels: booster_type.fallback_permission_levels(),
            global_multiplier: None,
            global_end_ms: None,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        _ => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3002,
            metrics_port: 9092,
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
            },
            booster: BoosterConfig::default(),
            channels: BoosterType::ALL
                .into_iter()
                .map(|booster_type| (booster_type, ChannelConfig::fallback(booster_type)))
                .collect(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "redis" => StorageBackend::Redis,
            other => anyhow::bail!("STORAGE_BACKEND must be 'redis' or 'memory', got '{}'", other),
        };

        let mut channels = HashMap::new();
        for booster_type in BoosterType::ALL {
            let prefix = format!("BOOSTER_{}", booster_type.key().to_uppercase());
            channels.insert(
                booster_type,
                ChannelConfig {
                    max_multiplier: parse_optional_var(&format!("{}_MAX_MULTIPLIER", prefix))?,
                    default_multiplier: parse_optional_var(&format!("{}_DEFAULT_MULTIPLIER", prefix))?,
                    permission_levels: parse_var(
                        &format!("{}_PERMISSION_LEVELS", prefix),
                        booster_type.fallback_permission_levels(),
                    )?,
                    global_multiplier: parse_optional_var(&format!("{}_GLOBAL_MULTIPLIER", prefix))?,
                    global_end_ms: parse_optional_var(&format!("{}_GLOBAL_END_MS", prefix))?,
                },
            );
        }

        let defaults = BoosterConfig::default();

        Ok(Config {
            api_port: parse_var("API_PORT", 3002)?,
            metrics_port: parse_var("METRICS_PORT", 9092)?,
            storage: StorageConfig { backend },
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            booster: BoosterConfig {
                max_per_actor: parse_var("BOOSTER_MAX_PER_ACTOR", defaults.max_per_actor)?,
                default_strategy: env::var("BOOSTER_DEFAULT_STACK_STRATEGY")
                    .map(|raw| StackingStrategy::parse(&raw))
                    .unwrap_or(defaults.default_strategy),
                cache_ttl_seconds: parse_var("BOOSTER_CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?,
                sweep_interval_seconds: parse_var(
                    "BOOSTER_SWEEP_INTERVAL_SECONDS",
                    defaults.sweep_interval_seconds,
                )?,
                save_interval_seconds: parse_var(
                    "BOOSTER_SAVE_INTERVAL_SECONDS",
                    defaults.save_interval_seconds,
                )?,
                delete_expired_interval_seconds: parse_var(
                    "BOOSTER_DELETE_EXPIRED_INTERVAL_SECONDS",
                    defaults.delete_expired_interval_seconds,
                )?,
                display_refresh_millis: parse_var(
                    "BOOSTER_DISPLAY_REFRESH_MILLIS",
                    defaults.display_refresh_millis,
                )?,
                persist_queue_capacity: parse_var(
                    "BOOSTER_PERSIST_QUEUE_CAPACITY",
                    defaults.persist_queue_capacity,
                )?,
                permission_prefix: env::var("BOOSTER_PERMISSION_PREFIX")
                    .unwrap_or(defaults.permission_prefix),
            },
            channels,
        })
    }
}
