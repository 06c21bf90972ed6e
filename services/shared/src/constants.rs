/// Shared constants for the booster engine
///
/// This module centralizes the defaults that the manager, the configuration
/// loader and the tests must agree on.

/// Maximum number of concurrently active boosters per actor
///
/// Applies only to boosters of distinct types; same-type collisions are resolved
/// by the stacking strategy instead.
pub const DEFAULT_MAX_BOOSTERS_PER_ACTOR: usize = 3;

/// Lifetime of a computed multiplier in the read cache (5 seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5;

/// Interval of the expiry sweep (10 seconds)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;

/// Interval of the full snapshot save (30 seconds)
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 30;

/// Interval of the expired-row cleanup in storage (5 minutes)
pub const DEFAULT_DELETE_EXPIRED_INTERVAL_SECS: u64 = 300;

/// Minimum delay between two status display refreshes for one actor
pub const DEFAULT_DISPLAY_REFRESH_MILLIS: i64 = 1_000;

/// Capacity of the incremental persistence queue
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 1_024;

/// Permission prefix for tiered permission boosters
///
/// Tier `n` of channel `points` is `booster.permission.points.n`.
pub const DEFAULT_PERMISSION_PREFIX: &str = "booster.permission";

/// Two multipliers closer than this are treated as equal by the smart strategy
pub const MULTIPLIER_TOLERANCE: f64 = 1e-4;

/// Lowest multiplier accepted on the validated activation path
pub const MIN_VALID_MULTIPLIER: f64 = 1.0;

/// Composed multipliers are never reported below this floor
pub const MIN_TOTAL_MULTIPLIER: f64 = 1.0;

/// Composed multipliers are clamped to the channel maximum times this factor
pub const TOTAL_CEILING_FACTOR: f64 = 2.0;

/// Remaining time below which a booster counts as urgent (30 seconds)
pub const URGENT_THRESHOLD_SECS: u64 = 30;

/// Remaining time below which a booster counts as expiring soon (5 minutes)
pub const WARNING_THRESHOLD_SECS: u64 = 300;
