/// Time-bounded multiplicative bonus on one reward channel
///
/// A `Booster` is immutable once built. Extending one yields a new value with a
/// later end time; the original is never touched. Every time-dependent accessor
/// has an `_at(now_ms)` form so callers with their own clock get deterministic
/// answers, and a convenience form that reads the wall clock.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::booster_type::BoosterType;
use crate::errors::ValidationError;
use crate::now_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBooster")]
pub struct Booster {
    booster_type: BoosterType,
    multiplier: f64,
    start_ms: i64,
    end_ms: i64,
}

/// Unvalidated wire shape; deserialization goes through `Booster::restore`
#[derive(Deserialize)]
struct RawBooster {
    booster_type: BoosterType,
    multiplier: f64,
    start_ms: i64,
    end_ms: i64,
}

impl TryFrom<RawBooster> for Booster {
    type Error = ValidationError;

    fn try_from(raw: RawBooster) -> Result<Self, Self::Error> {
        Booster::restore(raw.booster_type, raw.multiplier, raw.start_ms, raw.end_ms)
    }
}

/// Remaining-time layouts used by status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `01:23:45`
    Full,
    /// `1:23:45` or `23:45`
    Short,
    /// `1h 23m`, `23m 45s` or `45s`
    Compact,
}

fn seconds_to_millis(seconds: u64) -> Result<i64, ValidationError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| s.checked_mul(1000))
        .ok_or(ValidationError::InvalidDuration)
}

impl Booster {
    /// Create a booster starting now
    pub fn new(booster_type: BoosterType, multiplier: f64, duration_seconds: u64) -> Result<Self, ValidationError> {
        Self::starting_at(booster_type, multiplier, duration_seconds, now_millis())
    }

    /// Create a booster starting at `start_ms` and lasting `duration_seconds`
    pub fn starting_at(
        booster_type: BoosterType,
        multiplier: f64,
        duration_seconds: u64,
        start_ms: i64,
    ) -> Result<Self, ValidationError> {
        if duration_seconds == 0 {
            return Err(ValidationError::InvalidDuration);
        }
        let end_ms = start_ms
            .checked_add(seconds_to_millis(duration_seconds)?)
            .ok_or(ValidationError::InvalidDuration)?;
        Self::restore(booster_type, multiplier, start_ms, end_ms)
    }

    /// Rebuild a booster from stored timestamps
    pub fn restore(
        booster_type: BoosterType,
        multiplier: f64,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Self, ValidationError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ValidationError::InvalidMultiplier(multiplier));
        }
        if end_ms <= start_ms {
            return Err(ValidationError::InvalidTimeRange { start_ms, end_ms });
        }

        Ok(Self {
            booster_type,
            multiplier,
            start_ms,
            end_ms,
        })
    }

    pub fn booster_type(&self) -> BoosterType {
        self.booster_type
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn total_duration_millis(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn remaining_millis_at(&self, now_ms: i64) -> i64 {
        (self.end_ms - now_ms).max(0)
    }

    pub fn remaining_millis(&self) -> i64 {
        self.remaining_millis_at(now_millis())
    }

    pub fn remaining_seconds_at(&self, now_ms: i64) -> u64 {
        (self.remaining_millis_at(now_ms) / 1000) as u64
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds_at(now_millis())
    }

    /// Fraction of the total duration still left, in `0.0..=1.0`
    pub fn remaining_ratio_at(&self, now_ms: i64) -> f64 {
        let ratio = self.remaining_millis_at(now_ms) as f64 / self.total_duration_millis() as f64;
        ratio.clamp(0.0, 1.0)
    }

    pub fn remaining_ratio(&self) -> f64 {
        self.remaining_ratio_at(now_millis())
    }

    /// Elapsed share of the total duration, in percent
    pub fn progress_percentage_at(&self, now_ms: i64) -> f64 {
        let elapsed = (now_ms - self.start_ms) as f64;
        (elapsed / self.total_duration_millis() as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn progress_percentage(&self) -> f64 {
        self.progress_percentage_at(now_millis())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.end_ms
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }

    pub fn is_expiring_soon_at(&self, threshold_seconds: u64, now_ms: i64) -> bool {
        self.remaining_seconds_at(now_ms) <= threshold_seconds
    }

    pub fn is_expiring_soon(&self, threshold_seconds: u64) -> bool {
        self.is_expiring_soon_at(threshold_seconds, now_millis())
    }

    /// New booster with the same type, multiplier and start, ending later
    pub fn extend(&self, additional_seconds: u64) -> Result<Booster, ValidationError> {
        if additional_seconds == 0 {
            return Err(ValidationError::InvalidDuration);
        }
        let end_ms = self
            .end_ms
            .checked_add(seconds_to_millis(additional_seconds)?)
            .ok_or(ValidationError::InvalidDuration)?;

        Ok(Self {
            end_ms,
            ..self.clone()
        })
    }

    pub fn format_time_left_at(&self, format: TimeFormat, now_ms: i64) -> String {
        let seconds = self.remaining_seconds_at(now_ms);
        if seconds == 0 {
            return "00:00:00".to_string();
        }

        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;

        match format {
            TimeFormat::Full => format!("{:02}:{:02}:{:02}", hours, minutes, secs),
            TimeFormat::Short if hours > 0 => format!("{}:{:02}:{:02}", hours, minutes, secs),
            TimeFormat::Short => format!("{:02}:{:02}", minutes, secs),
            TimeFormat::Compact if hours > 0 => format!("{}h {}m", hours, minutes),
            TimeFormat::Compact if minutes > 0 => format!("{}m {}s", minutes, secs),
            TimeFormat::Compact => format!("{}s", secs),
        }
    }

    pub fn format_time_left(&self, format: TimeFormat) -> String {
        self.format_time_left_at(format, now_millis())
    }

    /// e.g. `Points Booster x2.0 (4m 10s)`
    pub fn describe_at(&self, now_ms: i64) -> String {
        format!(
            "{} Booster x{:.1} ({})",
            self.booster_type.display_name(),
            self.multiplier,
            self.format_time_left_at(TimeFormat::Compact, now_ms)
        )
    }

    pub fn describe(&self) -> String {
        self.describe_at(now_millis())
    }
}

impl fmt::Display for Booster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{:.1} until {}", self.booster_type, self.multiplier, self.end_ms)
    }
}
