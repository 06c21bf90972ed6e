/// Reward channels a booster can affect
///
/// The set is closed: every channel carries its labels and the hard-coded
/// fallback limits that apply when configuration does not override them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterType {
    Points,
    Exp,
    Drop,
}

impl BoosterType {
    pub const ALL: [BoosterType; 3] = [BoosterType::Points, BoosterType::Exp, BoosterType::Drop];

    pub fn display_name(&self) -> &'static str {
        match self {
            BoosterType::Points => "Points",
            BoosterType::Exp => "Experience",
            BoosterType::Drop => "Drop Rate",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BoosterType::Points => "⭐",
            BoosterType::Exp => "✨",
            BoosterType::Drop => "💎",
        }
    }

    /// Stable lowercase key used in storage, permissions and configuration
    pub fn key(&self) -> &'static str {
        match self {
            BoosterType::Points => "points",
            BoosterType::Exp => "exp",
            BoosterType::Drop => "drop",
        }
    }

    /// Icon followed by the display name, e.g. `⭐ Points`
    pub fn formatted_name(&self) -> String {
        format!("{} {}", self.icon(), self.display_name())
    }

    /// Ceiling used when configuration does not provide a higher one
    pub fn fallback_max_multiplier(&self) -> f64 {
        match self {
            BoosterType::Points | BoosterType::Exp => 100.0,
            BoosterType::Drop => 50.0,
        }
    }

    /// Multiplier granted when a request does not name one
    pub fn fallback_default_multiplier(&self) -> f64 {
        match self {
            BoosterType::Points | BoosterType::Exp => 2.0,
            BoosterType::Drop => 1.5,
        }
    }

    /// Number of permission tiers checked when configuration is silent
    pub fn fallback_permission_levels(&self) -> u32 {
        match self {
            BoosterType::Points | BoosterType::Exp => 10,
            BoosterType::Drop => 5,
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            BoosterType::Points => "POINTS",
            BoosterType::Exp => "EXP",
            BoosterType::Drop => "DROP",
        }
    }
}

impl fmt::Display for BoosterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for BoosterType {
    type Err = ValidationError;

    /// Accepts the variant name, the key or the display name in any case,
    /// then falls back to a partial match.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::UnknownBoosterType(input.to_string()));
        }

        let lowered = trimmed.to_lowercase();
        let exact = BoosterType::ALL.into_iter().find(|ty| {
            ty.variant_name().eq_ignore_ascii_case(trimmed)
                || ty.key() == lowered
                || ty.display_name().eq_ignore_ascii_case(trimmed)
        });
        if let Some(ty) = exact {
            return Ok(ty);
        }

        BoosterType::ALL
            .into_iter()
            .find(|ty| {
                ty.key().contains(&lowered) || ty.display_name().to_lowercase().contains(&lowered)
            })
            .ok_or_else(|| ValidationError::UnknownBoosterType(input.to_string()))
    }
}
