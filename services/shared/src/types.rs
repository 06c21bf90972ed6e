/// Small domain enums shared by requests, results and metadata
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an actor (player) holding boosters
pub type ActorId = Uuid;

/// Provenance of a booster or request, for display and audit only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoosterSource {
    AdminCommand,
    RewardSystem,
    GlobalEvent,
    Purchase,
    Persisted,
    Legacy,
    Api,
    #[default]
    Unknown,
}

impl BoosterSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            BoosterSource::AdminCommand => "Admin command",
            BoosterSource::RewardSystem => "Reward",
            BoosterSource::GlobalEvent => "Server-wide event",
            BoosterSource::Purchase => "Shop",
            BoosterSource::Persisted => "Restored",
            BoosterSource::Legacy => "Legacy",
            BoosterSource::Api => "API",
            BoosterSource::Unknown => "Unknown",
        }
    }
}

/// What happens when an actor already holds a booster of the requested type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackingStrategy {
    /// Refuse any second booster of the same type
    RejectDuplicates,
    /// Swap in the new booster only when it is strictly stronger
    ReplaceIfStronger,
    /// Add the requested duration to the existing booster
    ExtendDuration,
    /// Stronger replaces, equal extends, weaker is refused
    #[default]
    Smart,
}

impl StackingStrategy {
    pub fn display_name(&self) -> &'static str {
        match self {
            StackingStrategy::RejectDuplicates => "Keep",
            StackingStrategy::ReplaceIfStronger => "Replace",
            StackingStrategy::ExtendDuration => "Stack",
            StackingStrategy::Smart => "Smart",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StackingStrategy::RejectDuplicates => "Duplicate booster types are not allowed",
            StackingStrategy::ReplaceIfStronger => "Replace only when the new booster is stronger",
            StackingStrategy::ExtendDuration => "Add the new duration to the current booster",
            StackingStrategy::Smart => "Decide automatically from the current booster",
        }
    }

    /// Lenient parse used for configuration and admin input; unknown values map to `Smart`
    pub fn parse(input: &str) -> Self {
        match input.trim().to_uppercase().as_str() {
            "STRICT" | "REJECT" | "NONE" | "REJECT_DUPLICATES" => StackingStrategy::RejectDuplicates,
            "REPLACE" | "OVERRIDE" | "OVERWRITE" | "REPLACE_IF_STRONGER" => {
                StackingStrategy::ReplaceIfStronger
            }
            "EXTEND" | "STACK" | "ADD" | "EXTEND_DURATION" => StackingStrategy::ExtendDuration,
            _ => StackingStrategy::Smart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_aliases() {
        assert_eq!(StackingStrategy::parse("strict"), StackingStrategy::RejectDuplicates);
        assert_eq!(StackingStrategy::parse("OVERWRITE"), StackingStrategy::ReplaceIfStronger);
        assert_eq!(StackingStrategy::parse(" stack "), StackingStrategy::ExtendDuration);
        assert_eq!(StackingStrategy::parse("smart"), StackingStrategy::Smart);
    }

    #[test]
    fn test_strategy_unknown_or_blank_is_smart() {
        assert_eq!(StackingStrategy::parse(""), StackingStrategy::Smart);
        assert_eq!(StackingStrategy::parse("whatever"), StackingStrategy::Smart);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let json = serde_json::to_string(&BoosterSource::AdminCommand).unwrap();
        assert_eq!(json, "\"admin_command\"");
    }
}
