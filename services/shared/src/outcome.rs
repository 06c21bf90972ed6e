/// Outcome of an activation request
///
/// Success variants carry the booster now in effect; `Extended` and
/// `Replaced` also carry the booster they superseded. Failures carry a
/// `FailureReason` and never a booster.
use serde::Serialize;

use crate::booster::Booster;
use crate::errors::FailureCategory;
use crate::request::BoosterRequest;

/// Reasons a booster request could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    InvalidRequest,
    InvalidMultiplier,
    InvalidDuration,
    LimitReached,
    DuplicateType,
    WeakerThanCurrent,
    PlayerOffline,
    ShuttingDown,
    InternalError,
}

impl FailureReason {
    pub fn default_message(&self) -> &'static str {
        match self {
            FailureReason::InvalidRequest => "The booster request is invalid.",
            FailureReason::InvalidMultiplier => "The booster multiplier is invalid.",
            FailureReason::InvalidDuration => "The booster duration is invalid.",
            FailureReason::LimitReached => "The actor has reached the booster limit.",
            FailureReason::DuplicateType => "The actor already has a booster of this type.",
            FailureReason::WeakerThanCurrent => "The new booster is weaker than the current one.",
            FailureReason::PlayerOffline => "The actor is not online.",
            FailureReason::ShuttingDown => "The booster engine is shutting down.",
            FailureReason::InternalError => "An internal error occurred.",
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            FailureReason::InvalidRequest
            | FailureReason::InvalidMultiplier
            | FailureReason::InvalidDuration => FailureCategory::Validation,
            FailureReason::LimitReached
            | FailureReason::DuplicateType
            | FailureReason::WeakerThanCurrent => FailureCategory::Policy,
            FailureReason::PlayerOffline | FailureReason::ShuttingDown => FailureCategory::Availability,
            FailureReason::InternalError => FailureCategory::Internal,
        }
    }

    /// Stable machine-readable code, e.g. `BOOSTER_WEAKER_THAN_CURRENT`
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::InvalidRequest => "BOOSTER_INVALID_REQUEST",
            FailureReason::InvalidMultiplier => "BOOSTER_INVALID_MULTIPLIER",
            FailureReason::InvalidDuration => "BOOSTER_INVALID_DURATION",
            FailureReason::LimitReached => "BOOSTER_LIMIT_REACHED",
            FailureReason::DuplicateType => "BOOSTER_DUPLICATE_TYPE",
            FailureReason::WeakerThanCurrent => "BOOSTER_WEAKER_THAN_CURRENT",
            FailureReason::PlayerOffline => "BOOSTER_PLAYER_OFFLINE",
            FailureReason::ShuttingDown => "BOOSTER_SHUTTING_DOWN",
            FailureReason::InternalError => "BOOSTER_INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivationOutcome {
    Created {
        booster: Booster,
    },
    Extended {
        booster: Booster,
        previous: Booster,
        additional_seconds: u64,
    },
    Replaced {
        booster: Booster,
        previous: Booster,
    },
    /// Reserved for boosters that start when the current one of the same
    /// type ends; no activation path produces it yet.
    Queued {
        booster: Booster,
    },
    Failed {
        reason: FailureReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationResult {
    #[serde(skip)]
    pub request: BoosterRequest,
    #[serde(flatten)]
    pub outcome: ActivationOutcome,
    pub message: String,
}

impl ActivationResult {
    pub fn created(request: BoosterRequest, booster: Booster, message: impl Into<String>) -> Self {
        Self {
            request,
            outcome: ActivationOutcome::Created { booster },
            message: message.into(),
        }
    }

    pub fn extended(
        request: BoosterRequest,
        booster: Booster,
        previous: Booster,
        additional_seconds: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request,
            outcome: ActivationOutcome::Extended {
                booster,
                previous,
                additional_seconds,
            },
            message: message.into(),
        }
    }

    pub fn replaced(
        request: BoosterRequest,
        booster: Booster,
        previous: Booster,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request,
            outcome: ActivationOutcome::Replaced { booster, previous },
            message: message.into(),
        }
    }

    pub fn queued(request: BoosterRequest, booster: Booster, message: impl Into<String>) -> Self {
        Self {
            request,
            outcome: ActivationOutcome::Queued { booster },
            message: message.into(),
        }
    }

    /// Failure carrying the reason's default message
    pub fn failure(request: BoosterRequest, reason: FailureReason) -> Self {
        Self::failure_with_message(request, reason, reason.default_message())
    }

    pub fn failure_with_message(
        request: BoosterRequest,
        reason: FailureReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request,
            outcome: ActivationOutcome::Failed { reason },
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, ActivationOutcome::Failed { .. })
    }

    /// Booster now in effect, if the request succeeded
    pub fn booster(&self) -> Option<&Booster> {
        match &self.outcome {
            ActivationOutcome::Created { booster }
            | ActivationOutcome::Extended { booster, .. }
            | ActivationOutcome::Replaced { booster, .. }
            | ActivationOutcome::Queued { booster } => Some(booster),
            ActivationOutcome::Failed { .. } => None,
        }
    }

    pub fn previous(&self) -> Option<&Booster> {
        match &self.outcome {
            ActivationOutcome::Extended { previous, .. } | ActivationOutcome::Replaced { previous, .. } => {
                Some(previous)
            }
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.outcome {
            ActivationOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short lowercase label for logs and metrics
    pub fn status_label(&self) -> &'static str {
        match self.outcome {
            ActivationOutcome::Created { .. } => "created",
            ActivationOutcome::Extended { .. } => "extended",
            ActivationOutcome::Replaced { .. } => "replaced",
            ActivationOutcome::Queued { .. } => "queued",
            ActivationOutcome::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster_type::BoosterType;

    fn request() -> BoosterRequest {
        BoosterRequest::builder(BoosterType::Points)
            .multiplier(2.0)
            .duration_seconds(60)
            .build()
            .unwrap()
    }

    #[test]
    fn test_failure_uses_default_message() {
        let result = ActivationResult::failure(request(), FailureReason::LimitReached);

        assert!(!result.is_success());
        assert_eq!(result.failure_reason(), Some(FailureReason::LimitReached));
        assert_eq!(result.message, FailureReason::LimitReached.default_message());
        assert!(result.booster().is_none());
    }

    #[test]
    fn test_extended_exposes_previous() {
        let previous = Booster::starting_at(BoosterType::Points, 2.0, 60, 0).unwrap();
        let booster = previous.extend(30).unwrap();
        let result = ActivationResult::extended(request(), booster.clone(), previous.clone(), 30, "ok");

        assert!(result.is_success());
        assert_eq!(result.booster(), Some(&booster));
        assert_eq!(result.previous(), Some(&previous));
        assert_eq!(result.status_label(), "extended");
    }

    #[test]
    fn test_reason_categories() {
        assert_eq!(FailureReason::InvalidDuration.category(), FailureCategory::Validation);
        assert_eq!(FailureReason::WeakerThanCurrent.category(), FailureCategory::Policy);
        assert_eq!(FailureReason::ShuttingDown.category(), FailureCategory::Availability);
        assert_eq!(FailureReason::InternalError.category(), FailureCategory::Internal);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let booster = Booster::starting_at(BoosterType::Points, 2.0, 60, 0).unwrap();
        let result = ActivationResult::created(request(), booster, "done");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "created");
        assert_eq!(json["message"], "done");
        assert_eq!(json["booster"]["multiplier"], 2.0);
    }
}
