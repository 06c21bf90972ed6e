//! Stacking decision table
//!
//! Given the actor's current booster of the requested type (if any) and the
//! effective strategy, decide what the activation does. Pure: no locking, no
//! clock reads, no side effects.

use shared::{Booster, BoosterRequest, FailureReason, StackingStrategy, ValidationError, MULTIPLIER_TOLERANCE};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    Create(Booster),
    Extend {
        booster: Booster,
        previous: Booster,
        additional_seconds: u64,
    },
    Replace {
        booster: Booster,
        previous: Booster,
    },
    Reject(FailureReason),
}

pub(crate) struct ActivationContext<'a> {
    pub existing: Option<&'a Booster>,
    pub active_count: usize,
    pub limit: usize,
    pub strategy: StackingStrategy,
    pub now_ms: i64,
}

pub(crate) fn resolve(ctx: &ActivationContext<'_>, request: &BoosterRequest) -> Resolution {
    let Some(existing) = ctx.existing else {
        if ctx.active_count >= ctx.limit && !request.bypass_limit() {
            return Resolution::Reject(FailureReason::LimitReached);
        }
        return match candidate(request, ctx.now_ms) {
            Ok(booster) => Resolution::Create(booster),
            Err(reason) => Resolution::Reject(reason),
        };
    };

    let new_multiplier = request.target_multiplier();
    let old_multiplier = existing.multiplier();

    match ctx.strategy {
        StackingStrategy::RejectDuplicates => Resolution::Reject(FailureReason::DuplicateType),
        StackingStrategy::ExtendDuration => extend(existing, request),
        StackingStrategy::ReplaceIfStronger => {
            if new_multiplier <= old_multiplier && !request.bypass_validation() {
                Resolution::Reject(FailureReason::WeakerThanCurrent)
            } else {
                replace(existing, request, ctx.now_ms)
            }
        }
        StackingStrategy::Smart => {
            if new_multiplier > old_multiplier {
                replace(existing, request, ctx.now_ms)
            } else if (new_multiplier - old_multiplier).abs() < MULTIPLIER_TOLERANCE {
                extend(existing, request)
            } else if request.bypass_validation() {
                replace(existing, request, ctx.now_ms)
            } else {
                Resolution::Reject(FailureReason::WeakerThanCurrent)
            }
        }
    }
}

fn extend(existing: &Booster, request: &BoosterRequest) -> Resolution {
    let additional_seconds = request.duration_seconds();
    match existing.extend(additional_seconds) {
        Ok(booster) => Resolution::Extend {
            booster,
            previous: existing.clone(),
            additional_seconds,
        },
        Err(_) => Resolution::Reject(FailureReason::InvalidDuration),
    }
}

fn replace(existing: &Booster, request: &BoosterRequest, now_ms: i64) -> Resolution {
    match candidate(request, now_ms) {
        Ok(booster) => Resolution::Replace {
            booster,
            previous: existing.clone(),
        },
        Err(reason) => Resolution::Reject(reason),
    }
}

/// The booster a request would install: the attached one, or a fresh one starting now
fn candidate(request: &BoosterRequest, now_ms: i64) -> Result<Booster, FailureReason> {
    if let Some(booster) = request.custom_booster() {
        if booster.is_expired_at(now_ms) {
            return Err(FailureReason::InvalidDuration);
        }
        return Ok(booster.clone());
    }

    Booster::starting_at(request.booster_type(), request.multiplier(), request.duration_seconds(), now_ms)
        .map_err(|e| match e {
            ValidationError::InvalidMultiplier(_) => FailureReason::InvalidMultiplier,
            ValidationError::InvalidDuration | ValidationError::InvalidTimeRange { .. } => {
                FailureReason::InvalidDuration
            }
            ValidationError::UnknownBoosterType(_) => FailureReason::InvalidRequest,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BoosterType;

    const T0: i64 = 1_700_000_000_000;

    fn request(multiplier: f64, seconds: u64) -> BoosterRequest {
        BoosterRequest::builder(BoosterType::Points)
            .multiplier(multiplier)
            .duration_seconds(seconds)
            .build()
            .unwrap()
    }

    fn ctx(existing: Option<&Booster>, strategy: StackingStrategy) -> ActivationContext<'_> {
        ActivationContext {
            existing,
            active_count: existing.map(|_| 1).unwrap_or(0),
            limit: 3,
            strategy,
            now_ms: T0,
        }
    }

    fn current() -> Booster {
        Booster::starting_at(BoosterType::Points, 2.0, 60, T0).unwrap()
    }

    #[test]
    fn test_create_when_absent() {
        match resolve(&ctx(None, StackingStrategy::Smart), &request(2.0, 60)) {
            Resolution::Create(booster) => {
                assert_eq!(booster.multiplier(), 2.0);
                assert_eq!(booster.start_ms(), T0);
                assert_eq!(booster.end_ms(), T0 + 60_000);
            }
            other => panic!("expected Create, got {:?}", other),
        }
    }

    #[test]
    fn test_limit_applies_only_to_new_types() {
        let full = ActivationContext {
            existing: None,
            active_count: 3,
            limit: 3,
            strategy: StackingStrategy::Smart,
            now_ms: T0,
        };
        assert_eq!(resolve(&full, &request(2.0, 60)), Resolution::Reject(FailureReason::LimitReached));

        let bypass = request(2.0, 60).to_builder().bypass_limit(true).build().unwrap();
        assert!(matches!(resolve(&full, &bypass), Resolution::Create(_)));

        let existing = current();
        let full_with_existing = ActivationContext {
            existing: Some(&existing),
            ..full
        };
        assert!(matches!(
            resolve(&full_with_existing, &request(2.0, 30)),
            Resolution::Extend { .. }
        ));
    }

    #[test]
    fn test_smart_decision_table() {
        let existing = current();
        let context = ctx(Some(&existing), StackingStrategy::Smart);

        match resolve(&context, &request(1.99995, 30)) {
            Resolution::Extend {
                booster,
                additional_seconds,
                ..
            } => {
                assert_eq!(additional_seconds, 30);
                assert_eq!(booster.end_ms(), existing.end_ms() + 30_000);
                assert_eq!(booster.multiplier(), 2.0);
            }
            other => panic!("expected Extend, got {:?}", other),
        }

        match resolve(&context, &request(2.00005, 30)) {
            Resolution::Replace { booster, previous } => {
                assert_eq!(booster.multiplier(), 2.00005);
                assert_eq!(previous.multiplier(), 2.0);
            }
            other => panic!("expected Replace, got {:?}", other),
        }

        assert!(matches!(
            resolve(&context, &request(5.0, 10)),
            Resolution::Replace { ref previous, .. } if previous.multiplier() == 2.0
        ));
        assert_eq!(
            resolve(&context, &request(1.5, 10)),
            Resolution::Reject(FailureReason::WeakerThanCurrent)
        );

        let trusted = request(1.5, 10).to_builder().bypass_validation(true).build().unwrap();
        assert!(matches!(resolve(&context, &trusted), Resolution::Replace { .. }));
    }

    #[test]
    fn test_reject_duplicates() {
        let existing = current();
        assert_eq!(
            resolve(&ctx(Some(&existing), StackingStrategy::RejectDuplicates), &request(9.0, 10)),
            Resolution::Reject(FailureReason::DuplicateType)
        );
    }

    #[test]
    fn test_replace_if_stronger() {
        let existing = current();
        let context = ctx(Some(&existing), StackingStrategy::ReplaceIfStronger);

        assert_eq!(
            resolve(&context, &request(2.0, 10)),
            Resolution::Reject(FailureReason::WeakerThanCurrent)
        );
        assert!(matches!(resolve(&context, &request(2.5, 10)), Resolution::Replace { .. }));
    }

    #[test]
    fn test_extend_duration_ignores_multiplier() {
        let existing = current();
        match resolve(&ctx(Some(&existing), StackingStrategy::ExtendDuration), &request(7.0, 45)) {
            Resolution::Extend { booster, previous, .. } => {
                assert_eq!(booster.multiplier(), 2.0);
                assert_eq!(booster.end_ms(), previous.end_ms() + 45_000);
            }
            other => panic!("expected Extend, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_custom_booster_is_rejected() {
        let stale = Booster::starting_at(BoosterType::Points, 2.0, 10, T0 - 20_000).unwrap();
        let restore = BoosterRequest::from_existing(stale, shared::BoosterSource::Persisted);

        assert_eq!(
            resolve(&ctx(None, StackingStrategy::Smart), &restore),
            Resolution::Reject(FailureReason::InvalidDuration)
        );
    }
}
