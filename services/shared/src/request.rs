/// Intent to activate a booster for one actor
///
/// Requests are immutable once built. The builder supplies the defaults
/// (no explicit strategy, source `Unknown`, persisted) and validates the
/// multiplier and duration unless a pre-built booster is attached, in which
/// case the booster carries its own validated values.
use serde::Serialize;

use crate::booster::Booster;
use crate::booster_type::BoosterType;
use crate::errors::ValidationError;
use crate::types::{BoosterSource, StackingStrategy};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoosterRequest {
    booster_type: BoosterType,
    multiplier: f64,
    duration_seconds: u64,
    stacking_strategy: Option<StackingStrategy>,
    source: BoosterSource,
    note: Option<String>,
    bypass_limit: bool,
    bypass_validation: bool,
    silent: bool,
    save_to_storage: bool,
    custom_booster: Option<Booster>,
}

impl BoosterRequest {
    pub fn builder(booster_type: BoosterType) -> BoosterRequestBuilder {
        BoosterRequestBuilder::new(booster_type)
    }

    /// Restore-path request wrapping an already existing booster
    pub fn from_existing(booster: Booster, source: BoosterSource) -> Self {
        Self {
            booster_type: booster.booster_type(),
            multiplier: booster.multiplier(),
            duration_seconds: duration_of(&booster),
            stacking_strategy: Some(StackingStrategy::Smart),
            source,
            note: None,
            bypass_limit: false,
            bypass_validation: false,
            silent: false,
            save_to_storage: false,
            custom_booster: Some(booster),
        }
    }

    /// Same request re-targeted at a resolved booster
    pub fn with_booster(&self, booster: Booster) -> Self {
        Self {
            multiplier: booster.multiplier(),
            duration_seconds: duration_of(&booster),
            custom_booster: Some(booster),
            ..self.clone()
        }
    }

    pub fn to_builder(&self) -> BoosterRequestBuilder {
        BoosterRequestBuilder { request: self.clone() }
    }

    pub fn booster_type(&self) -> BoosterType {
        self.booster_type
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn stacking_strategy(&self) -> Option<StackingStrategy> {
        self.stacking_strategy
    }

    pub fn source(&self) -> BoosterSource {
        self.source
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn bypass_limit(&self) -> bool {
        self.bypass_limit
    }

    pub fn bypass_validation(&self) -> bool {
        self.bypass_validation
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    pub fn save_to_storage(&self) -> bool {
        self.save_to_storage
    }

    pub fn custom_booster(&self) -> Option<&Booster> {
        self.custom_booster.as_ref()
    }

    pub fn has_custom_booster(&self) -> bool {
        self.custom_booster.is_some()
    }

    /// Multiplier that activation will apply
    pub fn target_multiplier(&self) -> f64 {
        self.custom_booster
            .as_ref()
            .map(Booster::multiplier)
            .unwrap_or(self.multiplier)
    }

    /// Restore paths may target actors that are not currently online
    pub fn allows_offline(&self) -> bool {
        self.custom_booster.is_some() || self.source == BoosterSource::Persisted
    }
}

fn duration_of(booster: &Booster) -> u64 {
    ((booster.total_duration_millis() / 1000).max(1)) as u64
}

pub struct BoosterRequestBuilder {
    request: BoosterRequest,
}

impl BoosterRequestBuilder {
    fn new(booster_type: BoosterType) -> Self {
        Self {
            request: BoosterRequest {
                booster_type,
                multiplier: 0.0,
                duration_seconds: 0,
                stacking_strategy: None,
                source: BoosterSource::Unknown,
                note: None,
                bypass_limit: false,
                bypass_validation: false,
                silent: false,
                save_to_storage: true,
                custom_booster: None,
            },
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.request.multiplier = multiplier;
        self
    }

    pub fn duration_seconds(mut self, duration_seconds: u64) -> Self {
        self.request.duration_seconds = duration_seconds;
        self
    }

    pub fn stacking_strategy(mut self, strategy: StackingStrategy) -> Self {
        self.request.stacking_strategy = Some(strategy);
        self
    }

    pub fn source(mut self, source: BoosterSource) -> Self {
        self.request.source = source;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.request.note = Some(note.into());
        self
    }

    pub fn bypass_limit(mut self, bypass: bool) -> Self {
        self.request.bypass_limit = bypass;
        self
    }

    pub fn bypass_validation(mut self, bypass: bool) -> Self {
        self.request.bypass_validation = bypass;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.request.silent = silent;
        self
    }

    pub fn save_to_storage(mut self, save: bool) -> Self {
        self.request.save_to_storage = save;
        self
    }

    pub fn custom_booster(mut self, booster: Booster) -> Self {
        self.request.custom_booster = Some(booster);
        self
    }

    pub fn build(self) -> Result<BoosterRequest, ValidationError> {
        let request = self.request;
        if request.custom_booster.is_none() {
            if !request.multiplier.is_finite() || request.multiplier <= 0.0 {
                return Err(ValidationError::InvalidMultiplier(request.multiplier));
            }
            if request.duration_seconds == 0 {
                return Err(ValidationError::InvalidDuration);
            }
        }
        Ok(request)
    }
}
