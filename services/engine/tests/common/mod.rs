//! Common test utilities and fixtures for integration tests
#![allow(dead_code)]

use booster_engine::clock::ManualClock;
use booster_engine::config::{BoosterConfig, Config};
use booster_engine::directory::InMemoryActorDirectory;
use booster_engine::display::{StatusDisplay, StatusView};
use booster_engine::manager::BoosterManager;
use booster_engine::repository::InMemoryBoosterStore;
use booster_engine::retry::RetryPolicy;
use booster_engine::state::AppState;
use serde_json::Value;
use shared::{ActorId, BoosterRequest, BoosterType, StackingStrategy};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const T0: i64 = 1_700_000_000_000;

/// Display that records what it was asked to show
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Mutex<Vec<(ActorId, usize)>>,
    pub cleared: Mutex<Vec<ActorId>>,
}

impl RecordingDisplay {
    pub fn shown_for(&self, actor: ActorId) -> usize {
        self.shown.lock().unwrap().iter().filter(|(a, _)| *a == actor).count()
    }

    pub fn cleared_for(&self, actor: ActorId) -> usize {
        self.cleared.lock().unwrap().iter().filter(|a| **a == actor).count()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&self, actor: ActorId, view: &StatusView) {
        self.shown.lock().unwrap().push((actor, view.entries.len()));
    }

    fn clear(&self, actor: ActorId) {
        self.cleared.lock().unwrap().push(actor);
    }
}

/// Manager wired to in-memory collaborators and a manual clock
pub struct TestContext {
    pub manager: BoosterManager,
    pub store: Arc<InMemoryBoosterStore>,
    pub directory: Arc<InMemoryActorDirectory>,
    pub clock: Arc<ManualClock>,
    pub display: Arc<RecordingDisplay>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(BoosterConfig::default())
    }

    pub fn with_settings(settings: BoosterConfig) -> Self {
        Self::with_store(settings, Arc::new(InMemoryBoosterStore::new()))
    }

    pub fn with_store(settings: BoosterConfig, store: Arc<InMemoryBoosterStore>) -> Self {
        let directory = Arc::new(InMemoryActorDirectory::new());
        let clock = Arc::new(ManualClock::new(T0));
        let display = Arc::new(RecordingDisplay::default());

        let manager = BoosterManager::builder(store.clone(), directory.clone())
            .settings(settings)
            .clock(clock.clone())
            .display(display.clone())
            .retry_policy(RetryPolicy::fast())
            .build();

        Self {
            manager,
            store,
            directory,
            clock,
            display,
        }
    }

    /// A fresh actor that is online with no permissions
    pub fn online_actor(&self) -> ActorId {
        let actor = Uuid::new_v4();
        self.directory.join(actor, Vec::<String>::new());
        actor
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(Config::default(), self.manager.clone(), self.directory.clone())
    }

    /// Poll the store until `check` passes or a second has gone by
    pub async fn wait_for_store<F>(&self, actor: ActorId, check: F) -> bool
    where
        F: Fn(&[shared::Booster]) -> bool,
    {
        for _ in 0..100 {
            if check(&self.store.stored(actor).await) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

pub fn request(booster_type: BoosterType, multiplier: f64, seconds: u64) -> BoosterRequest {
    BoosterRequest::builder(booster_type)
        .multiplier(multiplier)
        .duration_seconds(seconds)
        .build()
        .expect("valid request")
}

pub fn smart_request(booster_type: BoosterType, multiplier: f64, seconds: u64) -> BoosterRequest {
    request(booster_type, multiplier, seconds)
        .to_builder()
        .stacking_strategy(StackingStrategy::Smart)
        .build()
        .expect("valid request")
}

/// Parse the standard error body into (code, message, category)
pub fn parse_error(body: &Value) -> Option<(String, String, String)> {
    let error = body.get("error")?;
    Some((
        error.get("code")?.as_str()?.to_string(),
        error.get("message")?.as_str()?.to_string(),
        error.get("category")?.as_str()?.to_string(),
    ))
}
