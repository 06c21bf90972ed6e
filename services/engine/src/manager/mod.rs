//! Booster manager
//!
//! Owns every actor's active boosters and the metadata of the request that
//! produced each one. All mutations (activate, remove, expiry purge) take the
//! manager-wide write lock, so writes for unrelated actors are serialized.
//! Composed multipliers are served from a separate cache that is invalidated
//! while the write lock is held, so a reader can never store a value computed
//! from a list that has since changed.
//!
//! Persistence is fire-and-forget: mutations enqueue the actor id and the
//! persistence loop snapshots that actor's list when it gets to it.

mod activation;
mod composition;
mod tasks;

use dashmap::DashMap;
use shared::{
    ActivationResult, ActorId, Booster, BoosterRequest, BoosterSource, BoosterType, FailureReason,
    ValidationError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::BoosterConfig;
use crate::directory::ActorDirectory;
use crate::display::{NoopStatusDisplay, StatusDisplay, StatusView};
use crate::registry::{BoosterTypeRegistry, GlobalBooster};
use crate::repository::{BoosterStore, Snapshot, StoreError};
use crate::retry::RetryPolicy;

use activation::{ActivationContext, Resolution};
pub use composition::MultiplierBreakdown;
use composition::{compose, personal_multiplier, MultiplierCache};

#[derive(Debug, Default)]
struct ActorBoosters {
    /// Sorted by ascending expiry
    boosters: Vec<Booster>,
    metadata: HashMap<BoosterType, BoosterRequest>,
}

impl ActorBoosters {
    fn find(&self, booster_type: BoosterType) -> Option<&Booster> {
        self.boosters.iter().find(|b| b.booster_type() == booster_type)
    }

    /// Drop expired boosters and their metadata; returns how many were dropped
    fn purge_expired(&mut self, now_ms: i64) -> usize {
        let before = self.boosters.len();
        let metadata = &mut self.metadata;
        self.boosters.retain(|b| {
            let keep = !b.is_expired_at(now_ms);
            if !keep {
                metadata.remove(&b.booster_type());
            }
            keep
        });
        before - self.boosters.len()
    }

    fn install(&mut self, booster: Booster, metadata: BoosterRequest) {
        let booster_type = booster.booster_type();
        self.boosters.retain(|b| b.booster_type() != booster_type);
        self.boosters.push(booster);
        self.boosters.sort_by_key(|b| (b.end_ms(), b.booster_type()));
        self.metadata.insert(booster_type, metadata);
    }

    fn is_empty(&self) -> bool {
        self.boosters.is_empty()
    }
}

struct Inner {
    settings: BoosterConfig,
    registry: BoosterTypeRegistry,
    clock: Arc<dyn Clock>,
    directory: Arc<dyn ActorDirectory>,
    display: Arc<dyn StatusDisplay>,
    store: Arc<dyn BoosterStore>,
    retry: RetryPolicy,
    actors: RwLock<HashMap<ActorId, ActorBoosters>>,
    globals: DashMap<BoosterType, GlobalBooster>,
    cache: MultiplierCache,
    display_refreshed: DashMap<ActorId, i64>,
    shutting_down: AtomicBool,
    persist_tx: mpsc::Sender<ActorId>,
    persist_rx: Mutex<Option<mpsc::Receiver<ActorId>>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Cheaply cloneable handle to the shared booster state
#[derive(Clone)]
pub struct BoosterManager {
    inner: Arc<Inner>,
}

pub struct BoosterManagerBuilder {
    settings: BoosterConfig,
    registry: BoosterTypeRegistry,
    clock: Arc<dyn Clock>,
    directory: Arc<dyn ActorDirectory>,
    display: Arc<dyn StatusDisplay>,
    store: Arc<dyn BoosterStore>,
    retry: RetryPolicy,
}

impl BoosterManagerBuilder {
    pub fn settings(mut self, settings: BoosterConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(mut self, registry: BoosterTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn display(mut self, display: Arc<dyn StatusDisplay>) -> Self {
        self.display = display;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> BoosterManager {
        let (persist_tx, persist_rx) = mpsc::channel(self.settings.persist_queue_capacity.max(1));
        let globals = self.registry.configured_globals().into_iter().collect();

        BoosterManager {
            inner: Arc::new(Inner {
                cache: MultiplierCache::new(self.settings.cache_ttl_seconds),
                settings: self.settings,
                registry: self.registry,
                clock: self.clock,
                directory: self.directory,
                display: self.display,
                store: self.store,
                retry: self.retry,
                actors: RwLock::new(HashMap::new()),
                globals,
                display_refreshed: DashMap::new(),
                shutting_down: AtomicBool::new(false),
                persist_tx,
                persist_rx: Mutex::new(Some(persist_rx)),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl BoosterManager {
    pub fn builder(store: Arc<dyn BoosterStore>, directory: Arc<dyn ActorDirectory>) -> BoosterManagerBuilder {
        BoosterManagerBuilder {
            settings: BoosterConfig::default(),
            registry: BoosterTypeRegistry::default(),
            clock: Arc::new(SystemClock),
            directory,
            display: Arc::new(NoopStatusDisplay),
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn registry(&self) -> &BoosterTypeRegistry {
        &self.inner.registry
    }

    pub fn settings(&self) -> &BoosterConfig {
        &self.inner.settings
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    /// Current time on the manager's clock
    pub fn now_ms(&self) -> i64 {
        self.inner.clock.now_ms()
    }

    /// Restore persisted boosters and start the sweep and persistence loops
    ///
    /// A store that cannot be read after retrying is logged and the manager
    /// starts empty. Returns the number of restored boosters.
    pub async fn start(&self) -> usize {
        let Some(persist_rx) = self.inner.persist_rx.lock().await.take() else {
            tracing::warn!("Booster manager already started");
            return 0;
        };

        let now_ms = self.now_ms();
        let store = Arc::clone(&self.inner.store);
        let loaded = self
            .inner
            .retry
            .run("load_all", move || {
                let store = Arc::clone(&store);
                async move { store.load_all(now_ms).await }
            })
            .await;

        let restored = match loaded {
            Ok(snapshot) => self.restore_snapshot(snapshot, now_ms).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load persisted boosters, starting empty");
                metrics::counter!("booster_persistence_failures_total", "operation" => "load_all").increment(1);
                0
            }
        };

        let mut tasks = self.inner.tasks.lock().await;
        tasks.push(tasks::spawn_sweep_loop(self.clone(), self.inner.cancel.clone()));
        tasks.push(tasks::spawn_persistence_loop(
            self.clone(),
            persist_rx,
            self.inner.cancel.clone(),
        ));

        tracing::info!(
            restored,
            store = self.inner.store.backend_name(),
            max_per_actor = self.inner.settings.max_per_actor,
            default_strategy = ?self.inner.settings.default_strategy,
            "Booster manager started"
        );
        restored
    }

    async fn restore_snapshot(&self, snapshot: Snapshot, now_ms: i64) -> usize {
        let mut restored = 0;
        let mut actors = self.inner.actors.write().await;

        for (actor, boosters) in snapshot {
            let entry = actors.entry(actor).or_default();
            for booster in boosters {
                if booster.is_expired_at(now_ms) || entry.find(booster.booster_type()).is_some() {
                    continue;
                }
                let metadata = BoosterRequest::from_existing(booster.clone(), BoosterSource::Persisted);
                entry.install(booster, metadata);
                restored += 1;
            }
            if entry.is_empty() {
                actors.remove(&actor);
            }
        }

        self.inner.cache.clear();
        metrics::gauge!("booster_active_actors").set(actors.len() as f64);
        restored
    }

    /// Re-activate stored boosters of types the actor does not currently hold
    pub async fn restore_actor(&self, actor: ActorId) -> Result<usize, StoreError> {
        let boosters = self.inner.store.load_actor(actor, self.now_ms()).await?;
        let held: HashSet<BoosterType> = self.list(actor).await.iter().map(Booster::booster_type).collect();
        let mut restored = 0;
        for booster in boosters.into_iter().filter(|b| !held.contains(&b.booster_type())) {
            let request = BoosterRequest::from_existing(booster, BoosterSource::Persisted);
            if self.activate(actor, request).await.is_success() {
                restored += 1;
            }
        }
        Ok(restored)
    }

    /// Stop accepting activations, stop the loops, save a final snapshot and
    /// release all in-memory state
    pub async fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Booster manager shutting down");

        self.inner.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = self.inner.tasks.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Booster background task ended abnormally");
            }
        }

        let snapshot = Arc::new(self.all_boosters().await);
        let store = Arc::clone(&self.inner.store);
        let saved = {
            let snapshot = Arc::clone(&snapshot);
            self.inner
                .retry
                .run("final_snapshot", move || {
                    let store = Arc::clone(&store);
                    let snapshot = Arc::clone(&snapshot);
                    async move { store.save_all(&snapshot).await }
                })
                .await
        };
        match saved {
            Ok(()) => tracing::info!(actors = snapshot.len(), "Final booster snapshot saved"),
            Err(e) => {
                tracing::error!(error = %e, actors = snapshot.len(), "Failed to save final booster snapshot");
                metrics::counter!("booster_persistence_failures_total", "operation" => "final_snapshot")
                    .increment(1);
            }
        }

        let mut actors = self.inner.actors.write().await;
        for actor in actors.keys() {
            self.inner.display.clear(*actor);
        }
        actors.clear();
        self.inner.cache.clear();
        self.inner.display_refreshed.clear();
        metrics::gauge!("booster_active_actors").set(0.0);

        tracing::info!("Booster manager stopped");
    }

    pub async fn activate(&self, actor: ActorId, request: BoosterRequest) -> ActivationResult {
        if self.is_shutting_down() {
            return self.fail(actor, request, FailureReason::ShuttingDown);
        }
        if !request.allows_offline() && !self.inner.directory.is_online(actor) {
            return self.fail(actor, request, FailureReason::PlayerOffline);
        }

        let booster_type = request.booster_type();
        if !request.has_custom_booster() {
            let multiplier = request.multiplier();
            if !request.bypass_validation() && !self.inner.registry.is_valid_multiplier(booster_type, multiplier) {
                let message = format!(
                    "{} multiplier must be between {:.1} and {:.1}, got {}",
                    booster_type.display_name(),
                    shared::MIN_VALID_MULTIPLIER,
                    self.inner.registry.max_multiplier(booster_type),
                    multiplier
                );
                return self.fail_with_message(actor, request, FailureReason::InvalidMultiplier, message);
            }
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return self.fail(actor, request, FailureReason::InvalidMultiplier);
            }
            if request.duration_seconds() == 0 {
                return self.fail(actor, request, FailureReason::InvalidDuration);
            }
        }

        let now_ms = self.now_ms();
        let mut actors = self.inner.actors.write().await;
        let entry = actors.entry(actor).or_default();
        if entry.purge_expired(now_ms) > 0 {
            self.inner.cache.invalidate_actor(actor);
        }

        let strategy = request
            .stacking_strategy()
            .unwrap_or(self.inner.settings.default_strategy);
        let resolution = activation::resolve(
            &ActivationContext {
                existing: entry.find(booster_type),
                active_count: entry.boosters.len(),
                limit: self.inner.settings.max_per_actor,
                strategy,
                now_ms,
            },
            &request,
        );

        let (installed, result) = match resolution {
            Resolution::Reject(reason) => {
                if entry.is_empty() {
                    actors.remove(&actor);
                }
                drop(actors);
                return self.fail(actor, request, reason);
            }
            Resolution::Create(booster) => {
                let message = format!("Activated {}", booster.describe_at(now_ms));
                (booster.clone(), ActivationResult::created(request.clone(), booster, message))
            }
            Resolution::Extend {
                booster,
                previous,
                additional_seconds,
            } => {
                let message = format!(
                    "Extended {} by {}s ({} left)",
                    booster_type.formatted_name(),
                    additional_seconds,
                    booster.format_time_left_at(shared::TimeFormat::Compact, now_ms)
                );
                (
                    booster.clone(),
                    ActivationResult::extended(request.clone(), booster, previous, additional_seconds, message),
                )
            }
            Resolution::Replace { booster, previous } => {
                let message = format!(
                    "Replaced x{:.1} {} with x{:.1}",
                    previous.multiplier(),
                    booster_type.formatted_name(),
                    booster.multiplier()
                );
                (booster.clone(), ActivationResult::replaced(request.clone(), booster, previous, message))
            }
        };

        entry.install(installed.clone(), request.with_booster(installed.clone()));
        self.inner.cache.invalidate_actor(actor);
        let current = entry.boosters.clone();
        let active_actors = actors.len();
        drop(actors);

        if request.save_to_storage() {
            self.enqueue_persist(actor);
        }
        if !request.silent() {
            self.show_status(actor, &current, now_ms);
        }

        if request.silent() {
            tracing::debug!(
                %actor,
                outcome = result.status_label(),
                booster_type = %booster_type,
                multiplier = installed.multiplier(),
                end_ms = installed.end_ms(),
                strategy = ?strategy,
                source = ?request.source(),
                "Booster activated"
            );
        } else {
            tracing::info!(
                %actor,
                outcome = result.status_label(),
                booster_type = %booster_type,
                multiplier = installed.multiplier(),
                end_ms = installed.end_ms(),
                strategy = ?strategy,
                source = ?request.source(),
                "Booster activated"
            );
        }
        metrics::counter!("booster_activations_total", "outcome" => result.status_label()).increment(1);
        metrics::gauge!("booster_active_actors").set(active_actors as f64);

        result
    }

    fn fail(&self, actor: ActorId, request: BoosterRequest, reason: FailureReason) -> ActivationResult {
        self.fail_with_message(actor, request, reason, reason.default_message())
    }

    fn fail_with_message(
        &self,
        actor: ActorId,
        request: BoosterRequest,
        reason: FailureReason,
        message: impl Into<String>,
    ) -> ActivationResult {
        let result = ActivationResult::failure_with_message(request, reason, message);
        let booster_type = result.request.booster_type();

        let category = reason.category();
        match category.log_level() {
            "error" => {
                tracing::error!(%actor, %booster_type, reason = reason.code(), category = category.as_str(), message = %result.message, "Booster request failed")
            }
            "warn" => {
                tracing::warn!(%actor, %booster_type, reason = reason.code(), category = category.as_str(), message = %result.message, "Booster request failed")
            }
            "info" => {
                tracing::info!(%actor, %booster_type, reason = reason.code(), category = category.as_str(), message = %result.message, "Booster request failed")
            }
            _ => {
                tracing::debug!(%actor, %booster_type, reason = reason.code(), category = category.as_str(), message = %result.message, "Booster request failed")
            }
        }
        metrics::counter!("booster_activations_total", "outcome" => "failed").increment(1);
        metrics::counter!("booster_activation_failures_total", "reason" => reason.code()).increment(1);

        result
    }

    /// Cancel one booster; `false` when the actor holds none of that type
    pub async fn remove(&self, actor: ActorId, booster_type: BoosterType) -> bool {
        let now_ms = self.now_ms();
        let mut actors = self.inner.actors.write().await;
        let Some(entry) = actors.get_mut(&actor) else {
            return false;
        };

        let before = entry.boosters.len();
        entry.boosters.retain(|b| b.booster_type() != booster_type);
        if entry.boosters.len() == before {
            return false;
        }
        entry.metadata.remove(&booster_type);
        entry.purge_expired(now_ms);
        self.inner.cache.invalidate_actor(actor);

        let current = entry.boosters.clone();
        if current.is_empty() {
            actors.remove(&actor);
        }
        let active_actors = actors.len();
        drop(actors);

        self.enqueue_persist(actor);
        if current.is_empty() {
            self.inner.display.clear(actor);
            self.inner.display_refreshed.remove(&actor);
        } else {
            self.show_status(actor, &current, now_ms);
        }

        tracing::info!(%actor, %booster_type, "Booster removed");
        metrics::gauge!("booster_active_actors").set(active_actors as f64);
        true
    }

    /// Active boosters of one actor, sorted by expiry
    pub async fn list(&self, actor: ActorId) -> Vec<Booster> {
        let now_ms = self.now_ms();
        let mut actors = self.inner.actors.write().await;
        let Some(entry) = actors.get_mut(&actor) else {
            return Vec::new();
        };

        if entry.purge_expired(now_ms) > 0 {
            self.inner.cache.invalidate_actor(actor);
        }
        let current = entry.boosters.clone();
        if current.is_empty() {
            actors.remove(&actor);
        }
        current
    }

    /// Request that produced the actor's current booster of this type
    pub async fn metadata(&self, actor: ActorId, booster_type: BoosterType) -> Option<BoosterRequest> {
        let now_ms = self.now_ms();
        let actors = self.inner.actors.read().await;
        let entry = actors.get(&actor)?;
        entry
            .find(booster_type)
            .filter(|b| !b.is_expired_at(now_ms))
            .and_then(|_| entry.metadata.get(&booster_type).cloned())
    }

    /// Every actor's active boosters
    pub async fn all_boosters(&self) -> Snapshot {
        let now_ms = self.now_ms();
        let actors = self.inner.actors.read().await;
        actors
            .iter()
            .filter_map(|(actor, entry)| {
                let active: Vec<Booster> = entry
                    .boosters
                    .iter()
                    .filter(|b| !b.is_expired_at(now_ms))
                    .cloned()
                    .collect();
                (!active.is_empty()).then_some((*actor, active))
            })
            .collect()
    }

    pub async fn active_actor_count(&self) -> usize {
        self.inner.actors.read().await.len()
    }

    /// Composed multiplier for one channel, served from the cache when fresh
    pub async fn multiplier(&self, actor: ActorId, booster_type: BoosterType) -> f64 {
        let now_ms = self.now_ms();
        if let Some(value) = self.inner.cache.get(actor, booster_type, now_ms) {
            metrics::counter!("booster_multiplier_cache_total", "result" => "hit").increment(1);
            return value;
        }
        metrics::counter!("booster_multiplier_cache_total", "result" => "miss").increment(1);

        let actors = self.inner.actors.read().await;
        let breakdown = self.breakdown_locked(&actors, actor, booster_type, now_ms);
        self.inner.cache.insert(actor, booster_type, breakdown.total, now_ms);
        breakdown.total
    }

    /// Every layer of the composed multiplier, always freshly computed
    pub async fn multiplier_breakdown(&self, actor: ActorId, booster_type: BoosterType) -> MultiplierBreakdown {
        let now_ms = self.now_ms();
        let actors = self.inner.actors.read().await;
        self.breakdown_locked(&actors, actor, booster_type, now_ms)
    }

    fn breakdown_locked(
        &self,
        actors: &HashMap<ActorId, ActorBoosters>,
        actor: ActorId,
        booster_type: BoosterType,
        now_ms: i64,
    ) -> MultiplierBreakdown {
        let personal = actors
            .get(&actor)
            .map(|entry| personal_multiplier(&entry.boosters, booster_type, now_ms))
            .unwrap_or(1.0);
        let global = self.global_multiplier_at(booster_type, now_ms);
        let permission = self.permission_multiplier(actor, booster_type);
        let total = compose(personal, global, permission, self.inner.registry.total_ceiling(booster_type));

        MultiplierBreakdown {
            booster_type,
            personal,
            global,
            permission,
            total,
        }
    }

    pub fn permission_multiplier(&self, actor: ActorId, booster_type: BoosterType) -> f64 {
        self.inner
            .registry
            .permission_multiplier(self.inner.directory.as_ref(), actor, booster_type)
    }

    fn global_multiplier_at(&self, booster_type: BoosterType, now_ms: i64) -> f64 {
        self.inner
            .globals
            .get(&booster_type)
            .filter(|global| global.is_active_at(now_ms))
            .map(|global| global.multiplier)
            .unwrap_or(1.0)
    }

    /// Currently active server-wide booster for a channel
    pub fn global_booster(&self, booster_type: BoosterType) -> Option<GlobalBooster> {
        let now_ms = self.now_ms();
        self.inner
            .globals
            .get(&booster_type)
            .map(|global| *global)
            .filter(|global| global.is_active_at(now_ms))
    }

    pub async fn set_global_booster(
        &self,
        booster_type: BoosterType,
        multiplier: f64,
        duration_seconds: u64,
    ) -> Result<GlobalBooster, ValidationError> {
        let template = Booster::starting_at(booster_type, multiplier, duration_seconds, self.now_ms())?;
        let global = GlobalBooster {
            multiplier: template.multiplier(),
            end_ms: template.end_ms(),
        };

        // Hold the write lock so no reader caches a value computed from the old global
        let _actors = self.inner.actors.write().await;
        self.inner.globals.insert(booster_type, global);
        self.inner.cache.clear();

        tracing::info!(%booster_type, multiplier, end_ms = global.end_ms, "Global booster set");
        Ok(global)
    }

    pub async fn clear_global_booster(&self, booster_type: BoosterType) -> bool {
        let _actors = self.inner.actors.write().await;
        let removed = self.inner.globals.remove(&booster_type).is_some();
        if removed {
            self.inner.cache.clear();
            tracing::info!(%booster_type, "Global booster cleared");
        }
        removed
    }

    /// Forget display throttling for an actor that left; its boosters keep running
    pub fn on_actor_quit(&self, actor: ActorId) {
        self.inner.display_refreshed.remove(&actor);
    }

    pub async fn store_health(&self) -> Result<(), StoreError> {
        self.inner.store.health_check().await
    }

    pub fn store_backend(&self) -> &'static str {
        self.inner.store.backend_name()
    }

    /// Purge expired boosters from every actor; returns how many were dropped
    pub async fn sweep_expired(&self) -> usize {
        let now_ms = self.now_ms();
        let mut changed = Vec::new();
        let mut expired = 0;

        let mut actors = self.inner.actors.write().await;
        actors.retain(|actor, entry| {
            let dropped = entry.purge_expired(now_ms);
            if dropped > 0 {
                expired += dropped;
                self.inner.cache.invalidate_actor(*actor);
                changed.push((*actor, entry.is_empty()));
            }
            !entry.is_empty()
        });
        let active_actors = actors.len();
        drop(actors);

        for (actor, now_empty) in changed {
            self.enqueue_persist(actor);
            if now_empty {
                self.inner.display.clear(actor);
                self.inner.display_refreshed.remove(&actor);
            }
        }

        if expired > 0 {
            tracing::debug!(expired, active_actors, "Expired boosters purged");
            metrics::counter!("boosters_expired_total").increment(expired as u64);
        }
        metrics::gauge!("booster_active_actors").set(active_actors as f64);
        expired
    }

    /// Push status to online actors whose last refresh is older than the refresh interval
    pub async fn refresh_displays(&self) {
        let now_ms = self.now_ms();
        let due: Vec<(ActorId, Vec<Booster>)> = {
            let actors = self.inner.actors.read().await;
            actors
                .iter()
                .filter(|(actor, entry)| !entry.is_empty() && self.refresh_due(**actor, now_ms))
                .filter(|(actor, _)| self.inner.directory.is_online(**actor))
                .map(|(actor, entry)| (*actor, entry.boosters.clone()))
                .collect()
        };

        for (actor, boosters) in due {
            self.show_status(actor, &boosters, now_ms);
        }
    }

    fn refresh_due(&self, actor: ActorId, now_ms: i64) -> bool {
        self.inner
            .display_refreshed
            .get(&actor)
            .map(|last| now_ms - *last >= self.inner.settings.display_refresh_millis)
            .unwrap_or(true)
    }

    fn show_status(&self, actor: ActorId, boosters: &[Booster], now_ms: i64) {
        if !self.inner.directory.is_online(actor) {
            return;
        }
        let active: Vec<Booster> = boosters.iter().filter(|b| !b.is_expired_at(now_ms)).cloned().collect();
        if active.is_empty() {
            self.inner.display.clear(actor);
        } else {
            self.inner.display.show(actor, &StatusView::build(&active, now_ms));
        }
        self.inner.display_refreshed.insert(actor, now_ms);
    }

    fn enqueue_persist(&self, actor: ActorId) {
        match self.inner.persist_tx.try_send(actor) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%actor, "Persistence queue full, deferring to the next full snapshot");
                metrics::counter!("booster_persistence_failures_total", "operation" => "enqueue").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(%actor, "Persistence loop stopped, skipping incremental save");
            }
        }
    }

    /// Save the current lists of the given actors; absent actors are saved empty
    async fn persist_actors(&self, pending: &[ActorId]) {
        if pending.is_empty() {
            return;
        }
        let now_ms = self.now_ms();
        let snapshot: Snapshot = {
            let actors = self.inner.actors.read().await;
            pending
                .iter()
                .map(|actor| {
                    let boosters = actors
                        .get(actor)
                        .map(|entry| {
                            entry
                                .boosters
                                .iter()
                                .filter(|b| !b.is_expired_at(now_ms))
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    (*actor, boosters)
                })
                .collect()
        };

        if let Err(e) = self.inner.store.save_all(&snapshot).await {
            tracing::error!(error = %e, actors = snapshot.len(), "Failed to persist boosters");
            metrics::counter!("booster_persistence_failures_total", "operation" => "save_actor").increment(1);
        }
    }

    /// Best-effort save of every actor's active boosters
    pub async fn save_snapshot(&self) -> Result<(), StoreError> {
        let snapshot = self.all_boosters().await;
        match self.inner.store.save_all(&snapshot).await {
            Ok(()) => {
                tracing::debug!(actors = snapshot.len(), "Booster snapshot saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, actors = snapshot.len(), "Failed to save booster snapshot");
                metrics::counter!("booster_persistence_failures_total", "operation" => "save_all").increment(1);
                Err(e)
            }
        }
    }

    async fn delete_expired_rows(&self) {
        match self.inner.store.delete_expired(self.now_ms()).await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "Deleted expired booster rows from storage"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete expired booster rows");
                metrics::counter!("booster_persistence_failures_total", "operation" => "delete_expired")
                    .increment(1);
            }
        }
    }
}
