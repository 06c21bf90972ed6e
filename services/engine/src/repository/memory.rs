use async_trait::async_trait;
use shared::{ActorId, Booster};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{sort_by_expiry, BoosterStore, Snapshot, StoreError};

/// Process-local store used by the `memory` backend and by tests
#[derive(Debug, Default)]
pub struct InMemoryBoosterStore {
    rows: RwLock<Snapshot>,
    failing: AtomicBool,
    saves: AtomicU64,
}

impl InMemoryBoosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Snapshot) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful `save_all` calls
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored rows, expired ones included
    pub async fn stored(&self, actor: ActorId) -> Vec<Booster> {
        self.rows.read().await.get(&actor).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BoosterStore for InMemoryBoosterStore {
    async fn save_all(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        for (actor, boosters) in snapshot {
            if boosters.is_empty() {
                rows.remove(actor);
            } else {
                rows.insert(*actor, boosters.clone());
            }
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_all(&self, now_ms: i64) -> Result<Snapshot, StoreError> {
        self.check()?;
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter_map(|(actor, boosters)| {
                let mut active: Vec<Booster> =
                    boosters.iter().filter(|b| !b.is_expired_at(now_ms)).cloned().collect();
                sort_by_expiry(&mut active);
                (!active.is_empty()).then_some((*actor, active))
            })
            .collect())
    }

    async fn load_actor(&self, actor: ActorId, now_ms: i64) -> Result<Vec<Booster>, StoreError> {
        self.check()?;
        let mut active: Vec<Booster> = self
            .rows
            .read()
            .await
            .get(&actor)
            .map(|boosters| boosters.iter().filter(|b| !b.is_expired_at(now_ms)).cloned().collect())
            .unwrap_or_default();
        sort_by_expiry(&mut active);
        Ok(active)
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<u64, StoreError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let mut removed = 0u64;
        for boosters in rows.values_mut() {
            let before = boosters.len();
            boosters.retain(|b| !b.is_expired_at(now_ms));
            removed += (before - boosters.len()) as u64;
        }
        rows.retain(|_, boosters| !boosters.is_empty());
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BoosterType;
    use std::collections::HashMap;
    use uuid::Uuid;

    const T0: i64 = 1_700_000_000_000;

    #[tokio::test]
    async fn test_save_replaces_actor_rows() {
        let store = InMemoryBoosterStore::new();
        let actor = Uuid::new_v4();
        let points = Booster::starting_at(BoosterType::Points, 2.0, 60, T0).unwrap();
        let exp = Booster::starting_at(BoosterType::Exp, 3.0, 30, T0).unwrap();

        store
            .save_all(&HashMap::from([(actor, vec![points.clone(), exp.clone()])]))
            .await
            .unwrap();
        store.save_all(&HashMap::from([(actor, vec![exp.clone()])])).await.unwrap();

        assert_eq!(store.load_actor(actor, T0).await.unwrap(), vec![exp]);

        store.save_all(&HashMap::from([(actor, vec![])])).await.unwrap();
        assert!(store.load_all(T0).await.unwrap().is_empty());
        assert_eq!(store.save_count(), 3);
    }

    #[tokio::test]
    async fn test_load_filters_and_delete_expired() {
        let actor = Uuid::new_v4();
        let short = Booster::starting_at(BoosterType::Drop, 1.5, 10, T0).unwrap();
        let long = Booster::starting_at(BoosterType::Points, 2.0, 600, T0).unwrap();
        let store = InMemoryBoosterStore::with_rows(HashMap::from([(actor, vec![long.clone(), short])]));

        let later = T0 + 10_000;
        assert_eq!(store.load_all(later).await.unwrap()[&actor], vec![long]);
        assert_eq!(store.delete_expired(later).await.unwrap(), 1);
        assert_eq!(store.stored(actor).await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryBoosterStore::new();
        store.set_failing(true);

        let err = store.save_all(&HashMap::new()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(store.health_check().await.is_err());

        store.set_failing(false);
        assert!(store.health_check().await.is_ok());
    }
}
