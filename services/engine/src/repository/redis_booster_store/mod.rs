//! Redis-backed `BoosterStore`
//!
//! One hash per actor holds that actor's boosters keyed by type, and an index
//! set lists the actors that have a hash. Saves rewrite an actor's hash inside
//! an atomic pipeline.

mod codec;
mod keys;
mod lua_scripts;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use shared::{ActorId, Booster};
use std::collections::HashMap;
use uuid::Uuid;

use super::{sort_by_expiry, BoosterStore, Snapshot, StoreError};
use keys::{actor_index_key, actor_key, ACTOR_KEY_PREFIX};
use lua_scripts::DELETE_EXPIRED_SCRIPT;

pub struct RedisBoosterStore {
    redis: ConnectionManager,
}

impl RedisBoosterStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let redis = client.get_connection_manager().await?;
        Ok(Self::new(redis))
    }

    async fn read_actor(
        &self,
        redis_conn: &mut ConnectionManager,
        actor: ActorId,
        now_ms: i64,
    ) -> Result<Vec<Booster>, StoreError> {
        let rows: HashMap<String, String> = redis_conn.hgetall(actor_key(actor)).await?;

        let mut boosters = Vec::with_capacity(rows.len());
        for (field, value) in rows {
            match codec::decode(&field, &value) {
                Ok(booster) if !booster.is_expired_at(now_ms) => boosters.push(booster),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(%actor, field = %field, error = %e, "Skipping unreadable booster row");
                }
            }
        }
        sort_by_expiry(&mut boosters);
        Ok(boosters)
    }
}

#[async_trait]
impl BoosterStore for RedisBoosterStore {
    async fn save_all(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if snapshot.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();

        for (actor, boosters) in snapshot {
            let key = actor_key(*actor);
            pipe.del(&key).ignore();

            if boosters.is_empty() {
                pipe.srem(actor_index_key(), actor.to_string()).ignore();
                continue;
            }

            let fields = boosters
                .iter()
                .map(|b| Ok((b.booster_type().key(), codec::encode(b)?)))
                .collect::<Result<Vec<_>, StoreError>>()?;
            pipe.hset_multiple(&key, fields.as_slice()).ignore();
            pipe.sadd(actor_index_key(), actor.to_string()).ignore();
        }

        let mut redis_conn = self.redis.clone();
        let _: () = pipe.query_async(&mut redis_conn).await?;

        tracing::debug!(actors = snapshot.len(), "Saved booster snapshot to Redis");
        Ok(())
    }

    async fn load_all(&self, now_ms: i64) -> Result<Snapshot, StoreError> {
        let mut redis_conn = self.redis.clone();
        let members: Vec<String> = redis_conn.smembers(actor_index_key()).await?;

        let mut snapshot = HashMap::with_capacity(members.len());
        for member in members {
            let actor = match Uuid::parse_str(&member) {
                Ok(actor) => actor,
                Err(e) => {
                    tracing::warn!(member = %member, error = %e, "Skipping invalid actor id in booster index");
                    continue;
                }
            };

            let boosters = self.read_actor(&mut redis_conn, actor, now_ms).await?;
            if !boosters.is_empty() {
                snapshot.insert(actor, boosters);
            }
        }

        Ok(snapshot)
    }

    async fn load_actor(&self, actor: ActorId, now_ms: i64) -> Result<Vec<Booster>, StoreError> {
        let mut redis_conn = self.redis.clone();
        self.read_actor(&mut redis_conn, actor, now_ms).await
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<u64, StoreError> {
        let mut redis_conn = self.redis.clone();
        let script = Script::new(DELETE_EXPIRED_SCRIPT);
        let removed: u64 = script
            .key(actor_index_key())
            .arg(now_ms)
            .arg(ACTOR_KEY_PREFIX)
            .invoke_async(&mut redis_conn)
            .await?;

        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let mut redis_conn = self.redis.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut redis_conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
