/// Redis store tests; need a running server (`REDIS_URL`, defaults to localhost db 1)
///
/// Run with `cargo test --test redis_store -- --ignored`.
use booster_engine::repository::{BoosterStore, RedisBoosterStore};
use shared::{now_millis, Booster, BoosterType};
use std::collections::HashMap;
use uuid::Uuid;

async fn store() -> RedisBoosterStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/1".to_string());
    RedisBoosterStore::connect(&url)
        .await
        .expect("Failed to connect to test redis")
}

#[tokio::test]
#[ignore]
async fn test_save_and_load_round_trip() {
    let store = store().await;
    let actor = Uuid::new_v4();
    let now = now_millis();
    let boosters = vec![
        Booster::starting_at(BoosterType::Exp, 2.0, 30, now).unwrap(),
        Booster::starting_at(BoosterType::Points, 3.0, 300, now).unwrap(),
    ];

    store.save_all(&HashMap::from([(actor, boosters.clone())])).await.unwrap();

    assert_eq!(store.load_actor(actor, now).await.unwrap(), boosters);
    let all = store.load_all(now).await.unwrap();
    assert_eq!(all.get(&actor), Some(&boosters));

    // Saving an empty list removes the actor
    store.save_all(&HashMap::from([(actor, Vec::new())])).await.unwrap();
    assert!(store.load_actor(actor, now).await.unwrap().is_empty());
    assert!(!store.load_all(now).await.unwrap().contains_key(&actor));
}

#[tokio::test]
#[ignore]
async fn test_save_replaces_previous_rows() {
    let store = store().await;
    let actor = Uuid::new_v4();
    let now = now_millis();

    let first = vec![Booster::starting_at(BoosterType::Drop, 1.5, 60, now).unwrap()];
    let second = vec![Booster::starting_at(BoosterType::Points, 2.0, 60, now).unwrap()];
    store.save_all(&HashMap::from([(actor, first)])).await.unwrap();
    store.save_all(&HashMap::from([(actor, second.clone())])).await.unwrap();

    assert_eq!(store.load_actor(actor, now).await.unwrap(), second);

    store.save_all(&HashMap::from([(actor, Vec::new())])).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_delete_expired_rows() {
    let store = store().await;
    let actor = Uuid::new_v4();
    let now = now_millis();
    let short = Booster::starting_at(BoosterType::Exp, 2.0, 10, now).unwrap();
    let long = Booster::starting_at(BoosterType::Points, 2.0, 600, now).unwrap();

    store
        .save_all(&HashMap::from([(actor, vec![short, long.clone()])]))
        .await
        .unwrap();

    let later = now + 20_000;
    assert_eq!(store.load_actor(actor, later).await.unwrap(), vec![long.clone()]);
    assert!(store.delete_expired(later).await.unwrap() >= 1);
    assert_eq!(store.load_actor(actor, now).await.unwrap(), vec![long]);

    assert!(store.delete_expired(now + 700_000).await.unwrap() >= 1);
    assert!(!store.load_all(now).await.unwrap().contains_key(&actor));
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let store = store().await;
    store.health_check().await.unwrap();
    assert_eq!(store.backend_name(), "redis");
}
