/// Integration tests for the HTTP surface
mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use booster_engine::build_router;
use common::{parse_error, request, TestContext, T0};
use serde_json::{json, Value};
use shared::BoosterType;
use uuid::Uuid;

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(build_router(ctx.app_state())).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");

    let body: Value = server.get("/health/detailed").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["store"]["backend"], "memory");

    ctx.store.set_failing(true);
    let body: Value = server.get("/health/detailed").await.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["store"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_activate_list_and_remove() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = Uuid::new_v4();

    let joined: Value = server
        .post(&format!("/api/actors/{}/session", actor))
        .json(&json!({ "permissions": ["booster.permission.points.2"] }))
        .await
        .json();
    assert_eq!(joined["online"], true);
    assert_eq!(joined["restored"], 0);

    let response = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({
            "booster_type": "points",
            "multiplier": 2.0,
            "duration_seconds": 60,
            "stacking_strategy": "SMART",
            "note": "weekend event"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "created");
    assert_eq!(body["booster"]["end_ms"], T0 + 60_000);

    let body: Value = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "points", "multiplier": 2.0, "duration_seconds": 30 }))
        .await
        .json();
    assert_eq!(body["status"], "extended");
    assert_eq!(body["additional_seconds"], 30);

    let listed: Value = server.get(&format!("/api/actors/{}/boosters", actor)).await.json();
    assert_eq!(listed["count"], 1);
    let view = &listed["boosters"][0];
    assert_eq!(view["booster_type"], "points");
    assert_eq!(view["remaining_seconds"], 90);
    assert_eq!(view["source"], "api");

    let multipliers: Value = server.get(&format!("/api/actors/{}/multipliers", actor)).await.json();
    let points = &multipliers["multipliers"][0];
    assert_eq!(points["booster_type"], "points");
    assert_eq!(points["permission"], 2.0);
    assert_eq!(points["total"], 3.0);

    let removed: Value = server
        .delete(&format!("/api/actors/{}/boosters/points", actor))
        .await
        .json();
    assert_eq!(removed["removed"], true);

    let response = server
        .delete(&format!("/api/actors/{}/boosters/points", actor))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let (code, _, category) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "NOT_FOUND");
    assert_eq!(category, "Validation");
}

#[tokio::test]
async fn test_multiplier_defaults_to_channel_default() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();

    let body: Value = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "drop", "duration_seconds": 60 }))
        .await
        .json();

    assert_eq!(body["booster"]["multiplier"], 1.5);
}

#[tokio::test]
async fn test_policy_rejection_is_conflict() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();
    ctx.manager.activate(actor, request(BoosterType::Exp, 3.0, 60)).await;

    let response = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "exp", "multiplier": 2.0, "duration_seconds": 60 }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let (code, message, category) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "BOOSTER_WEAKER_THAN_CURRENT");
    assert_eq!(category, "Policy");
    assert!(message.contains("weaker"));
}

#[tokio::test]
async fn test_invalid_multiplier_is_bad_request() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();

    let response = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "drop", "multiplier": 75.0, "duration_seconds": 60 }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let (code, _, category) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "BOOSTER_INVALID_MULTIPLIER");
    assert_eq!(category, "Validation");

    let response = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "drop", "multiplier": 2.0, "duration_seconds": 0 }))
        .expect_failure()
        .await;
    let (code, _, _) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "BOOSTER_INVALID_DURATION");
}

#[tokio::test]
async fn test_unknown_type_and_malformed_bodies() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();
    let path = format!("/api/actors/{}/boosters", actor);

    let response = server
        .post(&path)
        .json(&json!({ "booster_type": "gold", "duration_seconds": 60 }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let (code, _, _) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "VALIDATION_INVALID_INPUT");

    let response = server
        .post(&path)
        .json(&json!({ "booster_type": "points" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let (code, message, category) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "VALIDATION_MISSING_FIELD");
    assert!(message.contains("duration_seconds"));
    assert_eq!(category, "Validation");

    let response = server.post(&path).text("not json").expect_failure().await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_offline_and_shutdown_are_unavailable() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let offline = Uuid::new_v4();

    let response = server
        .post(&format!("/api/actors/{}/boosters", offline))
        .json(&json!({ "booster_type": "exp", "multiplier": 2.0, "duration_seconds": 60 }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let (code, _, category) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "BOOSTER_PLAYER_OFFLINE");
    assert_eq!(category, "Availability");

    let actor = ctx.online_actor();
    ctx.manager.shutdown().await;
    let response = server
        .post(&format!("/api/actors/{}/boosters", actor))
        .json(&json!({ "booster_type": "exp", "multiplier": 2.0, "duration_seconds": 60 }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let (code, _, _) = parse_error(&response.json()).unwrap();
    assert_eq!(code, "BOOSTER_SHUTTING_DOWN");
}

#[tokio::test]
async fn test_quit_requires_session() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();

    let body: Value = server.delete(&format!("/api/actors/{}/session", actor)).await.json();
    assert_eq!(body["online"], false);

    server
        .delete(&format!("/api/actors/{}/session", actor))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_global_booster_endpoints() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = ctx.online_actor();

    let body: Value = server
        .put("/api/global-boosters/exp")
        .json(&json!({ "multiplier": 2.0, "duration_seconds": 3600 }))
        .await
        .json();
    assert_eq!(body["end_ms"], T0 + 3_600_000);

    let multipliers: Value = server.get(&format!("/api/actors/{}/multipliers", actor)).await.json();
    assert_eq!(multipliers["multipliers"][1]["global"], 2.0);
    assert_eq!(multipliers["multipliers"][1]["total"], 2.0);

    server.delete("/api/global-boosters/exp").await.assert_status_ok();
    server
        .delete("/api/global-boosters/exp")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_restores_stored_boosters() {
    let ctx = TestContext::new();
    let server = server(&ctx);
    let actor = Uuid::new_v4();
    ctx.directory.join(actor, Vec::<String>::new());
    ctx.manager.activate(actor, request(BoosterType::Drop, 1.5, 120)).await;
    ctx.manager.save_snapshot().await.unwrap();
    ctx.manager.remove(actor, BoosterType::Drop).await;

    let body: Value = server
        .post(&format!("/api/actors/{}/session", actor))
        .json(&json!({}))
        .await
        .json();
    assert_eq!(body["restored"], 1);

    let listed: Value = server.get(&format!("/api/actors/{}/boosters", actor)).await.json();
    assert_eq!(listed["boosters"][0]["source"], "persisted");
}
