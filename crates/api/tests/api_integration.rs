//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::config::Config;
use api::routes::AppState;
use api::storage::Storage;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Builds the app with the read side running.
fn setup() -> (axum::Router, Arc<AppState<InMemoryEventStore>>) {
    let (state, read_side) = api::create_default_state(
        InMemoryEventStore::new(),
        &Config::default(),
        Storage::in_memory(),
    );
    read_side.spawn();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn command(app: &axum::Router, body: impl Into<Body>) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/commands")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn query(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Polls a query until it answers 200, since the read model lags behind.
async fn eventually(app: &axum::Router, uri: &str) -> Value {
    for _ in 0..100 {
        let (status, json) = query(app, uri).await;
        if status == StatusCode::OK {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{uri} never became available");
}

fn register(user_name: &str, password: &str, email: &str) -> String {
    json!({
        "type": "RegisterUser",
        "version": 1,
        "fields": { "userName": user_name, "password": password, "email": email }
    })
    .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = query(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_register_user_and_query_it() {
    let (app, _) = setup();

    let result = command(&app, register("peter", "12345678", "peter@x.com")).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["code"], 104);
    let user_id = result["aggregateId"].as_str().unwrap().to_string();

    let user = eventually(&app, &format!("/users/{user_id}")).await;
    assert_eq!(user["userName"], "peter");
    assert_eq!(user["email"], "peter@x.com");
    assert_eq!(user["state"], "NEW");
    assert!(user.get("passwordHash").is_none());

    let (status, users) = query(&app, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_registrations() {
    let (app, _) = setup();

    command(&app, register("peter", "12345678", "peter@x.com")).await;

    let same = command(&app, register("peter", "12345678", "peter@x.com")).await;
    assert_eq!(same["code"], 101);
    assert_eq!(same["success"], false);

    let name = command(&app, register("peter", "12345678", "other@x.com")).await;
    assert_eq!(name["code"], 102);

    let email = command(&app, register("someoneelse", "12345678", "peter@x.com")).await;
    assert_eq!(email["code"], 103);
}

#[tokio::test]
async fn test_change_password() {
    let (app, _) = setup();
    let result = command(&app, register("peter", "12345678", "peter@x.com")).await;
    let user_id = result["aggregateId"].as_str().unwrap();

    let change = |old: &str, new: &str| {
        json!({
            "type": "ChangeUserPassword",
            "version": 1,
            "fields": { "userId": user_id, "oldPassword": old, "newPassword": new }
        })
        .to_string()
    };

    let changed = command(&app, change("12345678", "abc123def")).await;
    assert_eq!(changed["code"], 106);

    let wrong = command(&app, change("wrong", "zzz")).await;
    assert_eq!(wrong["code"], 105);
    assert_eq!(
        wrong["text"],
        "The old password is not equal to the stored password."
    );
}

#[tokio::test]
async fn test_unreadable_commands_are_invalid() {
    let (app, _) = setup();

    for body in [
        "not json at all".to_string(),
        json!({"type": "RegisterUser"}).to_string(),
        json!({"type": "PlaceBid", "version": 1, "fields": {}}).to_string(),
        register("pe", "12345678", "peter@x.com"),
    ] {
        let result = command(&app, body).await;
        assert_eq!(result["code"], 2);
        assert_eq!(result["success"], false);
        assert_eq!(result["keyValues"][0]["key"], "reason");
    }
}

#[tokio::test]
async fn test_category_lifecycle() {
    let (app, _) = setup();

    let created = command(
        &app,
        json!({"type": "CreateCategory", "version": 1, "fields": {"name": "Books"}}).to_string(),
    )
    .await;
    assert_eq!(created["code"], 113);
    let id: i64 = created["aggregateId"].as_str().unwrap().parse().unwrap();

    let marked = command(
        &app,
        json!({"type": "MarkCategoryForDeletion", "version": 1, "fields": {"categoryId": id}})
            .to_string(),
    )
    .await;
    assert_eq!(marked["code"], 114);

    let category = eventually(&app, &format!("/categories/{id}")).await;
    assert_eq!(category["name"], "Books");

    let (_, categories) = query(&app, "/categories").await;
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_info() {
    let (app, _) = setup();

    let result = command(
        &app,
        json!({"type": "GetServerInfo", "version": 1}).to_string(),
    )
    .await;

    assert_eq!(result["code"], 100);
    assert_eq!(result["serverInfo"]["name"], command_server::SERVER_NAME);
    assert!(result["serverInfo"]["startedAt"].is_string());
}

#[tokio::test]
async fn test_query_errors() {
    let (app, _) = setup();

    let (status, json) = query(&app, "/users/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not-a-uuid"));

    let (status, _) = query(&app, &format!("/users/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = query(&app, "/categories/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = query(&app, "/categories/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, state) = setup();
    state
        .commands
        .send(&command_api::GetServerInfo::default())
        .await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("commands_total"));
}
