//! HTTP-level tests against the in-memory repository.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use user_api::{
    app, AppState, MemoryUserRepository, NewUser, Page, PageRequest, Role, StorageError, User, UserId,
    UserRepository, UserStats,
};

fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryUserRepository::new())), 1024)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => {
            let bytes = v.to_string();
            builder
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, bytes.len())
                .body(Body::from(bytes))
                .unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // Layers such as the body limit answer in plain text.
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/users", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["error_code"], 0, "{json}");
    json["data"].clone()
}

#[tokio::test]
async fn create_update_delete_lifecycle() {
    let app = test_app();
    let user = create(&app, json!({"name": "Zhang San", "status": 1, "role": "admin"})).await;
    let id = user["id"].as_i64().unwrap();
    assert_ne!(id, 0);
    assert_eq!(user["name"], "Zhang San");
    assert_eq!(user["status"], 1);
    assert_eq!(user["role"], "admin");

    let (status, json) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"error_code": 0, "error_message": "", "data": user}));

    let (status, json) = send(&app, "PATCH", &format!("/users/{id}/role"), Some(json!({"role": "user"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], "user");
    assert_eq!(json["data"]["status"], 1);

    let (status, json) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"error_code": 0, "error_message": "", "data": true}));

    let (status, json) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"detail": "User not found"}));
}

#[tokio::test]
async fn create_applies_default_status_and_role() {
    let app = test_app();
    let user = create(&app, json!({"name": "Li Si"})).await;
    assert_eq!(user["status"], 0);
    assert_eq!(user["role"], "user");
}

#[tokio::test]
async fn missing_ids_are_404_on_every_route() {
    let app = test_app();
    for (method, uri, body) in [
        ("GET", "/users/99", None),
        ("PATCH", "/users/99/role", Some(json!({"role": "guest"}))),
        ("DELETE", "/users/99", None),
    ] {
        let (status, json) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json["detail"], "User not found");
    }
    let (_, json) = send(&app, "GET", "/users", None).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let app = test_app();
    let id = create(&app, json!({"name": "Wang Wu"})).await["id"].as_i64().unwrap();
    let (first, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    let (second, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!((first, second), (StatusCode::OK, StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn malformed_input_is_unprocessable() {
    let app = test_app();
    for body in [
        json!({"name": "a", "role": "root"}),
        json!({"name": "a", "status": 9}),
        json!({"name": ""}),
        json!({"status": 1}),
        json!({"name": "a\u{0}b"}),
    ] {
        let (status, json) = send(&app, "POST", "/users", Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert!(json["detail"].is_string(), "{json}");
    }

    let (status, _) = send(&app, "GET", "/users/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let id = create(&app, json!({"name": "a"})).await["id"].as_i64().unwrap();
    let (status, _) = send(&app, "PATCH", &format!("/users/{id}/role"), Some(json!({"role": "ADMIN"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn overlong_name_is_a_business_error() {
    let app = test_app();
    let (status, json) = send(&app, "POST", "/users", Some(json!({"name": "x".repeat(21)}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["error_code"], 1001);
    assert_eq!(json["error_message"], "name must be at most 20 characters");
    assert_eq!(json["data"], Value::Null);

    let (_, json) = send(&app, "GET", "/users", None).await;
    assert_eq!(json["data"], json!([]));

    create(&app, json!({"name": "x".repeat(20)})).await;
}

#[tokio::test]
async fn list_returns_every_created_user() {
    let app = test_app();
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        ids.push(create(&app, json!({"name": name})).await["id"].clone());
    }
    let (status, json) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Value> = json["data"].as_array().unwrap().iter().map(|u| u["id"].clone()).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn page_endpoint_slices_and_validates() {
    let app = test_app();
    for name in ["a", "b", "c", "d", "e"] {
        create(&app, json!({"name": name})).await;
    }
    let (status, json) = send(&app, "GET", "/users/page?page=2&page_size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = &json["data"];
    let names: Vec<&str> = page["items"].as_array().unwrap().iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["c", "d"]);
    assert_eq!((page["total"].as_u64(), page["total_pages"].as_u64()), (Some(5), Some(3)));
    assert_eq!((page["page"].as_u64(), page["page_size"].as_u64()), (Some(2), Some(2)));

    let (status, json) = send(&app, "GET", "/users/page", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["page_size"], 20);

    for uri in ["/users/page?page=0", "/users/page?page_size=101", "/users/page?page=x"] {
        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn stats_endpoint_counts_groups() {
    let app = test_app();
    create(&app, json!({"name": "a", "status": 1, "role": "admin"})).await;
    create(&app, json!({"name": "b", "status": 1})).await;
    create(&app, json!({"name": "c", "role": "guest"})).await;
    let (status, json) = send(&app, "GET", "/users/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"],
        json!({
            "total": 3,
            "by_status": [{"status": 0, "count": 1}, {"status": 1, "count": 2}],
            "by_role": [
                {"role": "user", "count": 1},
                {"role": "admin", "count": 1},
                {"role": "guest", "count": 1}
            ]
        })
    );
}

#[tokio::test]
async fn common_routes_respond() {
    let app = test_app();
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!((status, json), (StatusCode::OK, json!({"status": "ok"})));
    let (status, json) = send(&app, "GET", "/ready", None).await;
    assert_eq!((status, json), (StatusCode::OK, json!({"status": "ok", "store": "ok"})));
    let (status, json) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "user-api");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = test_app();
    let (status, _) = send(&app, "POST", "/users", Some(json!({"name": "a".repeat(2048)}))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

/// A store whose pool never hands out a connection.
struct UnavailableStore;

fn unavailable() -> StorageError {
    StorageError::Db(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserRepository for UnavailableStore {
    async fn create(&self, _: NewUser) -> Result<User, StorageError> {
        Err(unavailable())
    }
    async fn get_by_id(&self, _: UserId) -> Result<Option<User>, StorageError> {
        Err(unavailable())
    }
    async fn list(&self) -> Result<Vec<User>, StorageError> {
        Err(unavailable())
    }
    async fn update_role(&self, _: UserId, _: Role) -> Result<Option<User>, StorageError> {
        Err(unavailable())
    }
    async fn delete(&self, _: UserId) -> Result<bool, StorageError> {
        Err(unavailable())
    }
    async fn page(&self, _: PageRequest) -> Result<Page<User>, StorageError> {
        Err(unavailable())
    }
    async fn stats(&self) -> Result<UserStats, StorageError> {
        Err(unavailable())
    }
    async fn ping(&self) -> Result<(), StorageError> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn ready_degrades_when_the_store_is_down() {
    let app = app(AppState::new(Arc::new(UnavailableStore)), 1024);
    let (status, json) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json, json!({"status": "degraded", "store": "unavailable"}));

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!((status, json), (StatusCode::OK, json!({"status": "ok"})));
}

#[tokio::test]
async fn storage_failures_surface_as_internal_errors() {
    let app = app(AppState::new(Arc::new(UnavailableStore)), 1024);
    for (method, uri, body) in [
        ("GET", "/users", None),
        ("GET", "/users/1", None),
        ("GET", "/users/stats", None),
        ("POST", "/users", Some(json!({"name": "a"}))),
        ("DELETE", "/users/1", None),
    ] {
        let (status, json) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(json.as_object().map(|o| o.len()), Some(1), "{json}");
        assert!(json["detail"].as_str().unwrap().starts_with("database:"), "{json}");
    }
}
