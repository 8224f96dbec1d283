// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Utc};
use hike_tracker::config::Config;
use hike_tracker::db::HikeDb;
use hike_tracker::models::{HikeCodes, NewHike, User, WaiverSigner};
use hike_tracker::routes::create_router;
use hike_tracker::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a fresh in-memory database.
#[allow(dead_code)]
pub async fn test_db() -> HikeDb {
    HikeDb::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// Create a test app over a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, test_db().await));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_user(uuid: &str, name: &str) -> User {
    User {
        uuid: uuid.to_string(),
        name: name.to_string(),
        phone: "808-555-0100".to_string(),
        license_plate: Some("HI 123".to_string()),
        emergency_contact: Some("Kai 808-555-0199".to_string()),
    }
}

#[allow(dead_code)]
pub fn test_new_hike(name: &str, latitude: f64, longitude: f64, start_time: DateTime<Utc>) -> NewHike {
    NewHike {
        name: name.to_string(),
        organization: Some("Trail Club".to_string()),
        trailhead_name: Some("Manoa Falls".to_string()),
        leader: User {
            uuid: "leader-1".to_string(),
            name: "Leilani".to_string(),
            phone: "808-555-0123".to_string(),
            license_plate: None,
            emergency_contact: None,
        },
        latitude,
        longitude,
        start_time,
        photo_release: false,
        description: Some("Bring **water**.".to_string()),
    }
}

#[allow(dead_code)]
pub fn test_signer() -> WaiverSigner {
    WaiverSigner {
        user_agent: "TestAgent/1.0".to_string(),
        ip_address: "192.0.2.10".to_string(),
    }
}

/// Fixed codes for store-level tests.
#[allow(dead_code)]
pub fn test_codes(suffix: &str) -> HikeCodes {
    HikeCodes {
        join_code: format!("join-{suffix}"),
        leader_code: format!("lead-{suffix}"),
    }
}

/// Response captured from a oneshot request.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("Body is not JSON ({e}): {}", self.body))
    }
}

/// Send a request through the router, with an optional JSON body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// POST a hike through the API and return the create response.
#[allow(dead_code)]
pub async fn create_hike(app: &axum::Router, new_hike: &NewHike) -> serde_json::Value {
    let response = send(
        app,
        Method::POST,
        "/api/hike",
        Some(serde_json::to_value(new_hike).unwrap()),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
    response.json()
}
