// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hike routes: create, read, end, discovery.

use crate::error::{AppError, Result};
use crate::models::{Hike, HikeLookup, NewHike};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hike", get(list_hikes).post(create_hike))
        .route("/hike/lastdescription", get(last_description))
        .route("/hike/{code}", get(get_hike).put(end_hike))
}

// ─── Create ──────────────────────────────────────────────────

/// Create a hike. The response carries both codes.
async fn create_hike(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewHike>, JsonRejection>,
) -> Result<Json<Hike>> {
    let Json(new_hike) = payload?;
    let hike = state.hikes.create(new_hike).await?;
    Ok(Json(hike))
}

// ─── Read ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetHikeQuery {
    #[serde(default)]
    leader_code: Option<String>,
}

/// Get an open hike by join code, or by the `leaderCode` query parameter
/// when one is given.
async fn get_hike(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<GetHikeQuery>,
) -> Result<Json<Hike>> {
    let lookup = match query.leader_code.filter(|c| !c.is_empty()) {
        Some(leader_code) => HikeLookup::LeaderCode(leader_code),
        None => HikeLookup::JoinCode(code),
    };
    let hike = state.hikes.find_open(&lookup).await?;
    Ok(Json(hike))
}

// ─── End ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndHikeQuery {
    #[serde(default)]
    leader_code: Option<String>,
}

/// Optional end-hike body. Clients may also send `joinCode`, which is
/// ignored: the join code is resolved from the leader code in the store.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndHikeRequest {
    #[serde(default)]
    leader_code: Option<String>,
}

/// End a hike and mark its active participants finished.
///
/// The leader code is taken from the `leaderCode` query parameter, then the
/// body, then the path. The body may be absent or empty.
async fn end_hike(
    State(state): State<Arc<AppState>>,
    Path(path_code): Path<String>,
    query: std::result::Result<Query<EndHikeQuery>, QueryRejection>,
    body: Bytes,
) -> Result<()> {
    let Query(query) = query?;
    let request: EndHikeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        EndHikeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid end-hike body: {}", e)))?
    };

    let leader_code = [query.leader_code, request.leader_code]
        .into_iter()
        .flatten()
        .find(|c| !c.is_empty())
        .unwrap_or(path_code);

    state.hikes.end(&leader_code).await
}

// ─── Discovery ───────────────────────────────────────────────

#[derive(Deserialize)]
struct ListHikesQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(rename = "userUUID")]
    user_uuid: Option<String>,
}

/// Nearby open hikes and/or hikes tied to a user. No parameters → empty list.
async fn list_hikes(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListHikesQuery>, QueryRejection>,
) -> Result<Json<Vec<Hike>>> {
    let Query(query) = query?;
    let mut hikes = Vec::new();

    if let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) {
        hikes.extend(state.hikes.nearby(latitude, longitude).await?);
    }
    if let Some(user_uuid) = query.user_uuid.filter(|u| !u.is_empty()) {
        hikes.extend(state.hikes.for_user(&user_uuid).await?);
    }

    Ok(Json(hikes))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastDescriptionQuery {
    #[serde(default)]
    hike_name: String,
    #[serde(rename = "leaderUUID", default)]
    leader_uuid: String,
}

/// Last description response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct LastDescriptionResponse {
    pub description: String,
}

/// Prefill text for a leader repeating a named hike.
async fn last_description(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LastDescriptionQuery>,
) -> Result<Json<LastDescriptionResponse>> {
    if query.hike_name.is_empty() || query.leader_uuid.is_empty() {
        return Err(AppError::BadRequest(
            "hikeName and leaderUUID query parameters are required".to_string(),
        ));
    }

    let description = state
        .hikes
        .last_description(&query.hike_name, &query.leader_uuid)
        .await?;
    Ok(Json(LastDescriptionResponse { description }))
}
