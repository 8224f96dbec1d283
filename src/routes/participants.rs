// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Participant routes, nested under a hike's code.

use crate::error::Result;
use crate::models::{Hike, Participant, User, WaiverSigner};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderMap},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

const UNKNOWN: &str = "unknown";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/hike/{code}/participant",
            get(list_participants).post(join_hike),
        )
        .route(
            "/hike/{code}/participant/{user_id}",
            put(update_status).delete(leave_hike),
        )
        .route("/hike/{code}/waiver", get(get_waiver))
}

/// Who is signing the waiver, taken from the request itself.
struct Signer(WaiverSigner);

impl<S> FromRequestParts<S> for Signer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(UNKNOWN)
            .to_string();
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Signer(WaiverSigner {
            user_agent,
            ip_address: client_ip(&parts.headers, peer),
        }))
    }
}

/// First `X-Forwarded-For` entry, else the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<String>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[derive(Deserialize)]
struct JoinRequest {
    user: User,
}

/// Join the hike identified by the join code in the path. Joining signs
/// the hike's waiver.
async fn join_hike(
    State(state): State<Arc<AppState>>,
    Path(join_code): Path<String>,
    Signer(signer): Signer,
    payload: std::result::Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<Hike>> {
    let Json(request) = payload?;
    let hike = state
        .participants
        .join(&join_code, &request.user, &signer)
        .await?;
    Ok(Json(hike))
}

/// Plain-text waiver a participant agrees to by joining.
async fn get_waiver(
    State(state): State<Arc<AppState>>,
    Path(join_code): Path<String>,
) -> Result<String> {
    state.participants.waiver(&join_code).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParticipantsQuery {
    #[serde(default)]
    leader_code: String,
}

/// List participants. Authorized by the `leaderCode` query parameter; the
/// path segment is ignored.
async fn list_participants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListParticipantsQuery>,
) -> Result<Json<Vec<Participant>>> {
    let participants = state.participants.list(&query.leader_code).await?;
    Ok(Json(participants))
}

#[derive(Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

/// Overwrite a participant's status with any string.
async fn update_status(
    State(state): State<Arc<AppState>>,
    Path((join_code, user_id)): Path<(String, String)>,
    payload: std::result::Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<()> {
    let Json(request) = payload?;
    state
        .participants
        .update_status(&join_code, &user_id, &request.status)
        .await
}

/// Leave a hike while still `active`.
async fn leave_hike(
    State(state): State<Arc<AppState>>,
    Path((join_code, user_id)): Path<(String, String)>,
) -> Result<()> {
    state.participants.leave(&join_code, &user_id).await
}
