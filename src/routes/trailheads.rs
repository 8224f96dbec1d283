//! Trailhead autocomplete.

use crate::error::Result;
use crate::models::Trailhead;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/trailhead", get(suggest_trailheads))
}

#[derive(Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

/// Up to five trailheads matching `q`.
async fn suggest_trailheads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<Trailhead>>> {
    let suggestions = state.db.trailhead_suggestions(&query.q).await?;
    Ok(Json(suggestions))
}
