// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trailhead reference data used for autocomplete.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A named trailhead.
///
/// Hikes copy the coordinates rather than referencing a trailhead row, so
/// renaming or moving a trailhead never touches existing hikes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct Trailhead {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Seed list loaded into an empty trailheads table.
const SEED_JSON: &str = include_str!("../../data/trailheads.json");

/// Parse the bundled trailhead seed list.
pub fn seed_trailheads() -> Result<Vec<Trailhead>, serde_json::Error> {
    serde_json::from_str(SEED_JSON)
}
