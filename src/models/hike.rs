// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hike model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::User;

/// Lifecycle state of a hike. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub enum HikeStatus {
    Open,
    Closed,
}

/// Why a hike appears in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub enum HikeSource {
    /// Near the requested coordinates
    Location,
    /// The user holds an active membership
    Joined,
    /// The user leads it
    LedByUser,
}

/// The two bearer codes issued for a hike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HikeCodes {
    /// Grants participant access
    pub join_code: String,
    /// Grants leader access; only ever returned from create
    pub leader_code: String,
}

/// How a caller identifies the hike it wants to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HikeLookup {
    JoinCode(String),
    LeaderCode(String),
}

/// Create-hike payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct NewHike {
    /// Custom name for the hike event
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// Free text, not a reference to the trailheads table
    #[serde(default)]
    pub trailhead_name: Option<String>,
    pub leader: User,
    pub latitude: f64,
    pub longitude: f64,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub photo_release: bool,
    /// Markdown
    #[serde(default)]
    pub description: Option<String>,
}

/// Public view of a hike's leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct Leader {
    pub uuid: String,
    pub name: String,
    pub phone: String,
}

/// A hike as returned by the API.
///
/// `leader_code` is only populated in the response to the create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct Hike {
    pub name: String,
    pub organization: Option<String>,
    pub trailhead_name: Option<String>,
    pub leader: Leader,
    pub latitude: f64,
    pub longitude: f64,
    pub start_time: DateTime<Utc>,
    pub status: HikeStatus,
    pub join_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_code: Option<String>,
    pub photo_release: bool,
    /// Rendered HTML on reads, raw Markdown in the create response
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<HikeSource>,
}

impl Hike {
    /// Build the create response from the payload and the issued codes.
    pub fn created(new_hike: NewHike, codes: HikeCodes) -> Self {
        Self {
            name: new_hike.name,
            organization: new_hike.organization,
            trailhead_name: new_hike.trailhead_name,
            leader: Leader {
                uuid: new_hike.leader.uuid,
                name: new_hike.leader.name,
                phone: new_hike.leader.phone,
            },
            latitude: new_hike.latitude,
            longitude: new_hike.longitude,
            start_time: new_hike.start_time,
            status: HikeStatus::Open,
            join_code: codes.join_code,
            leader_code: Some(codes.leader_code),
            photo_release: new_hike.photo_release,
            description: new_hike.description,
            source_type: None,
        }
    }

    /// Tag the hike with the listing it came from.
    pub fn with_source(mut self, source: HikeSource) -> Self {
        self.source_type = Some(source);
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == HikeStatus::Open
    }
}
