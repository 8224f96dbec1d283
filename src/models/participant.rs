// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hike membership model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::User;

/// Well-known membership statuses. Clients may store any other string.
pub mod membership_status {
    pub const ACTIVE: &str = "active";
    pub const FINISHED: &str = "finished";
}

/// One user's membership in a hike, as shown to the leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct Participant {
    pub user: User,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    /// When the waiver was signed; None for memberships without a signature
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status == membership_status::ACTIVE
    }
}
