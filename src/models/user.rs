//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A leader or participant.
///
/// The uuid is chosen by the client and taken at face value, so anyone who
/// knows a uuid can act under it. There are no accounts to verify it against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/generated/")
)]
pub struct User {
    /// Client-generated identifier (users table primary key)
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Contact phone number
    #[serde(default)]
    pub phone: String,
    /// Vehicle plate, for finding cars left at the trailhead
    #[serde(default)]
    pub license_plate: Option<String>,
    /// Who to call if the participant doesn't come back
    #[serde(default)]
    pub emergency_contact: Option<String>,
}
