// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Participant lifecycle: join, list, status updates, leave.

use chrono::Utc;

use crate::db::{HikeDb, JoinOutcome, LeaveOutcome};
use crate::error::{AppError, Result};
use crate::models::{Hike, Participant, User, WaiverSigner};
use crate::services::action_log::ActionLog;
use crate::services::markdown::with_rendered_description;

/// Membership operations keyed by join or leader code.
#[derive(Clone, Debug)]
pub struct ParticipantService {
    db: HikeDb,
    actions: ActionLog,
}

impl ParticipantService {
    pub fn new(db: HikeDb, actions: ActionLog) -> Self {
        Self { db, actions }
    }

    /// Join (or rejoin) an open hike, signing its waiver.
    ///
    /// Rejoining resets the membership to `active` with a fresh join time and
    /// replaces the earlier signature.
    pub async fn join(&self, join_code: &str, user: &User, signer: &WaiverSigner) -> Result<Hike> {
        match self.db.join_hike(join_code, user, signer, Utc::now()).await? {
            JoinOutcome::Joined(hike) => {
                tracing::info!(
                    join_code,
                    user = %user.uuid,
                    ip = %signer.ip_address,
                    "Participant joined hike, waiver signed"
                );
                self.actions
                    .record(&format!(
                        "Participant joined hike: {} (Hike Join Code: {}), Waiver Signed",
                        user.name, join_code
                    ))
                    .await;
                Ok(with_rendered_description(hike))
            }
            JoinOutcome::HikeNotFound => Err(AppError::NotFound("Hike not found".to_string())),
            JoinOutcome::HikeClosed => Err(AppError::HikeClosed),
        }
    }

    /// Waiver text for the hike, whether open or closed.
    pub async fn waiver(&self, join_code: &str) -> Result<String> {
        self.db
            .waiver_text(join_code)
            .await?
            .ok_or_else(|| AppError::NotFound("Hike not found".to_string()))
    }

    /// Every membership of the leader's hike. Unknown codes list nothing.
    pub async fn list(&self, leader_code: &str) -> Result<Vec<Participant>> {
        self.db.participants_for_leader(leader_code).await
    }

    /// Set a membership's status to any string, whatever the hike's state.
    pub async fn update_status(&self, join_code: &str, user_uuid: &str, status: &str) -> Result<()> {
        let updated = self
            .db
            .update_membership_status(join_code, user_uuid, status)
            .await?;

        tracing::info!(join_code, user = user_uuid, status, updated, "Participant status updated");
        self.actions
            .record(&format!(
                "Participant status updated: User: {}, Hike Join Code: {}, New Status: {}",
                user_uuid, join_code, status
            ))
            .await;
        Ok(())
    }

    /// Drop an active membership, and its waiver signature, from an open hike.
    pub async fn leave(&self, join_code: &str, user_uuid: &str) -> Result<()> {
        match self.db.leave_hike(join_code, user_uuid).await? {
            LeaveOutcome::Left => {
                tracing::info!(join_code, user = user_uuid, "Participant left hike");
                self.actions
                    .record(&format!(
                        "Participant left hike: User: {}, Hike Join Code: {}",
                        user_uuid, join_code
                    ))
                    .await;
                Ok(())
            }
            LeaveOutcome::NotMember => Err(AppError::NotFound(
                "Participant not found for this hike".to_string(),
            )),
            LeaveOutcome::HikeClosed => Err(AppError::HikeClosed),
            LeaveOutcome::NotActive(status) => Err(AppError::BadRequest(format!(
                "Cannot leave: participant status is '{}', not 'active'",
                status
            ))),
        }
    }
}
