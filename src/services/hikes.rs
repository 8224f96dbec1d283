// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hike lifecycle: create, read by code, end, and discovery.
//!
//! A hike is created `open` and moves to `closed` once, via [`HikeService::end`].
//! Nothing reopens it.

use chrono::Utc;

use crate::db::{HikeDb, HikeInsert};
use crate::error::{AppError, Result};
use crate::models::{Hike, HikeLookup, HikeSource, NewHike};
use crate::services::action_log::ActionLog;
use crate::services::codes::CodeGenerator;
use crate::services::markdown::with_rendered_description as render;
use crate::time_utils::truncate_to_stored;

/// Attempts at finding an unused code pair before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 3;

/// Hike lifecycle operations over the shared store.
#[derive(Clone, Debug)]
pub struct HikeService {
    db: HikeDb,
    codes: CodeGenerator,
    actions: ActionLog,
}

impl HikeService {
    pub fn new(db: HikeDb, actions: ActionLog) -> Self {
        Self {
            db,
            codes: CodeGenerator::new(),
            actions,
        }
    }

    /// Create a new open hike and issue its codes.
    ///
    /// The response is the only place the leader code is ever returned.
    pub async fn create(&self, mut new_hike: NewHike) -> Result<Hike> {
        let now = Utc::now();
        // Echo exactly what later reads will return.
        new_hike.start_time = truncate_to_stored(new_hike.start_time);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let codes = self.codes.generate_pair()?;

            match self.db.insert_hike(&new_hike, &codes, now).await? {
                HikeInsert::Created => {
                    tracing::info!(
                        join_code = %codes.join_code,
                        leader = %new_hike.leader.name,
                        start_time = %new_hike.start_time,
                        "Hike created"
                    );
                    self.actions
                        .record(&format!(
                            "Hike created: {} by {}, starting at {}",
                            new_hike.name,
                            new_hike.leader.name,
                            new_hike.start_time.to_rfc3339()
                        ))
                        .await;
                    return Ok(Hike::created(new_hike, codes));
                }
                HikeInsert::CodeCollision => {
                    tracing::warn!(attempt, "Hike code collision, regenerating");
                }
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "Could not allocate unique hike codes after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Look up an open hike by join or leader code.
    ///
    /// Closed and unknown hikes both come back as `NotFound`.
    pub async fn find_open(&self, lookup: &HikeLookup) -> Result<Hike> {
        let hike = self
            .db
            .find_open_hike(lookup)
            .await?
            .ok_or_else(|| AppError::NotFound("Hike not found or already closed".to_string()))?;
        Ok(render(hike))
    }

    /// Close the hike owned by `leader_code` and finish its active members.
    ///
    /// Succeeds even when nothing matched (unknown code or already closed).
    pub async fn end(&self, leader_code: &str) -> Result<()> {
        let outcome = self.db.close_hike(leader_code).await?;

        tracing::info!(
            hikes_closed = outcome.hikes_closed,
            memberships_finished = outcome.memberships_finished,
            "Hike end requested"
        );
        if outcome.hikes_closed > 0 {
            self.actions
                .record(&format!(
                    "Hike closed, {} participants marked finished",
                    outcome.memberships_finished
                ))
                .await;
        }
        Ok(())
    }

    /// Open hikes near a point that start within the hour either side of now.
    pub async fn nearby(&self, latitude: f64, longitude: f64) -> Result<Vec<Hike>> {
        let hikes = self
            .db
            .nearby_open_hikes(latitude, longitude, Utc::now())
            .await?;
        Ok(hikes
            .into_iter()
            .map(|h| render(h).with_source(HikeSource::Location))
            .collect())
    }

    /// Open hikes the user has actively joined, then those they lead.
    ///
    /// A hike matching both appears twice, once per source.
    pub async fn for_user(&self, user_uuid: &str) -> Result<Vec<Hike>> {
        let joined = self.db.hikes_joined_by(user_uuid).await?;
        let led = self.db.hikes_led_by(user_uuid).await?;

        Ok(joined
            .into_iter()
            .map(|h| render(h).with_source(HikeSource::Joined))
            .chain(
                led.into_iter()
                    .map(|h| render(h).with_source(HikeSource::LedByUser)),
            )
            .collect())
    }

    /// Raw Markdown of the leader's latest hike with this name, or empty.
    pub async fn last_description(&self, hike_name: &str, leader_uuid: &str) -> Result<String> {
        Ok(self
            .db
            .last_description(hike_name, leader_uuid)
            .await?
            .unwrap_or_default())
    }
}
