// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (leader and participant profiles)
//! - Hikes (lifecycle and discovery)
//! - Memberships (hike_users join table)
//! - Waiver signatures (recorded with each join)
//! - Trailheads (seeded reference data)
//!
//! Every multi-statement mutation runs in one transaction whose first
//! statement is a write, so SQLite hands out the write lock up front.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, SqlitePool};

use crate::db::proximity::{LATITUDE_TOLERANCE, LONGITUDE_TOLERANCE, START_WINDOW_HOURS};
use crate::error::AppError;
use crate::models::participant::membership_status;
use crate::models::trailhead::seed_trailheads;
use crate::models::{
    render_waiver, Hike, HikeCodes, HikeLookup, HikeStatus, Leader, NewHike, Participant,
    Trailhead, User, WaiverSigner,
};
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339, truncate_to_stored};

const MAX_SUGGESTIONS: i64 = 5;

/// Columns selected for every hike read, aliased to match [`HikeRow`].
const HIKE_SELECT: &str = "SELECT h.name, h.organization, h.trailhead_name, \
     u.uuid AS leader_uuid, u.name AS leader_name, \
     COALESCE(u.phone, '') AS leader_phone, \
     h.latitude, h.longitude, h.start_time, h.status, h.join_code, \
     h.photo_release, h.description \
     FROM hikes AS h JOIN users AS u ON h.leader_uuid = u.uuid";

/// Result of inserting a new hike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HikeInsert {
    Created,
    /// The join or leader code is already taken; nothing was written.
    CodeCollision,
}

/// Rows touched by ending a hike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    pub hikes_closed: u64,
    pub memberships_finished: u64,
}

/// Result of a join attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined(Hike),
    HikeNotFound,
    HikeClosed,
}

/// A stored waiver signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedWaiver {
    pub signed_at: DateTime<Utc>,
    pub signer: WaiverSigner,
    pub waiver_text: String,
}

/// Result of a leave attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    NotMember,
    HikeClosed,
    /// Membership exists but has moved past `active`.
    NotActive(String),
}

#[derive(sqlx::FromRow)]
struct HikeRow {
    name: String,
    organization: Option<String>,
    trailhead_name: Option<String>,
    leader_uuid: String,
    leader_name: String,
    leader_phone: String,
    latitude: f64,
    longitude: f64,
    start_time: String,
    status: HikeStatus,
    join_code: String,
    photo_release: bool,
    description: Option<String>,
}

impl TryFrom<HikeRow> for Hike {
    type Error = AppError;

    fn try_from(row: HikeRow) -> Result<Self, Self::Error> {
        let start_time = parse_utc_rfc3339(&row.start_time).map_err(|e| {
            AppError::Database(format!(
                "Corrupt start_time {:?} on hike {}: {}",
                row.start_time, row.join_code, e
            ))
        })?;

        Ok(Hike {
            name: row.name,
            organization: row.organization,
            trailhead_name: row.trailhead_name,
            leader: Leader {
                uuid: row.leader_uuid,
                name: row.leader_name,
                phone: row.leader_phone,
            },
            latitude: row.latitude,
            longitude: row.longitude,
            start_time,
            status: row.status,
            join_code: row.join_code,
            leader_code: None,
            photo_release: row.photo_release,
            description: row.description,
            source_type: None,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    uuid: String,
    name: String,
    phone: String,
    license_plate: Option<String>,
    emergency_contact: Option<String>,
    status: String,
    joined_at: String,
    signed_at: Option<String>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = AppError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let joined_at = parse_utc_rfc3339(&row.joined_at).map_err(|e| {
            AppError::Database(format!(
                "Corrupt joined_at {:?} for user {}: {}",
                row.joined_at, row.uuid, e
            ))
        })?;
        let signed_at = row
            .signed_at
            .as_deref()
            .map(parse_utc_rfc3339)
            .transpose()
            .map_err(|e| {
                AppError::Database(format!("Corrupt signed_at for user {}: {}", row.uuid, e))
            })?;

        Ok(Participant {
            user: User {
                uuid: row.uuid,
                name: row.name,
                phone: row.phone,
                license_plate: row.license_plate,
                emergency_contact: row.emergency_contact,
            },
            status: row.status,
            joined_at,
            signed_at,
        })
    }
}

fn into_hikes(rows: Vec<HikeRow>) -> Result<Vec<Hike>, AppError> {
    rows.into_iter().map(Hike::try_from).collect()
}

/// SQLite database handle. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct HikeDb {
    pool: SqlitePool,
}

impl HikeDb {
    /// Open (creating if needed) the database, apply migrations and seed
    /// trailheads.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if url.contains(":memory:") {
            // Each in-memory connection is its own database, so pin exactly one.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };

        sqlx::migrate!("./migrations").run(&db.pool).await?;
        db.seed_trailheads().await?;

        tracing::info!(url, "Connected to SQLite");
        Ok(db)
    }

    /// Fresh private in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert the bundled trailheads if the table is empty.
    async fn seed_trailheads(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM trailheads")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            tx.rollback().await?;
            return Ok(());
        }

        let trailheads = seed_trailheads()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid trailhead seed: {}", e)))?;

        for trailhead in &trailheads {
            query("INSERT INTO trailheads (name, latitude, longitude) VALUES (?, ?, ?)")
                .bind(&trailhead.name)
                .bind(trailhead.latitude)
                .bind(trailhead.longitude)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(count = trailheads.len(), "Seeded trailheads");
        Ok(())
    }

    // ─── Hike Operations ─────────────────────────────────────────

    /// Upsert the leader and insert a new open hike, atomically.
    ///
    /// Only the leader's name and phone are refreshed on conflict.
    pub async fn insert_hike(
        &self,
        new_hike: &NewHike,
        codes: &HikeCodes,
        now: DateTime<Utc>,
    ) -> Result<HikeInsert, AppError> {
        let mut tx = self.pool.begin().await?;

        query(
            "INSERT INTO users (uuid, name, phone) VALUES (?, ?, ?) \
             ON CONFLICT(uuid) DO UPDATE SET name = excluded.name, phone = excluded.phone",
        )
        .bind(&new_hike.leader.uuid)
        .bind(&new_hike.leader.name)
        .bind(&new_hike.leader.phone)
        .execute(&mut *tx)
        .await?;

        let inserted = query(
            "INSERT INTO hikes (name, organization, trailhead_name, leader_uuid, latitude, \
             longitude, created_at, start_time, status, join_code, leader_code, photo_release, \
             description) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_hike.name)
        .bind(&new_hike.organization)
        .bind(&new_hike.trailhead_name)
        .bind(&new_hike.leader.uuid)
        .bind(new_hike.latitude)
        .bind(new_hike.longitude)
        .bind(format_utc_rfc3339(now))
        .bind(format_utc_rfc3339(new_hike.start_time))
        .bind(HikeStatus::Open)
        .bind(&codes.join_code)
        .bind(&codes.leader_code)
        .bind(new_hike.photo_release)
        .bind(&new_hike.description)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(HikeInsert::Created)
            }
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                tx.rollback().await?;
                Ok(HikeInsert::CodeCollision)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get an open hike by either of its codes. Closed hikes are invisible.
    pub async fn find_open_hike(&self, lookup: &HikeLookup) -> Result<Option<Hike>, AppError> {
        let (column, code) = match lookup {
            HikeLookup::JoinCode(code) => ("join_code", code),
            HikeLookup::LeaderCode(code) => ("leader_code", code),
        };
        let sql = format!("{HIKE_SELECT} WHERE h.{column} = ? AND h.status = ?");

        let row: Option<HikeRow> = query_as(&sql)
            .bind(code)
            .bind(HikeStatus::Open)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Hike::try_from).transpose()
    }

    /// Waiver text for a hike in any state, or None if the code is unknown.
    pub async fn waiver_text(&self, join_code: &str) -> Result<Option<String>, AppError> {
        let sql = format!("{HIKE_SELECT} WHERE h.join_code = ?");
        let row: Option<HikeRow> = query_as(&sql)
            .bind(join_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(Hike::try_from)
            .transpose()?
            .map(|hike| render_waiver(&hike)))
    }

    /// Current status of a hike regardless of state, or None if unknown.
    pub async fn hike_status(&self, join_code: &str) -> Result<Option<HikeStatus>, AppError> {
        let status: Option<(HikeStatus,)> = query_as("SELECT status FROM hikes WHERE join_code = ?")
            .bind(join_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status.map(|(s,)| s))
    }

    /// Close the hike owned by `leader_code` and finish its active members.
    ///
    /// The join code is resolved from the leader code inside the store.
    /// Unknown or already-closed hikes touch zero rows and still succeed.
    pub async fn close_hike(&self, leader_code: &str) -> Result<CloseOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let hikes_closed = query("UPDATE hikes SET status = ? WHERE leader_code = ? AND status = ?")
            .bind(HikeStatus::Closed)
            .bind(leader_code)
            .bind(HikeStatus::Open)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let memberships_finished = query(
            "UPDATE hike_users SET status = ? WHERE status = ? AND \
             hike_join_code = (SELECT join_code FROM hikes WHERE leader_code = ?)",
        )
        .bind(membership_status::FINISHED)
        .bind(membership_status::ACTIVE)
        .bind(leader_code)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(CloseOutcome {
            hikes_closed,
            memberships_finished,
        })
    }

    /// Open hikes inside the proximity box whose start is within the window
    /// around `now`. Both ranges include their edges.
    pub async fn nearby_open_hikes(
        &self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Hike>, AppError> {
        let now = truncate_to_stored(now);
        let window = Duration::hours(START_WINDOW_HOURS);
        let sql = format!(
            "{HIKE_SELECT} WHERE h.latitude BETWEEN ? AND ? \
             AND h.longitude BETWEEN ? AND ? \
             AND h.status = ? \
             AND h.start_time BETWEEN ? AND ?"
        );

        let rows: Vec<HikeRow> = query_as(&sql)
            .bind(latitude - LATITUDE_TOLERANCE)
            .bind(latitude + LATITUDE_TOLERANCE)
            .bind(longitude - LONGITUDE_TOLERANCE)
            .bind(longitude + LONGITUDE_TOLERANCE)
            .bind(HikeStatus::Open)
            .bind(format_utc_rfc3339(now - window))
            .bind(format_utc_rfc3339(now + window))
            .fetch_all(&self.pool)
            .await?;

        into_hikes(rows)
    }

    /// Open hikes where the user holds an active membership, latest first.
    pub async fn hikes_joined_by(&self, user_uuid: &str) -> Result<Vec<Hike>, AppError> {
        let sql = format!(
            "{HIKE_SELECT} JOIN hike_users AS hu ON hu.hike_join_code = h.join_code \
             WHERE hu.user_uuid = ? AND hu.status = ? AND h.status = ? \
             ORDER BY h.start_time DESC"
        );

        let rows: Vec<HikeRow> = query_as(&sql)
            .bind(user_uuid)
            .bind(membership_status::ACTIVE)
            .bind(HikeStatus::Open)
            .fetch_all(&self.pool)
            .await?;

        into_hikes(rows)
    }

    /// Open hikes led by the user, latest first. Leader codes are not read.
    pub async fn hikes_led_by(&self, leader_uuid: &str) -> Result<Vec<Hike>, AppError> {
        let sql = format!(
            "{HIKE_SELECT} WHERE h.leader_uuid = ? AND h.status = ? ORDER BY h.start_time DESC"
        );

        let rows: Vec<HikeRow> = query_as(&sql)
            .bind(leader_uuid)
            .bind(HikeStatus::Open)
            .fetch_all(&self.pool)
            .await?;

        into_hikes(rows)
    }

    /// Raw description of the leader's most recent hike with this name.
    pub async fn last_description(
        &self,
        hike_name: &str,
        leader_uuid: &str,
    ) -> Result<Option<String>, AppError> {
        let row: Option<(Option<String>,)> = query_as(
            "SELECT description FROM hikes WHERE name = ? AND leader_uuid = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(hike_name)
        .bind(leader_uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(description,)| description))
    }

    // ─── Membership Operations ───────────────────────────────────

    /// Upsert the user, (re)activate their membership and record their
    /// waiver signature, atomically.
    ///
    /// If the hike is unknown or closed the transaction rolls back, so the
    /// profile, membership and signature are left untouched.
    pub async fn join_hike(
        &self,
        join_code: &str,
        user: &User,
        signer: &WaiverSigner,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        query(
            "INSERT INTO users (uuid, name, phone, license_plate, emergency_contact) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(uuid) DO UPDATE SET name = excluded.name, phone = excluded.phone, \
             license_plate = excluded.license_plate, \
             emergency_contact = excluded.emergency_contact",
        )
        .bind(&user.uuid)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.license_plate)
        .bind(&user.emergency_contact)
        .execute(&mut *tx)
        .await?;

        let sql = format!("{HIKE_SELECT} WHERE h.join_code = ?");
        let row: Option<HikeRow> = query_as(&sql)
            .bind(join_code)
            .fetch_optional(&mut *tx)
            .await?;

        let hike = match row {
            None => {
                tx.rollback().await?;
                return Ok(JoinOutcome::HikeNotFound);
            }
            Some(row) => Hike::try_from(row)?,
        };
        if !hike.is_open() {
            tx.rollback().await?;
            return Ok(JoinOutcome::HikeClosed);
        }

        query(
            "INSERT INTO hike_users (hike_join_code, user_uuid, status, joined_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(hike_join_code, user_uuid) DO UPDATE SET \
             status = excluded.status, joined_at = excluded.joined_at",
        )
        .bind(join_code)
        .bind(&user.uuid)
        .bind(membership_status::ACTIVE)
        .bind(format_utc_rfc3339(now))
        .execute(&mut *tx)
        .await?;

        query(
            "INSERT INTO waiver_signatures \
             (user_uuid, hike_join_code, signed_at, user_agent, ip_address, waiver_text) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_uuid, hike_join_code) DO UPDATE SET \
             signed_at = excluded.signed_at, user_agent = excluded.user_agent, \
             ip_address = excluded.ip_address, waiver_text = excluded.waiver_text",
        )
        .bind(&user.uuid)
        .bind(join_code)
        .bind(format_utc_rfc3339(now))
        .bind(&signer.user_agent)
        .bind(&signer.ip_address)
        .bind(render_waiver(&hike))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(JoinOutcome::Joined(hike))
    }

    /// All memberships of the hike owned by `leader_code`, with profiles.
    ///
    /// An unknown leader code matches nothing and yields an empty list.
    pub async fn participants_for_leader(
        &self,
        leader_code: &str,
    ) -> Result<Vec<Participant>, AppError> {
        let rows: Vec<ParticipantRow> = query_as(
            "SELECT u.uuid, u.name, COALESCE(u.phone, '') AS phone, u.license_plate, \
             u.emergency_contact, hu.status, hu.joined_at, ws.signed_at \
             FROM hike_users AS hu JOIN users AS u ON hu.user_uuid = u.uuid \
             LEFT JOIN waiver_signatures AS ws \
             ON ws.user_uuid = hu.user_uuid AND ws.hike_join_code = hu.hike_join_code \
             WHERE hu.hike_join_code = (SELECT join_code FROM hikes WHERE leader_code = ?)",
        )
        .bind(leader_code)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Participant::try_from).collect()
    }

    /// Current membership status, or None if the user never joined.
    pub async fn membership_status(
        &self,
        join_code: &str,
        user_uuid: &str,
    ) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> =
            query_as("SELECT status FROM hike_users WHERE hike_join_code = ? AND user_uuid = ?")
                .bind(join_code)
                .bind(user_uuid)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(status,)| status))
    }

    /// The signature a user left when joining, if any.
    pub async fn signed_waiver(
        &self,
        join_code: &str,
        user_uuid: &str,
    ) -> Result<Option<SignedWaiver>, AppError> {
        let row: Option<(String, String, String, String)> = query_as(
            "SELECT signed_at, user_agent, ip_address, waiver_text FROM waiver_signatures \
             WHERE hike_join_code = ? AND user_uuid = ?",
        )
        .bind(join_code)
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(signed_at, user_agent, ip_address, waiver_text)| -> Result<_, AppError> {
            let signed_at = parse_utc_rfc3339(&signed_at).map_err(|e| {
                AppError::Database(format!("Corrupt signed_at for user {}: {}", user_uuid, e))
            })?;
            Ok(SignedWaiver {
                signed_at,
                signer: WaiverSigner {
                    user_agent,
                    ip_address,
                },
                waiver_text,
            })
        })
        .transpose()
    }

    /// Overwrite a membership status. Does not look at the hike's state.
    pub async fn update_membership_status(
        &self,
        join_code: &str,
        user_uuid: &str,
        status: &str,
    ) -> Result<u64, AppError> {
        let result =
            query("UPDATE hike_users SET status = ? WHERE hike_join_code = ? AND user_uuid = ?")
                .bind(status)
                .bind(join_code)
                .bind(user_uuid)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Remove an active membership from an open hike.
    pub async fn leave_hike(
        &self,
        join_code: &str,
        user_uuid: &str,
    ) -> Result<LeaveOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = query(
            "DELETE FROM hike_users WHERE hike_join_code = ? AND user_uuid = ? AND status = ? \
             AND EXISTS (SELECT 1 FROM hikes WHERE join_code = ? AND status = ?)",
        )
        .bind(join_code)
        .bind(user_uuid)
        .bind(membership_status::ACTIVE)
        .bind(join_code)
        .bind(HikeStatus::Open)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted > 0 {
            query("DELETE FROM waiver_signatures WHERE hike_join_code = ? AND user_uuid = ?")
                .bind(join_code)
                .bind(user_uuid)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(LeaveOutcome::Left);
        }

        let existing: Option<(String, HikeStatus)> = query_as(
            "SELECT hu.status, h.status FROM hike_users AS hu \
             JOIN hikes AS h ON h.join_code = hu.hike_join_code \
             WHERE hu.hike_join_code = ? AND hu.user_uuid = ?",
        )
        .bind(join_code)
        .bind(user_uuid)
        .fetch_optional(&mut *tx)
        .await?;
        tx.rollback().await?;

        Ok(match existing {
            None => LeaveOutcome::NotMember,
            Some((_, HikeStatus::Closed)) => LeaveOutcome::HikeClosed,
            Some((status, HikeStatus::Open)) => LeaveOutcome::NotActive(status),
        })
    }

    // ─── Trailhead Operations ────────────────────────────────────

    /// Up to five trailheads whose name contains `q`, ignoring case and
    /// apostrophes. An empty query matches nothing.
    pub async fn trailhead_suggestions(&self, q: &str) -> Result<Vec<Trailhead>, AppError> {
        let needle = q.replace('\'', "");
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let trailheads: Vec<Trailhead> = query_as(
            "SELECT name, latitude, longitude FROM trailheads \
             WHERE REPLACE(name, '''', '') LIKE ? ORDER BY id LIMIT ?",
        )
        .bind(format!("%{}%", needle))
        .bind(MAX_SUGGESTIONS)
        .fetch_all(&self.pool)
        .await?;

        Ok(trailheads)
    }
}
