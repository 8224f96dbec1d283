// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hike Tracker: coordinate ad-hoc group hikes without accounts
//!
//! A leader creates a hike and receives a join code to share and a leader
//! code to keep. Holding a code is the only authorization there is.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::HikeDb;
use services::{ActionLog, HikeService, ParticipantService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: HikeDb,
    pub hikes: HikeService,
    pub participants: ParticipantService,
}

impl AppState {
    /// Wire the services over one store handle.
    pub fn new(config: Config, db: HikeDb) -> Self {
        let actions = ActionLog::new(config.action_log_path.clone());
        Self {
            hikes: HikeService::new(db.clone(), actions.clone()),
            participants: ParticipantService::new(db.clone(), actions),
            config,
            db,
        }
    }
}
