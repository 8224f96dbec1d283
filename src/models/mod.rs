// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod hike;
pub mod participant;
pub mod trailhead;
pub mod user;
pub mod waiver;

pub use hike::{Hike, HikeCodes, HikeLookup, HikeSource, HikeStatus, Leader, NewHike};
pub use participant::{membership_status, Participant};
pub use trailhead::Trailhead;
pub use user::User;
pub use waiver::{render_waiver, WaiverSigner};
