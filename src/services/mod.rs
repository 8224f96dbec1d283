// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod action_log;
pub mod codes;
pub mod hikes;
pub mod markdown;
pub mod participants;

pub use action_log::ActionLog;
pub use codes::{CodeError, CodeGenerator};
pub use hikes::HikeService;
pub use participants::ParticipantService;
