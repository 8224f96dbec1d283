// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer capability codes.
//!
//! A join code lets its holder read and join one hike; a leader code lets its
//! holder manage it. Codes are 128 bits from the OS CSPRNG, so collisions are
//! not checked up front. The hikes table's PK/UNIQUE constraints catch them
//! and the caller regenerates.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AppError;
use crate::models::HikeCodes;

/// Random bytes per code.
pub const CODE_BYTES: usize = 16;

/// Errors from code generation.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("Secure random source unavailable")]
    RandomUnavailable,
}

impl From<CodeError> for AppError {
    fn from(err: CodeError) -> Self {
        AppError::Internal(anyhow::anyhow!(err))
    }
}

/// Generates URL-safe capability codes.
#[derive(Clone, Debug)]
pub struct CodeGenerator {
    rng: SystemRandom,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// One code: 16 random bytes, base64url without padding (22 chars).
    pub fn generate(&self) -> Result<String, CodeError> {
        let mut bytes = [0u8; CODE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CodeError::RandomUnavailable)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// A join/leader pair. The two codes are always distinct.
    pub fn generate_pair(&self) -> Result<HikeCodes, CodeError> {
        let join_code = self.generate()?;
        let mut leader_code = self.generate()?;
        while leader_code == join_code {
            leader_code = self.generate()?;
        }
        Ok(HikeCodes {
            join_code,
            leader_code,
        })
    }
}
