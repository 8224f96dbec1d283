// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Timestamps are persisted as text, so every writer must go through
//! [`format_utc_rfc3339`] to keep range comparisons in SQL chronological.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Sub-second digits kept in stored timestamps.
pub const STORED_SUBSEC_DIGITS: u16 = 3;

/// Format a UTC timestamp as fixed-width RFC3339 with milliseconds and a
/// `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drop precision the store cannot hold, so a value reads back unchanged.
pub fn truncate_to_stored(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Parse a stored RFC3339 timestamp back into UTC.
pub fn parse_utc_rfc3339(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}
