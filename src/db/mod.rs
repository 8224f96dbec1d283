//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::{CloseOutcome, HikeDb, HikeInsert, JoinOutcome, LeaveOutcome, SignedWaiver};

/// Coarse "nearby" box used instead of a distance radius.
pub mod proximity {
    /// Roughly a quarter mile of latitude.
    pub const LATITUDE_TOLERANCE: f64 = 0.003623;
    /// Roughly a quarter mile of longitude near 21°N. Not scaled by latitude.
    pub const LONGITUDE_TOLERANCE: f64 = 0.003896;
    /// Start times within this many hours either side of now qualify.
    pub const START_WINDOW_HOURS: i64 = 1;
}
