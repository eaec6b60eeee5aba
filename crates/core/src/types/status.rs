//! Status enums for planets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ClaimerId;

/// Parallax layer a planet is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanetDepth {
    #[default]
    Near,
    Mid,
    Far,
}

/// Claim state of a planet at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Nobody holds the planet.
    Unclaimed,
    /// Held until `expires_at`.
    Claimed {
        by: ClaimerId,
        expires_at: DateTime<Utc>,
    },
    /// A claim is recorded but has lapsed; the planet can be claimed again.
    Expired { by: ClaimerId },
}

impl ClaimStatus {
    /// Whether a claim currently blocks other claimers.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Claimed { .. })
    }
}
