//! Promotional planet records.
//!
//! A planet is created by anyone (up to a global cap), shown on the landing
//! page parallax, and can be claimed for a limited time. Claims lapse on
//! their own; a periodic reset clears lapsed claim fields.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ClaimerId, PlanetId};
use super::status::{ClaimStatus, PlanetDepth};

/// Name given to planets created without one.
pub const DEFAULT_PLANET_NAME: &str = "Mystery Planet";

/// Size given to planets created without one.
pub const DEFAULT_PLANET_SIZE: f64 = 70.0;

/// A stored planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    pub link: String,
    pub avatar: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub depth: PlanetDepth,
    pub claimed_by: Option<ClaimerId>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claim_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Planet {
    /// Claim state as of `now`.
    ///
    /// A claim only counts while its expiry is strictly in the future; a
    /// recorded claimer with a past or missing expiry is [`ClaimStatus::Expired`].
    #[must_use]
    pub fn claim_status(&self, now: DateTime<Utc>) -> ClaimStatus {
        match (&self.claimed_by, self.claim_expires_at) {
            (None, _) => ClaimStatus::Unclaimed,
            (Some(by), Some(expires_at)) if expires_at > now => ClaimStatus::Claimed {
                by: by.clone(),
                expires_at,
            },
            (Some(by), _) => ClaimStatus::Expired { by: by.clone() },
        }
    }

    /// Whether the claim lapsed before `now` and should be reset.
    #[must_use]
    pub fn claim_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.claimed_by.is_some() && self.claim_expires_at.is_some_and(|at| at < now)
    }

    /// Record a claim by `claimer` starting at `now` for `months` calendar months.
    pub fn claim(&mut self, claimer: ClaimerId, now: DateTime<Utc>, months: u32) {
        let expires_at = now
            .checked_add_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.claimed_by = Some(claimer);
        self.claimed_at = Some(now);
        self.claim_expires_at = Some(expires_at);
    }

    /// Clear all claim fields.
    pub fn release(&mut self) {
        self.claimed_by = None;
        self.claimed_at = None;
        self.claim_expires_at = None;
    }
}

/// Request body for creating a planet. Every field is optional.
///
/// Empty strings and zero sizes fall back to the defaults, the same way a
/// blank form field would.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPlanet {
    pub name: Option<String>,
    pub link: Option<String>,
    pub avatar: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub size: Option<f64>,
    pub depth: Option<PlanetDepth>,
}

impl NewPlanet {
    /// Build an unclaimed planet with defaults applied.
    #[must_use]
    pub fn into_planet(self, id: PlanetId, created_at: DateTime<Utc>) -> Planet {
        Planet {
            id,
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLANET_NAME.to_owned()),
            link: self.link.unwrap_or_default(),
            avatar: self.avatar.unwrap_or_default(),
            x: self.x.filter(|x| x.is_finite()).unwrap_or(0.0),
            y: self.y.filter(|y| y.is_finite()).unwrap_or(0.0),
            size: self
                .size
                .filter(|size| size.is_finite() && *size > 0.0)
                .unwrap_or(DEFAULT_PLANET_SIZE),
            depth: self.depth.unwrap_or_default(),
            claimed_by: None,
            claimed_at: None,
            claim_expires_at: None,
            created_at,
        }
    }
}
