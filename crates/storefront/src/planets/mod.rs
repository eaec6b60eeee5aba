//! Planet promotion rules.
//!
//! Visitors create planets (up to a global cap), browse them, and claim one
//! for a limited number of calendar months. A claim blocks other claimers
//! until it expires; the holder may claim again without effect. Lapsed claims
//! are cleared by [`PlanetService::reset_expired`], which a scheduler calls
//! through the admin endpoint.

pub mod repository;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use spacegoods_core::{ClaimStatus, ClaimerId, NewPlanet, Planet, PlanetId};
use thiserror::Error;
use tracing::instrument;

pub use repository::PlanetRepository;

/// Default cap on the number of planets.
pub const DEFAULT_MAX_PLANETS: usize = 100;

/// Default claim length in calendar months.
pub const DEFAULT_CLAIM_MONTHS: u32 = 1;

/// Errors from planet operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanetError {
    /// Request is missing a required field.
    #[error("{0}")]
    InvalidRequest(String),

    /// No planet with the given ID.
    #[error("Planet not found.")]
    NotFound,

    /// Someone else holds an active claim.
    #[error("Planet is already claimed by another user.")]
    AlreadyClaimed,

    /// The planet cap has been reached.
    #[error("Planet creation limit reached. Maximum {max} planets allowed.")]
    LimitReached { max: usize },
}

/// How a claim request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// A new claim was recorded.
    Claimed,
    /// The requester already held an active claim; nothing changed.
    AlreadyYours,
}

impl ClaimOutcome {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Claimed => "Planet claimed successfully.",
            Self::AlreadyYours => "Planet already claimed by you.",
        }
    }
}

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimResult {
    pub outcome: ClaimOutcome,
    pub planet: Planet,
}

/// Result of clearing lapsed claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub reset_count: usize,
}

impl ResetSummary {
    #[must_use]
    pub fn message(&self) -> String {
        if self.reset_count == 0 {
            "No expired claims to reset.".to_owned()
        } else {
            format!("Reset {} expired claims.", self.reset_count)
        }
    }
}

/// Planet operations over a shared repository.
#[derive(Debug, Clone)]
pub struct PlanetService {
    repo: Arc<PlanetRepository>,
    max_planets: usize,
    claim_months: u32,
}

impl PlanetService {
    /// Create a service with the given limits.
    #[must_use]
    pub const fn new(repo: Arc<PlanetRepository>, max_planets: usize, claim_months: u32) -> Self {
        Self {
            repo,
            max_planets,
            claim_months,
        }
    }

    /// All planets in creation order.
    pub async fn list(&self) -> Vec<Planet> {
        self.repo.list().await
    }

    /// Create a planet with defaults filled in.
    ///
    /// # Errors
    ///
    /// Returns [`PlanetError::LimitReached`] if the cap has been reached.
    #[instrument(skip(self, new_planet))]
    pub async fn create(
        &self,
        new_planet: NewPlanet,
        now: DateTime<Utc>,
    ) -> Result<Planet, PlanetError> {
        let max = self.max_planets;
        let planet = self
            .repo
            .transaction(|planets| {
                if planets.len() >= max {
                    return Err(PlanetError::LimitReached { max });
                }
                let planet = new_planet.into_planet(PlanetId::generate(), now);
                planets.push(planet.clone());
                Ok(planet)
            })
            .await?;

        tracing::info!(planet_id = %planet.id, name = %planet.name, "Planet created");
        Ok(planet)
    }

    /// Claim a planet for `claimer` as of `now`.
    ///
    /// # Errors
    ///
    /// - [`PlanetError::InvalidRequest`] if either ID is empty
    /// - [`PlanetError::NotFound`] if no planet has `id`
    /// - [`PlanetError::AlreadyClaimed`] if another claimer holds it
    #[instrument(skip(self))]
    pub async fn claim(
        &self,
        id: &PlanetId,
        claimer: &ClaimerId,
        now: DateTime<Utc>,
    ) -> Result<ClaimResult, PlanetError> {
        if id.is_empty() || claimer.is_empty() {
            return Err(PlanetError::InvalidRequest(
                "Planet ID and claimer ID are required.".to_owned(),
            ));
        }

        let months = self.claim_months;
        let result = self
            .repo
            .transaction(|planets| {
                let planet = planets
                    .iter_mut()
                    .find(|planet| &planet.id == id)
                    .ok_or(PlanetError::NotFound)?;

                if let ClaimStatus::Claimed { by, .. } = planet.claim_status(now) {
                    if &by == claimer {
                        return Ok(ClaimResult {
                            outcome: ClaimOutcome::AlreadyYours,
                            planet: planet.clone(),
                        });
                    }
                    return Err(PlanetError::AlreadyClaimed);
                }

                planet.claim(claimer.clone(), now, months);
                Ok(ClaimResult {
                    outcome: ClaimOutcome::Claimed,
                    planet: planet.clone(),
                })
            })
            .await?;

        tracing::info!(outcome = ?result.outcome, "Planet claim resolved");
        Ok(result)
    }

    /// Clear claim fields on every planet whose claim lapsed before `now`.
    #[instrument(skip(self))]
    pub async fn reset_expired(&self, now: DateTime<Utc>) -> ResetSummary {
        let reset_count = self
            .repo
            .transaction(|planets| {
                let mut reset = 0;
                for planet in planets.iter_mut().filter(|planet| planet.claim_lapsed(now)) {
                    planet.release();
                    reset += 1;
                }
                reset
            })
            .await;

        let summary = ResetSummary { reset_count };
        tracing::info!(reset_count, "{}", summary.message());
        summary
    }
}
