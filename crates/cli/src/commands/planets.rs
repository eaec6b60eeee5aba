//! Planet API commands.
//!
//! # Usage
//!
//! ```bash
//! sg-cli planets list
//! SPACEGOODS_ADMIN_TOKEN=... sg-cli planets reset-claims
//! ```
//!
//! # Environment Variables
//!
//! - `SPACEGOODS_API_URL` - Storefront base URL (default: `http://localhost:3000`)
//! - `SPACEGOODS_ADMIN_TOKEN` - Bearer token for `reset-claims`

use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use spacegoods_core::{ClaimStatus, Planet};
use thiserror::Error;

/// Errors from calling the planet API.
#[derive(Debug, Error)]
pub enum PlanetsError {
    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetBody {
    message: String,
    reset_count: usize,
}

/// Thin client for the storefront's planet endpoints.
pub struct PlanetsClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlanetsClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/planets{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlanetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.error);
        Err(PlanetsError::Api { status, message })
    }

    /// Fetch every planet.
    ///
    /// # Errors
    ///
    /// Returns `PlanetsError` if the request fails or the API rejects it.
    pub async fn list(&self) -> Result<Vec<Planet>, PlanetsError> {
        let response = self.client.get(self.url("")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Clear lapsed claims; returns the API's message and the reset count.
    ///
    /// # Errors
    ///
    /// Returns `PlanetsError` if the request fails or the token is rejected.
    pub async fn reset_claims(
        &self,
        token: Option<&SecretString>,
    ) -> Result<(String, usize), PlanetsError> {
        let mut request = self.client.post(self.url("/reset-claims"));
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        let body: ResetBody = Self::check(request.send().await?).await?.json().await?;
        Ok((body.message, body.reset_count))
    }
}

/// One-line description of a planet's claim state.
fn describe(planet: &Planet) -> String {
    match planet.claim_status(Utc::now()) {
        ClaimStatus::Unclaimed => "unclaimed".to_owned(),
        ClaimStatus::Claimed { by, expires_at } => {
            format!("claimed by {by} until {}", expires_at.format("%Y-%m-%d"))
        }
        ClaimStatus::Expired { by } => format!("expired (was {by})"),
    }
}

/// Print every planet.
///
/// # Errors
///
/// Returns an error if the API cannot be reached.
#[allow(clippy::print_stdout)]
pub async fn list(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let planets = PlanetsClient::new(api_url).list().await?;
    if planets.is_empty() {
        println!("No planets yet.");
    }
    for planet in &planets {
        println!("{}  {}  [{}]", planet.id, planet.name, describe(planet));
    }
    Ok(())
}

/// Clear lapsed claims.
///
/// # Errors
///
/// Returns an error if the API cannot be reached or rejects the token.
#[allow(clippy::print_stdout)]
pub async fn reset_claims(
    api_url: &str,
    token: Option<&SecretString>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (message, reset_count) = PlanetsClient::new(api_url).reset_claims(token).await?;
    tracing::info!(reset_count, "Claims reset");
    println!("{message}");
    Ok(())
}
