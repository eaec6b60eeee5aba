//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::planets::{PlanetRepository, PlanetService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the planet service and configuration. Carts are not
/// held here: each request rebuilds its cart from the visitor's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    planets: PlanetService,
}

impl AppState {
    /// Create application state with an empty planet repository.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_repository(config, Arc::new(PlanetRepository::new()))
    }

    /// Create application state over an existing planet repository.
    #[must_use]
    pub fn with_repository(config: StorefrontConfig, repo: Arc<PlanetRepository>) -> Self {
        let planets = PlanetService::new(
            repo,
            config.planets.max_planets,
            config.planets.claim_months,
        );

        Self {
            inner: Arc::new(AppStateInner { config, planets }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the planet service.
    #[must_use]
    pub fn planets(&self) -> &PlanetService {
        &self.inner.planets
    }
}
