//! Planet storage.
//!
//! An in-process collection behind a `tokio` read/write lock. Reads share the
//! lock; [`PlanetRepository::transaction`] holds the write lock for the whole
//! closure, so a read-check-write inside it cannot interleave with another.

use spacegoods_core::Planet;
use tokio::sync::RwLock;

/// Repository for planet records, kept in creation order.
#[derive(Debug, Default)]
pub struct PlanetRepository {
    planets: RwLock<Vec<Planet>>,
}

impl PlanetRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `planets`.
    #[must_use]
    pub fn with_planets(planets: Vec<Planet>) -> Self {
        Self {
            planets: RwLock::new(planets),
        }
    }

    /// All planets in creation order.
    pub async fn list(&self) -> Vec<Planet> {
        self.planets.read().await.clone()
    }

    /// Run `f` with exclusive access to the collection.
    pub async fn transaction<T>(&self, f: impl FnOnce(&mut Vec<Planet>) -> T) -> T {
        let mut planets = self.planets.write().await;
        f(&mut planets)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use spacegoods_core::{NewPlanet, PlanetId};

    use super::*;

    #[tokio::test]
    async fn test_transaction_and_list() {
        let repo = PlanetRepository::new();
        assert!(repo.list().await.is_empty());

        let id = PlanetId::new("p1");
        let planet = NewPlanet::default().into_planet(id.clone(), Utc::now());
        let len = repo
            .transaction(|planets| {
                planets.push(planet);
                planets.len()
            })
            .await;

        assert_eq!(len, 1);
        let planets = repo.list().await;
        assert_eq!(planets.len(), 1);
        assert_eq!(planets[0].id, id);
    }

    #[tokio::test]
    async fn test_with_planets_keeps_order() {
        let now = Utc::now();
        let repo = PlanetRepository::with_planets(vec![
            NewPlanet::default().into_planet(PlanetId::new("a"), now),
            NewPlanet::default().into_planet(PlanetId::new("b"), now),
        ]);

        let ids: Vec<String> = repo
            .list()
            .await
            .into_iter()
            .map(|planet| planet.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
