use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resource;
use crate::types::{Point2d, ResourceKind, ResourceMap};

// ============================================================================
// Market - Read-only supply/demand surface shared by cities and snapshots
// ============================================================================

/// Anything that exposes a city-local market.
///
/// Implementors supply stock and population; the demand, supply and price
/// laws are the same everywhere.
pub trait Market {
    fn market_name(&self) -> &str;

    fn stock_of(&self, resource: ResourceKind) -> f64;

    fn population(&self) -> f64;

    fn demand(&self, resource: ResourceKind) -> f64 {
        resource::demand(resource, self.population())
    }

    fn supply(&self, resource: ResourceKind) -> f64 {
        self.stock_of(resource)
    }

    fn excess_supply(&self, resource: ResourceKind) -> f64 {
        resource::excess_supply(self.demand(resource), self.supply(resource))
    }

    fn production(&self, resource: ResourceKind) -> f64 {
        resource::production(resource, self.population())
    }

    fn price(&self, resource: ResourceKind) -> f64 {
        resource::price(resource, self.demand(resource), self.supply(resource))
    }
}

// ============================================================================
// Snapshots - Immutable value copies of a city
// ============================================================================

/// A city as it looked when observed. Carries the inputs needed to rebuild
/// its population and prices, nothing live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub name: String,
    pub location: Point2d,
    pub stock: ResourceMap<f64>,
    pub gold: f64,
    pub recency: u64,
    pub base_population: f64,
}

impl CitySnapshot {
    pub fn base_capacity(&self) -> f64 {
        resource::base_capacity(self.stock[ResourceKind::Food])
    }

    pub fn capacity(&self) -> f64 {
        resource::capacity(self.base_capacity(), &self.stock, self.gold)
    }
}

impl Market for CitySnapshot {
    fn market_name(&self) -> &str {
        &self.name
    }

    fn stock_of(&self, resource: ResourceKind) -> f64 {
        self.stock[resource]
    }

    fn population(&self) -> f64 {
        resource::population(self.capacity(), self.base_population)
    }
}

/// Market facts a city holds about its peers, keyed by city name.
pub type Information = BTreeMap<String, Arc<CitySnapshot>>;

/// What an observer learns by looking at a city: the city itself plus the
/// facts that city holds about others.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub subject: Arc<CitySnapshot>,
    pub known: Information,
}

impl Observation {
    pub fn name(&self) -> &str {
        &self.subject.name
    }

    pub fn recency(&self) -> u64 {
        self.subject.recency
    }

    /// Candidate facts in offer order: the subject first, then known facts by name.
    /// A known entry about the subject itself is superseded by the subject.
    pub fn facts(&self) -> impl Iterator<Item = &Arc<CitySnapshot>> {
        std::iter::once(&self.subject).chain(
            self.known
                .iter()
                .filter(|(name, _)| name.as_str() != self.subject.name)
                .map(|(_, snapshot)| snapshot),
        )
    }
}

impl Market for Observation {
    fn market_name(&self) -> &str {
        self.subject.market_name()
    }

    fn stock_of(&self, resource: ResourceKind) -> f64 {
        self.subject.stock_of(resource)
    }

    fn population(&self) -> f64 {
        self.subject.population()
    }
}
