//! Resource catalog: global economic constants and the pricing law.
//!
//! Rates are per capita per day; callers scale them by [`DAYS_PER_ITERATION`].

use crate::types::{ResourceKind, ResourceMap};

// === TIME ===

pub const DAYS_PER_ITERATION: f64 = 1.0;

// === PRICING ===

pub const PRICE_MIN: f64 = 1.0 / 1_000_000.0;
pub const PRICE_MAX: f64 = 200.0;
pub const PRICE_ELASTICITY: f64 = 0.5;

/// Fraction of a surplus that may leave the city in one exchange
pub const EXCESS_SUPPLY_FRACTION: f64 = 0.8;

// === POPULATION & CAPACITY ===

pub const INITIAL_CAPACITY: f64 = 100.0;
pub const GROWTH_RATE_PER_DAY: f64 = 0.5;
/// Food (tons) at which base capacity is 10/11 of its ceiling
pub const FOOD_CAPACITY_SCALE: f64 = 1_000.0;
pub const GOLD_CAPACITY_WEIGHT: f64 = 0.15;
pub const MIN_BASE_POPULATION: f64 = 1.0;

impl ResourceKind {
    pub fn base_price(self) -> f64 {
        match self {
            ResourceKind::Food => 3.0,
            ResourceKind::Goods => 5.0,
            ResourceKind::Luxuries => 10.0,
            ResourceKind::Cannons => 1.0,
        }
    }

    pub fn consumption_per_capita(self) -> f64 {
        match self {
            ResourceKind::Food => 0.0063,
            ResourceKind::Goods => 0.0025,
            ResourceKind::Luxuries => 0.001,
            ResourceKind::Cannons => 0.0001,
        }
    }

    pub fn production_per_capita(self) -> f64 {
        match self {
            ResourceKind::Food => 0.003,
            ResourceKind::Goods => 0.001,
            ResourceKind::Luxuries => 0.0,
            ResourceKind::Cannons => 0.0,
        }
    }

    /// Linear contribution of one ton in stock to city capacity
    pub fn capacity_weight(self) -> f64 {
        match self {
            ResourceKind::Food => 0.6,
            ResourceKind::Goods => 0.07,
            ResourceKind::Luxuries => 0.15,
            ResourceKind::Cannons => 0.03,
        }
    }
}

/// Supply/demand pricing law.
///
/// - demand <= 0 → floor (nobody wants it)
/// - supply <= 0 → ceiling (nobody has it)
/// - otherwise `base * (demand / supply)^elasticity`, clamped
pub fn price(resource: ResourceKind, demand: f64, supply: f64) -> f64 {
    if demand <= 0.0 {
        return PRICE_MIN;
    }
    if supply <= 0.0 {
        return PRICE_MAX;
    }
    let raw = resource.base_price() * (demand / supply).powf(PRICE_ELASTICITY);
    if raw.is_nan() {
        return PRICE_MAX;
    }
    raw.clamp(PRICE_MIN, PRICE_MAX)
}

pub fn excess_supply(demand: f64, supply: f64) -> f64 {
    (EXCESS_SUPPLY_FRACTION * (supply - demand)).max(0.0)
}

pub fn demand(resource: ResourceKind, population: f64) -> f64 {
    population * resource.consumption_per_capita() * DAYS_PER_ITERATION
}

pub fn production(resource: ResourceKind, population: f64) -> f64 {
    population * resource.production_per_capita() * DAYS_PER_ITERATION
}

/// Saturating in food: 50% of the ceiling at zero food, approaching 100%.
pub fn base_capacity(food: f64) -> f64 {
    INITIAL_CAPACITY / (1.0 + 10f64.powf(-food / FOOD_CAPACITY_SCALE))
}

pub fn capacity(base_capacity: f64, stock: &ResourceMap<f64>, gold: f64) -> f64 {
    let weighted: f64 = stock.iter().map(|(r, qty)| qty * r.capacity_weight()).sum();
    base_capacity * (1.0 + weighted + gold * GOLD_CAPACITY_WEIGHT)
}

/// Logistic population anchored at `base_population`, one iteration toward `capacity`.
pub fn population(capacity: f64, base_population: f64) -> f64 {
    let decay = (-GROWTH_RATE_PER_DAY * DAYS_PER_ITERATION).exp();
    capacity / (1.0 + (capacity / base_population - 1.0) * decay)
}

/// Multiplicative update applied to `base_population` at the end of a step.
pub fn growth_factor(population: f64, capacity: f64) -> f64 {
    1.0 + GROWTH_RATE_PER_DAY * DAYS_PER_ITERATION * (1.0 - population / capacity)
}
