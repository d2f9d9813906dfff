//! Run configuration.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```
//! use pirate_sim::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "seed": 7, "world": { "city_count": 6 } }"#).unwrap();
//! assert_eq!(config.world.city_count, 6);
//! assert_eq!(config.world.ships_per_city.max, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::Point2d;
use crate::worldgen::CITY_NAMES;

pub const DEFAULT_SEED: u64 = 42;

/// Tons per day a port crew can move on or off a ship
pub const HANDLING_RATE_RANGE_IN_TONS_PER_DAY: (f64, f64) = (10.0, 50.0);
/// Upper bound on the share of the owner's gold a departing ship takes along
pub const WORKING_CAPITAL_MAX_FRACTION: f64 = 0.3;

pub const MAP_SIZE_IN_KM: Point2d = Point2d::new(2_500.0, 1_000.0);
pub const MAP_MARGIN_IN_KM: Point2d = Point2d::new(2_500.0 / 25.0, 1_000.0 / 25.0);

/// Closed range `[min, max]` for integer draws, half-open `[min, max)` for rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd + std::fmt::Debug> Bounds<T> {
    fn check_ordered(&self, what: &str) -> Result<()> {
        if self.min <= self.max {
            Ok(())
        } else {
            Err(SimError::InvalidConfig(format!(
                "{what}: min {:?} exceeds max {:?}",
                self.min, self.max
            )))
        }
    }
}

// ============================================================================
// Trading rules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeRules {
    /// Drawn once per foreign arrival, half-open
    pub handling_rate: Bounds<f64>,
    pub working_capital_max_fraction: f64,
}

impl Default for TradeRules {
    fn default() -> Self {
        let (min, max) = HANDLING_RATE_RANGE_IN_TONS_PER_DAY;
        Self {
            handling_rate: Bounds::new(min, max),
            working_capital_max_fraction: WORKING_CAPITAL_MAX_FRACTION,
        }
    }
}

impl TradeRules {
    pub fn validate(&self) -> Result<()> {
        let rate = &self.handling_rate;
        if !(rate.min.is_finite() && rate.max.is_finite() && rate.min > 0.0 && rate.min < rate.max)
        {
            return Err(SimError::InvalidConfig(format!(
                "handling_rate must satisfy 0 < min < max, got [{}, {})",
                rate.min, rate.max
            )));
        }
        if !(0.0..=1.0).contains(&self.working_capital_max_fraction) {
            return Err(SimError::InvalidConfig(format!(
                "working_capital_max_fraction must lie in [0, 1], got {}",
                self.working_capital_max_fraction
            )));
        }
        Ok(())
    }
}

// ============================================================================
// World generation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    pub city_count: usize,
    pub map_size: Point2d,
    pub map_margin: Point2d,
    pub ships_per_city: Bounds<u32>,
    pub population: Bounds<u32>,
    pub gold: Bounds<u32>,
    pub food: Bounds<u32>,
    pub goods: Bounds<u32>,
    pub luxuries: Bounds<u32>,
    pub cannons: Bounds<u32>,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            city_count: 4,
            map_size: MAP_SIZE_IN_KM,
            map_margin: MAP_MARGIN_IN_KM,
            ships_per_city: Bounds::new(1, 3),
            population: Bounds::new(10, 1_000),
            gold: Bounds::new(50, 10_000),
            food: Bounds::new(10, 500),
            goods: Bounds::new(0, 300),
            luxuries: Bounds::new(0, 200),
            cannons: Bounds::new(0, 20),
        }
    }
}

impl WorldGenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.city_count < 2 {
            return Err(SimError::InvalidConfig(format!(
                "city_count must be at least 2, got {}",
                self.city_count
            )));
        }
        if self.city_count > CITY_NAMES.len() {
            return Err(SimError::InvalidConfig(format!(
                "city_count {} exceeds the {} available city names",
                self.city_count,
                CITY_NAMES.len()
            )));
        }

        let inner = self.map_size - self.map_margin * 2.0;
        if !(inner.x > 0.0 && inner.y > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "map_margin {:?} leaves no room inside map_size {:?}",
                self.map_margin, self.map_size
            )));
        }

        self.ships_per_city.check_ordered("ships_per_city")?;
        // Each ship of a city sails to a different peer
        if self.ships_per_city.max as usize >= self.city_count {
            return Err(SimError::InvalidConfig(format!(
                "ships_per_city.max {} needs at least {} cities",
                self.ships_per_city.max,
                self.ships_per_city.max + 1
            )));
        }

        self.population.check_ordered("population")?;
        if self.population.min == 0 {
            return Err(SimError::InvalidConfig(
                "population.min must be positive".to_string(),
            ));
        }
        self.gold.check_ordered("gold")?;
        self.food.check_ordered("food")?;
        self.goods.check_ordered("goods")?;
        self.luxuries.check_ordered("luxuries")?;
        self.cannons.check_ordered("cannons")?;
        Ok(())
    }
}

// ============================================================================
// SimConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub world: WorldGenConfig,
    pub trade: TradeRules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            world: WorldGenConfig::default(),
            trade: TradeRules::default(),
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_city_count(mut self, city_count: usize) -> Self {
        self.world.city_count = city_count;
        self
    }

    /// Parse and validate. An empty object yields the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.world.validate()?;
        self.trade.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.trade.handling_rate, Bounds::new(10.0, 50.0));
        assert_eq!(config.world.map_margin, Point2d::new(100.0, 40.0));
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(SimConfig::from_json("{}").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_partial_nested_override_keeps_siblings() {
        let config =
            SimConfig::from_json(r#"{ "trade": { "handling_rate": { "min": 5, "max": 6 } } }"#).unwrap();
        assert_eq!(config.trade.handling_rate, Bounds::new(5.0, 6.0));
        assert_eq!(config.trade.working_capital_max_fraction, WORKING_CAPITAL_MAX_FRACTION);
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        let err = SimConfig::from_json("{ seed: }").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            r#"{ "world": { "city_count": 1 } }"#,
            r#"{ "world": { "city_count": 500 } }"#,
            r#"{ "world": { "city_count": 3, "ships_per_city": { "min": 1, "max": 3 } } }"#,
            r#"{ "world": { "gold": { "min": 10, "max": 5 } } }"#,
            r#"{ "world": { "population": { "min": 0, "max": 5 } } }"#,
            r#"{ "world": { "map_margin": { "x": 2000, "y": 10 } } }"#,
            r#"{ "trade": { "handling_rate": { "min": 50, "max": 10 } } }"#,
            r#"{ "trade": { "handling_rate": { "min": 0, "max": 10 } } }"#,
            r#"{ "trade": { "working_capital_max_fraction": 1.5 } }"#,
        ];
        for json in cases {
            let err = SimConfig::from_json(json).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidConfig(_)),
                "expected InvalidConfig for {json}, got {err:?}"
            );
        }
    }
}
