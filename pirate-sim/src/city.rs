// City economic model: stocks, gold, population feedback and market intel

use std::sync::Arc;

use crate::error::{Result, check_amount, draw_down};
use crate::market::{CitySnapshot, Information, Market, Observation};
use crate::resource::{self, MIN_BASE_POPULATION};
use crate::types::{Point2d, ResourceKind, ResourceMap};

/// Fee charged per city fact bought through [`City::buy_city_info`]
pub const CITY_INFORMATION_PRICE_IN_GOLD: f64 = 100.0;

/// Population figures fixed for the duration of one [`City::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrozenView {
    pub base_capacity: f64,
    pub capacity: f64,
    pub population: f64,
}

impl FrozenView {
    pub fn demand(&self, resource: ResourceKind) -> f64 {
        resource::demand(resource, self.population)
    }

    pub fn production(&self, resource: ResourceKind) -> f64 {
        resource::production(resource, self.population)
    }
}

/// Ordering key for offered facts. Unknown cities outrank any staleness gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum InfoPriority {
    Newer(u64),
    Unknown,
}

#[derive(Debug, Clone)]
pub struct City {
    pub name: String,
    pub location: Point2d,
    pub base_population: f64,
    pub stock: ResourceMap<f64>,
    pub gold: f64,
    /// Iterations stepped so far; larger means fresher
    pub recency: u64,
    pub information: Information,
}

impl City {
    pub fn new(name: impl Into<String>, location: impl Into<Point2d>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            base_population: 100.0,
            stock: ResourceMap::splat(0.0),
            gold: 0.0,
            recency: 0,
            information: Information::new(),
        }
    }

    pub fn with_base_population(mut self, base_population: f64) -> Self {
        self.base_population = base_population;
        self
    }

    pub fn with_gold(mut self, gold: f64) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_stock(mut self, resource: ResourceKind, tons: f64) -> Self {
        self.stock[resource] = tons;
        self
    }

    pub fn with_recency(mut self, recency: u64) -> Self {
        self.recency = recency;
        self
    }

    // === Derived figures ===

    pub fn base_capacity(&self) -> f64 {
        resource::base_capacity(self.stock[ResourceKind::Food])
    }

    pub fn capacity(&self) -> f64 {
        resource::capacity(self.base_capacity(), &self.stock, self.gold)
    }

    /// Compute base capacity, capacity and population once from current state.
    pub fn freeze(&self) -> FrozenView {
        let base_capacity = self.base_capacity();
        let capacity = resource::capacity(base_capacity, &self.stock, self.gold);
        FrozenView {
            base_capacity,
            capacity,
            population: resource::population(capacity, self.base_population),
        }
    }

    // === Iteration ===

    /// Consume and produce from a frozen population, then pull
    /// `base_population` toward capacity.
    pub fn step(&mut self) {
        let view = self.freeze();

        for r in ResourceKind::all() {
            let delta = view.production(r) - view.demand(r);
            // Consumption is limited to what the city holds
            self.stock[r] = (self.stock[r] + delta).max(0.0);
        }

        let factor = resource::growth_factor(view.population, view.capacity);
        self.base_population = (self.base_population * factor).max(MIN_BASE_POPULATION);
        self.recency += 1;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "city_step",
            city = self.name.as_str(),
            recency = self.recency,
            population = view.population,
            capacity = view.capacity,
            base_population = self.base_population,
            food = self.stock[ResourceKind::Food],
            goods = self.stock[ResourceKind::Goods],
            luxuries = self.stock[ResourceKind::Luxuries],
            cannons = self.stock[ResourceKind::Cannons],
            gold = self.gold,
        );
    }

    // === Observation ===

    pub fn snapshot(&self) -> CitySnapshot {
        CitySnapshot {
            name: self.name.clone(),
            location: self.location,
            stock: self.stock,
            gold: self.gold,
            recency: self.recency,
            base_population: self.base_population,
        }
    }

    pub fn observe(&self) -> Observation {
        Observation {
            subject: Arc::new(self.snapshot()),
            known: self.information.clone(),
        }
    }

    /// Buy facts from `source` that are unknown here or fresher than what we
    /// hold, most outdated first, until gold runs short. Returns gold spent.
    pub fn buy_city_info(&mut self, source: &Observation) -> f64 {
        let mut offers: Vec<(InfoPriority, &Arc<CitySnapshot>)> = source
            .facts()
            .filter(|fact| fact.name != self.name)
            .filter_map(|fact| {
                let priority = match self.information.get(&fact.name) {
                    None => InfoPriority::Unknown,
                    Some(held) if fact.recency > held.recency => {
                        InfoPriority::Newer(fact.recency - held.recency)
                    }
                    Some(_) => return None,
                };
                Some((priority, fact))
            })
            .collect();

        // Stable: equal priorities keep offer order
        offers.sort_by(|a, b| b.0.cmp(&a.0));

        let mut spent = 0.0;
        for (_priority, fact) in offers {
            if self.gold < CITY_INFORMATION_PRICE_IN_GOLD {
                break;
            }
            self.gold -= CITY_INFORMATION_PRICE_IN_GOLD;
            spent += CITY_INFORMATION_PRICE_IN_GOLD;
            self.information.insert(fact.name.clone(), Arc::clone(fact));

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "intel",
                buyer = self.name.as_str(),
                seller = source.name(),
                subject = fact.name.as_str(),
                subject_recency = fact.recency,
                fee = CITY_INFORMATION_PRICE_IN_GOLD,
                unknown = matches!(_priority, InfoPriority::Unknown),
            );
        }

        spent
    }

    // === Transfers ===

    pub fn deposit(&mut self, resource: ResourceKind, tons: f64) -> Result<()> {
        check_amount(resource.name(), tons)?;
        self.stock[resource] += tons;
        Ok(())
    }

    pub fn withdraw(&mut self, resource: ResourceKind, tons: f64) -> Result<()> {
        draw_down(&mut self.stock[resource], tons, &self.name, resource.name())
    }

    pub fn credit_gold(&mut self, amount: f64) -> Result<()> {
        check_amount("gold", amount)?;
        self.gold += amount;
        Ok(())
    }

    pub fn debit_gold(&mut self, amount: f64) -> Result<()> {
        draw_down(&mut self.gold, amount, &self.name, "gold")
    }
}

impl Market for City {
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
