// ============================================================================
// Simulation - Sole owner of cities, ships and the run's random stream
// ============================================================================

use rand::SeedableRng;
use rand::rngs::StdRng;
use slotmap::SlotMap;

use crate::city::City;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::ship::{Agenda, Ship, ShipSpec, ShipType};
use crate::types::{CityId, ResourceKind, ShipId};
use crate::worldgen;

pub struct Simulation {
    cities: SlotMap<CityId, City>,
    ships: SlotMap<ShipId, Ship>,
    rng: StdRng,
    config: SimConfig,
    iteration: u64,
}

impl Simulation {
    /// An empty world. Every random draw of the run comes from `config.seed`.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cities: SlotMap::with_key(),
            ships: SlotMap::with_key(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            iteration: 0,
        })
    }

    /// A world drawn from `config.world`.
    pub fn generate(config: SimConfig) -> Result<Self> {
        let mut sim = Self::new(config)?;
        let plan = worldgen::generate(&sim.config.world, &mut sim.rng);

        let ids = plan
            .cities
            .into_iter()
            .map(|city| sim.add_city(city))
            .collect::<Result<Vec<_>>>()?;

        for ship in plan.ships {
            let route = ship.route.iter().map(|&i| ids[i]).collect();
            sim.add_ship(ship.name, ship.ship_type, ids[ship.home], route, ship.agenda)?;
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "worldgen",
            seed = sim.config.seed,
            cities = sim.cities.len(),
            ships = sim.ships.len(),
        );

        Ok(sim)
    }

    // === World building ===

    pub fn add_city(&mut self, city: City) -> Result<CityId> {
        if self.city_by_name(&city.name).is_some() {
            return Err(SimError::DuplicateCity(city.name));
        }
        Ok(self.cities.insert(city))
    }

    pub fn add_ship(
        &mut self,
        name: impl Into<String>,
        ship_type: ShipType,
        home: CityId,
        route: Vec<CityId>,
        agenda: Agenda,
    ) -> Result<ShipId> {
        let home_location = self
            .cities
            .get(home)
            .ok_or_else(|| SimError::UnknownCity(format!("{home:?}")))?
            .location;
        if let Some(missing) = route.iter().find(|id| !self.cities.contains_key(**id)) {
            return Err(SimError::UnknownCity(format!("{missing:?}")));
        }

        let ship = Ship::new(
            name,
            ShipSpec::from_type(ship_type),
            home,
            home_location,
            route,
            agenda,
        )?;
        Ok(self.ships.insert(ship))
    }

    /// Same as [`Simulation::add_ship`], resolving class and cities by name.
    pub fn add_ship_by_names(
        &mut self,
        name: impl Into<String>,
        ship_class: &str,
        home: &str,
        route: &[&str],
        agenda: Agenda,
    ) -> Result<ShipId> {
        let ship_type: ShipType = ship_class.parse()?;
        let home = self.city_id(home)?;
        let route = route
            .iter()
            .map(|stop| self.city_id(stop))
            .collect::<Result<Vec<_>>>()?;
        self.add_ship(name, ship_type, home, route, agenda)
    }

    pub fn set_agenda(&mut self, ship_name: &str, agenda: Agenda) -> Result<()> {
        let ship = self
            .ships
            .values_mut()
            .find(|s| s.name() == ship_name)
            .ok_or_else(|| SimError::UnknownShip(ship_name.to_string()))?;
        ship.set_agenda(agenda);
        Ok(())
    }

    // === Iteration ===

    /// Every ship, then every city, each in insertion order.
    pub fn step(&mut self) -> Result<()> {
        for ship in self.ships.values_mut() {
            ship.step(&mut self.cities, &mut self.rng, &self.config.trade)?;
        }
        for city in self.cities.values_mut() {
            city.step();
        }
        self.iteration += 1;
        Ok(())
    }

    pub fn run(&mut self, iterations: u64) -> Result<()> {
        for _ in 0..iterations {
            self.step()?;
        }
        Ok(())
    }

    // === Queries ===

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cities(&self) -> &SlotMap<CityId, City> {
        &self.cities
    }

    pub fn ships(&self) -> &SlotMap<ShipId, Ship> {
        &self.ships
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    pub fn city_by_name(&self, name: &str) -> Option<(CityId, &City)> {
        self.cities.iter().find(|(_, c)| c.name == name)
    }

    pub fn ship_by_name(&self, name: &str) -> Option<(ShipId, &Ship)> {
        self.ships.iter().find(|(_, s)| s.name() == name)
    }

    fn city_id(&self, name: &str) -> Result<CityId> {
        self.city_by_name(name)
            .map(|(id, _)| id)
            .ok_or_else(|| SimError::UnknownCity(name.to_string()))
    }

    /// Gold held by cities and ships together
    pub fn total_gold(&self) -> f64 {
        let in_cities: f64 = self.cities.values().map(|c| c.gold).sum();
        let at_sea: f64 = self.ships.values().map(|s| s.gold()).sum();
        in_cities + at_sea
    }

    /// Tons of `resource` in city stocks and ship holds together
    pub fn total_stock(&self, resource: ResourceKind) -> f64 {
        let in_cities: f64 = self.cities.values().map(|c| c.stock[resource]).sum();
        let at_sea: u32 = self.ships.values().map(|s| s.cargo(resource)).sum();
        in_cities + f64::from(at_sea)
    }
}
