// Ship state machine: sail, trade at port, return home

mod agenda;
mod class;
mod hold;
mod trade;

pub use agenda::{Agenda, Orders, StopOrders};
pub use class::{MIN_SHIP_SPEED_IN_KM_PER_DAY, ShipSpec, ShipSpeed, ShipType};
pub use hold::Hold;

use rand::Rng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tsify_next::Tsify;

use crate::city::City;
use crate::config::TradeRules;
use crate::error::{Result, SimError};
use crate::market::{Market, Observation};
use crate::types::{CityId, Point2d, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ShipState {
    AtSea,
    ArrivedAtPort,
    WaitingForDeparture,
}

pub(crate) fn city_ref(cities: &SlotMap<CityId, City>, id: CityId) -> Result<&City> {
    cities
        .get(id)
        .ok_or_else(|| SimError::UnknownCity(format!("{id:?}")))
}

pub(crate) fn city_mut(cities: &mut SlotMap<CityId, City>, id: CityId) -> Result<&mut City> {
    cities
        .get_mut(id)
        .ok_or_else(|| SimError::UnknownCity(format!("{id:?}")))
}

#[derive(Debug, Clone)]
pub struct Ship {
    name: String,
    spec: ShipSpec,
    home: CityId,
    /// Always ends at `home`
    route: Vec<CityId>,
    agenda: Agenda,
    route_index: usize,
    state: ShipState,
    position: Point2d,
    hold: Hold,
    gold: f64,
    destination: CityId,
    iterations_en_route: u32,
    waiting_iterations_remaining: u32,
    owner_info: Option<Observation>,
    destination_info: Option<Observation>,
    /// Last foreign port seen this voyage, handed over at home
    voyage_news: Option<Observation>,
}

impl Ship {
    /// A ship docked at `home`, waiting to sail `route`. Home is appended
    /// to the route when it is not already the last stop.
    pub fn new(
        name: impl Into<String>,
        spec: ShipSpec,
        home: CityId,
        home_location: Point2d,
        mut route: Vec<CityId>,
        agenda: Agenda,
    ) -> Result<Self> {
        let name = name.into();
        let Some(&first) = route.first() else {
            return Err(SimError::EmptyRoute { ship: name });
        };
        if route.last() != Some(&home) {
            route.push(home);
        }

        Ok(Self {
            hold: Hold::new(spec.max_cargo_hold_in_tons),
            name,
            spec,
            home,
            route,
            agenda,
            route_index: 0,
            state: ShipState::WaitingForDeparture,
            position: home_location,
            gold: 0.0,
            destination: first,
            iterations_en_route: 0,
            waiting_iterations_remaining: 0,
            owner_info: None,
            destination_info: None,
            voyage_news: None,
        })
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ShipSpec {
        &self.spec
    }

    pub fn home(&self) -> CityId {
        self.home
    }

    pub fn route(&self) -> &[CityId] {
        &self.route
    }

    pub fn route_index(&self) -> usize {
        self.route_index
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn set_agenda(&mut self, agenda: Agenda) {
        self.agenda = agenda;
    }

    pub fn state(&self) -> ShipState {
        self.state
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn hold(&self) -> &Hold {
        &self.hold
    }

    pub fn cargo(&self, resource: ResourceKind) -> u32 {
        self.hold.get(resource)
    }

    pub fn gold(&self) -> f64 {
        self.gold
    }

    pub fn destination(&self) -> CityId {
        self.destination
    }

    pub fn iterations_en_route(&self) -> u32 {
        self.iterations_en_route
    }

    pub fn waiting_iterations_remaining(&self) -> u32 {
        self.waiting_iterations_remaining
    }

    pub fn owner_info(&self) -> Option<&Observation> {
        self.owner_info.as_ref()
    }

    pub fn destination_info(&self) -> Option<&Observation> {
        self.destination_info.as_ref()
    }

    pub fn voyage_news(&self) -> Option<&Observation> {
        self.voyage_news.as_ref()
    }

    fn current_stop(&self) -> CityId {
        self.route.get(self.route_index).copied().unwrap_or(self.home)
    }

    // === Iteration ===

    pub fn step<R: Rng>(
        &mut self,
        cities: &mut SlotMap<CityId, City>,
        rng: &mut R,
        rules: &TradeRules,
    ) -> Result<()> {
        self.travel(cities)?;
        self.handle_arrival(cities, rng, rules)?;
        self.depart(cities, rng, rules)
    }

    fn travel(&mut self, cities: &SlotMap<CityId, City>) -> Result<()> {
        if self.state != ShipState::AtSea {
            return Ok(());
        }
        self.iterations_en_route += 1;

        let target = city_ref(cities, self.destination)?.location;
        let speed = self.spec.speed_km();
        let distance = self.position.distance_to(target);
        if distance > speed {
            self.position += (target - self.position) * (speed / distance);
        } else {
            self.position = target;
            self.state = ShipState::ArrivedAtPort;
        }
        Ok(())
    }

    fn handle_arrival<R: Rng>(
        &mut self,
        cities: &mut SlotMap<CityId, City>,
        rng: &mut R,
        rules: &TradeRules,
    ) -> Result<()> {
        if self.state != ShipState::ArrivedAtPort {
            return Ok(());
        }

        // Only the last stop ends the voyage. Home may also appear mid-route.
        let voyage_done = self.route_index + 1 >= self.route.len();
        let owner_view = city_ref(cities, self.home)?.observe();
        self.owner_info = Some(owner_view.clone());
        self.destination_info = Some(city_ref(cities, self.destination)?.observe());

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "arrival",
            ship = self.name.as_str(),
            city = city_ref(cities, self.destination)?.name.as_str(),
            home = self.destination == self.home,
            iterations_en_route = self.iterations_en_route,
            cargo_tons = self.hold.total(),
            gold = self.gold,
        );

        if voyage_done {
            let owner = city_mut(cities, self.home)?;
            self.arrive_home(owner)?;
            self.bring_news_home(owner)?;
            self.waiting_iterations_remaining = 0;
            self.route_index = 0;
            self.destination = self.current_stop();
            self.state = ShipState::WaitingForDeparture;
            return Ok(());
        }

        let port_id = self.destination;
        let before = self.hold.contents();
        let port = city_mut(cities, port_id)?;
        let orders = self.agenda.get(&port.name).cloned().unwrap_or_default();

        match &orders.sell {
            Some(sell) => self.sell_per_orders(port, sell)?,
            None => self.sell_by_margin(port, &owner_view)?,
        }
        match &orders.buy {
            Some(buy) => {
                // Every stop still ahead, home included
                let ahead = self.route.get(self.route_index + 1..).unwrap_or_default().to_vec();
                self.buy_per_orders(cities, port_id, buy, &ahead)?;
            }
            None => self.buy_by_demand(city_mut(cities, port_id)?, &owner_view)?,
        }

        // The port pays for what the ship knows about its owner's market
        self.gold += city_mut(cities, port_id)?.buy_city_info(&owner_view);
        if port_id != self.home {
            self.voyage_news = self.destination_info.clone();
        }

        let moved = self.hold.tons_moved_since(&before);
        let handling_rate = rng.random_range(rules.handling_rate.min..rules.handling_rate.max);
        self.waiting_iterations_remaining = (f64::from(moved) / handling_rate).ceil() as u32;
        self.state = ShipState::WaitingForDeparture;

        if self.route_index < self.route.len() {
            self.route_index += 1;
        }
        self.destination = self.current_stop();
        Ok(())
    }

    fn depart<R: Rng>(
        &mut self,
        cities: &mut SlotMap<CityId, City>,
        rng: &mut R,
        rules: &TradeRules,
    ) -> Result<()> {
        if self.state != ShipState::WaitingForDeparture {
            return Ok(());
        }
        if self.waiting_iterations_remaining > 0 {
            self.waiting_iterations_remaining -= 1;
            return Ok(());
        }

        self.destination = self.current_stop();
        self.state = ShipState::AtSea;
        self.iterations_en_route = 0;

        // Index 0 is only ever sailed for from home
        let from_home = self.route_index == 0;
        self.owner_info = Some(city_ref(cities, self.home)?.observe());
        self.destination_info = Some(city_ref(cities, self.destination)?.observe());

        if from_home {
            self.load_cargo_to_sell(city_mut(cities, self.home)?, rng, rules)?;
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "departure",
            ship = self.name.as_str(),
            destination = city_ref(cities, self.destination)?.name.as_str(),
            from_home = from_home,
            cargo_tons = self.hold.total(),
            gold = self.gold,
        );

        Ok(())
    }

    /// Fill the hold with the owner's surplus, largest first, and take
    /// working capital.
    fn load_cargo_to_sell<R: Rng>(
        &mut self,
        owner: &mut City,
        rng: &mut R,
        rules: &TradeRules,
    ) -> Result<()> {
        let mut surplus: Vec<(ResourceKind, f64)> = ResourceKind::all()
            .map(|r| (r, owner.excess_supply(r)))
            .collect();
        surplus.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (resource, excess) in surplus {
            let free = self.hold.free();
            if free == 0 || excess <= 0.0 {
                break;
            }
            let tons = excess.min(f64::from(free)).floor() as u32;
            if tons == 0 {
                continue;
            }
            owner.withdraw(resource, f64::from(tons))?;
            self.hold.load(&self.name, resource, tons)?;
        }

        let fraction = rng.random::<f64>() * rules.working_capital_max_fraction;
        let capital = (fraction * owner.gold).floor();
        owner.debit_gold(capital)?;
        self.gold += capital;
        Ok(())
    }

    /// Hand everything to the owner. The owner also takes the ship's
    /// destination snapshot, and pays itself back for it.
    fn arrive_home(&mut self, owner: &mut City) -> Result<()> {
        owner.credit_gold(std::mem::take(&mut self.gold))?;
        for (resource, tons) in self.hold.take_all().iter() {
            owner.deposit(resource, f64::from(tons))?;
        }

        if let Some(snapshot) = &self.destination_info {
            let paid = owner.buy_city_info(snapshot);
            owner.credit_gold(paid)?;
        }
        Ok(())
    }

    /// Pass on what the last foreign port knew. Like `arrive_home`, the
    /// owner pays itself, so only the facts change hands.
    fn bring_news_home(&mut self, owner: &mut City) -> Result<()> {
        if let Some(news) = self.voyage_news.take() {
            let paid = owner.buy_city_info(&news);
            owner.credit_gold(paid)?;
        }
        Ok(())
    }
}
