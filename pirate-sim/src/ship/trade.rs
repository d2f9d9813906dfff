use slotmap::SlotMap;

use crate::city::City;
use crate::error::{Result, draw_down};
use crate::market::{Market, Observation};
use crate::types::{CityId, ResourceKind};

use super::{Orders, Ship, city_mut, city_ref};

/// Sort resources by score, highest first. Ties keep resource order.
fn ranked(mut scored: Vec<(ResourceKind, f64)>) -> Vec<(ResourceKind, f64)> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Current lowest price of `resource` over `stops`; infinite when there are none.
fn lowest_price(cities: &SlotMap<CityId, City>, stops: &[CityId], resource: ResourceKind) -> Result<f64> {
    stops.iter().try_fold(f64::INFINITY, |lowest, &id| {
        Ok(lowest.min(city_ref(cities, id)?.price(resource)))
    })
}

/// Whole tons `gold` pays for at `price`.
fn affordable(gold: f64, price: f64) -> f64 {
    if price > 0.0 { (gold / price).floor() } else { 0.0 }
}

impl Ship {
    // === Exchange primitives ===

    /// Sell `tons` to `port` at `price`: cargo to the port, gold to the ship.
    pub(super) fn sell_to(
        &mut self,
        port: &mut City,
        resource: ResourceKind,
        tons: u32,
        price: f64,
    ) -> Result<()> {
        if tons == 0 {
            return Ok(());
        }
        let earnings = f64::from(tons) * price;
        port.debit_gold(earnings)?;
        self.hold.unload(&self.name, resource, tons)?;
        port.deposit(resource, f64::from(tons))?;
        self.gold += earnings;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "trade",
            ship = self.name.as_str(),
            city = port.name.as_str(),
            side = "sell",
            resource = resource.name(),
            tons = tons,
            price = price,
            gold = earnings,
        );
        Ok(())
    }

    /// Buy `tons` from `port` at `price`: gold to the port, cargo to the ship.
    pub(super) fn buy_from(
        &mut self,
        port: &mut City,
        resource: ResourceKind,
        tons: u32,
        price: f64,
    ) -> Result<()> {
        if tons == 0 {
            return Ok(());
        }
        let cost = f64::from(tons) * price;
        self.hold.load(&self.name, resource, tons)?;
        port.withdraw(resource, f64::from(tons))?;
        draw_down(&mut self.gold, cost, &self.name, "gold")?;
        port.credit_gold(cost)?;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "trade",
            ship = self.name.as_str(),
            city = port.name.as_str(),
            side = "buy",
            resource = resource.name(),
            tons = tons,
            price = price,
            gold = cost,
        );
        Ok(())
    }

    // === Default trading ===

    /// Sell the best margins first: port price against the owner's price.
    pub(super) fn sell_by_margin(&mut self, port: &mut City, owner: &Observation) -> Result<()> {
        let margins = ranked(
            ResourceKind::all()
                .map(|r| (r, port.price(r) - owner.price(r)))
                .collect(),
        );

        for (resource, _margin) in margins {
            let price = port.price(resource);
            let carried = f64::from(self.hold.get(resource));
            let tons = carried.min(affordable(port.gold, price)) as u32;
            self.sell_to(port, resource, tons, price)?;
        }
        Ok(())
    }

    /// Buy what the owner consumes most, limited by the owner's demand,
    /// free hold space, the port's surplus and the ship's gold.
    pub(super) fn buy_by_demand(&mut self, port: &mut City, owner: &Observation) -> Result<()> {
        let wanted = ranked(
            ResourceKind::all()
                .map(|r| (r, owner.demand(r)))
                .filter(|(_, demand)| *demand > 0.0)
                .map(|(r, demand)| (r, demand.floor()))
                .collect(),
        );

        for (resource, want) in wanted {
            let free = self.hold.free();
            if free == 0 || self.gold <= 0.0 {
                break;
            }
            let price = port.price(resource);
            let tons = f64::from(free)
                .min(want)
                .min(port.excess_supply(resource))
                .min(affordable(self.gold, price))
                .floor() as u32;
            self.buy_from(port, resource, tons, price)?;
        }
        Ok(())
    }

    // === Agenda trading ===

    /// Sell up to each target, or everything carried when the target is open.
    pub(super) fn sell_per_orders(&mut self, port: &mut City, orders: &Orders) -> Result<()> {
        for (&resource, &target) in orders {
            let carried = self.hold.get(resource);
            if carried == 0 {
                continue;
            }
            let wanted = target.map_or(carried, |t| t.min(carried));
            let price = port.price(resource);
            let tons = f64::from(wanted).min(affordable(port.gold, price)) as u32;
            self.sell_to(port, resource, tons, price)?;
        }
        Ok(())
    }

    /// Buy toward each target, but only where the port is at least as cheap
    /// as every stop in `ahead`. Prices are read as each resource comes up,
    /// so trades already made at this stop count.
    pub(super) fn buy_per_orders(
        &mut self,
        cities: &mut SlotMap<CityId, City>,
        port: CityId,
        orders: &Orders,
        ahead: &[CityId],
    ) -> Result<()> {
        for (&resource, &target) in orders {
            let carried = self.hold.get(resource);
            let need = match target {
                Some(t) if t <= carried => continue,
                Some(t) => f64::from(t - carried),
                None => f64::INFINITY,
            };

            let lowest_ahead = lowest_price(cities, ahead, resource)?;
            let city = city_mut(cities, port)?;
            let price = city.price(resource);
            if price > lowest_ahead {
                continue;
            }

            let free = self.hold.free();
            if free == 0 {
                break;
            }
            let tons = need
                .min(f64::from(free))
                .min(city.excess_supply(resource))
                .min(affordable(self.gold, price))
                .floor() as u32;
            self.buy_from(city, resource, tons, price)?;
        }
        Ok(())
    }
}
