// ============================================================================
// Report - Read-only picture of the world for rendering and logging
// ============================================================================

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::market::Market;
use crate::ship::{ShipState, ShipType};
use crate::simulation::Simulation;
use crate::types::{CityId, KeyToU64, Point2d, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct WorldReport {
    pub iteration: u64,
    pub cities: Vec<CityReport>,
    pub ships: Vec<ShipReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct CityReport {
    pub id: u64,
    pub name: String,
    pub location: Point2d,
    pub population: f64,
    pub capacity: f64,
    pub gold: f64,
    pub stock: Vec<(ResourceKind, f64)>,
    pub prices: Vec<(ResourceKind, f64)>,
    pub known_cities: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ShipReport {
    pub id: u64,
    pub name: String,
    pub class: ShipType,
    pub state: ShipState,
    pub position: Point2d,
    pub home: String,
    pub destination: String,
    /// Only resources actually carried
    pub cargo: Vec<(ResourceKind, u32)>,
    pub gold: f64,
}

impl Simulation {
    pub fn report(&self) -> WorldReport {
        let name_of = |id: CityId| {
            self.city(id)
                .map(|c| c.name.clone())
                .unwrap_or_default()
        };

        WorldReport {
            iteration: self.iteration(),
            cities: self
                .cities()
                .iter()
                .map(|(id, c)| CityReport {
                    id: id.to_u64(),
                    name: c.name.clone(),
                    location: c.location,
                    population: c.population(),
                    capacity: c.capacity(),
                    gold: c.gold,
                    stock: c.stock.to_vec(),
                    prices: ResourceKind::all().map(|r| (r, c.price(r))).collect(),
                    known_cities: c.information.len(),
                })
                .collect(),
            ships: self
                .ships()
                .iter()
                .map(|(id, s)| ShipReport {
                    id: id.to_u64(),
                    name: s.name().to_string(),
                    class: s.spec().ship_type,
                    state: s.state(),
                    position: s.position(),
                    home: name_of(s.home()),
                    destination: name_of(s.destination()),
                    cargo: s
                        .hold()
                        .contents()
                        .iter()
                        .filter(|(_, tons)| *tons > 0)
                        .collect(),
                    gold: s.gold(),
                })
                .collect(),
        }
    }
}
