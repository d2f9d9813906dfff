//! Pirate cities: a deterministic, turn-based trading simulation.
//!
//! Cities consume, grow and price four resources from their stock. Ships
//! carry surplus from their home port along a route, trade at each stop and
//! bring gold, cargo and news back home.

mod city;
pub mod config;
mod error;
mod market;
mod report;
pub mod resource;
mod ship;
mod simulation;
mod types;
mod wasm;
pub mod worldgen;

pub use city::{CITY_INFORMATION_PRICE_IN_GOLD, City, FrozenView};
pub use config::{Bounds, SimConfig, TradeRules, WorldGenConfig};
pub use error::{ErrorKind, Result, SimError};
pub use market::{CitySnapshot, Information, Market, Observation};
pub use report::{CityReport, ShipReport, WorldReport};
pub use ship::{
    Agenda, Hold, MIN_SHIP_SPEED_IN_KM_PER_DAY, Orders, Ship, ShipSpec, ShipSpeed, ShipState,
    ShipType, StopOrders,
};
pub use simulation::Simulation;
pub use types::{CityId, KeyToU64, Point2d, ResourceKind, ResourceMap, ShipId};
pub use wasm::WasmSimulation;
