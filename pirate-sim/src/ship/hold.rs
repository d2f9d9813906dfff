use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::{ResourceKind, ResourceMap};

/// Cargo hold measured in whole tons, bounded by the ship's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hold {
    cargo: ResourceMap<u32>,
    capacity: f64,
}

impl Hold {
    pub fn new(capacity: f64) -> Self {
        Self {
            cargo: ResourceMap::splat(0),
            capacity,
        }
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.cargo[resource]
    }

    pub fn contents(&self) -> ResourceMap<u32> {
        self.cargo
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn total(&self) -> u32 {
        self.cargo.total()
    }

    /// Whole tons that still fit
    pub fn free(&self) -> u32 {
        let free = self.capacity - f64::from(self.total());
        if free <= 0.0 { 0 } else { free.floor() as u32 }
    }

    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    pub fn load(&mut self, ship: &str, resource: ResourceKind, tons: u32) -> Result<()> {
        if tons > self.free() {
            return Err(SimError::HoldOverflow {
                ship: ship.to_string(),
                resource,
                tons,
                free: self.capacity - f64::from(self.total()),
            });
        }
        self.cargo[resource] += tons;
        Ok(())
    }

    pub fn unload(&mut self, ship: &str, resource: ResourceKind, tons: u32) -> Result<()> {
        let held = self.cargo[resource];
        if tons > held {
            return Err(SimError::Overdraw {
                holder: ship.to_string(),
                what: resource.name(),
                requested: f64::from(tons),
                available: f64::from(held),
            });
        }
        self.cargo[resource] = held - tons;
        Ok(())
    }

    /// Empty the hold, returning what was in it.
    pub fn take_all(&mut self) -> ResourceMap<u32> {
        std::mem::replace(&mut self.cargo, ResourceMap::splat(0))
    }

    /// Sum of per-resource absolute differences against an earlier manifest.
    pub fn tons_moved_since(&self, before: &ResourceMap<u32>) -> u32 {
        ResourceKind::all()
            .map(|r| self.cargo[r].abs_diff(before[r]))
            .sum()
    }
}
