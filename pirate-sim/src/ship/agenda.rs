use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ResourceKind;

/// Resource to whole-ton target. `None` means "all" when selling and
/// "unbounded" when buying.
pub type Orders = BTreeMap<ResourceKind, Option<u32>>;

/// What to trade at one stop. A missing side falls back to default trading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOrders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell: Option<Orders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy: Option<Orders>,
}

impl StopOrders {
    pub fn selling(mut self, resource: ResourceKind, target: Option<u32>) -> Self {
        self.sell.get_or_insert_with(Orders::new).insert(resource, target);
        self
    }

    pub fn buying(mut self, resource: ResourceKind, target: Option<u32>) -> Self {
        self.buy.get_or_insert_with(Orders::new).insert(resource, target);
        self
    }
}

/// Per-stop instructions keyed by city name.
pub type Agenda = BTreeMap<String, StopOrders>;
