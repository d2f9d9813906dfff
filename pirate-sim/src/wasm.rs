// ============================================================================
// WASM API - Browser facade over Simulation
// ============================================================================

use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::report::WorldReport;
use crate::ship::Agenda;
use crate::simulation::Simulation;

fn js_error(err: SimError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Generate a world from a JSON `SimConfig`; `"{}"` gives the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSimulation, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let config = SimConfig::from_json(config_json).map_err(js_error)?;
        let sim = Simulation::generate(config).map_err(js_error)?;
        Ok(Self { sim })
    }

    /// Default world with a chosen seed
    #[wasm_bindgen]
    pub fn with_seed(seed: u64) -> Result<WasmSimulation, JsValue> {
        console_error_panic_hook::set_once();

        let sim = Simulation::generate(SimConfig::default().with_seed(seed)).map_err(js_error)?;
        Ok(Self { sim })
    }

    /// Advance the simulation by one iteration
    #[wasm_bindgen]
    pub fn advance_tick(&mut self) -> Result<(), JsValue> {
        self.sim.step().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.sim.iteration()
    }

    /// Get a snapshot of the current state for rendering
    #[wasm_bindgen]
    pub fn get_state_snapshot(&self) -> WorldReport {
        self.sim.report()
    }

    /// Replace a ship's agenda with a JS object shaped like
    /// `{ "Nassau": { "sell": { "food": null }, "buy": { "goods": 20 } } }`.
    #[wasm_bindgen]
    pub fn set_agenda(&mut self, ship: &str, agenda: JsValue) -> Result<(), JsValue> {
        let agenda: Agenda = serde_wasm_bindgen::from_value(agenda)?;
        self.sim.set_agenda(ship, agenda).map_err(js_error)
    }
}
