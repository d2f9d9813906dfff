//! Recorded tracing events agree with the state changes they describe.
#![cfg(feature = "instrument")]

use instrument::Recorder;
use polars::prelude::*;
use pirate_sim::{Agenda, City, Point2d, ResourceKind, SimConfig, Simulation};

fn small_world() -> (Simulation, pirate_sim::ShipId, pirate_sim::CityId) {
    let mut sim = Simulation::new(SimConfig::default().with_seed(3)).unwrap();
    sim.add_city(
        City::new("Home", (0.0, 0.0))
            .with_base_population(300.0)
            .with_gold(2_000.0)
            .with_stock(ResourceKind::Food, 1_500.0)
            .with_stock(ResourceKind::Cannons, 60.0),
    )
    .unwrap();
    let port = sim
        .add_city(
            City::new("Port", (24.0, 0.0))
                .with_base_population(400.0)
                .with_gold(4_000.0)
                .with_stock(ResourceKind::Goods, 800.0)
                .with_stock(ResourceKind::Luxuries, 300.0),
        )
        .unwrap();
    let ship = sim
        .add_ship_by_names("De Zeemeeuw", "Brig", "Home", &["Port"], Agenda::new())
        .unwrap();
    (sim, ship, port)
}

/// Sum of `field` over the rows matching `predicate`; zero for an empty table.
fn sum_where(df: &DataFrame, predicate: Expr, field: &str) -> f64 {
    if df.height() == 0 {
        return 0.0;
    }
    let out = df
        .clone()
        .lazy()
        .filter(predicate)
        .select([col(field).cast(DataType::Float64).sum()])
        .collect()
        .unwrap();
    out.column(field).unwrap().f64().unwrap().get(0).unwrap_or(0.0)
}

fn arrived_abroad(recorder: &Recorder) -> bool {
    let arrivals = recorder.frame("arrival").unwrap();
    arrivals.height() > 0
        && arrivals
            .clone()
            .lazy()
            .filter(col("home").eq(lit(false)))
            .collect()
            .unwrap()
            .height()
            > 0
}

#[test]
fn trade_events_reconcile_with_cargo_and_gold() {
    let (mut sim, ship, port) = small_world();

    for _ in 0..200 {
        let before = sim.ship(ship).unwrap().hold().contents();
        let gold_before = sim.ship(ship).unwrap().gold();

        let (result, recorder) = instrument::record(|| sim.step());
        result.unwrap();
        if !arrived_abroad(&recorder) {
            continue;
        }

        let after = sim.ship(ship).unwrap().hold().contents();
        let trades = recorder.frame("trade").unwrap();
        assert!(trades.height() > 0, "arrived without trading");
        for r in ResourceKind::all() {
            let of = |side: &str| col("resource").eq(lit(r.name())).and(col("side").eq(lit(side)));
            let bought = sum_where(&trades, of("buy"), "tons");
            let sold = sum_where(&trades, of("sell"), "tons");
            assert_eq!(
                f64::from(after[r]) - f64::from(before[r]),
                bought - sold,
                "{r:?} cargo does not match the trade log"
            );
        }

        let earned = sum_where(&trades, col("side").eq(lit("sell")), "gold");
        let paid = sum_where(&trades, col("side").eq(lit("buy")), "gold");
        let intel = recorder.frame("intel").unwrap();
        let fees = sum_where(&intel, col("buyer").eq(lit("Port")), "fee");
        let gold_after = sim.ship(ship).unwrap().gold();
        assert!(
            (gold_after - gold_before - (earned - paid + fees)).abs() < 1e-6,
            "ship gold moved {} but the log says {}",
            gold_after - gold_before,
            earned - paid + fees
        );

        assert_eq!(recorder.table("city_step").len(), sim.cities().len());
        assert_eq!(sim.ship(ship).unwrap().position(), sim.city(port).unwrap().location);
        return;
    }
    panic!("ship never reached the port");
}

#[test]
fn trade_rows_price_every_ton() {
    let mut config = SimConfig::default().with_seed(12);
    config.world.map_size = Point2d::new(120.0, 60.0);
    config.world.map_margin = Point2d::new(10.0, 5.0);
    let mut sim = Simulation::generate(config).unwrap();

    let (result, recorder) = instrument::record(|| sim.run(250));
    result.unwrap();

    let trades = recorder.frame("trade").unwrap();
    assert!(trades.height() > 0);
    let numbers = |name: &str| -> Vec<f64> {
        let column = trades.column(name).unwrap().cast(&DataType::Float64).unwrap();
        column.f64().unwrap().into_no_null_iter().collect()
    };
    let (tons, price, gold) = (numbers("tons"), numbers("price"), numbers("gold"));
    for ((tons, price), gold) in tons.iter().zip(&price).zip(&gold) {
        assert!(*tons >= 1.0, "zero-ton trade recorded at {price}");
        assert!((gold - tons * price).abs() <= 1e-9 * gold.max(1.0), "{tons}t at {price} for {gold}");
    }
    assert_eq!(tons.len(), trades.height(), "every trade row carries its tons");
    assert_eq!(recorder.table("city_step").len(), 250 * sim.cities().len());
}
