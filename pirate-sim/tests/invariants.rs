//! Invariants that must hold at every iteration of a generated world.

use pirate_sim::resource::{PRICE_MAX, PRICE_MIN};
use pirate_sim::{Market, Point2d, ResourceKind, SimConfig, Simulation};

/// Default endowments on a map small enough for ships to finish round trips.
fn compact_config(seed: u64) -> SimConfig {
    let mut config = SimConfig::default().with_seed(seed);
    config.world.map_size = Point2d::new(120.0, 60.0);
    config.world.map_margin = Point2d::new(10.0, 5.0);
    config
}

fn check_world(sim: &Simulation, seed: u64) {
    let iteration = sim.iteration();
    for city in sim.cities().values() {
        assert_eq!(city.recency, iteration, "seed {seed}: {} out of step", city.name);
        assert!(city.gold >= 0.0, "seed {seed} iter {iteration}: {} gold {}", city.name, city.gold);
        assert!(
            city.capacity() >= city.base_capacity(),
            "seed {seed} iter {iteration}: {} capacity {} < base {}",
            city.name,
            city.capacity(),
            city.base_capacity()
        );
        assert!(city.population() > 0.0, "seed {seed}: {} is empty", city.name);
        for r in ResourceKind::all() {
            let price = city.price(r);
            assert!(
                (PRICE_MIN..=PRICE_MAX).contains(&price),
                "seed {seed} iter {iteration}: {} {r:?} price {price}",
                city.name
            );
            assert!(city.stock[r] >= 0.0, "seed {seed}: {} has negative {r:?}", city.name);
            assert!(city.excess_supply(r) >= 0.0);
        }
    }

    for ship in sim.ships().values() {
        let hold = ship.hold();
        assert!(
            f64::from(hold.total()) <= hold.capacity(),
            "seed {seed} iter {iteration}: {} carries {} of {}",
            ship.name(),
            hold.total(),
            hold.capacity()
        );
        assert!(ship.gold() >= 0.0, "seed {seed}: {} gold {}", ship.name(), ship.gold());
        assert_eq!(ship.route().last(), Some(&ship.home()));
    }
}

#[test]
fn invariant_world_stays_valid_over_long_runs() {
    for seed in 0..6 {
        let mut sim = Simulation::generate(compact_config(seed)).unwrap();
        check_world(&sim, seed);
        for _ in 0..300 {
            sim.step().unwrap();
            check_world(&sim, seed);
        }
    }
}

#[test]
fn invariant_gold_is_conserved_across_steps() {
    for seed in 0..6 {
        let mut sim = Simulation::generate(compact_config(seed)).unwrap();
        let initial = sim.total_gold();

        for _ in 0..300 {
            sim.step().unwrap();
            let now = sim.total_gold();
            assert!(
                (now - initial).abs() <= 1e-6 * initial.max(1.0),
                "seed {seed} iter {}: gold {initial} became {now}",
                sim.iteration()
            );
        }
    }
}

#[test]
fn invariant_ships_leave_home_and_come_back() {
    let mut sim = Simulation::generate(compact_config(3)).unwrap();
    let homes: Vec<_> = sim
        .ships()
        .values()
        .map(|s| sim.city(s.home()).unwrap().location)
        .collect();

    let mut left = vec![false; homes.len()];
    let mut returned = vec![false; homes.len()];
    for _ in 0..400 {
        sim.step().unwrap();
        for (i, ship) in sim.ships().values().enumerate() {
            let at_home = ship.position() == homes[i];
            if !at_home {
                left[i] = true;
            } else if left[i] {
                returned[i] = true;
            }
        }
    }

    assert!(left.iter().all(|&l| l), "some ship never sailed");
    assert!(returned.iter().all(|&r| r), "some ship never made it home");
}
