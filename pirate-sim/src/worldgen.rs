// ============================================================================
// World generation - Cities on an ellipse, one to three ships each
// ============================================================================

use std::f64::consts::TAU;

use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::city::City;
use crate::config::{Bounds, WorldGenConfig};
use crate::ship::{Agenda, ShipType};
use crate::types::{Point2d, ResourceKind};

pub const CITY_NAMES: &[&str] = &[
    "Baracoa",
    "Barranquilla",
    "Basseterre",
    "Belize City",
    "Bluefields",
    "Bridgetown",
    "Caibarién",
    "Camagüey",
    "Cárdenas",
    "Cartagena",
    "Castries",
    "Charles Town",
    "Charlotte Amalie",
    "Cienfuegos",
    "Cockburn Town",
    "Colón",
    "Consolación del Sur",
    "Cumaná",
    "Florida",
    "Fort-de-France",
    "George Town",
    "Guantánamo",
    "Hamilton",
    "Havana",
    "Holguín",
    "Jatibonico",
    "Kingston",
    "Kingstown",
    "Kralendijk",
    "La Ceiba",
    "La Guaira",
    "Las Tunas",
    "Livingston",
    "Manzanillo",
    "Maracaibo",
    "Matanzas",
    "Morón",
    "Nassau",
    "Nuevitas",
    "Oranjestad",
    "Palma Soriano",
    "Panama City",
    "Philipsburg",
    "Pinar del Río",
    "Pointe-à-Pitre",
    "Ponce",
    "Port of Spain",
    "Port Royal",
    "Port-au-Prince",
    "Providencia",
    "Puerto Barrios",
    "Puerto Cabezas",
    "Puerto Cortés",
    "Puerto La Cruz",
    "Remedios",
    "Riohacha",
    "Road Town",
    "Roseau",
    "San Andrés",
    "San Juan",
    "San Pedro Sula",
    "Santa Clara",
    "Santa Marta",
    "Santiago de Cuba",
    "Santo Domingo",
    "Scarborough",
    "St. George's",
    "St. John's",
    "The Valley",
    "Tortuga",
    "Trinidad",
    "Victoria de Las Tunas",
    "Willemstad",
];

pub const SHIP_NAMES: &[&str] = &[
    // French
    "Le Vengeur",
    "La Sirène",
    "Le Dragon",
    "La Belle Étoile",
    "Le Corsaire",
    "La Perle Noire",
    "Le Fantôme",
    "La Fleur de Mer",
    "Le Tigre",
    "La Reine des Mers",
    "Le Vent Rapide",
    "La Licorne",
    "Le Soleil Levant",
    "La Tempête",
    "Le Dauphin",
    "La Fortune",
    "Le Lion d'Or",
    "La Victoire",
    "Le Phénix",
    "La Liberté",
    // Dutch
    "De Vliegende Hollander",
    "De Gouden Leeuw",
    "De Zeemeeuw",
    "De Dappere Zeeman",
    "De Stormvogel",
    "De Zilveren Maan",
    "De Rode Draak",
    "De Vrijheid",
    "De Zeeslang",
    "De Noorderwind",
    "De Blauwe Golven",
    "De Drie Gebroeders",
    "De Ster van de Zee",
    "De Vurige Haas",
    "De Zwarte Roos",
    "De Eendracht",
    "De Gouden Zon",
    "De Zeehond",
    "De Vliegende Vis",
    "De Trots van Holland",
    // Spanish
    "El León de Oro",
    "La Santa María",
    "El Dragón de Fuego",
    "La Estrella del Mar",
    "El Corsario Negro",
    "La Perla Negra",
    "El Rayo Veloz",
    "La Fortuna",
    "El Águila Real",
    "La Sirena del Caribe",
    "El Tesoro Perdido",
    "La Victoria",
    "El Halcón del Mar",
    "La Luna Nueva",
    "El Tigre Feroz",
    "La Dama del Mar",
    "El Sol Brillante",
    "La Tormenta",
    "El Barco Fantasma",
    "La Libertad",
    // English
    "The Black Pearl",
    "The Royal Fortune",
    "The Queen Anne's Revenge",
    "The Adventure Galley",
    "The Fancy",
    "The Whydah",
    "The Golden Hind",
    "The Revenge",
    "The Victory",
    "The Defiant",
    "The Swift",
    "The Resolution",
    "The Endeavour",
    "The Discovery",
    "The Triumph",
    "The Sovereign",
    "The Merlin",
    "The Phoenix",
    "The Liberty",
    "The Sea Hawk",
];

/// A ship waiting to be registered: indices refer to [`WorldPlan::cities`].
#[derive(Debug, Clone)]
pub struct ShipPlan {
    pub name: String,
    pub ship_type: ShipType,
    pub home: usize,
    pub route: Vec<usize>,
    pub agenda: Agenda,
}

#[derive(Debug, Clone)]
pub struct WorldPlan {
    pub cities: Vec<City>,
    pub ships: Vec<ShipPlan>,
}

/// `n` equally spaced points on the ellipse inscribed in the map margin.
pub fn city_locations(config: &WorldGenConfig, n: usize) -> Vec<Point2d> {
    let inner = config.map_size - config.map_margin * 2.0;
    let (radius_x, radius_y) = (inner.x / 2.0, inner.y / 2.0);
    let center = inner * 0.5 + config.map_margin;
    let step = TAU / n as f64;

    (0..n)
        .map(|i| {
            let theta = step * i as f64;
            Point2d::new(
                center.x + radius_x * theta.cos(),
                center.y + radius_y * theta.sin(),
            )
        })
        .collect()
}

fn draw<R: Rng>(rng: &mut R, bounds: Bounds<u32>) -> f64 {
    f64::from(rng.random_range(bounds.min..=bounds.max))
}

/// Take names in shuffled order; once the pool runs dry, reuse it with a
/// numeric suffix so names stay unique.
fn unique_names<R: Rng>(rng: &mut R, pool: &[&str], count: usize) -> Vec<String> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    (0..count)
        .map(|i| {
            let base = shuffled[i % shuffled.len()];
            match i / shuffled.len() {
                0 => base.to_string(),
                round => format!("{base} {}", round + 1),
            }
        })
        .collect()
}

/// Draw a whole world from `rng`. The config must already be validated.
pub fn generate<R: Rng>(config: &WorldGenConfig, rng: &mut R) -> WorldPlan {
    let n = config.city_count;
    let names = unique_names(rng, CITY_NAMES, n);

    let cities: Vec<City> = names
        .into_iter()
        .zip(city_locations(config, n))
        .map(|(name, location)| {
            City::new(name, location)
                .with_base_population(draw(rng, config.population))
                .with_gold(draw(rng, config.gold))
                .with_stock(ResourceKind::Food, draw(rng, config.food))
                .with_stock(ResourceKind::Goods, draw(rng, config.goods))
                .with_stock(ResourceKind::Luxuries, draw(rng, config.luxuries))
                .with_stock(ResourceKind::Cannons, draw(rng, config.cannons))
        })
        .collect();

    let mut fleets = Vec::with_capacity(n);
    for home in 0..n {
        let count = rng.random_range(config.ships_per_city.min..=config.ships_per_city.max) as usize;
        let peers: Vec<usize> = (0..n).filter(|&c| c != home).collect();
        let picks = index::sample(rng, peers.len(), count.min(peers.len()));
        fleets.push((home, picks.into_iter().map(|i| peers[i]).collect::<Vec<_>>()));
    }

    let total: usize = fleets.iter().map(|(_, destinations)| destinations.len()).sum();
    let mut ship_names = unique_names(rng, SHIP_NAMES, total).into_iter();

    let mut ships = Vec::with_capacity(total);
    for (home, destinations) in fleets {
        for (destination, name) in destinations.into_iter().zip(ship_names.by_ref()) {
            let ship_type = ShipType::ALL[rng.random_range(0..ShipType::ALL.len())];
            ships.push(ShipPlan {
                name,
                ship_type,
                home,
                route: vec![destination],
                agenda: Agenda::new(),
            });
        }
    }

    WorldPlan { cities, ships }
}
