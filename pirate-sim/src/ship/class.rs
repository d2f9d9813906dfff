// Ship catalog: class -> speed, hold, armament

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::SimError;

/// Slowest sailing speed, km per day
pub const MIN_SHIP_SPEED_IN_KM_PER_DAY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ShipSpeed {
    VerySlow,
    Slow,
    Moderate,
    Fast,
    VeryFast,
}

impl ShipSpeed {
    /// Distance covered per iteration, in km
    pub fn km_per_iteration(self) -> f64 {
        let multiple = match self {
            ShipSpeed::VerySlow => 1.0,
            ShipSpeed::Slow => 2.0,
            ShipSpeed::Moderate => 3.0,
            ShipSpeed::Fast => 4.0,
            ShipSpeed::VeryFast => 5.0,
        };
        multiple * MIN_SHIP_SPEED_IN_KM_PER_DAY * crate::resource::DAYS_PER_ITERATION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ShipType {
    // Pinnace class
    WarCanoe,
    Pinnace,
    MailRunner,
    // Sloop class
    Sloop,
    SloopOfWar,
    RoyalSloop,
    // Brig class
    Brigantine,
    Brig,
    BrigOfWar,
    // Barque class
    CoastalBarque,
    Barque,
    OceanBarque,
    // Fluyt class
    Fluyt,
    LargeFluyt,
    WestIndianman,
    // Merchantman class
    Merchantman,
    LargeMerchantman,
    EastIndianman,
    // Galleon class
    FastGalleon,
    WarGalleon,
    FlagGalleon,
    // Frigate class
    Frigate,
    LargeFrigate,
    ShipOfTheLine,
}

impl ShipType {
    pub const ALL: [ShipType; 24] = [
        ShipType::WarCanoe,
        ShipType::Pinnace,
        ShipType::MailRunner,
        ShipType::Sloop,
        ShipType::SloopOfWar,
        ShipType::RoyalSloop,
        ShipType::Brigantine,
        ShipType::Brig,
        ShipType::BrigOfWar,
        ShipType::CoastalBarque,
        ShipType::Barque,
        ShipType::OceanBarque,
        ShipType::Fluyt,
        ShipType::LargeFluyt,
        ShipType::WestIndianman,
        ShipType::Merchantman,
        ShipType::LargeMerchantman,
        ShipType::EastIndianman,
        ShipType::FastGalleon,
        ShipType::WarGalleon,
        ShipType::FlagGalleon,
        ShipType::Frigate,
        ShipType::LargeFrigate,
        ShipType::ShipOfTheLine,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ShipType::WarCanoe => "War Canoe",
            ShipType::Pinnace => "Pinnace",
            ShipType::MailRunner => "Mail Runner",
            ShipType::Sloop => "Sloop",
            ShipType::SloopOfWar => "Sloop of War",
            ShipType::RoyalSloop => "Royal Sloop",
            ShipType::Brigantine => "Brigantine",
            ShipType::Brig => "Brig",
            ShipType::BrigOfWar => "Brig of War",
            ShipType::CoastalBarque => "Coastal Barque",
            ShipType::Barque => "Barque",
            ShipType::OceanBarque => "Ocean Barque",
            ShipType::Fluyt => "Fluyt",
            ShipType::LargeFluyt => "Large Fluyt",
            ShipType::WestIndianman => "West Indianman",
            ShipType::Merchantman => "Merchantman",
            ShipType::LargeMerchantman => "Large Merchantman",
            ShipType::EastIndianman => "East Indianman",
            ShipType::FastGalleon => "Fast Galleon",
            ShipType::WarGalleon => "War Galleon",
            ShipType::FlagGalleon => "Flag Galleon",
            ShipType::Frigate => "Frigate",
            ShipType::LargeFrigate => "Large Frigate",
            ShipType::ShipOfTheLine => "Ship of the Line",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ShipType {
    type Err = SimError;

    /// Accepts the display name ("Sloop of War"), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShipType::ALL
            .into_iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SimError::UnknownShipClass(s.to_string()))
    }
}

/// Static performance figures for a ship class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub ship_type: ShipType,
    pub speed: ShipSpeed,
    pub max_cargo_hold_in_tons: f64,
    pub max_cannons: u32,
}

impl ShipSpec {
    pub fn from_type(ship_type: ShipType) -> Self {
        use ShipSpeed::*;
        let (speed, hold, cannons) = match ship_type {
            ShipType::WarCanoe => (VeryFast, 20.0, 8),
            ShipType::Pinnace => (VeryFast, 25.0, 10),
            ShipType::MailRunner => (VeryFast, 30.0, 12),
            ShipType::Sloop => (Fast, 40.0, 12),
            ShipType::SloopOfWar => (Fast, 50.0, 16),
            ShipType::RoyalSloop => (Fast, 60.0, 20),
            ShipType::Brigantine => (Moderate, 60.0, 20),
            ShipType::Brig => (Moderate, 80.0, 24),
            ShipType::BrigOfWar => (Moderate, 80.0, 32),
            ShipType::CoastalBarque => (Slow, 60.0, 12),
            ShipType::Barque => (Slow, 70.0, 16),
            ShipType::OceanBarque => (Slow, 80.0, 16),
            ShipType::Fluyt => (VerySlow, 80.0, 8),
            ShipType::LargeFluyt => (VerySlow, 100.0, 12),
            ShipType::WestIndianman => (VerySlow, 120.0, 16),
            ShipType::Merchantman => (Slow, 100.0, 16),
            ShipType::LargeMerchantman => (Slow, 120.0, 20),
            ShipType::EastIndianman => (Slow, 140.0, 20),
            ShipType::FastGalleon => (Slow, 80.0, 24),
            ShipType::WarGalleon => (Slow, 90.0, 32),
            ShipType::FlagGalleon => (Slow, 100.0, 40),
            ShipType::Frigate => (Fast, 80.0, 32),
            ShipType::LargeFrigate => (Fast, 90.0, 40),
            ShipType::ShipOfTheLine => (Fast, 100.0, 48),
        };
        Self {
            ship_type,
            speed,
            max_cargo_hold_in_tons: hold,
            max_cannons: cannons,
        }
    }

    /// Resolve a spec from a class name; unknown names are a configuration error.
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        name.parse().map(Self::from_type)
    }

    pub fn speed_km(&self) -> f64 {
        self.speed.km_per_iteration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_every_class_resolves() {
        for t in ShipType::ALL {
            let spec = ShipSpec::from_type(t);
            assert_eq!(spec.ship_type, t);
            assert!(spec.max_cargo_hold_in_tons > 0.0);
            assert!(spec.speed_km() >= MIN_SHIP_SPEED_IN_KM_PER_DAY);
        }
    }

    #[test]
    fn test_from_name_round_trips_display() {
        for t in ShipType::ALL {
            assert_eq!(ShipSpec::from_name(t.display_name()).unwrap().ship_type, t);
        }
        assert_eq!(
            ShipSpec::from_name("sloop of war").unwrap().ship_type,
            ShipType::SloopOfWar
        );
    }

    #[test]
    fn test_unknown_class_is_configuration_error() {
        let err = ShipSpec::from_name("Dinghy").unwrap_err();
        assert!(matches!(err, SimError::UnknownShipClass(ref n) if n == "Dinghy"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_sloop_figures() {
        let spec = ShipSpec::from_type(ShipType::Sloop);
        assert_eq!(spec.speed, ShipSpeed::Fast);
        assert_eq!(spec.speed_km(), 4.0);
        assert_eq!(spec.max_cargo_hold_in_tons, 40.0);
        assert_eq!(spec.max_cannons, 12);
    }
}
