use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct CityId;
    pub struct ShipId;
}

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for CityId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl KeyToU64 for ShipId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

// ============================================================================
// Resources - The commodities that flow between cities
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Food,
    Goods,
    Luxuries,
    Cannons,
}

impl ResourceKind {
    pub const COUNT: usize = 4;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Food,
        ResourceKind::Goods,
        ResourceKind::Luxuries,
        ResourceKind::Cannons,
    ];

    /// Returns an iterator over all resources
    pub fn all() -> impl Iterator<Item = ResourceKind> {
        Self::ALL.into_iter()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Goods => "goods",
            ResourceKind::Luxuries => "luxuries",
            ResourceKind::Cannons => "cannons",
        }
    }
}

/// Closed per-resource table. One slot per `ResourceKind`, no missing keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceMap<T>([T; ResourceKind::COUNT]);

impl<T: Copy> ResourceMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; ResourceKind::COUNT])
    }

    pub fn from_fn(mut f: impl FnMut(ResourceKind) -> T) -> Self {
        Self(ResourceKind::ALL.map(&mut f))
    }

    pub fn get(&self, resource: ResourceKind) -> T {
        self.0[resource.index()]
    }

    pub fn set(&mut self, resource: ResourceKind, value: T) {
        self.0[resource.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, T)> + '_ {
        ResourceKind::all().map(move |r| (r, self.0[r.index()]))
    }

    pub fn to_vec(&self) -> Vec<(ResourceKind, T)> {
        self.iter().collect()
    }
}

impl ResourceMap<f64> {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl ResourceMap<u32> {
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl<T> Index<ResourceKind> for ResourceMap<T> {
    type Output = T;

    fn index(&self, resource: ResourceKind) -> &T {
        &self.0[resource.index()]
    }
}

impl<T> IndexMut<ResourceKind> for ResourceMap<T> {
    fn index_mut(&mut self, resource: ResourceKind) -> &mut T {
        &mut self.0[resource.index()]
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Position on the map, in km.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point2d) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Point2d) -> Point2d {
        Point2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2d {
    fn add_assign(&mut self, rhs: Point2d) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2d {
    type Output = Point2d;

    fn sub(self, rhs: Point2d) -> Point2d {
        Point2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2d {
    type Output = Point2d;

    fn mul(self, rhs: f64) -> Point2d {
        Point2d::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point2d {
    fn from((x, y): (f64, f64)) -> Self {
        Point2d::new(x, y)
    }
}
