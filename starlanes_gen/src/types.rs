// Core types shared across the generator.
//
// Defines world-space coordinates (`Coordinate`), star systems and the
// Oikumene/Beyond split (`StarSystem`, `Region`, `OikumeneSystem`), and the
// canonical `Route` produced by the route builder. Everything here is an
// immutable value once created: a generation pass builds these and nothing
// mutates them afterwards.
//
// **Critical constraint: determinism.** Attribute maps use `BTreeMap` so
// serialized records have a fixed key order. No `HashMap` in any type that
// reaches disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in world space. One unit is one cost-grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance, computed in `i64`.
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Star systems
// ---------------------------------------------------------------------------

/// Which part of the galaxy a system belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// The inhabited core. Only these systems get trade routes.
    Oikumene,
    /// Peripheral, less-settled space.
    Beyond,
}

/// A cataloged star system.
///
/// `id` and position are fixed at catalog time. `attributes` is the slot the
/// narrative/economic stage fills in (tech level, population, trade codes);
/// the generator itself never reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub region: Region,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl StarSystem {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }

    pub fn is_oikumene(&self) -> bool {
        self.region == Region::Oikumene
    }

    /// The identity-and-position view the route builder works on.
    pub fn as_oikumene(&self) -> OikumeneSystem {
        OikumeneSystem {
            id: self.id.clone(),
            x: self.x,
            y: self.y,
        }
    }
}

/// The subset of a star system the route builder needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OikumeneSystem {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

impl OikumeneSystem {
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// How a route came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// A pair within `max_range` of each other.
    Direct,
    /// Added to merge two otherwise-disconnected components.
    Bridge,
}

/// A traversable route between two systems.
///
/// Invariant: `origin_id < destination_id` lexicographically, and `path`
/// runs from the origin's position to the destination's position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin_id: String,
    pub destination_id: String,
    pub cost: u32,
    pub path: Vec<Coordinate>,
    pub kind: RouteKind,
}

impl Route {
    /// The unordered pair key: `min(a, b) + "|" + max(a, b)`.
    pub fn pair_key(a: &str, b: &str) -> String {
        if a <= b {
            format!("{a}|{b}")
        } else {
            format!("{b}|{a}")
        }
    }

    pub fn key(&self) -> String {
        Self::pair_key(&self.origin_id, &self.destination_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_helpers() {
        let a = Coordinate::new(-3, 4);
        let b = Coordinate::new(0, 0);
        assert_eq!(a.distance_sq(b), 25);
        assert_eq!(a.chebyshev_distance(b), 4);
        assert_eq!(b.chebyshev_distance(b), 0);
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(Route::pair_key("b", "a"), "a|b");
        assert_eq!(Route::pair_key("a", "b"), "a|b");
    }

    #[test]
    fn region_serializes_lowercase() {
        let json = serde_json::to_string(&Region::Oikumene).unwrap();
        assert_eq!(json, "\"oikumene\"");
    }
}
