// starlanes_gen: pure Rust starfield and trade-route generation library.
//
// Builds a whole universe from one `UniverseConfig`: a spiral starfield, a
// catalog of star systems split into the inhabited Oikumene and the
// Beyond, a quantized traversal-cost grid, and a connected network of
// trade routes across the Oikumene. No I/O, no async, no threads; the
// `starlanes_output` crate writes the result to disk.
//
// Module overview:
// - `universe.rs`:     `generate_universe`, the top-level pipeline.
// - `config.rs`:       UniverseConfig and every per-stage sub-config.
// - `types.rs`:        Coordinate, StarSystem, Region, Route.
// - `starfield.rs`:    Lazy three-level spiral starfield iterator.
// - `catalog.rs`:      Id assignment, duplicate dropping, Oikumene selection.
// - `noise.rs`:        Seeded Perlin noise with fractal octaves.
// - `automata.rs`:     Life-like cellular automata (B/S rules) for walls.
// - `cost_map.rs`:     CostMap (uint8_linear grid) and its composer.
// - `spatial_hash.rs`: Bucket grid for broad-phase radius queries.
// - `pathfinding.rs`:  8-connected A* over the cost grid.
// - `routes.rs`:       Route builder: candidates, search, bridging.
// - `stats.rs`:        GenerationStats summary.
// - `error.rs`:        ConfigError, CostMapError, RouteError, GenerationError.
// - `prng`:            Re-exported from `starlanes_prng` (xoshiro256++).
//
// **Critical constraint: determinism.** Generation is a pure function of
// the config. All randomness comes from two seeded xoshiro256++ streams
// (`seed` for the starfield, `"{seed}:costmap"` for the cost map), consumed
// in a fixed order on one thread. No `HashMap` iteration order leaks into
// output, no system time, no OS entropy.

pub mod automata;
pub mod catalog;
pub mod config;
pub mod cost_map;
pub mod error;
pub mod noise;
pub mod pathfinding;
pub use starlanes_prng as prng;
pub mod routes;
pub mod spatial_hash;
pub mod starfield;
pub mod stats;
pub mod types;
pub mod universe;

pub use config::UniverseConfig;
pub use error::GenerationError;
pub use universe::{Universe, generate_universe};
