// Quantized traversal-cost grid and the composer that builds it.
//
// `CostMap` is a flat row-major `Vec<u8>` anchored at a world-space origin:
// `index = (y - grid_origin_y) * width + (x - grid_origin_x)`. Every byte
// lies in `[min_cost, max_cost]`, and `min_cost >= 1`, so every step of a
// path has positive cost. The map is built once per run and only read
// afterwards (the pathfinder borrows it immutably).
//
// Composition (`compose`) runs in a fixed order, all draws from the
// cost-map PRNG stream (`"{seed}:costmap"`):
//   1. Shuffle the base noise layer's permutation table.
//   2. Shuffle the wall noise layer's permutation table.
//   3. Sample both layers over the grid (no draws).
//   4. Seed the wall grid, one `next_f64()` per cell in row-major order.
//   5. Run the cellular automaton (no draws).
//   6. Combine, normalize by the cost ceiling, quantize `uint8_linear`.
//
// See also: `noise.rs`, `automata.rs`, `pathfinding.rs` (the consumer),
// `config.rs` for `CostMapConfig` / `GridRect`.
//
// **Critical constraint: determinism.** The draw order above is part of the
// output format: changing it changes every generated `costmap.bin`.

use crate::automata::{CaRule, seed_walls};
use crate::config::{
    CaConfig, CostMapConfig, GridRect, PerlinConfig, validate_cost_range, validate_grid_size,
};
use crate::error::{ConfigError, CostMapError};
use crate::noise::PerlinNoise;
use crate::types::{Coordinate, StarSystem};
use serde::{Deserialize, Serialize};
use starlanes_prng::GameRng;

/// Marker for the linear uint8 cost encoding.
pub const QUANTIZATION_KIND: &str = "uint8_linear";

/// How grid bytes map back to costs and world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantization {
    pub min_cost: u8,
    pub max_cost: u8,
    pub grid_origin_x: i32,
    pub grid_origin_y: i32,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl Quantization {
    pub fn for_rect(rect: GridRect, min_cost: u8, max_cost: u8) -> Self {
        Self {
            min_cost,
            max_cost,
            grid_origin_x: rect.origin_x,
            grid_origin_y: rect.origin_y,
            grid_width: rect.width,
            grid_height: rect.height,
        }
    }

    /// Map a normalized cost in `[0, 1]` to a byte in `[min_cost, max_cost]`.
    pub fn quantize(&self, t: f64) -> u8 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let span = f64::from(self.max_cost - self.min_cost);
        let step = (t * span).round() as u8;
        self.min_cost + step.min(self.max_cost - self.min_cost)
    }
}

/// An immutable traversal-cost grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    quantization: Quantization,
}

impl CostMap {
    /// Wrap a buffer, checking its length and every byte against the
    /// quantization range.
    pub fn new(data: Vec<u8>, quantization: Quantization) -> Result<Self, CostMapError> {
        validate_cost_range(quantization.min_cost, quantization.max_cost)?;
        let width = quantization.grid_width;
        let height = quantization.grid_height;
        validate_grid_size(i64::from(width), i64::from(height))?;
        if data.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(CostMapError::LengthMismatch {
                actual: data.len(),
                width,
                height,
            });
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|&(_, &v)| v < quantization.min_cost || v > quantization.max_cost)
        {
            return Err(CostMapError::CostOutOfRange {
                index,
                value,
                min_cost: quantization.min_cost,
                max_cost: quantization.max_cost,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            quantization,
        })
    }

    /// A grid where every cell costs `min_cost`.
    pub fn uniform(quantization: Quantization) -> Result<Self, CostMapError> {
        let len = quantization.grid_width as usize * quantization.grid_height as usize;
        Self::new(vec![quantization.min_cost; len], quantization)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn quantization(&self) -> &Quantization {
        &self.quantization
    }

    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.quantization.grid_origin_x, self.quantization.grid_origin_y)
    }

    /// Flat index of a world coordinate, or `None` outside the grid.
    pub fn index_of(&self, c: Coordinate) -> Option<usize> {
        let gx = i64::from(c.x) - i64::from(self.quantization.grid_origin_x);
        let gy = i64::from(c.y) - i64::from(self.quantization.grid_origin_y);
        if gx < 0 || gy < 0 || gx >= i64::from(self.width) || gy >= i64::from(self.height) {
            return None;
        }
        Some(gy as usize * self.width as usize + gx as usize)
    }

    /// World coordinate of a flat index. `index` must be in bounds.
    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        let w = self.width as usize;
        Coordinate::new(
            self.quantization.grid_origin_x + (index % w) as i32,
            self.quantization.grid_origin_y + (index / w) as i32,
        )
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.index_of(c).is_some()
    }

    pub fn cost_at(&self, c: Coordinate) -> Option<u8> {
        self.index_of(c).map(|i| self.data[i])
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// The grid rectangle for a run: the configured `grid`, or the systems'
/// bounding box expanded by `padding` on every side.
pub fn grid_extent(config: &CostMapConfig, systems: &[StarSystem]) -> Result<GridRect, ConfigError> {
    if let Some(rect) = config.grid {
        validate_grid_size(i64::from(rect.width), i64::from(rect.height))?;
        return Ok(rect);
    }

    let pad = i64::from(config.padding.max(0));
    let (min_x, min_y, max_x, max_y) = systems.iter().fold(
        (i64::MAX, i64::MAX, i64::MIN, i64::MIN),
        |(min_x, min_y, max_x, max_y), s| {
            let (x, y) = (i64::from(s.x), i64::from(s.y));
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        },
    );
    let (min_x, min_y, max_x, max_y) = if systems.is_empty() {
        (0, 0, 0, 0)
    } else {
        (min_x, min_y, max_x, max_y)
    };

    let origin_x = min_x - pad;
    let origin_y = min_y - pad;
    let width = max_x + pad - origin_x + 1;
    let height = max_y + pad - origin_y + 1;
    validate_grid_size(width, height)?;

    let to_i32 = |v: i64| {
        i32::try_from(v).map_err(|_| ConfigError::GridTooLarge {
            width: width as u64,
            height: height as u64,
            max_cells: crate::config::MAX_GRID_CELLS,
        })
    };
    Ok(GridRect {
        origin_x: to_i32(origin_x)?,
        origin_y: to_i32(origin_y)?,
        width: width as u32,
        height: height as u32,
    })
}

/// Build the cost grid over `rect`, consuming `rng` in the fixed order
/// documented at the top of this file.
pub fn compose(
    rect: GridRect,
    cost: &CostMapConfig,
    perlin: &PerlinConfig,
    ca: &CaConfig,
    rng: &mut GameRng,
) -> Result<CostMap, CostMapError> {
    validate_cost_range(cost.min_cost, cost.max_cost)?;
    validate_grid_size(i64::from(rect.width), i64::from(rect.height))?;
    let rule = CaRule::parse(&ca.rule)?;

    let width = rect.width as usize;
    let height = rect.height as usize;

    let base_layer = PerlinNoise::new(rng);
    let wall_layer = PerlinNoise::new(rng);
    let base = base_layer.sample_grid(&perlin.base, rect.origin_x, rect.origin_y, width, height);
    let wall = wall_layer.sample_grid(&perlin.wall, rect.origin_x, rect.origin_y, width, height);

    let seeded = seed_walls(&wall, ca.fill_probability, rng);
    let walls = rule.run(seeded, width, height, ca.iterations);
    let wall_count = walls.iter().filter(|w| **w).count();

    let quantization = Quantization::for_rect(rect, cost.min_cost, cost.max_cost);
    let ceiling = cost.cost_ceiling();
    let data = (0..width * height)
        .map(|i| {
            let mut raw = cost.base_cost + cost.base_noise_weight * base[i];
            if walls[i] {
                raw += cost.wall_cost + cost.wall_noise_weight * wall[i];
            }
            let t = if ceiling > 0.0 { raw / ceiling } else { 0.0 };
            quantization.quantize(t)
        })
        .collect();

    tracing::debug!(
        width,
        height,
        wall_cells = wall_count,
        "composed cost map"
    );
    CostMap::new(data, quantization)
}
