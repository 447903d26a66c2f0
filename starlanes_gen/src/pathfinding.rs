// A* pathfinding over the quantized cost grid.
//
// The grid is 8-connected. Entering a cell costs that cell's quantized
// value; the start cell is free. Costs are integers, accumulated in `u64`
// and reported as `u32` (saturating). The heuristic is Chebyshev distance
// times `min_cost`: every king move enters exactly one cell costing at
// least `min_cost`, so it never overestimates.
//
// Uses a `BinaryHeap` as a min-heap via reversed ordering, with per-cell
// scores in flat `Vec`s (no `HashMap`). Scores are stored only for the
// search window, so a short windowed search on a huge grid allocates
// proportionally to the window, not the grid.
//
// See also: `cost_map.rs` for the grid being searched, `routes.rs` which
// runs one search per candidate pair and per bridge attempt.
//
// **Critical constraint: determinism.** A search is a pure function of the
// grid and its endpoints. The open set is ordered by `f`, then `h`, then
// global cell index, and neighbors are expanded in the fixed order N, E, S,
// W, NE, SE, SW, NW, so equal-cost alternatives always resolve the same way.

use crate::cost_map::CostMap;
use crate::types::Coordinate;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Neighbor offsets in expansion order: N, E, S, W, NE, SE, SW, NW.
const NEIGHBORS: [(i64, i64); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    /// World coordinates from origin to destination (inclusive).
    pub path: Vec<Coordinate>,
    /// Sum of the costs of every entered cell.
    pub total_cost: u32,
}

/// Entry in the open set (min-heap via reversed ordering).
#[derive(PartialEq, Eq)]
struct OpenEntry {
    f: u64,
    h: u64,
    /// Global grid index; the final tie-breaker.
    cell: usize,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the smallest (f, h, cell) is the "greatest".
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

/// Inclusive rectangle of grid (not world) coordinates a search may touch.
#[derive(Clone, Copy, Debug)]
struct Window {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl Window {
    fn width(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    fn height(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }

    fn contains(&self, gx: i64, gy: i64) -> bool {
        gx >= self.min_x && gx <= self.max_x && gy >= self.min_y && gy <= self.max_y
    }

    fn local(&self, gx: i64, gy: i64) -> usize {
        (gy - self.min_y) as usize * self.width() + (gx - self.min_x) as usize
    }
}

/// Searches a borrowed `CostMap`. Cheap to construct; holds no buffers
/// between searches.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder<'a> {
    map: &'a CostMap,
    impassable: Option<u8>,
}

impl<'a> Pathfinder<'a> {
    pub fn new(map: &'a CostMap) -> Self {
        Self {
            map,
            impassable: None,
        }
    }

    /// Never enter cells whose cost is at or above `threshold` (the two
    /// endpoints excepted).
    pub fn with_impassable(mut self, threshold: Option<u8>) -> Self {
        self.impassable = threshold;
        self
    }

    /// Unbounded search over the whole grid.
    ///
    /// Returns `None` when either endpoint lies outside the grid or no path
    /// exists.
    pub fn find_path(&self, origin: Coordinate, destination: Coordinate) -> Option<PathResult> {
        let window = Window {
            min_x: 0,
            min_y: 0,
            max_x: i64::from(self.map.width()) - 1,
            max_y: i64::from(self.map.height()) - 1,
        };
        self.search(origin, destination, window)
    }

    /// Like `find_path`, but only expands cells inside the endpoints'
    /// bounding box padded by `margin` cells on every side.
    pub fn find_path_within(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        margin: u32,
    ) -> Option<PathResult> {
        let (ox, oy) = self.grid_xy(origin)?;
        let (dx, dy) = self.grid_xy(destination)?;
        let m = i64::from(margin);
        let window = Window {
            min_x: (ox.min(dx) - m).max(0),
            min_y: (oy.min(dy) - m).max(0),
            max_x: (ox.max(dx) + m).min(i64::from(self.map.width()) - 1),
            max_y: (oy.max(dy) + m).min(i64::from(self.map.height()) - 1),
        };
        self.search(origin, destination, window)
    }

    fn grid_xy(&self, c: Coordinate) -> Option<(i64, i64)> {
        self.map.index_of(c)?;
        let origin = self.map.origin();
        Some((
            i64::from(c.x) - i64::from(origin.x),
            i64::from(c.y) - i64::from(origin.y),
        ))
    }

    fn search(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        window: Window,
    ) -> Option<PathResult> {
        let (sx, sy) = self.grid_xy(origin)?;
        let (gx, gy) = self.grid_xy(destination)?;
        if origin == destination {
            return Some(PathResult {
                path: vec![origin],
                total_cost: 0,
            });
        }

        let data = self.map.data();
        let grid_width = self.map.width() as usize;
        let global = |x: i64, y: i64| y as usize * grid_width + x as usize;
        let min_cost = u64::from(self.map.quantization().min_cost);
        let heuristic = |x: i64, y: i64| {
            let d = (x - gx).unsigned_abs().max((y - gy).unsigned_abs());
            d * min_cost
        };

        let n = window.width() * window.height();
        // g_score[local] = cheapest known cost from origin.
        let mut g_score = vec![u64::MAX; n];
        // came_from[local] = previous cell (local index).
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];

        let start_local = window.local(sx, sy);
        let goal_local = window.local(gx, gy);
        g_score[start_local] = 0;

        let mut open = BinaryHeap::new();
        let h_start = heuristic(sx, sy);
        open.push(OpenEntry {
            f: h_start,
            h: h_start,
            cell: global(sx, sy),
        });

        while let Some(current) = open.pop() {
            let cx = (current.cell % grid_width) as i64;
            let cy = (current.cell / grid_width) as i64;
            let ci = window.local(cx, cy);

            if ci == goal_local {
                return Some(self.reconstruct_path(&came_from, &window, ci, g_score[ci]));
            }
            if closed[ci] {
                continue;
            }
            closed[ci] = true;

            let current_g = g_score[ci];
            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (cx + dx, cy + dy);
                if !window.contains(nx, ny) {
                    continue;
                }
                let ni = window.local(nx, ny);
                if closed[ni] {
                    continue;
                }
                let cell = global(nx, ny);
                let cost = data[cell];
                if ni != goal_local && self.impassable.is_some_and(|t| cost >= t) {
                    continue;
                }

                let tentative_g = current_g + u64::from(cost);
                if tentative_g < g_score[ni] {
                    g_score[ni] = tentative_g;
                    came_from[ni] = Some(ci);
                    let h = heuristic(nx, ny);
                    open.push(OpenEntry {
                        f: tentative_g + h,
                        h,
                        cell,
                    });
                }
            }
        }

        None
    }

    fn reconstruct_path(
        &self,
        came_from: &[Option<usize>],
        window: &Window,
        goal_local: usize,
        total_cost: u64,
    ) -> PathResult {
        let origin = self.map.origin();
        let w = window.width();
        let to_world = |local: usize| {
            Coordinate::new(
                (i64::from(origin.x) + window.min_x + (local % w) as i64) as i32,
                (i64::from(origin.y) + window.min_y + (local / w) as i64) as i32,
            )
        };

        let mut path = vec![to_world(goal_local)];
        let mut current = goal_local;
        while let Some(prev) = came_from[current] {
            path.push(to_world(prev));
            current = prev;
        }
        path.reverse();

        PathResult {
            path,
            total_cost: u32::try_from(total_cost).unwrap_or(u32::MAX),
        }
    }
}
