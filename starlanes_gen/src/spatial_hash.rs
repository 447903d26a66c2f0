// Fixed-bucket grid index for broad-phase radius queries.
//
// Positions are bucketed by `(x.div_euclid(cell), y.div_euclid(cell))`.
// `query_radius` returns every entry in the buckets that overlap the square
// of side `2 * radius` around the query point: never a false negative,
// possibly false positives. Callers re-check exact distance.
//
// Built once per route-building pass and read-only afterwards.
//
// See also: `routes.rs`, the only caller.
//
// **Critical constraint: determinism.** `FxHashMap` has a fixed hash
// function, but results never depend on map iteration order anyway:
// queries walk bucket keys in ascending row-then-column order and return
// bucket members in insertion order.

use crate::error::ConfigError;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct SpatialHash {
    cell_size: i64,
    buckets: FxHashMap<(i64, i64), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: i64) -> Result<Self, ConfigError> {
        if cell_size <= 0 {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            buckets: FxHashMap::default(),
        })
    }

    pub fn cell_size(&self) -> i64 {
        self.cell_size
    }

    fn key(&self, x: i64, y: i64) -> (i64, i64) {
        (x.div_euclid(self.cell_size), y.div_euclid(self.cell_size))
    }

    /// Record entry `index` at `(x, y)`.
    pub fn insert(&mut self, index: usize, x: i32, y: i32) {
        let key = self.key(i64::from(x), i64::from(y));
        self.buckets.entry(key).or_default().push(index);
    }

    /// Indices whose bucket overlaps the square `[x - radius, x + radius] x
    /// [y - radius, y + radius]`.
    pub fn query_radius(&self, x: i32, y: i32, radius: u32) -> Vec<usize> {
        let r = i64::from(radius);
        let (x, y) = (i64::from(x), i64::from(y));
        let (min_bx, min_by) = self.key(x - r, y - r);
        let (max_bx, max_by) = self.key(x + r, y + r);

        let mut out = Vec::new();
        for by in min_by..=max_by {
            for bx in min_bx..=max_bx {
                if let Some(members) = self.buckets.get(&(bx, by)) {
                    out.extend_from_slice(members);
                }
            }
        }
        out
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlanes_prng::GameRng;

    #[test]
    fn rejects_non_positive_cell_size() {
        assert_eq!(
            SpatialHash::new(0).unwrap_err(),
            ConfigError::InvalidCellSize(0)
        );
        assert!(SpatialHash::new(-4).is_err());
    }

    #[test]
    fn negative_coordinates_bucket_with_floor_division() {
        let mut hash = SpatialHash::new(10).unwrap();
        hash.insert(0, -1, -1);
        hash.insert(1, 0, 0);
        assert_eq!(hash.bucket_count(), 2);
        // A zero-radius query at (-5, -5) only touches bucket (-1, -1).
        assert_eq!(hash.query_radius(-5, -5, 0), vec![0]);
    }

    #[test]
    fn query_has_no_false_negatives() {
        let mut rng = GameRng::new(77);
        let points: Vec<(i32, i32)> = (0..400)
            .map(|_| {
                (
                    rng.range_i64_inclusive(-200, 200) as i32,
                    rng.range_i64_inclusive(-200, 200) as i32,
                )
            })
            .collect();
        let mut hash = SpatialHash::new(25).unwrap();
        for (i, &(x, y)) in points.iter().enumerate() {
            hash.insert(i, x, y);
        }
        let radius = 25u32;
        for &(qx, qy) in points.iter().take(50) {
            let found = hash.query_radius(qx, qy, radius);
            for (i, &(x, y)) in points.iter().enumerate() {
                let dx = i64::from(x - qx);
                let dy = i64::from(y - qy);
                if dx * dx + dy * dy <= i64::from(radius * radius) {
                    assert!(found.contains(&i), "missed point {i} near ({qx}, {qy})");
                }
            }
        }
    }

    #[test]
    fn results_come_back_in_bucket_then_insertion_order() {
        let mut hash = SpatialHash::new(10).unwrap();
        hash.insert(5, 15, 15); // bucket (1, 1)
        hash.insert(3, 2, 2); // bucket (0, 0)
        hash.insert(9, 12, 3); // bucket (1, 0)
        hash.insert(1, 4, 4); // bucket (0, 0)
        assert_eq!(hash.query_radius(10, 10, 5), vec![3, 1, 9, 5]);
    }
}
