// Seeded 2D gradient (Perlin) noise with fractal octaves.
//
// Each noise layer owns a 256-entry permutation table shuffled by the
// cost-map PRNG at construction; after that, sampling is a pure function of
// the table and the input position. Octaves are summed with lacunarity 2 and
// gain 0.5 and the sum is normalized to [0, 1].
//
// Sampling happens in world coordinates (`(origin + cell) * frequency`), so
// two grids with different extents agree wherever they overlap.
//
// See also: `cost_map.rs` which builds the base and wall layers,
// `config.rs` for `NoiseLayer` / `PerlinConfig`.
//
// **Critical constraint: determinism.** The only PRNG draws are the 255
// swaps of the table shuffle. Sampling uses plain f64 arithmetic with no
// platform-dependent intrinsics.

use crate::config::NoiseLayer;
use starlanes_prng::GameRng;

const LACUNARITY: f64 = 2.0;
const GAIN: f64 = 0.5;

/// Gradient directions selected by the low three hash bits.
const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// A seeded gradient-noise source.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    /// Permutation table, doubled so `perm[i + 1]` never wraps.
    perm: Vec<u8>,
}

impl PerlinNoise {
    /// Build a noise source, shuffling its permutation table with `rng`.
    pub fn new(rng: &mut GameRng) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        rng.shuffle(&mut table);
        let perm = table.iter().chain(table.iter()).copied().collect();
        Self { perm }
    }

    /// Single-octave noise at `(x, y)`, roughly in [-1, 1].
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = (x0 as i64).rem_euclid(256) as usize;
        let yi = (y0 as i64).rem_euclid(256) as usize;
        let xf = x - x0;
        let yf = y - y0;

        let aa = self.hash(xi, yi);
        let ab = self.hash(xi, yi + 1);
        let ba = self.hash(xi + 1, yi);
        let bb = self.hash(xi + 1, yi + 1);

        let u = fade(xf);
        let v = fade(yf);

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        lerp(x1, x2, v).clamp(-1.0, 1.0)
    }

    /// Fractal sum of `octaves` samples, normalized to [0, 1].
    pub fn fractal(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut sum = 0.0;
        let mut normaliser = 0.0;
        for _ in 0..octaves {
            sum += self.sample(x * frequency, y * frequency) * amplitude;
            normaliser += amplitude;
            frequency *= LACUNARITY;
            amplitude *= GAIN;
        }
        if normaliser == 0.0 {
            return 0.5;
        }
        ((sum / normaliser + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Sample a whole grid in row-major order at world coordinates
    /// `(origin_x + col, origin_y + row)`.
    pub fn sample_grid(
        &self,
        layer: &NoiseLayer,
        origin_x: i32,
        origin_y: i32,
        width: usize,
        height: usize,
    ) -> Vec<f64> {
        let mut out = Vec::with_capacity(width * height);
        for row in 0..height {
            let wy = (f64::from(origin_y) + row as f64) * layer.frequency;
            for col in 0..width {
                let wx = (f64::from(origin_x) + col as f64) * layer.frequency;
                out.push(self.fractal(wx, wy, layer.octaves));
            }
        }
        out
    }

    fn hash(&self, xi: usize, yi: usize) -> u8 {
        self.perm[self.perm[xi] as usize + yi]
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let (gx, gy) = GRADIENTS[(hash & 7) as usize];
    gx * x + gy * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = PerlinNoise::new(&mut GameRng::new(3));
        let b = PerlinNoise::new(&mut GameRng::new(3));
        for i in 0..200 {
            let x = i as f64 * 0.173;
            let y = i as f64 * 0.311;
            assert_eq!(a.fractal(x, y, 4), b.fractal(x, y, 4));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = PerlinNoise::new(&mut GameRng::new(3));
        let b = PerlinNoise::new(&mut GameRng::new(4));
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.37 + 0.5;
            a.sample(x, x * 0.5) != b.sample(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn zero_at_lattice_points() {
        let n = PerlinNoise::new(&mut GameRng::new(11));
        for x in -3..3 {
            for y in -3..3 {
                assert_eq!(n.sample(x as f64, y as f64), 0.0);
            }
        }
    }

    #[test]
    fn fractal_stays_in_unit_range() {
        let n = PerlinNoise::new(&mut GameRng::new(5));
        for i in 0..5000 {
            let x = (i % 97) as f64 * 0.731 - 30.0;
            let y = (i / 97) as f64 * 0.419 - 10.0;
            let v = n.fractal(x, y, 5);
            assert!((0.0..=1.0).contains(&v), "fractal out of range: {v}");
        }
    }

    #[test]
    fn grid_sampling_is_anchored_to_world_space() {
        let n = PerlinNoise::new(&mut GameRng::new(8));
        let layer = NoiseLayer {
            frequency: 0.05,
            octaves: 3,
        };
        let wide = n.sample_grid(&layer, -10, -10, 20, 20);
        let narrow = n.sample_grid(&layer, -5, -5, 5, 5);
        // Cell (0, 0) of the narrow grid is cell (5, 5) of the wide one.
        assert_eq!(narrow[0], wide[5 * 20 + 5]);
        assert_eq!(narrow[4 * 5 + 4], wide[9 * 20 + 9]);
    }
}
