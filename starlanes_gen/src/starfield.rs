// Lazy three-level spiral starfield.
//
// Produces world-space `Coordinate`s one at a time, drawing from a borrowed
// `GameRng`. Nothing is materialized up front; consuming a prefix draws
// exactly the numbers needed for that prefix.
//
// Levels:
//   1. Galaxy: per-arm parameters (`ArmParams`): rotation `shift`, the
//      spiral scale `sx`/`sy`, cloud radii and stars-per-cloud factor.
//   2. Spiral arm: walks the sweep angle `n_deg` from 0 while
//      `n_deg <= deg`, stepping by a random 1-5 degrees after each cloud.
//      Each stop is a cloud centered on the rotated spiral point, with
//      `floor(|p| * spc / n)` stars (none at `n == 0`).
//   3. Elliptic cloud: each star draws an angle in [0, 359] degrees and a
//      radial draw in [0, 10000] squared into a bias that clusters stars
//      near the cloud center. The offset uses sine for x and cosine for y.
//      This swap is part of the output format; do not "fix" it.
//
// Per-cloud draw order: all stars (angle then bias, per star), then the
// step to the next cloud. The step after an arm's last cloud is drawn
// before the arm ends.
//
// See also: `catalog.rs` which consumes this sequence, `config.rs` for
// `GalaxyConfig`.
//
// **Critical constraint: determinism.** Output depends only on the config
// and the rng state at construction. All trig is plain `f64`, rounded with
// `f64::round` at the very end.

use crate::config::GalaxyConfig;
use crate::types::Coordinate;
use starlanes_prng::GameRng;
use std::f64::consts::TAU;

/// Cloud radius as a multiple of the arm's spiral scale.
pub const CLOUD_SPREAD: f64 = 2.0;

/// Precomputed per-arm parameters (level 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmParams {
    /// Arm rotation plus the galaxy-wide `turn`, in radians.
    pub rotation: f64,
    pub sx: f64,
    pub sy: f64,
    pub rx: f64,
    pub ry: f64,
    pub spc: f64,
}

impl ArmParams {
    pub fn new(config: &GalaxyConfig, arm: u32) -> Self {
        let shift = f64::from(arm) / f64::from(config.arms) * TAU;
        let sweep = config.deg.to_radians();
        let sx = config.size.0 / sweep;
        let sy = config.size.1 / sweep;
        Self {
            rotation: shift + config.turn,
            sx,
            sy,
            rx: sx * CLOUD_SPREAD,
            ry: sy * CLOUD_SPREAD,
            spc: config.spc_factor,
        }
    }
}

fn rotate((x, y): (f64, f64), angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Offset of one star from its cloud center, before rotation.
///
/// Sine drives x and cosine drives y.
pub fn star_offset(angle_deg: i64, radial_draw: i64, rx: f64, ry: f64) -> (f64, f64) {
    let angle = (angle_deg as f64).to_radians();
    let r = radial_draw as f64 / 10_000.0;
    let bias = r * r;
    (angle.sin() * bias * rx, angle.cos() * bias * ry)
}

/// One cloud along an arm (level 3 state).
#[derive(Clone, Copy, Debug)]
struct Cloud {
    /// Cloud center relative to the galaxy center, already rotated.
    center: (f64, f64),
    remaining: u64,
}

/// The lazy coordinate sequence. Borrows the rng for its whole lifetime so
/// nothing else can draw in between.
pub struct Starfield<'r> {
    rng: &'r mut GameRng,
    config: GalaxyConfig,
    arm: u32,
    params: ArmParams,
    /// Sweep angle of the current cloud; `None` before an arm's first cloud.
    n_deg: Option<i64>,
    cloud: Option<Cloud>,
    produced: usize,
    arm_stars: usize,
}

impl<'r> Starfield<'r> {
    pub fn new(config: &GalaxyConfig, rng: &'r mut GameRng) -> Self {
        Self {
            rng,
            params: ArmParams::new(config, 0),
            config: config.clone(),
            arm: 0,
            n_deg: None,
            cloud: None,
            produced: 0,
            arm_stars: 0,
        }
    }

    /// Advance to the next cloud (level 2), moving to the next arm when the
    /// current one is exhausted. `None` once every arm is done.
    fn next_cloud(&mut self) -> Option<Cloud> {
        loop {
            if self.arm >= self.config.arms {
                return None;
            }
            let n_deg = match self.n_deg {
                None => 0,
                Some(prev) => prev + self.rng.range_i64_inclusive(1, 5),
            };
            if n_deg as f64 > self.config.deg {
                tracing::debug!(arm = self.arm, stars = self.arm_stars, "spiral arm done");
                self.arm += 1;
                self.arm_stars = 0;
                self.n_deg = None;
                if self.arm < self.config.arms {
                    self.params = ArmParams::new(&self.config, self.arm);
                }
                continue;
            }
            self.n_deg = Some(n_deg);
            return Some(self.cloud_at(n_deg));
        }
    }

    fn cloud_at(&self, n_deg: i64) -> Cloud {
        let p = &self.params;
        let n = (n_deg as f64).to_radians();
        let dyn_size = self.config.dyn_size_factor;
        let raw = (n.cos() * n * p.sx * dyn_size, n.sin() * n * p.sy * dyn_size);
        let center = rotate(raw, p.rotation);
        let remaining = if n == 0.0 {
            0
        } else {
            (raw.0.hypot(raw.1) * p.spc / n).floor().max(0.0) as u64
        };
        Cloud { center, remaining }
    }

    /// Place one star of `cloud` (level 3): two draws.
    fn place_star(&mut self, cloud: Cloud) -> Coordinate {
        let angle_deg = self.rng.range_i64_inclusive(0, 359);
        let radial = self.rng.range_i64_inclusive(0, 10_000);
        let p = &self.params;
        let offset = rotate(star_offset(angle_deg, radial, p.rx, p.ry), p.rotation);
        let m = self.config.multiplier;
        let x = (self.config.center.0 + cloud.center.0 + offset.0) * m;
        let y = (self.config.center.1 + cloud.center.1 + offset.1) * m;
        Coordinate::new(x.round() as i32, y.round() as i32)
    }
}

impl Iterator for Starfield<'_> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        if self.config.limit.is_some_and(|limit| self.produced >= limit) {
            return None;
        }
        loop {
            if let Some(cloud) = self.cloud.as_mut().filter(|c| c.remaining > 0) {
                cloud.remaining -= 1;
                let cloud = *cloud;
                let star = self.place_star(cloud);
                self.produced += 1;
                self.arm_stars += 1;
                return Some(star);
            }
            self.cloud = Some(self.next_cloud()?);
        }
    }
}
