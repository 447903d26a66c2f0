// Life-like cellular automata for consolidating wall regions.
//
// The cost-map composer seeds a boolean wall grid from the PRNG (biased by
// the wall noise layer) and then runs a birth/survival rule over it for a
// fixed number of rounds. Rules like `B5678/S45678` turn salt-and-pepper
// noise into coherent blobs: isolated walls die, crowded open cells fill in.
//
// Grids are flat row-major `Vec<bool>` (`index = y * width + x`), the same
// layout as `CostMap`. Neighborhoods are Moore (8 cells); anything outside
// the grid counts as dead, so walls never grow in from the border.
//
// See also: `cost_map.rs` which owns the seed fill and calls `run()`,
// `config.rs` for `CaConfig`.
//
// **Critical constraint: determinism.** Updates are synchronous and
// double-buffered; the result depends only on the input grid, never on
// iteration order within a round.

use crate::error::ConfigError;
use starlanes_prng::GameRng;

/// A parsed birth/survival rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaRule {
    /// `birth[n]`: a dead cell with `n` live neighbors becomes alive.
    pub birth: [bool; 9],
    /// `survive[n]`: a live cell with `n` live neighbors stays alive.
    pub survive: [bool; 9],
}

impl CaRule {
    /// Parse `B<digits>/S<digits>` (letters case-insensitive, either digit
    /// list may be empty).
    pub fn parse(rule: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason,
        };

        let (birth_part, survive_part) = rule
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid("expected `B.../S...`"))?;

        let birth_digits = strip_letter(birth_part, 'b')
            .ok_or_else(|| invalid("birth part must start with `B`"))?;
        let survive_digits = strip_letter(survive_part, 's')
            .ok_or_else(|| invalid("survival part must start with `S`"))?;

        Ok(Self {
            birth: parse_counts(birth_digits)
                .ok_or_else(|| invalid("neighbor counts must be digits 0-8"))?,
            survive: parse_counts(survive_digits)
                .ok_or_else(|| invalid("neighbor counts must be digits 0-8"))?,
        })
    }

    /// Next state of one cell.
    pub fn next_state(&self, alive: bool, live_neighbors: usize) -> bool {
        if alive {
            self.survive[live_neighbors]
        } else {
            self.birth[live_neighbors]
        }
    }

    /// One synchronous round over a row-major grid.
    pub fn step(&self, cells: &[bool], width: usize, height: usize) -> Vec<bool> {
        debug_assert_eq!(cells.len(), width * height);
        let mut next = vec![false; cells.len()];
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let n = live_neighbors(cells, width, height, x, y);
                next[i] = self.next_state(cells[i], n);
            }
        }
        next
    }

    /// Run `iterations` rounds and return the final grid.
    pub fn run(
        &self,
        mut cells: Vec<bool>,
        width: usize,
        height: usize,
        iterations: u32,
    ) -> Vec<bool> {
        for _ in 0..iterations {
            cells = self.step(&cells, width, height);
        }
        cells
    }
}

fn strip_letter(part: &str, letter: char) -> Option<&str> {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.eq_ignore_ascii_case(&letter) => Some(chars.as_str()),
        _ => None,
    }
}

fn parse_counts(digits: &str) -> Option<[bool; 9]> {
    let mut counts = [false; 9];
    for c in digits.chars() {
        let n = c.to_digit(10)? as usize;
        if n > 8 {
            return None;
        }
        counts[n] = true;
    }
    Some(counts)
}

/// Count live Moore neighbors. Out-of-grid cells are dead.
fn live_neighbors(cells: &[bool], width: usize, height: usize, x: usize, y: usize) -> usize {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            if cells[ny as usize * width + nx as usize] {
                count += 1;
            }
        }
    }
    count
}

/// Seed the initial wall grid, one PRNG draw per cell in row-major order.
///
/// A cell starts alive when `next_f64() < fill_probability * (0.5 + bias)`,
/// where `bias` is the wall noise sample in `[0, 1]`. Noisier regions are
/// seeded denser, so the automaton grows walls where the wall layer peaks.
pub fn seed_walls(wall_noise: &[f64], fill_probability: f64, rng: &mut GameRng) -> Vec<bool> {
    wall_noise
        .iter()
        .map(|&bias| {
            let p = (fill_probability * (0.5 + bias)).clamp(0.0, 1.0);
            rng.random_bool(p)
        })
        .collect()
}
