// Star catalog: identity assignment and the Oikumene/Beyond split.
//
// `Catalog::from_coordinates` turns the starfield sequence into
// `StarSystem`s. Systems at an already-seen position are dropped (and
// counted) so no two systems share a cell. Ids are `SYS-000000`,
// `SYS-000001`, ... in production order; zero padding makes lexicographic
// id order equal production order.
//
// `select_oikumene` marks the inhabited core. Candidates must lie between
// the core and rim exclusion radii (measured from the galaxy center in
// world units). The candidate nearest the center anchors the cluster, and
// the `target_count` candidates nearest the anchor (within
// `cluster_radius`) become Oikumene. Everything else stays Beyond.
//
// See also: `starfield.rs` (input), `routes.rs` (consumes the Oikumene
// view), `config.rs` for `OikumeneConfig`.
//
// **Critical constraint: determinism.** No PRNG draws. Every ordering
// breaks ties by catalog index.

use crate::config::OikumeneConfig;
use crate::types::{Coordinate, OikumeneSystem, Region, StarSystem};
use std::collections::{BTreeMap, BTreeSet};

/// Catalog id for the `index`-th kept system.
pub fn system_id(index: usize) -> String {
    format!("SYS-{index:06}")
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    systems: Vec<StarSystem>,
    duplicates_dropped: usize,
}

impl Catalog {
    /// Build a catalog, keeping the first system at each position. Every
    /// system starts in `Region::Beyond`.
    pub fn from_coordinates(coords: impl IntoIterator<Item = Coordinate>) -> Self {
        let mut seen = BTreeSet::new();
        let mut systems = Vec::new();
        let mut duplicates_dropped = 0;
        for c in coords {
            if !seen.insert(c) {
                duplicates_dropped += 1;
                continue;
            }
            systems.push(StarSystem {
                id: system_id(systems.len()),
                x: c.x,
                y: c.y,
                region: Region::Beyond,
                attributes: BTreeMap::new(),
            });
        }
        if duplicates_dropped > 0 {
            tracing::debug!(duplicates_dropped, "dropped systems at duplicate coordinates");
        }
        Self {
            systems,
            duplicates_dropped,
        }
    }

    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn into_systems(self) -> Vec<StarSystem> {
        self.systems
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Oikumene systems in catalog order.
    pub fn oikumene(&self) -> Vec<OikumeneSystem> {
        self.systems
            .iter()
            .filter(|s| s.is_oikumene())
            .map(StarSystem::as_oikumene)
            .collect()
    }

    /// Mark the inhabited core around `center` (world units). Returns the
    /// number of Oikumene systems.
    pub fn select_oikumene(&mut self, config: &OikumeneConfig, center: (f64, f64)) -> usize {
        let from_center =
            |s: &StarSystem| (f64::from(s.x) - center.0).hypot(f64::from(s.y) - center.1);

        let eligible: Vec<usize> = self
            .systems
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                let d = from_center(s);
                d >= config.core_exclusion_radius && d <= config.rim_exclusion_radius
            })
            .map(|(i, _)| i)
            .collect();

        // Nearest to the center; strict `<` keeps the lowest index on ties.
        let mut anchor: Option<(usize, f64)> = None;
        for &i in &eligible {
            let d = from_center(&self.systems[i]);
            if anchor.is_none_or(|(_, best)| d < best) {
                anchor = Some((i, d));
            }
        }
        let Some((anchor, _)) = anchor else {
            tracing::warn!("no system lies inside the Oikumene band");
            return 0;
        };

        let anchor_pos = self.systems[anchor].position();
        let cluster_sq = config.cluster_radius * config.cluster_radius;
        let mut members: Vec<(i64, usize)> = eligible
            .iter()
            .map(|&i| (self.systems[i].position().distance_sq(anchor_pos), i))
            .filter(|&(d2, _)| d2 as f64 <= cluster_sq)
            .collect();
        members.sort_unstable();
        members.truncate(config.target_count);

        for &(_, i) in &members {
            self.systems[i].region = Region::Oikumene;
        }
        tracing::info!(
            anchor = %self.systems[anchor].id,
            eligible = eligible.len(),
            oikumene = members.len(),
            "selected Oikumene"
        );
        members.len()
    }
}
