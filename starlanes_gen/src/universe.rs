// Top-level generation pipeline.
//
// `generate_universe` runs every stage in order:
//   1. Validate the config.
//   2. Draw the starfield from `GameRng::from_seed_str(seed)` and catalog it.
//   3. Select the Oikumene around the scaled galaxy center.
//   4. Compose the cost map from the independent `"{seed}:costmap"` stream.
//   5. Build routes over the Oikumene.
//   6. Compute stats.
//
// The result (`Universe`) owns everything the output writer needs.
//
// **Critical constraint: determinism.** Single-threaded and sequential.
// The two PRNG streams are separate, so changing the cost-map parameters
// never moves a star, and changing the galaxy only moves the cost map
// through the grid extent.

use crate::catalog::Catalog;
use crate::config::UniverseConfig;
use crate::cost_map::{CostMap, compose, grid_extent};
use crate::error::GenerationError;
use crate::routes::{RouteNetwork, build_routes};
use crate::starfield::Starfield;
use crate::stats::GenerationStats;
use crate::types::{OikumeneSystem, StarSystem};
use starlanes_prng::GameRng;

/// A fully generated universe.
#[derive(Clone, Debug)]
pub struct Universe {
    pub seed: String,
    pub config: UniverseConfig,
    /// Every cataloged system, in catalog order.
    pub systems: Vec<StarSystem>,
    pub cost_map: CostMap,
    pub network: RouteNetwork,
    pub stats: GenerationStats,
}

impl Universe {
    /// The Oikumene view the routes were built over.
    pub fn oikumene(&self) -> Vec<OikumeneSystem> {
        self.systems
            .iter()
            .filter(|s| s.is_oikumene())
            .map(StarSystem::as_oikumene)
            .collect()
    }
}

/// Run a full generation pass.
pub fn generate_universe(config: &UniverseConfig) -> Result<Universe, GenerationError> {
    config.validate()?;

    let mut rng = GameRng::from_seed_str(&config.seed);
    let mut catalog = Catalog::from_coordinates(Starfield::new(&config.galaxy, &mut rng));
    tracing::info!(
        seed = %config.seed,
        systems = catalog.len(),
        duplicates = catalog.duplicates_dropped(),
        "generated starfield"
    );

    let m = config.galaxy.multiplier;
    let center = (config.galaxy.center.0 * m, config.galaxy.center.1 * m);
    catalog.select_oikumene(&config.oikumene, center);

    let rect = grid_extent(&config.cost_map, catalog.systems())?;
    let mut map_rng = GameRng::from_seed_str(&config.cost_map_seed());
    let cost_map = compose(
        rect,
        &config.cost_map,
        &config.perlin,
        &config.cellular_automata,
        &mut map_rng,
    )?;
    tracing::info!(
        width = cost_map.width(),
        height = cost_map.height(),
        origin = %cost_map.origin(),
        "composed cost map"
    );

    let network = build_routes(&catalog.oikumene(), &cost_map, &config.routes)?;
    let stats = GenerationStats::compute(catalog.systems(), catalog.duplicates_dropped(), &network);

    Ok(Universe {
        seed: config.seed.clone(),
        config: config.clone(),
        systems: catalog.into_systems(),
        cost_map,
        network,
        stats,
    })
}
