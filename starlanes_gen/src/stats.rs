// Summary counts for a finished generation run.
//
// Computed once after route building; the output writer embeds them in
// `metadata.json` and the CLI logs them.

use crate::routes::RouteNetwork;
use crate::types::StarSystem;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub total_systems: usize,
    pub oikumene_systems: usize,
    pub beyond_systems: usize,
    pub duplicate_coordinates_dropped: usize,
    pub total_routes: usize,
    pub direct_routes: usize,
    pub bridge_routes: usize,
    /// Mean route cost; `0.0` when there are no routes.
    pub average_route_cost: f64,
    pub components_before_bridging: usize,
    pub unbridged_components: usize,
}

impl GenerationStats {
    pub fn compute(
        systems: &[StarSystem],
        duplicate_coordinates_dropped: usize,
        network: &RouteNetwork,
    ) -> Self {
        let oikumene_systems = systems.iter().filter(|s| s.is_oikumene()).count();
        let total_routes = network.routes.len();
        let average_route_cost = if total_routes == 0 {
            0.0
        } else {
            let sum: u64 = network.routes.iter().map(|r| u64::from(r.cost)).sum();
            sum as f64 / total_routes as f64
        };
        Self {
            total_systems: systems.len(),
            oikumene_systems,
            beyond_systems: systems.len() - oikumene_systems,
            duplicate_coordinates_dropped,
            total_routes,
            direct_routes: network.direct_routes,
            bridge_routes: network.bridge_routes,
            average_route_cost,
            components_before_bridging: network.components_before_bridging,
            unbridged_components: network.unbridged_components.len(),
        }
    }
}
