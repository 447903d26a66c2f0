// On-disk schemas for every JSON artifact.
//
// The writer never assembles JSON ad hoc: each file is one of these
// structs, so every field is always present. Keys are camelCase. Config
// sections are embedded as the generator's own config structs; the cost
// map section is reduced to its quantization descriptor plus the
// `uint8_linear` marker.
//
// See also: `writer.rs`, which serializes these.

use serde::{Deserialize, Serialize};
use starlanes_gen::Universe;
use starlanes_gen::config::{CaConfig, GalaxyConfig, OikumeneConfig, PerlinConfig, RouteConfig};
use starlanes_gen::cost_map::{CostMap, QUANTIZATION_KIND};
use starlanes_gen::stats::GenerationStats;
use starlanes_gen::types::{Route, RouteKind};

/// `metadata.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFile {
    pub seed: String,
    pub galaxy: GalaxyConfig,
    pub cost_map: CostMapMetadata,
    pub perlin: PerlinConfig,
    pub cellular_automata: CaConfig,
    pub oikumene: OikumeneConfig,
    pub routes: RouteConfig,
    pub stats: GenerationStats,
}

impl MetadataFile {
    pub fn from_universe(universe: &Universe) -> Self {
        let config = &universe.config;
        Self {
            seed: universe.seed.clone(),
            galaxy: config.galaxy.clone(),
            cost_map: CostMapMetadata::from_cost_map(&universe.cost_map),
            perlin: config.perlin.clone(),
            cellular_automata: config.cellular_automata.clone(),
            oikumene: config.oikumene.clone(),
            routes: config.routes.clone(),
            stats: universe.stats.clone(),
        }
    }
}

/// The `costMap` section of `metadata.json`: enough to decode
/// `costmap.bin` and place it in world space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMapMetadata {
    pub quantization: String,
    pub min_cost: u8,
    pub max_cost: u8,
    pub grid_origin_x: i32,
    pub grid_origin_y: i32,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl CostMapMetadata {
    pub fn from_cost_map(map: &CostMap) -> Self {
        let q = map.quantization();
        Self {
            quantization: QUANTIZATION_KIND.to_string(),
            min_cost: q.min_cost,
            max_cost: q.max_cost,
            grid_origin_x: q.grid_origin_x,
            grid_origin_y: q.grid_origin_y,
            grid_width: q.grid_width,
            grid_height: q.grid_height,
        }
    }
}

/// `routes.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesFile {
    pub routes: Vec<RouteRecord>,
}

impl RoutesFile {
    pub fn from_routes(routes: &[Route]) -> Self {
        Self {
            routes: routes.iter().map(RouteRecord::from_route).collect(),
        }
    }
}

/// One route with its path flattened to `[x, y]` pairs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub origin_id: String,
    pub destination_id: String,
    pub cost: u32,
    pub path: Vec<[i32; 2]>,
    pub kind: RouteKind,
}

impl RouteRecord {
    pub fn from_route(route: &Route) -> Self {
        Self {
            origin_id: route.origin_id.clone(),
            destination_id: route.destination_id.clone(),
            cost: route.cost,
            path: route.path.iter().map(|c| [c.x, c.y]).collect(),
            kind: route.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlanes_gen::types::Coordinate;

    #[test]
    fn route_record_flattens_path() {
        let route = Route {
            origin_id: "SYS-000001".to_string(),
            destination_id: "SYS-000004".to_string(),
            cost: 3,
            path: vec![Coordinate::new(0, 0), Coordinate::new(1, -1)],
            kind: RouteKind::Direct,
        };
        let json = serde_json::to_value(RoutesFile::from_routes(&[route])).unwrap();
        let record = &json["routes"][0];
        assert_eq!(record["originId"], "SYS-000001");
        assert_eq!(record["destinationId"], "SYS-000004");
        assert_eq!(record["cost"], 3);
        assert_eq!(record["path"], serde_json::json!([[0, 0], [1, -1]]));
        assert_eq!(record["kind"], "direct");
    }
}
