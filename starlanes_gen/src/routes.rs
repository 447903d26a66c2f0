// Trade-route builder over the Oikumene.
//
// Runs in five phases:
//   1. Candidates: a `SpatialHash` (cell size `max_range`) proposes nearby
//      pairs; each unordered pair is visited once (`j > i`, deduplicated by
//      `Route::pair_key`) and kept only if its exact squared distance is
//      within `max_range^2`.
//   2. Exact search: A* per candidate, restricted to the endpoints'
//      bounding box padded by `max_range`. Unreachable pairs are dropped.
//   3. Canonicalization: `origin_id` is the lexicographically smaller id;
//      the path is reversed when the search ran the other way.
//   4. Components: BFS over the route graph, started from each unvisited
//      system in index order.
//   5. Bridging: each other component is joined to component 0 through
//      the closest cross-component system pair (squared distance, ties by
//      index), searched without a window. A component whose bridge search
//      fails stays disconnected; `BridgeFailurePolicy` decides whether
//      that is recorded or fatal.
//
// See also: `spatial_hash.rs`, `pathfinding.rs`, `universe.rs` (caller),
// `config.rs` for `RouteConfig`.
//
// **Critical constraint: determinism.** Candidate order follows system
// index and spatial-hash query order, components are sorted by index, and
// every tie is broken by index. No randomness.

use crate::config::{BridgeFailurePolicy, RouteConfig};
use crate::cost_map::CostMap;
use crate::error::RouteError;
use crate::pathfinding::{PathResult, Pathfinder};
use crate::spatial_hash::SpatialHash;
use crate::types::{OikumeneSystem, Route, RouteKind};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Everything the route builder produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteNetwork {
    /// Direct routes in candidate order, then bridges in bridging order.
    pub routes: Vec<Route>,
    pub direct_routes: usize,
    pub bridge_routes: usize,
    /// Component count of the direct-route graph.
    pub components_before_bridging: usize,
    /// Ids of each component that could not be bridged (tolerated only).
    pub unbridged_components: Vec<Vec<String>>,
}

impl RouteNetwork {
    pub fn is_connected(&self) -> bool {
        self.unbridged_components.is_empty()
    }
}

/// Build the route network for `systems` over `map`.
pub fn build_routes(
    systems: &[OikumeneSystem],
    map: &CostMap,
    config: &RouteConfig,
) -> Result<RouteNetwork, RouteError> {
    let mut ids = BTreeSet::new();
    for s in systems {
        if !ids.insert(s.id.as_str()) {
            return Err(RouteError::DuplicateSystemId(s.id.clone()));
        }
    }
    if systems.len() < 2 {
        return Ok(RouteNetwork {
            components_before_bridging: systems.len(),
            ..RouteNetwork::default()
        });
    }

    let pathfinder = Pathfinder::new(map).with_impassable(config.impassable_cost);

    // Phases 1-3.
    let candidates = candidate_pairs(systems, config.max_range)?;
    let mut routes = Vec::new();
    for &(i, j) in &candidates {
        let (a, b) = (&systems[i], &systems[j]);
        if let Some(result) =
            pathfinder.find_path_within(a.position(), b.position(), config.max_range)
        {
            routes.push(canonical_route(a, b, result, RouteKind::Direct));
        }
    }
    let direct_routes = routes.len();
    tracing::debug!(
        candidates = candidates.len(),
        direct_routes,
        "computed direct routes"
    );

    // Phase 4.
    let components = connected_components(systems, &routes);
    let components_before_bridging = components.len();

    // Phase 5.
    let mut unbridged = Vec::new();
    let mut components = components.into_iter();
    if let Some(mut main) = components.next() {
        for component in components {
            let (a, b) = closest_pair(systems, &main, &component);
            tracing::debug!(
                from = %systems[a].id,
                to = %systems[b].id,
                "attempting bridge"
            );
            match pathfinder.find_path(systems[a].position(), systems[b].position()) {
                Some(result) => {
                    routes.push(canonical_route(
                        &systems[a],
                        &systems[b],
                        result,
                        RouteKind::Bridge,
                    ));
                    main.extend(component);
                    main.sort_unstable();
                }
                None => {
                    let ids: Vec<String> =
                        component.iter().map(|&i| systems[i].id.clone()).collect();
                    tracing::warn!(
                        systems = ids.len(),
                        first = %ids[0],
                        "component could not be bridged"
                    );
                    unbridged.push(ids);
                }
            }
        }
    }

    if !unbridged.is_empty() && config.bridge_failure == BridgeFailurePolicy::Fail {
        return Err(RouteError::Disconnected {
            count: unbridged.len(),
            components: unbridged,
        });
    }

    let bridge_routes = routes.len() - direct_routes;
    tracing::info!(
        systems = systems.len(),
        direct_routes,
        bridge_routes,
        components_before_bridging,
        unbridged = unbridged.len(),
        "built route network"
    );
    Ok(RouteNetwork {
        routes,
        direct_routes,
        bridge_routes,
        components_before_bridging,
        unbridged_components: unbridged,
    })
}

/// Unordered index pairs `(i, j)` with `i < j` whose squared distance is at
/// most `max_range^2`, in discovery order.
fn candidate_pairs(
    systems: &[OikumeneSystem],
    max_range: u32,
) -> Result<Vec<(usize, usize)>, RouteError> {
    let mut hash = SpatialHash::new(i64::from(max_range))?;
    for (i, s) in systems.iter().enumerate() {
        hash.insert(i, s.x, s.y);
    }

    let range_sq = i64::from(max_range) * i64::from(max_range);
    let mut seen = BTreeSet::new();
    let mut pairs = Vec::new();
    for (i, s) in systems.iter().enumerate() {
        for j in hash.query_radius(s.x, s.y, max_range) {
            if j <= i {
                continue;
            }
            let other = &systems[j];
            if s.position().distance_sq(other.position()) > range_sq {
                continue;
            }
            if seen.insert(Route::pair_key(&s.id, &other.id)) {
                pairs.push((i, j));
            }
        }
    }
    Ok(pairs)
}

/// Orient a search result so `origin_id < destination_id`.
fn canonical_route(
    from: &OikumeneSystem,
    to: &OikumeneSystem,
    result: PathResult,
    kind: RouteKind,
) -> Route {
    let PathResult {
        mut path,
        total_cost,
    } = result;
    let (origin, destination) = if from.id <= to.id {
        (from, to)
    } else {
        path.reverse();
        (to, from)
    };
    Route {
        origin_id: origin.id.clone(),
        destination_id: destination.id.clone(),
        cost: total_cost,
        path,
        kind,
    }
}

/// Connected components of the route graph as sorted index lists, ordered
/// by their smallest member.
pub fn connected_components(systems: &[OikumeneSystem], routes: &[Route]) -> Vec<Vec<usize>> {
    let index: BTreeMap<&str, usize> = systems
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let mut adjacency = vec![Vec::new(); systems.len()];
    for route in routes {
        let (Some(&a), Some(&b)) = (
            index.get(route.origin_id.as_str()),
            index.get(route.destination_id.as_str()),
        ) else {
            continue;
        };
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut visited = vec![false; systems.len()];
    let mut components = Vec::new();
    for start in 0..systems.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// The globally closest pair `(a in main, b in other)`. Both lists must be
/// non-empty and sorted; ties keep the first pair found.
fn closest_pair(systems: &[OikumeneSystem], main: &[usize], other: &[usize]) -> (usize, usize) {
    let mut best = (main[0], other[0]);
    let mut best_d2 = i64::MAX;
    for &a in main {
        let pa = systems[a].position();
        for &b in other {
            let d2 = pa.distance_sq(systems[b].position());
            if d2 < best_d2 {
                best_d2 = d2;
                best = (a, b);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_map::Quantization;
    use crate::types::Coordinate;
    use starlanes_prng::GameRng;

    fn quant(w: u32, h: u32) -> Quantization {
        Quantization {
            min_cost: 1,
            max_cost: 100,
            grid_origin_x: 0,
            grid_origin_y: 0,
            grid_width: w,
            grid_height: h,
        }
    }

    fn open_map(w: u32, h: u32) -> CostMap {
        CostMap::uniform(quant(w, h)).unwrap()
    }

    /// Open grid with a full-height column of max-cost cells at `wall_x`.
    fn walled_map(w: u32, h: u32, wall_x: u32) -> CostMap {
        let data = (0..w * h)
            .map(|i| if i % w == wall_x { 100 } else { 1 })
            .collect();
        CostMap::new(data, quant(w, h)).unwrap()
    }

    fn sys(id: &str, x: i32, y: i32) -> OikumeneSystem {
        OikumeneSystem::new(id, x, y)
    }

    fn range(max_range: u32) -> RouteConfig {
        RouteConfig {
            max_range,
            ..RouteConfig::default()
        }
    }

    fn keys(network: &RouteNetwork) -> Vec<String> {
        network.routes.iter().map(Route::key).collect()
    }

    #[test]
    fn two_systems_one_route() {
        let systems = [sys("a", 10, 10), sys("b", 20, 10)];
        let network = build_routes(&systems, &open_map(40, 30), &range(100)).unwrap();
        assert_eq!(network.routes.len(), 1);
        let route = &network.routes[0];
        assert!(route.cost > 0);
        assert_eq!(route.origin_id, "a");
        assert_eq!(route.destination_id, "b");
        assert_eq!(route.path.first(), Some(&Coordinate::new(10, 10)));
        assert_eq!(route.path.last(), Some(&Coordinate::new(20, 10)));
        assert_eq!(route.kind, RouteKind::Direct);
    }

    #[test]
    fn chain_connects_through_middle_system() {
        let systems = [sys("a", 10, 10), sys("b", 20, 10), sys("c", 30, 10)];
        let network = build_routes(&systems, &open_map(50, 30), &range(15)).unwrap();
        assert_eq!(keys(&network), ["a|b", "b|c"]);
        assert_eq!(network.direct_routes, 2);
        assert_eq!(network.bridge_routes, 0);
        assert_eq!(network.components_before_bridging, 1);
        assert_eq!(connected_components(&systems, &network.routes).len(), 1);
    }

    #[test]
    fn reversed_search_is_canonicalized() {
        // Index order runs zeta -> alpha, so the search starts at zeta.
        let systems = [sys("zeta", 10, 10), sys("alpha", 20, 13)];
        let network = build_routes(&systems, &open_map(40, 30), &range(50)).unwrap();
        let route = &network.routes[0];
        assert_eq!(route.origin_id, "alpha");
        assert_eq!(route.destination_id, "zeta");
        assert_eq!(route.path.first(), Some(&Coordinate::new(20, 13)));
        assert_eq!(route.path.last(), Some(&Coordinate::new(10, 10)));

        let mut forward = route.path.clone();
        forward.reverse();
        let direct = Pathfinder::new(&open_map(40, 30))
            .find_path(Coordinate::new(10, 10), Coordinate::new(20, 13))
            .unwrap();
        assert_eq!(forward, direct.path);
    }

    #[test]
    fn fewer_than_two_systems_yield_nothing() {
        let map = open_map(10, 10);
        let none = build_routes(&[], &map, &range(5)).unwrap();
        assert!(none.routes.is_empty());
        assert_eq!(none.components_before_bridging, 0);
        let one = build_routes(&[sys("a", 1, 1)], &map, &range(5)).unwrap();
        assert!(one.routes.is_empty());
        assert_eq!(one.components_before_bridging, 1);
    }

    #[test]
    fn identical_positions_give_zero_cost_route() {
        let systems = [sys("a", 4, 4), sys("b", 4, 4)];
        let network = build_routes(&systems, &open_map(10, 10), &range(5)).unwrap();
        assert_eq!(network.routes.len(), 1);
        assert_eq!(network.routes[0].cost, 0);
        assert_eq!(network.routes[0].path, vec![Coordinate::new(4, 4)]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let systems = [sys("a", 1, 1), sys("a", 5, 5)];
        assert_eq!(
            build_routes(&systems, &open_map(10, 10), &range(5)),
            Err(RouteError::DuplicateSystemId("a".to_string()))
        );
    }

    #[test]
    fn distant_clusters_are_bridged() {
        let systems = [
            sys("a", 5, 5),
            sys("b", 10, 5),
            sys("c", 60, 5),
            sys("d", 65, 5),
        ];
        let network = build_routes(&systems, &open_map(80, 20), &range(10)).unwrap();
        assert_eq!(network.components_before_bridging, 2);
        assert_eq!(network.direct_routes, 2);
        assert_eq!(network.bridge_routes, 1);
        let bridge = &network.routes[2];
        assert_eq!(bridge.kind, RouteKind::Bridge);
        // The closest cross pair is b-c.
        assert_eq!(bridge.key(), "b|c");
        assert_eq!(bridge.cost, 50);
        assert!(network.is_connected());
        assert_eq!(connected_components(&systems, &network.routes).len(), 1);
    }

    #[test]
    fn unbridgeable_component_is_recorded_or_fatal() {
        let systems = [sys("a", 5, 5), sys("b", 8, 5), sys("c", 40, 5)];
        let map = walled_map(50, 12, 20);
        let mut config = RouteConfig {
            max_range: 10,
            impassable_cost: Some(100),
            bridge_failure: BridgeFailurePolicy::Tolerate,
        };

        let network = build_routes(&systems, &map, &config).unwrap();
        assert_eq!(keys(&network), ["a|b"]);
        assert_eq!(network.unbridged_components, vec![vec!["c".to_string()]]);
        assert!(!network.is_connected());

        config.bridge_failure = BridgeFailurePolicy::Fail;
        assert_eq!(
            build_routes(&systems, &map, &config),
            Err(RouteError::Disconnected {
                count: 1,
                components: vec![vec!["c".to_string()]],
            })
        );
    }

    #[test]
    fn out_of_grid_system_never_gets_a_route() {
        let systems = [sys("a", 2, 2), sys("b", 5, 2), sys("far", 500, 2)];
        let network = build_routes(&systems, &open_map(20, 20), &range(600)).unwrap();
        assert_eq!(keys(&network), ["a|b"]);
        assert_eq!(network.unbridged_components, vec![vec!["far".to_string()]]);
    }

    #[test]
    fn random_field_has_unique_canonical_routes() {
        let mut rng = GameRng::new(2024);
        let systems: Vec<_> = (0..60)
            .map(|i| {
                sys(
                    &format!("S{i:02}"),
                    rng.range_i64_inclusive(0, 99) as i32,
                    rng.range_i64_inclusive(0, 99) as i32,
                )
            })
            .collect();
        let network = build_routes(&systems, &open_map(100, 100), &range(20)).unwrap();

        let mut seen = BTreeSet::new();
        for route in &network.routes {
            assert!(route.origin_id < route.destination_id);
            assert!(seen.insert(route.key()), "duplicate route {}", route.key());
        }
        assert!(network.is_connected());
        assert_eq!(connected_components(&systems, &network.routes).len(), 1);
    }
}
