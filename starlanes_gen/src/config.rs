// Data-driven generation configuration.
//
// Every tunable parameter of a generation run lives in `UniverseConfig`,
// loaded from JSON by the CLI and never mutated during the run. Each stage
// reads only its own sub-config:
//
// - `GalaxyConfig`:    spiral-arm starfield shape (`starfield.rs`).
// - `OikumeneConfig`:  which systems form the inhabited core (`catalog.rs`).
// - `CostMapConfig`:   grid extent and cost composition (`cost_map.rs`).
// - `PerlinConfig`:    the base and wall noise layers (`noise.rs`).
// - `CaConfig`:        wall consolidation by cellular automata (`automata.rs`).
// - `RouteConfig`:     direct-route range and bridge policy (`routes.rs`).
//
// `Default` impls form a playable preset: a four-arm galaxy of a few
// thousand stars with an Oikumene of ~120 systems.
//
// **Critical constraint: determinism.** Config values feed directly into
// generation. The same config and seed must always reproduce the same
// universe, so nothing here may be derived from time or environment.

use crate::automata::CaRule;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest cost grid a run may allocate (64 Mi cells).
pub const MAX_GRID_CELLS: u64 = 64 * 1024 * 1024;

/// Longest spiral-arm sweep in degrees (one hundred turns).
pub const MAX_SWEEP_DEG: f64 = 36_000.0;

// ---------------------------------------------------------------------------
// Starfield
// ---------------------------------------------------------------------------

/// Shape of the spiral galaxy. Distances are in galaxy units; `multiplier`
/// converts them to world units (cost-grid cells) at the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalaxyConfig {
    /// Galaxy center in galaxy units.
    pub center: (f64, f64),
    /// Spiral extent along each axis at the end of the sweep.
    pub size: (f64, f64),
    /// Global rotation applied to every arm (radians).
    pub turn: f64,
    /// Angular sweep of each arm in degrees.
    pub deg: f64,
    /// Scale applied to the raw spiral radius.
    pub dyn_size_factor: f64,
    /// Stars-per-cloud multiplier.
    pub spc_factor: f64,
    /// Number of spiral arms.
    pub arms: u32,
    /// Galaxy-to-world scale factor.
    pub multiplier: f64,
    /// Stop producing coordinates after this many. `None` = no cap.
    pub limit: Option<usize>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            size: (100.0, 100.0),
            turn: 0.0,
            deg: 720.0,
            dyn_size_factor: 1.0,
            spc_factor: 0.5,
            arms: 4,
            multiplier: 4.0,
            limit: None,
        }
    }
}

impl GalaxyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arms == 0 {
            return Err(ConfigError::NoArms);
        }
        require_finite(&[
            ("center.0", self.center.0),
            ("center.1", self.center.1),
            ("turn", self.turn),
            ("dyn_size_factor", self.dyn_size_factor),
            ("spc_factor", self.spc_factor),
        ])?;
        let positive = [
            ("deg", self.deg),
            ("multiplier", self.multiplier),
            ("size.0", self.size.0),
            ("size.1", self.size.1),
        ];
        for (field, value) in positive {
            // `!(v > 0)` also rejects NaN.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        require_finite(&positive)?;
        // An arm walks its sweep in 1-5 degree steps; past this the walk
        // never ends in practice and every cloud is empty.
        if self.deg > MAX_SWEEP_DEG {
            return Err(ConfigError::SweepTooLarge {
                value: self.deg,
                max: MAX_SWEEP_DEG,
            });
        }
        Ok(())
    }
}

/// Reject NaN and infinities.
fn require_finite(fields: &[(&'static str, f64)]) -> Result<(), ConfigError> {
    for &(field, value) in fields {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { field, value });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Oikumene selection
// ---------------------------------------------------------------------------

/// Selects the inhabited core. All radii are world units measured from the
/// galaxy center (after `multiplier` scaling).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OikumeneConfig {
    /// Systems closer to the center than this are never inhabited
    /// (the crowded, radiation-heavy core).
    pub core_exclusion_radius: f64,
    /// Systems farther out than this are never inhabited.
    pub rim_exclusion_radius: f64,
    /// Maximum distance from the Oikumene anchor system.
    pub cluster_radius: f64,
    /// Maximum number of Oikumene systems.
    pub target_count: usize,
}

impl OikumeneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radii = [
            ("core_exclusion_radius", self.core_exclusion_radius),
            ("rim_exclusion_radius", self.rim_exclusion_radius),
            ("cluster_radius", self.cluster_radius),
        ];
        require_finite(&radii)?;
        for (field, value) in radii {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}

impl Default for OikumeneConfig {
    fn default() -> Self {
        Self {
            core_exclusion_radius: 40.0,
            rim_exclusion_radius: 300.0,
            cluster_radius: 150.0,
            target_count: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// Cost map
// ---------------------------------------------------------------------------

/// An explicit world-space rectangle for the cost grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRect {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
}

/// Controls the traversal-cost grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMapConfig {
    /// Fixed grid extent. `None` fits the grid to the cataloged systems'
    /// bounding box expanded by `padding`.
    pub grid: Option<GridRect>,
    /// Cells of margin around the systems' bounding box.
    pub padding: i32,
    /// Lowest quantized cost (open space). Must be at least 1.
    pub min_cost: u8,
    /// Highest quantized cost (dense walls).
    pub max_cost: u8,
    /// Constant cost of every cell.
    pub base_cost: f64,
    /// Extra cost scaled by the base noise layer.
    pub base_noise_weight: f64,
    /// Extra constant cost of wall cells.
    pub wall_cost: f64,
    /// Extra wall cost scaled by the wall noise layer.
    pub wall_noise_weight: f64,
}

impl Default for CostMapConfig {
    fn default() -> Self {
        Self {
            grid: None,
            padding: 16,
            min_cost: 1,
            max_cost: 100,
            base_cost: 1.0,
            base_noise_weight: 2.0,
            wall_cost: 8.0,
            wall_noise_weight: 4.0,
        }
    }
}

impl CostMapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_cost_range(self.min_cost, self.max_cost)?;
        let weights = [
            ("base_cost", self.base_cost),
            ("base_noise_weight", self.base_noise_weight),
            ("wall_cost", self.wall_cost),
            ("wall_noise_weight", self.wall_noise_weight),
        ];
        require_finite(&weights)?;
        for (field, value) in weights {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if let Some(rect) = self.grid {
            validate_grid_size(i64::from(rect.width), i64::from(rect.height))?;
        }
        Ok(())
    }

    /// The cost of a cell before quantization can never exceed this.
    pub fn cost_ceiling(&self) -> f64 {
        self.base_cost + self.base_noise_weight + self.wall_cost + self.wall_noise_weight
    }
}

pub(crate) fn validate_cost_range(min_cost: u8, max_cost: u8) -> Result<(), ConfigError> {
    if min_cost == 0 || min_cost > max_cost {
        return Err(ConfigError::InvalidCostRange { min_cost, max_cost });
    }
    Ok(())
}

pub(crate) fn validate_grid_size(width: i64, height: i64) -> Result<(), ConfigError> {
    if width <= 0 || height <= 0 {
        return Err(ConfigError::EmptyGrid { width, height });
    }
    let (w, h) = (width as u64, height as u64);
    if w.saturating_mul(h) > MAX_GRID_CELLS {
        return Err(ConfigError::GridTooLarge {
            width: w,
            height: h,
            max_cells: MAX_GRID_CELLS,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Noise and cellular automata
// ---------------------------------------------------------------------------

/// One fractal noise layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseLayer {
    /// Base frequency in cycles per world unit.
    pub frequency: f64,
    /// Number of fractal octaves summed.
    pub octaves: u32,
}

/// The two noise layers feeding the cost map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerlinConfig {
    /// Open-terrain variation.
    pub base: NoiseLayer,
    /// Barrier density; also biases the cellular-automata seed fill.
    pub wall: NoiseLayer,
}

impl Default for PerlinConfig {
    fn default() -> Self {
        Self {
            base: NoiseLayer {
                frequency: 0.02,
                octaves: 4,
            },
            wall: NoiseLayer {
                frequency: 0.05,
                octaves: 3,
            },
        }
    }
}

impl PerlinConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite(&[
            ("base.frequency", self.base.frequency),
            ("wall.frequency", self.wall.frequency),
        ])?;
        if self.base.octaves == 0 {
            return Err(ConfigError::NoOctaves("base"));
        }
        if self.wall.octaves == 0 {
            return Err(ConfigError::NoOctaves("wall"));
        }
        Ok(())
    }
}

/// Cellular-automata pass that consolidates scattered wall cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaConfig {
    /// Base probability that a cell starts as wall.
    pub fill_probability: f64,
    /// Number of synchronous update rounds.
    pub iterations: u32,
    /// Life-like rule in `B<digits>/S<digits>` notation.
    pub rule: String,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            fill_probability: 0.45,
            iterations: 4,
            rule: "B5678/S45678".to_string(),
        }
    }
}

impl CaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fill_probability) {
            return Err(ConfigError::FillProbability(self.fill_probability));
        }
        CaRule::parse(&self.rule)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// What to do when a disconnected component cannot be bridged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeFailurePolicy {
    /// Leave the component disconnected, record it, and log a warning.
    #[default]
    Tolerate,
    /// Abort route building with `RouteError::Disconnected`.
    Fail,
}

/// Controls route candidacy and connectivity repair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Euclidean distance ceiling for direct routes (world units).
    pub max_range: u32,
    /// Cells whose cost is at or above this value are impassable.
    #[serde(default)]
    pub impassable_cost: Option<u8>,
    #[serde(default)]
    pub bridge_failure: BridgeFailurePolicy,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            max_range: 30,
            impassable_cost: None,
            bridge_failure: BridgeFailurePolicy::Tolerate,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_range == 0 {
            return Err(ConfigError::ZeroRange);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything one generation run needs. Loaded from JSON, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseConfig {
    /// Run seed. The starfield draws from `seed`, the cost map from
    /// `"{seed}:costmap"`.
    pub seed: String,
    #[serde(default)]
    pub galaxy: GalaxyConfig,
    #[serde(default)]
    pub cost_map: CostMapConfig,
    #[serde(default)]
    pub perlin: PerlinConfig,
    #[serde(default)]
    pub cellular_automata: CaConfig,
    #[serde(default)]
    pub oikumene: OikumeneConfig,
    #[serde(default)]
    pub routes: RouteConfig,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            seed: "oikumene".to_string(),
            galaxy: GalaxyConfig::default(),
            cost_map: CostMapConfig::default(),
            perlin: PerlinConfig::default(),
            cellular_automata: CaConfig::default(),
            oikumene: OikumeneConfig::default(),
            routes: RouteConfig::default(),
        }
    }
}

impl UniverseConfig {
    /// Check every sub-config. Called once before generation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.galaxy.validate()?;
        self.cost_map.validate()?;
        self.perlin.validate()?;
        self.cellular_automata.validate()?;
        self.oikumene.validate()?;
        self.routes.validate()?;
        Ok(())
    }

    /// Seed string for the cost-map PRNG stream.
    pub fn cost_map_seed(&self) -> String {
        format!("{}:costmap", self.seed)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(UniverseConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_config_serializes() {
        let config = UniverseConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = UniverseConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn config_loads_from_partial_json() {
        let json = r#"{
            "seed": "tau-ceti",
            "galaxy": {
                "center": [10.0, -5.0],
                "size": [80.0, 60.0],
                "turn": 0.5,
                "deg": 540.0,
                "dynSizeFactor": 1.2,
                "spcFactor": 0.8,
                "arms": 3,
                "multiplier": 2.0,
                "limit": 1500
            },
            "routes": { "maxRange": 45, "bridgeFailure": "fail" }
        }"#;
        let config = UniverseConfig::from_json(json).unwrap();
        assert_eq!(config.seed, "tau-ceti");
        assert_eq!(config.galaxy.arms, 3);
        assert_eq!(config.galaxy.limit, Some(1500));
        assert_eq!(config.routes.max_range, 45);
        assert_eq!(config.routes.bridge_failure, BridgeFailurePolicy::Fail);
        assert_eq!(config.routes.impassable_cost, None);
        // Omitted sections fall back to defaults.
        assert_eq!(config.cellular_automata, CaConfig::default());
        assert_eq!(config.cost_map_seed(), "tau-ceti:costmap");
    }

    #[test]
    fn rejects_bad_galaxy() {
        let mut config = UniverseConfig::default();
        config.galaxy.arms = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoArms));

        let mut config = UniverseConfig::default();
        config.galaxy.deg = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "deg", .. })
        ));

        let mut config = UniverseConfig::default();
        config.galaxy.deg = f64::INFINITY;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "deg",
                value: f64::INFINITY
            })
        );

        let mut config = UniverseConfig::default();
        config.galaxy.deg = 1e300;
        assert_eq!(
            config.validate(),
            Err(ConfigError::SweepTooLarge {
                value: 1e300,
                max: MAX_SWEEP_DEG
            })
        );

        // The cap itself is still a valid sweep.
        let mut config = UniverseConfig::default();
        config.galaxy.deg = MAX_SWEEP_DEG;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_finite_galaxy_shape() {
        let cases: [(&str, fn(&mut GalaxyConfig)); 7] = [
            ("spc_factor", |g| g.spc_factor = f64::INFINITY),
            ("dyn_size_factor", |g| g.dyn_size_factor = f64::NEG_INFINITY),
            ("center.0", |g| g.center.0 = f64::NAN),
            ("center.1", |g| g.center.1 = f64::INFINITY),
            ("turn", |g| g.turn = f64::NAN),
            ("multiplier", |g| g.multiplier = f64::INFINITY),
            ("size.1", |g| g.size.1 = f64::INFINITY),
        ];
        for (expected, corrupt) in cases {
            let mut config = UniverseConfig::default();
            corrupt(&mut config.galaxy);
            match config.validate() {
                Err(ConfigError::NonFinite { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: expected NonFinite, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_weights_and_radii_name_the_field() {
        let mut config = UniverseConfig::default();
        config.cost_map.base_cost = -1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Negative {
                field: "base_cost",
                value: -1.0
            }
        );
        assert_eq!(err.to_string(), "`base_cost` must not be negative, got -1");

        // Zero weights are allowed.
        let mut config = UniverseConfig::default();
        config.cost_map.wall_noise_weight = 0.0;
        assert_eq!(config.validate(), Ok(()));

        let mut config = UniverseConfig::default();
        config.cost_map.wall_cost = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "wall_cost", .. })
        ));

        let mut config = UniverseConfig::default();
        config.oikumene.cluster_radius = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "cluster_radius", .. })
        ));

        let mut config = UniverseConfig::default();
        config.perlin.wall.frequency = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "wall.frequency", .. })
        ));
    }

    #[test]
    fn config_keys_are_camel_case() {
        let json = serde_json::to_value(UniverseConfig::default()).unwrap();
        assert!(json["galaxy"]["dynSizeFactor"].is_number());
        assert!(json["galaxy"].get("dyn_size_factor").is_none());
        assert!(json["cellularAutomata"]["fillProbability"].is_number());
        assert!(json["costMap"]["wallNoiseWeight"].is_number());
        assert!(json["oikumene"]["coreExclusionRadius"].is_number());
        assert_eq!(json["routes"]["maxRange"], 30);
    }

    #[test]
    fn rejects_zero_min_cost() {
        let mut config = UniverseConfig::default();
        config.cost_map.min_cost = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCostRange {
                min_cost: 0,
                max_cost: 100
            })
        );
    }

    #[test]
    fn rejects_bad_rule_and_probability() {
        let mut config = UniverseConfig::default();
        config.cellular_automata.rule = "B9/S1".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRule { .. })));

        let mut config = UniverseConfig::default();
        config.cellular_automata.fill_probability = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::FillProbability(1.5)));
    }

    #[test]
    fn rejects_oversized_grid() {
        let mut config = UniverseConfig::default();
        config.cost_map.grid = Some(GridRect {
            origin_x: 0,
            origin_y: 0,
            width: 100_000,
            height: 100_000,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_zero_range() {
        let mut config = UniverseConfig::default();
        config.routes.max_range = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRange));
    }
}
