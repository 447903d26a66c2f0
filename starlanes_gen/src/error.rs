// Error types for the generator.
//
// Generation itself is infallible once the inputs are valid: unreachable
// pairs and out-of-grid systems are ordinary outcomes (a `None` from the
// pathfinder), not errors. What can fail is input validation, building a
// `CostMap` from a buffer that breaks its invariants, and the route
// builder's identity/connectivity checks.

use thiserror::Error;

/// A configuration value that cannot drive a generation run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("galaxy must have at least one arm")]
    NoArms,

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("`{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("galaxy sweep of {value} degrees exceeds the {max}-degree limit")]
    SweepTooLarge { value: f64, max: f64 },

    #[error("cost range is empty or includes zero: min_cost={min_cost}, max_cost={max_cost}")]
    InvalidCostRange { min_cost: u8, max_cost: u8 },

    #[error("fill probability must lie in [0, 1], got {0}")]
    FillProbability(f64),

    #[error("malformed cellular-automata rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: &'static str },

    #[error("noise layer `{0}` must have at least one octave")]
    NoOctaves(&'static str),

    #[error("route max_range must be positive")]
    ZeroRange,

    #[error("spatial hash cell size must be positive, got {0}")]
    InvalidCellSize(i64),

    #[error("cost grid {width}x{height} exceeds the {max_cells}-cell limit")]
    GridTooLarge {
        width: u64,
        height: u64,
        max_cells: u64,
    },

    #[error("cost grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: i64, height: i64 },
}

/// A cost buffer that violates the `CostMap` invariants.
#[derive(Debug, Error, PartialEq)]
pub enum CostMapError {
    #[error("buffer holds {actual} bytes but the grid is {width}x{height}")]
    LengthMismatch {
        actual: usize,
        width: u32,
        height: u32,
    },

    #[error("cell {index} has cost {value}, outside [{min_cost}, {max_cost}]")]
    CostOutOfRange {
        index: usize,
        value: u8,
        min_cost: u8,
        max_cost: u8,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures of the route builder.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("system id `{0}` appears more than once")]
    DuplicateSystemId(String),

    #[error("{count} component(s) could not be bridged to the main network")]
    Disconnected {
        count: usize,
        components: Vec<Vec<String>>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Any failure of a full generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid cost map: {0}")]
    CostMap(#[from] CostMapError),

    #[error("route building failed: {0}")]
    Route(#[from] RouteError),
}
