use thiserror::Error;

/// Failures surfaced by the scoring engine.
///
/// Every failure is deterministic: retrying the same request fails the same way.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    /// The caller supplied a request the engine cannot evaluate.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// Two arrays that must be index-aligned have different lengths.
    #[error("{array} has {actual} values but {expected} were expected")]
    DimensionMismatch {
        /// Name of the array that did not match.
        array: &'static str,
        /// Length every aligned array must share.
        expected: usize,
        /// Length that was observed.
        actual: usize,
    },
}

/// Specific reasons a request was rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InputError {
    /// A bounding box edge was NaN or infinite.
    #[error("bounding box coordinate {value} is not finite")]
    NonFiniteCoordinate {
        /// Offending coordinate.
        value: f64,
    },
    /// The bounding box has zero or negative width or height.
    #[error(
        "bounding box [{min_x}, {min_y}, {max_x}, {max_y}] must satisfy minx < maxx and miny < maxy"
    )]
    DegenerateBoundingBox {
        /// Western edge.
        min_x: f64,
        /// Southern edge.
        min_y: f64,
        /// Eastern edge.
        max_x: f64,
        /// Northern edge.
        max_y: f64,
    },
    /// The grid must contain at least one cell per axis.
    #[error("grid size must be at least 1, got {grid_size}")]
    GridSizeTooSmall {
        /// Requested cells per axis.
        grid_size: u32,
    },
    /// The grid exceeds the largest supported number of cells per axis.
    #[error("grid size {grid_size} exceeds the maximum of {max_grid_size}")]
    GridSizeTooLarge {
        /// Requested cells per axis.
        grid_size: u32,
        /// Largest accepted cells per axis.
        max_grid_size: u32,
    },
    /// A layer scale or bias was NaN or infinite.
    #[error("layer tuning scale={scale}, bias={bias} must be finite")]
    NonFiniteTuning {
        /// Requested scale.
        scale: f64,
        /// Requested bias.
        bias: f64,
    },
    /// A finite layer tuning pushed a transformed draw outside the finite range.
    #[error("layer tuning scale={scale}, bias={bias} overflows the signal range")]
    TuningOverflow {
        /// Requested scale.
        scale: f64,
        /// Requested bias.
        bias: f64,
    },
    /// The minimum separation was below zero.
    #[error("minimum distance must be non-negative, got {min_distance_m} m")]
    NegativeMinDistance {
        /// Requested separation in meters.
        min_distance_m: f64,
    },
    /// The minimum separation was NaN or infinite.
    #[error("minimum distance {min_distance_m} m is not finite")]
    NonFiniteMinDistance {
        /// Requested separation in meters.
        min_distance_m: f64,
    },
    /// A composite score handed to the selector was NaN or infinite.
    #[error("score {score} for cell {cell} is not finite")]
    NonFiniteScore {
        /// Position of the score in the array.
        cell: usize,
        /// Offending score.
        score: f64,
    },
}
