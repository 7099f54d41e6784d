#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the UHI greening engine.
//!
//! This crate defines the plain data that flows between the grid builder,
//! the pure scoring systems, and the outward adapters. A caller describes the
//! area of interest with a [`BoundingBox`], the grid crate subdivides it into
//! [`Cell`] values, the signal and fusion systems produce index-aligned score
//! arrays, and the site selector reduces those scores to a list of
//! [`Recommendation`] values. Nothing in here performs I/O or holds state
//! between requests.

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
mod normalize;

pub use error::{EngineError, InputError};
pub use normalize::{normalize_min_max, Normalization};

/// Conversion factor applied to planar degree distances.
///
/// The factor is latitude independent, so east-west distances are
/// overestimated away from the equator. Recorded scenarios depend on it.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Number of cells per axis used when a request does not specify one.
pub const DEFAULT_GRID_SIZE: u32 = 50;

/// Largest accepted number of cells per axis.
///
/// Keeps a single request to at most one million cells, so an oversized grid
/// is rejected before any allocation.
pub const MAX_GRID_SIZE: u32 = 1_000;

/// Seed used when a request does not specify one.
pub const DEFAULT_SEED: u64 = 42;

/// Maximum number of recommendations returned when a request does not specify one.
pub const DEFAULT_TOP_K: u32 = 10;

/// Minimum separation between recommendations used when a request does not specify one.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 200.0;

/// Ordered per-cell values, index-aligned with the grid that produced them.
pub type SignalArray = Vec<f64>;

/// Rectangular area of interest expressed in geographic degrees.
///
/// Construction guarantees `min_x < max_x` and `min_y < max_y` with every
/// coordinate finite, so downstream systems never see a degenerate area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundingBoxFields", into = "BoundingBoxFields")]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Creates a bounding box after validating its extent.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, EngineError> {
        for value in [min_x, min_y, max_x, max_y] {
            if !value.is_finite() {
                return Err(InputError::NonFiniteCoordinate { value }.into());
            }
        }

        if min_x >= max_x || min_y >= max_y {
            return Err(InputError::DegenerateBoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            }
            .into());
        }

        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Western edge of the box (minimum longitude).
    #[must_use]
    pub const fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Southern edge of the box (minimum latitude).
    #[must_use]
    pub const fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Eastern edge of the box (maximum longitude).
    #[must_use]
    pub const fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Northern edge of the box (maximum latitude).
    #[must_use]
    pub const fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Planar area of the box in square degrees.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoundingBoxFields {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl TryFrom<BoundingBoxFields> for BoundingBox {
    type Error = EngineError;

    fn try_from(fields: BoundingBoxFields) -> Result<Self, Self::Error> {
        Self::new(fields.minx, fields.miny, fields.maxx, fields.maxy)
    }
}

impl From<BoundingBox> for BoundingBoxFields {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            minx: bbox.min_x,
            miny: bbox.min_y,
            maxx: bbox.max_x,
            maxy: bbox.max_y,
        }
    }
}

/// Stable identifier assigned to a grid cell.
///
/// Identifiers follow the grid scan order, so they double as indices into
/// every [`SignalArray`] derived from the same grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the cell inside index-aligned arrays.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic position expressed as longitude/latitude degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// East-west coordinate in degrees.
    pub longitude: f64,
    /// North-south coordinate in degrees.
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a new point from longitude and latitude degrees.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Axis-aligned rectangle occupied by a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    /// Western edge in degrees.
    pub min_x: f64,
    /// Southern edge in degrees.
    pub min_y: f64,
    /// Eastern edge in degrees.
    pub max_x: f64,
    /// Northern edge in degrees.
    pub max_y: f64,
}

impl CellBounds {
    /// Creates a rectangle from its edges.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Planar area of the rectangle in square degrees.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// Geometric centre of the rectangle.
    #[must_use]
    pub fn centroid(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Closed exterior ring, counter-clockwise from the south-east corner.
    #[must_use]
    pub const fn exterior_ring(&self) -> [[f64; 2]; 5] {
        [
            [self.max_x, self.min_y],
            [self.max_x, self.max_y],
            [self.min_x, self.max_y],
            [self.min_x, self.min_y],
            [self.max_x, self.min_y],
        ]
    }
}

/// One rectangular subdivision of the bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    bounds: CellBounds,
}

impl Cell {
    /// Creates a cell from its identifier and rectangle.
    #[must_use]
    pub const fn new(id: CellId, bounds: CellBounds) -> Self {
        Self { id, bounds }
    }

    /// Identifier assigned by the grid scan.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Rectangle covered by the cell.
    #[must_use]
    pub const fn bounds(&self) -> CellBounds {
        self.bounds
    }

    /// Candidate planting location for the cell.
    #[must_use]
    pub fn centroid(&self) -> GeoPoint {
        self.bounds.centroid()
    }
}

/// Simulated environmental layers that feed the composite heat score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLayer {
    /// Land-surface temperature proxy.
    SurfaceTemperature,
    /// Built-up density proxy.
    BuildingDensity,
    /// Traffic intensity proxy.
    Traffic,
}

impl SignalLayer {
    /// Every layer in the order the scoring pipeline simulates them.
    pub const ALL: [SignalLayer; 3] = [
        SignalLayer::SurfaceTemperature,
        SignalLayer::BuildingDensity,
        SignalLayer::Traffic,
    ];

    /// Offset added to the request seed when simulating this layer.
    #[must_use]
    pub const fn seed_offset(self) -> u64 {
        match self {
            Self::SurfaceTemperature => 0,
            Self::BuildingDensity => 1,
            Self::Traffic => 2,
        }
    }

    /// Seed used for this layer given the request seed.
    #[must_use]
    pub const fn seed_for(self, request_seed: u64) -> u64 {
        request_seed.wrapping_add(self.seed_offset())
    }

    /// Scale and bias applied to the raw normal draws of this layer.
    #[must_use]
    pub const fn default_tuning(self) -> LayerTuning {
        match self {
            Self::SurfaceTemperature => LayerTuning::new(1.5, 1.0),
            Self::BuildingDensity => LayerTuning::new(1.0, 0.5),
            Self::Traffic => LayerTuning::new(0.8, 0.2),
        }
    }

    /// Property name used when the layer is exported.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SurfaceTemperature => "surface_temp",
            Self::BuildingDensity => "building_density",
            Self::Traffic => "traffic",
        }
    }
}

impl fmt::Display for SignalLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Affine transform applied to standard-normal draws before normalization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerTuning {
    /// Multiplier applied to each draw.
    pub scale: f64,
    /// Offset added after scaling.
    pub bias: f64,
}

impl LayerTuning {
    /// Creates a tuning from its scale and bias.
    #[must_use]
    pub const fn new(scale: f64, bias: f64) -> Self {
        Self { scale, bias }
    }
}

/// Fixed weights combining the three layers into the composite heat score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight applied to the surface temperature layer.
    pub surface_temp: f64,
    /// Weight applied to the building density layer.
    pub building_density: f64,
    /// Weight applied to the traffic layer.
    pub traffic: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            surface_temp: 0.6,
            building_density: 0.25,
            traffic: 0.15,
        }
    }
}

/// Selected planting location derived from a high-scoring cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Cell the recommendation was drawn from.
    pub cell_id: CellId,
    /// Centroid of that cell.
    pub location: GeoPoint,
    /// Composite heat score of that cell.
    pub score: f64,
}
