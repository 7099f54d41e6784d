#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Heatmap and recommendation operations composed from the pure systems.
//!
//! Every call builds a fresh [`Grid`], simulates the three signal layers with
//! seeds `seed`, `seed + 1` and `seed + 2`, fuses them into a composite heat
//! score, and (for recommendations) hands the scores to the site selector.
//! Nothing survives between calls apart from reusable scratch buffers, so
//! replaying a request always reproduces its output.

use serde::{Deserialize, Serialize};
use uhi_greening_core::{
    BoundingBox, CellBounds, CellId, EngineError, FusionWeights, LayerTuning, Recommendation,
    SignalArray, SignalLayer, DEFAULT_GRID_SIZE, DEFAULT_MIN_DISTANCE_M, DEFAULT_SEED,
    DEFAULT_TOP_K,
};
use uhi_greening_grid::Grid;
use uhi_greening_system_fusion::{LayerSignals, ScoreFusion};
use uhi_greening_system_signals::SignalSimulator;
use uhi_greening_system_site_selection::{SelectionCriteria, SiteSelector};

/// Input of the heatmap operation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatmapRequest {
    /// Area to score.
    pub bbox: BoundingBox,
    /// Cells per axis.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Seed of the surface temperature layer; the other layers follow it.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl HeatmapRequest {
    /// Creates a request using the default grid size and seed.
    #[must_use]
    pub const fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            grid_size: DEFAULT_GRID_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Input of the recommendation operation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRequest {
    /// Area to score.
    pub bbox: BoundingBox,
    /// Cells per axis.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Seed of the surface temperature layer; the other layers follow it.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Maximum number of sites to return.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Minimum separation in meters between returned sites.
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,
}

impl RecommendationRequest {
    /// Creates a request using the default grid size, seed, cap and separation.
    #[must_use]
    pub const fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            grid_size: DEFAULT_GRID_SIZE,
            seed: DEFAULT_SEED,
            top_k: DEFAULT_TOP_K,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }

    /// Heatmap request covering the same grid and seed.
    #[must_use]
    pub const fn heatmap(&self) -> HeatmapRequest {
        HeatmapRequest {
            bbox: self.bbox,
            grid_size: self.grid_size,
            seed: self.seed,
        }
    }

    fn criteria(&self) -> SelectionCriteria {
        let top_k = usize::try_from(self.top_k).unwrap_or(usize::MAX);
        SelectionCriteria::new(top_k, self.min_distance_m)
    }
}

const fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

const fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

const fn default_min_distance_m() -> f64 {
    DEFAULT_MIN_DISTANCE_M
}

/// Layer tunings and fusion weights applied by [`Scenario`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Scale and bias of the surface temperature layer.
    pub surface_temp: LayerTuning,
    /// Scale and bias of the building density layer.
    pub building_density: LayerTuning,
    /// Scale and bias of the traffic layer.
    pub traffic: LayerTuning,
    /// Weights combining the layers.
    pub weights: FusionWeights,
}

impl ScenarioConfig {
    /// Tuning applied to `layer`.
    #[must_use]
    pub const fn tuning(&self, layer: SignalLayer) -> LayerTuning {
        match layer {
            SignalLayer::SurfaceTemperature => self.surface_temp,
            SignalLayer::BuildingDensity => self.building_density,
            SignalLayer::Traffic => self.traffic,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            surface_temp: SignalLayer::SurfaceTemperature.default_tuning(),
            building_density: SignalLayer::BuildingDensity.default_tuning(),
            traffic: SignalLayer::Traffic.default_tuning(),
            weights: FusionWeights::default(),
        }
    }
}

/// Per-cell values of a heatmap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Identifier of the cell.
    pub cell_id: CellId,
    /// Rectangle covered by the cell.
    pub bounds: CellBounds,
    /// Normalized surface temperature signal.
    pub surface_temp: f64,
    /// Normalized building density signal.
    pub building_density: f64,
    /// Normalized traffic signal.
    pub traffic: f64,
    /// Normalized composite heat score.
    pub heat_score: f64,
}

/// Full per-cell output of the heatmap operation, in grid order.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    grid_size: u32,
    cells: Vec<HeatmapCell>,
}

impl Heatmap {
    /// Cells per axis of the grid the heatmap was built on.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Per-cell rows in identifier order.
    #[must_use]
    pub fn cells(&self) -> &[HeatmapCell] {
        &self.cells
    }

    /// Consumes the heatmap, returning its rows.
    #[must_use]
    pub fn into_cells(self) -> Vec<HeatmapCell> {
        self.cells
    }
}

#[derive(Debug, Default)]
struct LayerScores {
    surface_temp: SignalArray,
    building_density: SignalArray,
    traffic: SignalArray,
    heat_score: SignalArray,
}

/// Stateless scoring pipeline with reusable scratch buffers.
#[derive(Debug)]
pub struct Scenario {
    config: ScenarioConfig,
    simulator: SignalSimulator,
    fusion: ScoreFusion,
    selector: SiteSelector,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new(ScenarioConfig::default())
    }
}

impl Scenario {
    /// Creates a pipeline using the provided tunings and weights.
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            simulator: SignalSimulator::new(),
            fusion: ScoreFusion::new(config.weights),
            selector: SiteSelector::new(),
        }
    }

    /// Tunings and weights in effect.
    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Scores every cell of the requested grid.
    pub fn heatmap(&self, request: &HeatmapRequest) -> Result<Heatmap, EngineError> {
        let grid = Grid::build(request.bbox, request.grid_size)?;
        let scores = self.score(&grid, request.seed)?;

        let cells = grid
            .cells()
            .iter()
            .enumerate()
            .map(|(index, cell)| HeatmapCell {
                cell_id: cell.id(),
                bounds: cell.bounds(),
                surface_temp: scores.surface_temp[index],
                building_density: scores.building_density[index],
                traffic: scores.traffic[index],
                heat_score: scores.heat_score[index],
            })
            .collect();

        Ok(Heatmap {
            grid_size: grid.grid_size(),
            cells,
        })
    }

    /// Picks spatially separated planting sites from the hottest cells.
    pub fn recommendations(
        &mut self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let grid = Grid::build(request.bbox, request.grid_size)?;
        let scores = self.score(&grid, request.seed)?;

        let mut picks = Vec::new();
        self.selector
            .select(grid.cells(), &scores.heat_score, request.criteria(), &mut picks)?;
        log::info!(
            "recommended {} sites for seed {} on a {}x{} grid",
            picks.len(),
            request.seed,
            request.grid_size,
            request.grid_size
        );
        Ok(picks)
    }

    fn score(&self, grid: &Grid, seed: u64) -> Result<LayerScores, EngineError> {
        let mut scores = LayerScores::default();
        for layer in SignalLayer::ALL {
            let out = match layer {
                SignalLayer::SurfaceTemperature => &mut scores.surface_temp,
                SignalLayer::BuildingDensity => &mut scores.building_density,
                SignalLayer::Traffic => &mut scores.traffic,
            };
            self.simulator
                .simulate_layer(layer, self.config.tuning(layer), grid.len(), seed, out)?;
        }

        self.fusion.fuse(
            LayerSignals::new(
                &scores.surface_temp,
                &scores.building_density,
                &scores.traffic,
            ),
            &mut scores.heat_score,
        )?;
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::{RecommendationRequest, ScenarioConfig};
    use uhi_greening_core::{BoundingBox, SignalLayer};

    #[test]
    fn default_config_uses_layer_defaults() {
        let config = ScenarioConfig::default();
        for layer in SignalLayer::ALL {
            assert_eq!(config.tuning(layer), layer.default_tuning());
        }
    }

    #[test]
    fn recommendation_request_projects_to_heatmap() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).expect("valid bbox");
        let mut request = RecommendationRequest::new(bbox);
        request.grid_size = 8;
        request.seed = 99;

        let heatmap = request.heatmap();
        assert_eq!(heatmap.bbox, bbox);
        assert_eq!(heatmap.grid_size, 8);
        assert_eq!(heatmap.seed, 99);
        assert_eq!(request.criteria().top_k, 10);
    }
}
