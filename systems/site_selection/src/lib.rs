#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy selection of spatially separated, high-scoring planting sites.

use std::cmp::Ordering;

use glam::DVec2;
use uhi_greening_core::{
    Cell, CellId, EngineError, GeoPoint, InputError, Recommendation, METERS_PER_DEGREE,
};

/// Limits applied while picking sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionCriteria {
    /// Maximum number of sites to return.
    pub top_k: usize,
    /// Minimum separation in meters between any two returned sites.
    pub min_distance_m: f64,
}

impl SelectionCriteria {
    /// Creates selection criteria from a pick cap and a separation in meters.
    #[must_use]
    pub const fn new(top_k: usize, min_distance_m: f64) -> Self {
        Self {
            top_k,
            min_distance_m,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        let min_distance_m = self.min_distance_m;
        if !min_distance_m.is_finite() {
            return Err(InputError::NonFiniteMinDistance { min_distance_m }.into());
        }
        if min_distance_m < 0.0 {
            return Err(InputError::NegativeMinDistance { min_distance_m }.into());
        }
        Ok(())
    }
}

/// Approximate distance in meters between two points.
///
/// Planar Euclidean distance in degrees scaled by [`METERS_PER_DEGREE`]. The
/// scale ignores latitude, so east-west separations are overstated away from
/// the equator.
#[must_use]
pub fn approximate_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    to_plane(a).distance(to_plane(b)) * METERS_PER_DEGREE
}

fn to_plane(point: GeoPoint) -> DVec2 {
    DVec2::new(point.longitude, point.latitude)
}

/// Site selection system that reuses scratch buffers between requests.
#[derive(Debug, Default)]
pub struct SiteSelector {
    candidate_workspace: Vec<Candidate>,
    accepted_workspace: Vec<DVec2>,
}

impl SiteSelector {
    /// Creates a new selector with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up to `criteria.top_k` cells in descending score order.
    ///
    /// Candidates are visited from the highest score down, ties going to the
    /// lower cell identifier. A candidate is accepted only when its centroid
    /// lies at least `criteria.min_distance_m` from every site accepted so
    /// far; rejected candidates are never revisited. `scores` must be
    /// index-aligned with `cells`. The output buffer is cleared before it is
    /// populated and stays empty on failure.
    pub fn select(
        &mut self,
        cells: &[Cell],
        scores: &[f64],
        criteria: SelectionCriteria,
        out: &mut Vec<Recommendation>,
    ) -> Result<(), EngineError> {
        out.clear();
        criteria.validate()?;

        if scores.len() != cells.len() {
            return Err(EngineError::DimensionMismatch {
                array: "heat_score",
                expected: cells.len(),
                actual: scores.len(),
            });
        }

        self.prepare_candidate_workspace(cells, scores)?;
        if criteria.top_k == 0 {
            return Ok(());
        }

        self.candidate_workspace.sort_by(Candidate::ranking);
        self.accepted_workspace.clear();

        for candidate in &self.candidate_workspace {
            if out.len() >= criteria.top_k {
                break;
            }

            if !is_separated(
                &self.accepted_workspace,
                candidate.position,
                criteria.min_distance_m,
            ) {
                log::trace!(
                    "skipping cell {} (score {}): within {} m of an accepted site",
                    candidate.id,
                    candidate.score,
                    criteria.min_distance_m
                );
                continue;
            }

            self.accepted_workspace.push(candidate.position);
            out.push(Recommendation {
                cell_id: candidate.id,
                location: candidate.location,
                score: candidate.score,
            });
        }

        log::debug!(
            "selected {} of {} requested sites from {} cells",
            out.len(),
            criteria.top_k,
            cells.len()
        );
        Ok(())
    }

    fn prepare_candidate_workspace(
        &mut self,
        cells: &[Cell],
        scores: &[f64],
    ) -> Result<(), EngineError> {
        self.candidate_workspace.clear();
        self.candidate_workspace.reserve(cells.len());

        for (index, (cell, &score)) in cells.iter().zip(scores).enumerate() {
            if !score.is_finite() {
                return Err(InputError::NonFiniteScore { cell: index, score }.into());
            }

            let location = cell.centroid();
            self.candidate_workspace.push(Candidate {
                id: cell.id(),
                location,
                position: to_plane(location),
                score,
            });
        }
        Ok(())
    }
}

fn is_separated(accepted: &[DVec2], position: DVec2, min_distance_m: f64) -> bool {
    accepted
        .iter()
        .all(|site| position.distance(*site) * METERS_PER_DEGREE >= min_distance_m)
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: CellId,
    location: GeoPoint,
    position: DVec2,
    score: f64,
}

impl Candidate {
    /// Higher scores first, then lower identifiers.
    fn ranking(a: &Self, b: &Self) -> Ordering {
        b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
    }
}
