#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted fusion of the simulated layers into one composite heat score.

use uhi_greening_core::{
    normalize_min_max, EngineError, FusionWeights, InputError, Normalization, SignalArray,
    SignalLayer,
};

/// Borrowed, index-aligned layer arrays consumed by [`ScoreFusion`].
#[derive(Clone, Copy, Debug)]
pub struct LayerSignals<'a> {
    /// Surface temperature layer.
    pub surface_temp: &'a [f64],
    /// Building density layer.
    pub building_density: &'a [f64],
    /// Traffic layer.
    pub traffic: &'a [f64],
}

impl<'a> LayerSignals<'a> {
    /// Bundles the three layer arrays.
    #[must_use]
    pub const fn new(
        surface_temp: &'a [f64],
        building_density: &'a [f64],
        traffic: &'a [f64],
    ) -> Self {
        Self {
            surface_temp,
            building_density,
            traffic,
        }
    }

    /// Shared length of the arrays, or the first array that disagrees with the surface layer.
    fn aligned_len(&self) -> Result<usize, EngineError> {
        let expected = self.surface_temp.len();
        for (layer, values) in [
            (SignalLayer::BuildingDensity, self.building_density),
            (SignalLayer::Traffic, self.traffic),
        ] {
            if values.len() != expected {
                return Err(EngineError::DimensionMismatch {
                    array: layer.name(),
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(expected)
    }
}

/// Pure system combining layer signals with fixed weights.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreFusion {
    weights: FusionWeights,
}

impl ScoreFusion {
    /// Creates a fusion system using the provided weights.
    #[must_use]
    pub const fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    /// Weights applied to each layer.
    #[must_use]
    pub const fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Writes the pointwise weighted sum of the layers into `out` without normalizing.
    ///
    /// Weights large enough to overflow a sum are rejected and leave `out` empty.
    pub fn weighted_sum(
        &self,
        signals: LayerSignals<'_>,
        out: &mut SignalArray,
    ) -> Result<(), EngineError> {
        let len = signals.aligned_len()?;
        let weights = self.weights;

        out.clear();
        out.reserve(len);
        out.extend(
            signals
                .surface_temp
                .iter()
                .zip(signals.building_density)
                .zip(signals.traffic)
                .map(|((surface, building), traffic)| {
                    weights.surface_temp * surface
                        + weights.building_density * building
                        + weights.traffic * traffic
                }),
        );

        if let Some(cell) = out.iter().position(|score| !score.is_finite()) {
            let score = out[cell];
            out.clear();
            return Err(InputError::NonFiniteScore { cell, score }.into());
        }
        Ok(())
    }

    /// Writes the normalized composite heat score into `out`.
    ///
    /// A weighted sum with zero range becomes all zeros, matching the policy
    /// the signal simulator applies.
    pub fn fuse(
        &self,
        signals: LayerSignals<'_>,
        out: &mut SignalArray,
    ) -> Result<(), EngineError> {
        self.weighted_sum(signals, out)?;
        if normalize_min_max(out) == Normalization::Constant {
            log::warn!(
                "composite heat score has zero range over {} cells; using all zeros",
                out.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerSignals, ScoreFusion};
    use uhi_greening_core::{EngineError, FusionWeights, InputError};

    #[test]
    fn default_weights_favour_surface_temperature() {
        let weights = ScoreFusion::default().weights();
        assert_eq!(weights, FusionWeights::default());
        assert!(weights.surface_temp > weights.building_density + weights.traffic);
    }

    #[test]
    fn overflowing_weights_are_rejected() {
        let fusion = ScoreFusion::new(FusionWeights {
            surface_temp: 1e308,
            building_density: 1e308,
            traffic: 1e308,
        });
        let mut out = vec![0.25];
        let error = fusion
            .fuse(LayerSignals::new(&[0.0, 1.0], &[0.0, 1.0], &[0.0, 1.0]), &mut out)
            .expect_err("overflowing sum must fail");
        assert_eq!(
            error,
            EngineError::InvalidInput(InputError::NonFiniteScore {
                cell: 1,
                score: f64::INFINITY,
            })
        );
        assert!(out.is_empty());
    }

    #[test]
    fn mismatched_traffic_layer_is_reported() {
        let mut out = Vec::new();
        let error = ScoreFusion::default()
            .fuse(
                LayerSignals::new(&[0.0, 1.0], &[0.0, 1.0], &[0.5]),
                &mut out,
            )
            .expect_err("length mismatch must fail");
        assert_eq!(
            error,
            EngineError::DimensionMismatch {
                array: "traffic",
                expected: 2,
                actual: 1,
            }
        );
        assert!(out.is_empty(), "no partial output on failure");
    }
}
