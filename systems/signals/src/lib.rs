#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic signal simulation producing normalized per-cell layers.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use uhi_greening_core::{
    normalize_min_max, EngineError, InputError, LayerTuning, Normalization, SignalArray,
    SignalLayer,
};

/// Pure system that turns a seed into a normalized signal array.
///
/// Identical `(cell_count, seed, tuning)` inputs always produce bit-identical
/// arrays: draws come from a ChaCha8 stream seeded with `seed` and sampled
/// through the standard normal distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalSimulator;

impl SignalSimulator {
    /// Creates a new simulator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Fills `out` with `cell_count` normalized values.
    ///
    /// Each standard-normal draw is mapped through `draw * scale + bias` and
    /// the array is then min-max normalized into `[0, 1]`. When every draw
    /// maps to the same value the array is all zeros. A tuning that drives
    /// any mapped draw to infinity is rejected and leaves `out` empty. The
    /// output buffer is cleared before it is populated.
    pub fn simulate(
        &self,
        cell_count: usize,
        seed: u64,
        tuning: LayerTuning,
        out: &mut SignalArray,
    ) -> Result<(), EngineError> {
        if !tuning.scale.is_finite() || !tuning.bias.is_finite() {
            return Err(InputError::NonFiniteTuning {
                scale: tuning.scale,
                bias: tuning.bias,
            }
            .into());
        }

        out.clear();
        out.reserve(cell_count);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        out.extend((0..cell_count).map(|_| {
            let draw: f64 = rng.sample(StandardNormal);
            draw * tuning.scale + tuning.bias
        }));

        if out.iter().any(|value| !value.is_finite()) {
            out.clear();
            return Err(InputError::TuningOverflow {
                scale: tuning.scale,
                bias: tuning.bias,
            }
            .into());
        }

        if normalize_min_max(out) == Normalization::Constant {
            log::warn!(
                "signal with seed {seed} has zero range over {cell_count} cells; using all zeros"
            );
        }
        Ok(())
    }

    /// Simulates `layer` using the seed offset that layer owns.
    pub fn simulate_layer(
        &self,
        layer: SignalLayer,
        tuning: LayerTuning,
        cell_count: usize,
        request_seed: u64,
        out: &mut SignalArray,
    ) -> Result<(), EngineError> {
        let seed = layer.seed_for(request_seed);
        log::debug!("simulating {layer} for {cell_count} cells with seed {seed}");
        self.simulate(cell_count, seed, tuning, out)
    }
}
