use uhi_greening_core::{EngineError, LayerTuning};
use uhi_greening_system_fusion::{LayerSignals, ScoreFusion};
use uhi_greening_system_signals::SignalSimulator;

fn layer(cell_count: usize, seed: u64, tuning: LayerTuning) -> Vec<f64> {
    let mut out = Vec::new();
    SignalSimulator::new()
        .simulate(cell_count, seed, tuning, &mut out)
        .expect("simulation succeeds");
    out
}

#[test]
fn weighted_sum_is_linear_in_each_layer() {
    let surface = layer(300, 42, LayerTuning::new(1.5, 1.0));
    let building = layer(300, 43, LayerTuning::new(1.0, 0.5));
    let traffic = layer(300, 44, LayerTuning::new(0.8, 0.2));

    let mut raw = Vec::new();
    ScoreFusion::default()
        .weighted_sum(LayerSignals::new(&surface, &building, &traffic), &mut raw)
        .expect("fusion succeeds");

    assert_eq!(raw.len(), 300);
    for index in 0..raw.len() {
        let expected = 0.6 * surface[index] + 0.25 * building[index] + 0.15 * traffic[index];
        assert_eq!(raw[index], expected, "cell {index}");
    }
}

#[test]
fn composite_score_is_normalized() {
    let surface = layer(300, 1, LayerTuning::new(1.5, 1.0));
    let building = layer(300, 2, LayerTuning::new(1.0, 0.5));
    let traffic = layer(300, 3, LayerTuning::new(0.8, 0.2));

    let mut scores = Vec::new();
    ScoreFusion::default()
        .fuse(LayerSignals::new(&surface, &building, &traffic), &mut scores)
        .expect("fusion succeeds");

    assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
    assert!(scores.iter().any(|score| *score == 0.0));
    assert!(scores.iter().any(|score| *score == 1.0));
}

#[test]
fn composite_preserves_order_of_weighted_sum() {
    let surface = [0.0, 1.0, 0.5, 0.25];
    let building = [1.0, 0.0, 0.5, 0.0];
    let traffic = [0.0, 0.0, 1.0, 1.0];
    let signals = LayerSignals::new(&surface, &building, &traffic);
    let fusion = ScoreFusion::default();

    let mut raw = Vec::new();
    fusion.weighted_sum(signals, &mut raw).expect("fusion succeeds");
    let mut scores = Vec::new();
    fusion.fuse(signals, &mut scores).expect("fusion succeeds");

    // raw: [0.25, 0.6, 0.575, 0.3]
    assert_eq!(scores[0], 0.0);
    assert_eq!(scores[1], 1.0);
    assert!(scores[2] > scores[3] && scores[3] > scores[0]);
    let expected_third = (raw[2] - raw[0]) / (raw[1] - raw[0]);
    assert!((scores[2] - expected_third).abs() < 1e-12);
}

#[test]
fn constant_layers_produce_zero_scores() {
    let flat = [0.0; 6];
    let mut scores = Vec::new();
    ScoreFusion::default()
        .fuse(LayerSignals::new(&flat, &flat, &flat), &mut scores)
        .expect("fusion succeeds");
    assert_eq!(scores, vec![0.0; 6]);
}

#[test]
fn building_layer_mismatch_is_reported_first() {
    let mut scores = Vec::new();
    let error = ScoreFusion::default()
        .fuse(LayerSignals::new(&[0.0; 3], &[0.0; 2], &[0.0; 1]), &mut scores)
        .expect_err("mismatched layers must fail");
    assert_eq!(
        error,
        EngineError::DimensionMismatch {
            array: "building_density",
            expected: 3,
            actual: 2,
        }
    );
}
