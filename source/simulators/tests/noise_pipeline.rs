// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Source and detector noise composed through the full sampling pipeline.

use photonic_circuit::{Barrier, BeamSplitter, BsConvention, CircuitSpec, FockState};
use photonic_simulators::backend::Statistics;
use photonic_simulators::detector::Detector;
use photonic_simulators::processor::Processor;
use photonic_simulators::sampler::{SampleMode, Sampler};
use photonic_simulators::source::Source;
use photonic_simulators::statistical_testing::{
    TOLERANCE_LOW_SAMPLES, assert_rate_within_tolerance,
};

fn pass_through(modes: usize) -> CircuitSpec {
    let mut spec = CircuitSpec::new(modes);
    spec.add(Barrier::new((0..modes).collect()))
        .expect("barrier should be addable");
    spec
}

#[test]
fn dim_source_shows_up_in_the_analytic_distribution() {
    let mut processor = Processor::new(pass_through(2), Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 1]));
    let mut source = Source::PERFECT;
    source.set_brightness(0.7).expect("in range");
    processor.set_source(source);

    let distribution = processor.probabilities().expect("distribution should compute");
    assert!((distribution.get(&FockState::new(vec![1, 1])) - 0.49).abs() < 1e-9);
    assert!((distribution.get(&FockState::new(vec![1, 0])) - 0.21).abs() < 1e-9);
    assert!((distribution.get(&FockState::new(vec![0, 0])) - 0.09).abs() < 1e-9);
    assert!((distribution.total_mass() - 1.0).abs() < 1e-9);
}

#[test]
fn dim_source_lowers_the_accepted_trial_rate() {
    let mut processor = Processor::new(pass_through(2), Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 1]));
    let mut source = Source::PERFECT;
    source.set_brightness(0.7).expect("in range");
    processor.set_source(source);
    processor.set_min_detected_photons(2);

    let mut sampler = Sampler::new(processor, SampleMode::Input).expect("compatible");
    let trials = 20_000;
    let accepted = sampler.sample_n(trials, 31).expect("sampling should succeed");
    assert_rate_within_tolerance(
        accepted.len(),
        trials,
        0.49,
        TOLERANCE_LOW_SAMPLES,
        "both photons emitted",
    );
}

#[test]
fn dark_counts_inject_clicks_on_empty_modes() {
    let mut processor = Processor::new(pass_through(2), Statistics::Bosonic);
    processor.set_input(FockState::vacuum(2));
    processor.set_detector(Detector::new(1.0, 0.05).expect("parameters in range"));

    let mut sampler = Sampler::new(processor, SampleMode::Input).expect("input mode allows noise");
    let trials = 20_000;
    let samples = sampler.sample_n(trials, 13).expect("sampling should succeed");
    assert_eq!(trials, samples.len(), "nothing filters vacuum trials");
    let with_clicks = samples
        .iter()
        .filter(|state| state.total_photons() > 0)
        .count();
    // 1 − (1 − p_dark)² per trial.
    assert_rate_within_tolerance(
        with_clicks,
        trials,
        1.0 - 0.95f64.powi(2),
        TOLERANCE_LOW_SAMPLES,
        "dark count rate",
    );
}

#[test]
fn partial_distinguishability_softens_the_hom_dip() {
    let mut spec = CircuitSpec::new(2);
    spec.add(BeamSplitter::new(0, 1, 0.5, BsConvention::Rx).expect("valid splitter"))
        .expect("splitter should be addable");
    let mut processor = Processor::new(spec, Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 1]));
    processor.set_source(Source::new(1.0, 1.0, 0.5).expect("parameters in range"));

    let distribution = processor.probabilities().expect("distribution should compute");
    let coincidence = distribution.get(&FockState::new(vec![1, 1]));
    // Between the quantum dip (0) and the classical rate (0.5): the photons
    // share the interference label with probability √indistinguishability
    // each, so the coincidence rate is (1 − indistinguishability)/2.
    assert!((coincidence - 0.25).abs() < 1e-9);
    assert!((distribution.total_mass() - 1.0).abs() < 1e-9);
}
