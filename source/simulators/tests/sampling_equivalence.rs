// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Heralding a mode must be equivalent to post-selecting on it after the
//! fact — exactly for analytic distributions, statistically for sampling.

use photonic_circuit::{BeamSplitter, BsConvention, CircuitSpec, FockState};
use photonic_simulators::backend::Statistics;
use photonic_simulators::post_select::PostSelection;
use photonic_simulators::processor::Processor;
use photonic_simulators::sampler::{SampleMode, Sampler};
use rustc_hash::FxHashMap;

fn interferometer() -> CircuitSpec {
    let mut spec = CircuitSpec::new(3);
    spec.add(BeamSplitter::new(0, 1, 0.5, BsConvention::Rx).expect("valid splitter"))
        .expect("addable");
    spec.add(BeamSplitter::new(1, 2, 0.3, BsConvention::Rx).expect("valid splitter"))
        .expect("addable");
    spec
}

/// Heralded configuration: mode 2 carries one ancilla photon in and must
/// read one photon out.
fn heralded() -> Processor {
    let mut spec = interferometer();
    spec.add_herald(2, 1, 1).expect("herald should be addable");
    let mut processor = Processor::new(spec, Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 0]));
    processor
}

/// The same circuit without the herald, filtered by the equivalent
/// post-selection predicate.
fn post_selected() -> Processor {
    let mut processor = Processor::new(interferometer(), Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 0, 1]));
    processor
        .set_post_selection(PostSelection::new().eq(&[2], 1))
        .expect("predicate should attach");
    processor
}

#[test]
fn analytic_distributions_are_identical() {
    let mut heralded = heralded();
    let mut post_selected = post_selected();

    let heralded_dist = heralded
        .probabilities()
        .expect("distribution should compute")
        .clone();
    let filtered_dist = post_selected
        .probabilities()
        .expect("distribution should compute");

    // The herald-free observable state keeps mode 2; project it away for
    // comparison.
    let mut projected: FxHashMap<FockState, f64> = FxHashMap::default();
    for (state, probability) in filtered_dist.iter() {
        *projected.entry(state.project(&[0, 1])).or_insert(0.0) += probability;
    }

    assert_eq!(heralded_dist.len(), projected.len());
    for (state, probability) in heralded_dist.iter() {
        let other = projected.get(state).copied().unwrap_or(0.0);
        assert!(
            (probability - other).abs() < 1e-9,
            "state {state}: heralded {probability} vs post-selected {other}"
        );
    }
}

#[test]
fn sampled_counts_match_within_tolerance() {
    const SHOTS: usize = 50_000;
    const MIN_BUCKET: u64 = 2_000;
    const RELATIVE_TOLERANCE: f64 = 0.10;

    let mut heralded_sampler =
        Sampler::new(heralded(), SampleMode::Input).expect("compatible configuration");
    let heralded_counts = heralded_sampler
        .sample_counts(SHOTS, 1)
        .expect("sampling should succeed");

    let mut filtered_sampler =
        Sampler::new(post_selected(), SampleMode::Input).expect("compatible configuration");
    let filtered_raw = filtered_sampler
        .sample_n(SHOTS, 2)
        .expect("sampling should succeed");
    let mut filtered_counts: FxHashMap<FockState, u64> = FxHashMap::default();
    for state in filtered_raw {
        *filtered_counts.entry(state.project(&[0, 1])).or_insert(0) += 1;
    }

    let mut compared = 0;
    for (state, &count) in &heralded_counts {
        if count <= MIN_BUCKET {
            continue;
        }
        compared += 1;
        let other = filtered_counts.get(state).copied().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let relative = (count as f64 - other as f64).abs() / count as f64;
        assert!(
            relative < RELATIVE_TOLERANCE,
            "state {state}: heralded {count} vs post-selected {other}"
        );
    }
    assert!(compared > 0, "at least one bucket must clear the threshold");
}

#[test]
fn independent_stacks_reproduce_the_same_counts() {
    let mut first =
        Sampler::new(heralded(), SampleMode::Input).expect("compatible configuration");
    let mut second =
        Sampler::new(heralded(), SampleMode::Input).expect("compatible configuration");
    let counts_a = first.sample_counts(10_000, 77).expect("sampling should succeed");
    let counts_b = second.sample_counts(10_000, 77).expect("sampling should succeed");
    assert_eq!(counts_a, counts_b);
}
