// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Physics invariants: unitarity, probability conservation, and
//! Hong–Ou–Mandel interference.

use photonic_circuit::component::is_unitary;
use photonic_circuit::compiler::UNITARITY_TOLERANCE;
use photonic_circuit::{
    BeamSplitter, BsConvention, CircuitSpec, FockState, Group, LossChannel, ModeSwap, PhaseShifter,
    compile,
};
use photonic_simulators::backend::{BackendKind, Statistics};
use photonic_simulators::processor::Processor;

fn busy_spec() -> CircuitSpec {
    let mut spec = CircuitSpec::new(4);
    spec.add(BeamSplitter::new(0, 1, 0.37, BsConvention::Rx).expect("valid splitter"))
        .expect("addable");
    spec.add(PhaseShifter::new(1, 0.9)).expect("addable");
    spec.add(
        BeamSplitter::new(1, 2, 0.62, BsConvention::H)
            .expect("valid splitter")
            .with_loss(0.4)
            .expect("valid loss"),
    )
    .expect("addable");
    spec.add(LossChannel::new(3, 1.2).expect("valid loss"))
        .expect("addable");
    spec.add(ModeSwap::new(vec![(0, 3), (3, 0)]).expect("valid permutation"))
        .expect("addable");
    spec.add(Group::new(
        1,
        vec![
            BeamSplitter::new(0, 1, 0.5, BsConvention::Rx)
                .expect("valid splitter")
                .into(),
            PhaseShifter::new(1, 0.25).into(),
        ],
    ))
    .expect("addable");
    spec
}

#[test]
fn compiled_full_matrices_stay_unitary() {
    let compiled = compile(&busy_spec()).expect("compilation should succeed");
    assert!(compiled.loss_modes() > 0);
    assert!(is_unitary(compiled.unitary(), UNITARITY_TOLERANCE));
}

#[test]
fn lossless_distributions_sum_to_one() {
    let mut spec = CircuitSpec::new(3);
    spec.add(BeamSplitter::new(0, 1, 0.3, BsConvention::Rx).expect("valid splitter"))
        .expect("addable");
    spec.add(BeamSplitter::new(1, 2, 0.7, BsConvention::H).expect("valid splitter"))
        .expect("addable");
    spec.add(PhaseShifter::new(2, 1.5)).expect("addable");

    for backend in [BackendKind::FullDistribution, BackendKind::Permanent] {
        let mut processor =
            Processor::new(spec.clone(), Statistics::Bosonic).with_backend(backend);
        processor.set_input(FockState::new(vec![1, 0, 1]));
        let distribution = processor.probabilities().expect("distribution should compute");
        assert!(
            (distribution.total_mass() - 1.0).abs() < 1e-8,
            "lossless circuits conserve probability ({backend:?})"
        );
    }
}

#[test]
fn lossy_distributions_account_for_absorbed_mass() {
    let mut processor = Processor::new(busy_spec(), Statistics::Bosonic);
    processor.set_input(FockState::new(vec![1, 1, 0, 0]));
    processor.set_min_detected_photons(2);
    let distribution = processor.probabilities().expect("distribution should compute");
    let recorded = distribution.total_mass();
    let absorbed = distribution.absorbed_mass();
    assert!(recorded < 1.0, "losses must remove recorded mass");
    assert!((recorded + absorbed - 1.0).abs() < 1e-8);
}

#[test]
fn hong_ou_mandel_dip_on_both_backends() {
    for backend in [BackendKind::FullDistribution, BackendKind::Permanent] {
        let mut spec = CircuitSpec::new(2);
        spec.add(BeamSplitter::new(0, 1, 0.5, BsConvention::Rx).expect("valid splitter"))
            .expect("addable");
        let mut processor = Processor::new(spec, Statistics::Bosonic).with_backend(backend);
        processor.set_input(FockState::new(vec![1, 1]));
        let distribution = processor.probabilities().expect("distribution should compute");

        assert!((distribution.get(&FockState::new(vec![2, 0])) - 0.5).abs() < 1e-6);
        assert!((distribution.get(&FockState::new(vec![0, 2])) - 0.5).abs() < 1e-6);
        assert!(distribution.get(&FockState::new(vec![1, 1])) < 1e-6);
    }
}
