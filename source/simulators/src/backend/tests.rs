// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{
    BackendKind, Statistics, distribution_via_amplitudes, output_states, transition_amplitude,
    transition_probability,
};
use crate::error::Error;
use expect_test::expect;
use nalgebra::DMatrix;
use num_complex::Complex64;
use photonic_circuit::FockState;

fn balanced_splitter() -> DMatrix<Complex64> {
    let c = 0.5f64.sqrt();
    DMatrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(c, 0.0),
            Complex64::new(0.0, c),
            Complex64::new(0.0, c),
            Complex64::new(c, 0.0),
        ],
    )
}

#[test]
fn backend_names_parse() {
    assert_eq!(Ok(BackendKind::Permanent), "permanent".parse());
    assert_eq!(Ok(BackendKind::FullDistribution), "full-distribution".parse());
    let err = "tensor-network".parse::<BackendKind>().expect_err("unknown name");
    expect!["unknown backend `tensor-network`, expected `permanent` or `full-distribution`"]
        .assert_eq(&err.to_string());
}

#[test]
fn statistics_names_parse() {
    assert_eq!(Ok(Statistics::Bosonic), "bosonic".parse());
    assert_eq!(Ok(Statistics::Fermionic), "fermionic".parse());
    let err = "anyonic".parse::<Statistics>().expect_err("unknown name");
    expect!["unknown statistics `anyonic`, expected `bosonic` or `fermionic`"]
        .assert_eq(&err.to_string());
}

#[test]
fn vacuum_transmits_with_unit_amplitude() {
    let amp = transition_amplitude(
        &balanced_splitter(),
        &FockState::vacuum(2),
        &FockState::vacuum(2),
        Statistics::Bosonic,
    )
    .expect("amplitude should compute");
    assert!((amp - Complex64::new(1.0, 0.0)).norm() < 1e-12);
}

#[test]
fn hong_ou_mandel_amplitudes() {
    let u = balanced_splitter();
    let input = FockState::new(vec![1, 1]);

    let bunched = transition_probability(&u, &input, &FockState::new(vec![2, 0]), Statistics::Bosonic)
        .expect("probability should compute");
    let coincident =
        transition_probability(&u, &input, &FockState::new(vec![1, 1]), Statistics::Bosonic)
            .expect("probability should compute");
    assert!((bunched - 0.5).abs() < 1e-9);
    assert!(coincident < 1e-9);
}

#[test]
fn fermions_never_bunch() {
    let u = balanced_splitter();
    let input = FockState::new(vec![1, 1]);
    // Pauli exclusion: the only allowed output is |1,1⟩, with unit probability.
    let p = transition_probability(&u, &input, &input, Statistics::Fermionic)
        .expect("probability should compute");
    assert!((p - 1.0).abs() < 1e-9);

    let err = transition_amplitude(
        &u,
        &FockState::new(vec![2, 0]),
        &FockState::new(vec![1, 1]),
        Statistics::Fermionic,
    )
    .expect_err("double occupancy should be rejected");
    assert_eq!(Error::FermionicOccupancy { mode: 0, count: 2 }, err);
}

#[test]
fn photon_number_mismatch_is_rejected() {
    let err = transition_amplitude(
        &balanced_splitter(),
        &FockState::new(vec![1, 1]),
        &FockState::new(vec![1, 0]),
        Statistics::Bosonic,
    )
    .expect_err("photon numbers differ");
    assert_eq!(Error::PhotonNumberMismatch { input: 2, output: 1 }, err);
}

#[test]
fn mode_mismatch_is_rejected() {
    let err = transition_amplitude(
        &balanced_splitter(),
        &FockState::new(vec![1, 1, 0]),
        &FockState::new(vec![1, 1]),
        Statistics::Bosonic,
    )
    .expect_err("mode counts differ");
    assert!(matches!(
        err,
        Error::Circuit(photonic_circuit::Error::ModeMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn output_state_enumeration_counts_compositions() {
    // C(photons + modes − 1, modes − 1) compositions.
    assert_eq!(10, output_states(3, 3).len());
    assert_eq!(1, output_states(4, 0).len());
    assert_eq!(4, output_states(4, 1).len());
    // Descending lexicographic order, starting with everything in mode 0.
    let states = output_states(2, 2);
    assert_eq!(FockState::new(vec![2, 0]), states[0]);
    assert_eq!(FockState::new(vec![1, 1]), states[1]);
    assert_eq!(FockState::new(vec![0, 2]), states[2]);
}

#[test]
fn enumerated_distribution_conserves_probability() {
    let dist = distribution_via_amplitudes(
        &balanced_splitter(),
        &FockState::new(vec![1, 1]),
        Statistics::Bosonic,
    )
    .expect("distribution should compute");
    assert!((dist.total_mass() - 1.0).abs() < 1e-9);
    assert!((dist.get(&FockState::new(vec![0, 2])) - 0.5).abs() < 1e-9);
}

#[test]
fn fermionic_distribution_respects_exclusion() {
    let dist = distribution_via_amplitudes(
        &balanced_splitter(),
        &FockState::new(vec![1, 1]),
        Statistics::Fermionic,
    )
    .expect("distribution should compute");
    assert_eq!(1, dist.len());
    assert!((dist.get(&FockState::new(vec![1, 1])) - 1.0).abs() < 1e-9);
}
