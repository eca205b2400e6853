// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::AnnotatedState;
use crate::fock::FockState;
use expect_test::expect;

#[test]
fn from_fock_uses_shared_label() {
    let state = AnnotatedState::from_fock(&FockState::new(vec![2, 0, 1]));
    assert_eq!(3, state.total_photons());
    assert_eq!(FockState::new(vec![2, 0, 1]), state.to_fock());
    assert_eq!(1, state.label_classes().len());
}

#[test]
fn display_renders_label_multisets() {
    let mut state = AnnotatedState::vacuum(3);
    state.push_photon(0, 0);
    state.push_photon(0, 1);
    state.push_photon(2, 0);
    expect!["|{0 1},0,{0}⟩"].assert_eq(&state.to_string());
}

#[test]
fn canonicalization_merges_equivalent_labelings() {
    // Same class structure, different label values.
    let mut a = AnnotatedState::vacuum(2);
    a.push_photon(0, 7);
    a.push_photon(1, 7);
    a.push_photon(1, 3);

    let mut b = AnnotatedState::vacuum(2);
    b.push_photon(0, 1);
    b.push_photon(1, 4);
    b.push_photon(1, 1);

    a.canonicalize();
    b.canonicalize();
    assert_eq!(a, b);
}

#[test]
fn canonicalization_distinguishes_different_structures() {
    // Two photons sharing a label vs. two distinct labels.
    let mut shared = AnnotatedState::vacuum(2);
    shared.push_photon(0, 5);
    shared.push_photon(1, 5);

    let mut distinct = AnnotatedState::vacuum(2);
    distinct.push_photon(0, 5);
    distinct.push_photon(1, 6);

    shared.canonicalize();
    distinct.canonicalize();
    assert_ne!(shared, distinct);
}

#[test]
fn label_classes_split_occupations() {
    let mut state = AnnotatedState::vacuum(3);
    state.push_photon(0, 0);
    state.push_photon(1, 1);
    state.push_photon(1, 0);
    state.canonicalize();

    // Canonical label order follows the lexicographic signature order, so
    // the single-photon class |0,1,0⟩ comes before the shared class |1,1,0⟩.
    let classes = state.label_classes();
    assert_eq!(2, classes.len());
    assert_eq!(FockState::new(vec![0, 1, 0]), classes[0]);
    assert_eq!(FockState::new(vec![1, 1, 0]), classes[1]);

    // Classes partition the photons.
    let total: u32 = classes.iter().map(FockState::total_photons).sum();
    assert_eq!(state.total_photons(), total);
}
