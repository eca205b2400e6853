// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::distribution::Distribution;
use crate::error::Error;
use crate::permanent::occupation_factorial;
use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::{One, Zero};
use photonic_circuit::FockState;
use rustc_hash::FxHashMap;

/// Full bosonic output distribution for one input in a single pass.
///
/// Instead of one permanent per output state, the quantum state is carried
/// as a map from occupation tuple to amplitude and each input photon is
/// injected in turn: an entry branches over every target mode `j` with
/// amplitude factor `U[j,k]·√(n_j + 1)`, and branches landing on the same
/// tuple sum. After the final photon the amplitudes are divided by
/// `√(Π input factorials)` and squared into probabilities.
///
/// Must agree with the permanent-per-output method to numerical tolerance
/// for any transfer matrix and input; the integration suite checks that
/// equivalence against random unitaries.
pub fn full_distribution(
    transfer: &DMatrix<Complex64>,
    input: &FockState,
) -> Result<Distribution, Error> {
    input.expect_modes(transfer.ncols())?;
    let modes = transfer.nrows();

    let mut amplitudes: FxHashMap<Vec<u32>, Complex64> = FxHashMap::default();
    amplitudes.insert(vec![0; modes], Complex64::one());

    for (source, &count) in input.occupations().iter().enumerate() {
        for _ in 0..count {
            let mut next: FxHashMap<Vec<u32>, Complex64> = FxHashMap::default();
            next.reserve(amplitudes.len() * modes);
            for (occupation, amplitude) in &amplitudes {
                for target in 0..modes {
                    let coupling = transfer[(target, source)];
                    if coupling.is_zero() {
                        continue;
                    }
                    let mut raised = occupation.clone();
                    raised[target] += 1;
                    let contribution =
                        amplitude * coupling * f64::from(raised[target]).sqrt();
                    *next.entry(raised).or_insert_with(Complex64::zero) += contribution;
                }
            }
            amplitudes = next;
        }
    }

    let norm = occupation_factorial(input).sqrt();
    let mut entries: Vec<(Vec<u32>, Complex64)> = amplitudes.into_iter().collect();
    // Canonical state order keeps iteration and sampling deterministic.
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut distribution = Distribution::new();
    for (occupation, amplitude) in entries {
        let probability = (amplitude / norm).norm_sqr();
        if probability > 0.0 {
            distribution.add(FockState::new(occupation), probability);
        }
    }
    Ok(distribution)
}
