// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::{One, Zero};
use photonic_circuit::FockState;

/// Permanent of a square complex matrix via Ryser's formula with Gray-code
/// subset iteration.
///
/// Cost is `O(n·2ⁿ)` in the matrix dimension, which equals the total photon
/// number for scattering submatrices. Callers bound `n` (see
/// [`crate::backend::MAX_PERMANENT_PHOTONS`]); this primitive assumes
/// `n < 64` so subsets fit a `u64`.
#[must_use]
pub fn permanent(matrix: &DMatrix<Complex64>) -> Complex64 {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols(), "permanent requires a square matrix");
    if n == 0 {
        return Complex64::one();
    }

    // Ryser: perm(A) = Σ_S (−1)^(n−|S|) Π_i Σ_{j∈S} a_ij. The Gray code
    // walk touches one column per subset, so each step costs O(n).
    let mut row_sums = vec![Complex64::zero(); n];
    let mut total = Complex64::zero();
    let mut previous: u64 = 0;
    for k in 1..(1u64 << n) {
        let subset = k ^ (k >> 1);
        let toggled = (subset ^ previous).trailing_zeros() as usize;
        if subset & (1 << toggled) == 0 {
            for (i, sum) in row_sums.iter_mut().enumerate() {
                *sum -= matrix[(i, toggled)];
            }
        } else {
            for (i, sum) in row_sums.iter_mut().enumerate() {
                *sum += matrix[(i, toggled)];
            }
        }
        previous = subset;

        let product = row_sums
            .iter()
            .fold(Complex64::one(), |acc, &sum| acc * sum);
        if (n as u32 - subset.count_ones()) % 2 == 0 {
            total += product;
        } else {
            total -= product;
        }
    }
    total
}

/// Determinant of a square complex matrix; the fermionic counterpart of the
/// permanent, polynomial instead of combinatorial.
#[must_use]
pub fn determinant(matrix: &DMatrix<Complex64>) -> Complex64 {
    if matrix.nrows() == 0 {
        return Complex64::one();
    }
    matrix.determinant()
}

/// Builds the m×m scattering submatrix for a transition: column `j` of the
/// transfer matrix is repeated per input occupation and row `i` per output
/// occupation, with `m` the total photon number.
///
/// Input and output must carry the same number of photons; the caller checks
/// that before building the submatrix.
#[must_use]
pub fn scattering_submatrix(
    transfer: &DMatrix<Complex64>,
    input: &FockState,
    output: &FockState,
) -> DMatrix<Complex64> {
    let mut rows = Vec::with_capacity(output.total_photons() as usize);
    for (mode, &count) in output.occupations().iter().enumerate() {
        for _ in 0..count {
            rows.push(mode);
        }
    }
    let mut cols = Vec::with_capacity(input.total_photons() as usize);
    for (mode, &count) in input.occupations().iter().enumerate() {
        for _ in 0..count {
            cols.push(mode);
        }
    }
    debug_assert_eq!(rows.len(), cols.len());
    DMatrix::from_fn(rows.len(), cols.len(), |r, c| {
        transfer[(rows[r], cols[c])]
    })
}

/// `n!` as a float; occupation numbers stay small enough that this is exact.
#[must_use]
pub fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// `Π nᵢ!` over a state's occupations.
#[must_use]
pub fn occupation_factorial(state: &FockState) -> f64 {
    state
        .occupations()
        .iter()
        .map(|&n| factorial(n))
        .product()
}
