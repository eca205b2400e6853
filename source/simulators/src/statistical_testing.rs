// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for statistical assertions in sampling tests, plus
//! deterministic random-unitary generation for backend equivalence checks.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Tolerance for tests with ≥100K samples.
pub const TOLERANCE_HIGH_SAMPLES: f64 = 0.05;

/// Tolerance for tests with fewer samples or higher variance.
pub const TOLERANCE_LOW_SAMPLES: f64 = 0.10;

/// Asserts that an observed event rate matches the expected probability
/// within a relative tolerance.
///
/// # Panics
///
/// Panics if the observed rate deviates from expected by more than the
/// tolerance.
#[allow(clippy::cast_precision_loss)]
pub fn assert_rate_within_tolerance(
    observed: usize,
    total: usize,
    expected_probability: f64,
    relative_tolerance: f64,
    context: &str,
) {
    let observed_rate = observed as f64 / total as f64;
    let lower = expected_probability * (1.0 - relative_tolerance);
    let upper = expected_probability * (1.0 + relative_tolerance);
    assert!(
        (lower..=upper).contains(&observed_rate),
        "{context}: observed rate {observed_rate:.4} deviates from expected \
         {expected_probability:.4} by more than {:.0}%",
        relative_tolerance * 100.0
    );
}

/// Asserts two probabilities agree within an absolute tolerance.
///
/// # Panics
///
/// Panics if `|actual − expected| > tolerance`.
pub fn assert_probability_close(actual: f64, expected: f64, tolerance: f64, context: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{context}: probability {actual} differs from expected {expected} \
         by more than {tolerance:e}"
    );
}

/// A Haar-ish random unitary: a seeded complex Gaussian-free matrix pushed
/// through QR. Deterministic per seed, unitary to machine precision.
#[must_use]
pub fn random_unitary(modes: usize, seed: u64) -> DMatrix<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let raw = DMatrix::from_fn(modes, modes, |_, _| {
        Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    });
    raw.qr().q()
}
