// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use crate::distribution::Distribution;
use crate::error::Error;
use crate::permanent::{determinant, occupation_factorial, permanent, scattering_submatrix};
use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::One;
use photonic_circuit::FockState;
use std::fmt::Display;
use std::str::FromStr;

/// Particle exchange statistics.
///
/// An explicit value threaded into every backend and processor — never
/// ambient state. Bosonic amplitudes come from permanents, fermionic ones
/// from determinants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statistics {
    Bosonic,
    Fermionic,
}

impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statistics::Bosonic => write!(f, "bosonic"),
            Statistics::Fermionic => write!(f, "fermionic"),
        }
    }
}

impl FromStr for Statistics {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name {
            "bosonic" => Ok(Statistics::Bosonic),
            "fermionic" => Ok(Statistics::Fermionic),
            _ => Err(Error::UnknownStatistics { name: name.into() }),
        }
    }
}

/// Bosonic distribution strategy.
///
/// `Permanent` evaluates one permanent per output state;
/// `FullDistribution` runs the incremental creation-operator pass once per
/// input (see [`crate::full_distribution`]). Fermionic statistics always
/// take the internal determinant path regardless of this choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Permanent,
    FullDistribution,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Permanent => write!(f, "permanent"),
            BackendKind::FullDistribution => write!(f, "full-distribution"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name {
            "permanent" => Ok(BackendKind::Permanent),
            "full-distribution" => Ok(BackendKind::FullDistribution),
            _ => Err(Error::UnknownBackend { name: name.into() }),
        }
    }
}

/// Permanent evaluation is `O(n·2ⁿ)` in total photon number; past this the
/// submatrix subsets no longer fit the Gray-code word and the run time is
/// unreasonable anyway.
pub const MAX_PERMANENT_PHOTONS: u32 = 62;

/// Transition amplitude `⟨output| U |input⟩` for one input/output pair.
///
/// A pure combinatorial primitive: loss handling belongs to the
/// orchestration layer, which sums probabilities over loss-mode occupation
/// splits of the full matrix.
pub fn transition_amplitude(
    transfer: &DMatrix<Complex64>,
    input: &FockState,
    output: &FockState,
    statistics: Statistics,
) -> Result<Complex64, Error> {
    input.expect_modes(transfer.ncols())?;
    output.expect_modes(transfer.nrows())?;
    let photons_in = input.total_photons();
    let photons_out = output.total_photons();
    if photons_in != photons_out {
        return Err(Error::PhotonNumberMismatch {
            input: photons_in,
            output: photons_out,
        });
    }

    match statistics {
        Statistics::Bosonic => {
            if photons_in > MAX_PERMANENT_PHOTONS {
                return Err(Error::PhotonNumberTooLarge {
                    photons: photons_in,
                    max: MAX_PERMANENT_PHOTONS,
                });
            }
            if photons_in == 0 {
                return Ok(Complex64::one());
            }
            let sub = scattering_submatrix(transfer, input, output);
            let norm = (occupation_factorial(input) * occupation_factorial(output)).sqrt();
            Ok(permanent(&sub) / norm)
        }
        Statistics::Fermionic => {
            check_fermionic(input)?;
            check_fermionic(output)?;
            let sub = scattering_submatrix(transfer, input, output);
            Ok(determinant(&sub))
        }
    }
}

/// `|amplitude|²` for one input/output pair.
pub fn transition_probability(
    transfer: &DMatrix<Complex64>,
    input: &FockState,
    output: &FockState,
    statistics: Statistics,
) -> Result<f64, Error> {
    transition_amplitude(transfer, input, output, statistics).map(|a| a.norm_sqr())
}

/// The full output distribution by enumerating every Fock basis state with
/// the input's photon number and evaluating one amplitude per state.
pub fn distribution_via_amplitudes(
    transfer: &DMatrix<Complex64>,
    input: &FockState,
    statistics: Statistics,
) -> Result<Distribution, Error> {
    input.expect_modes(transfer.ncols())?;
    if statistics == Statistics::Fermionic {
        check_fermionic(input)?;
    }

    let mut distribution = Distribution::new();
    for output in output_states(transfer.nrows(), input.total_photons()) {
        if statistics == Statistics::Fermionic
            && output.occupations().iter().any(|&count| count > 1)
        {
            continue;
        }
        let probability = transition_probability(transfer, input, &output, statistics)?;
        if probability > 0.0 {
            distribution.add(output, probability);
        }
    }
    Ok(distribution)
}

/// Every Fock basis state of `photons` photons in `modes` modes, in
/// lexicographically descending occupation order.
#[must_use]
pub fn output_states(modes: usize, photons: u32) -> Vec<FockState> {
    let mut states = Vec::new();
    if modes == 0 {
        if photons == 0 {
            states.push(FockState::new(Vec::new()));
        }
        return states;
    }
    let mut current = vec![0u32; modes];
    fill_states(&mut current, 0, photons, &mut states);
    states
}

fn fill_states(current: &mut Vec<u32>, mode: usize, remaining: u32, states: &mut Vec<FockState>) {
    if mode == current.len() - 1 {
        current[mode] = remaining;
        states.push(FockState::new(current.clone()));
        return;
    }
    for count in (0..=remaining).rev() {
        current[mode] = count;
        fill_states(current, mode + 1, remaining - count, states);
    }
    current[mode] = 0;
}

fn check_fermionic(state: &FockState) -> Result<(), Error> {
    for (mode, &count) in state.occupations().iter().enumerate() {
        if count > 1 {
            return Err(Error::FermionicOccupancy { mode, count });
        }
    }
    Ok(())
}
