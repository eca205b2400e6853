// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by backends, noise models, and orchestration.
///
/// Circuit-side validation and compilation failures pass through
/// transparently; everything else names the offending field or the exact
/// combination that was rejected.
#[derive(Clone, Debug, Diagnostic, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Circuit(#[from] photonic_circuit::Error),

    #[error("input carries {input} photons but output carries {output}")]
    #[diagnostic(code("Photonic.Sim.PhotonNumberMismatch"))]
    PhotonNumberMismatch { input: u32, output: u32 },

    #[error("output photon number {output} exceeds input photon number {input}")]
    #[diagnostic(code("Photonic.Sim.PhotonNumberExceeded"))]
    PhotonNumberExceeded { input: u32, output: u32 },

    #[error("{photons} photons exceed the permanent evaluation limit of {max}")]
    #[diagnostic(code("Photonic.Sim.PhotonNumberTooLarge"))]
    PhotonNumberTooLarge { photons: u32, max: u32 },

    #[error("fermionic statistics allow at most one photon per mode, got {count} in mode {mode}")]
    #[diagnostic(code("Photonic.Sim.FermionicOccupancy"))]
    FermionicOccupancy { mode: usize, count: u32 },

    #[error("unknown statistics `{name}`, expected `bosonic` or `fermionic`")]
    #[diagnostic(code("Photonic.Sim.UnknownStatistics"))]
    UnknownStatistics { name: String },

    #[error("unknown backend `{name}`, expected `permanent` or `full-distribution`")]
    #[diagnostic(code("Photonic.Sim.UnknownBackend"))]
    UnknownBackend { name: String },

    #[error("no input state was supplied to the processor")]
    #[diagnostic(code("Photonic.Sim.InputNotSet"))]
    InputNotSet,

    #[error(
        "output sampling draws from the pre-filtered distribution and cannot model detector \
         dark counts or sub-unity efficiency; use input sampling instead"
    )]
    #[diagnostic(code("Photonic.Sim.IncompatibleSampling"))]
    IncompatibleSampling,

    #[error("no candidate outputs survive heralding, post-selection, and minimum detection")]
    #[diagnostic(code("Photonic.Sim.NoValidOutputs"))]
    NoValidOutputs,

    #[error("probability threshold {threshold} discarded every source branch")]
    #[diagnostic(code("Photonic.Sim.ThresholdDiscardedAll"))]
    ThresholdDiscardedAll { threshold: f64 },

    #[error("distribution sums to {sum} which deviates from 1 beyond tolerance {tolerance:e}")]
    #[diagnostic(code("Photonic.Sim.Normalization"))]
    Normalization { sum: f64, tolerance: f64 },
}
