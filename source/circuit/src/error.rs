// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while building or compiling a circuit.
///
/// Validation is eager: out-of-range values are rejected at the point they
/// are supplied, never deferred into numeric code, and every message names
/// the offending field.
#[derive(Clone, Debug, Diagnostic, Error, PartialEq)]
pub enum Error {
    #[error("{field} must be within [{low}, {high}], got {value}")]
    #[diagnostic(code("Photonic.Circuit.ValueOutOfRange"))]
    ValueOutOfRange {
        field: &'static str,
        low: f64,
        high: f64,
        value: f64,
    },

    #[error("mode index {mode} is out of range for a circuit with {modes} modes")]
    #[diagnostic(code("Photonic.Circuit.ModeOutOfRange"))]
    ModeOutOfRange { mode: usize, modes: usize },

    #[error("component must act on distinct modes, got mode {0} twice")]
    #[diagnostic(code("Photonic.Circuit.DuplicateMode"))]
    DuplicateMode(usize),

    #[error("mode swap permutation is incomplete: sources {sources:?} do not match targets {targets:?}")]
    #[diagnostic(code("Photonic.Circuit.IncompletePermutation"))]
    IncompletePermutation {
        sources: Vec<usize>,
        targets: Vec<usize>,
    },

    #[error("state has {actual} modes, expected {expected}")]
    #[diagnostic(code("Photonic.Circuit.ModeMismatch"))]
    ModeMismatch { expected: usize, actual: usize },

    #[error("matrix embedded at mode {mode} is not unitary within tolerance {tolerance:e}")]
    #[diagnostic(code("Photonic.Circuit.NotUnitary"))]
    NotUnitary { mode: usize, tolerance: f64 },

    #[error("compiled transfer matrix lost unitarity within tolerance {tolerance:e}")]
    #[diagnostic(code("Photonic.Circuit.UnitarityDrift"))]
    UnitarityDrift { tolerance: f64 },

    #[error("mode {mode} already carries a herald")]
    #[diagnostic(code("Photonic.Circuit.DuplicateHerald"))]
    DuplicateHerald { mode: usize },

    #[error("failed to compile component {index} ({kind}): {source}")]
    #[diagnostic(code("Photonic.Circuit.Compilation"))]
    Compilation {
        index: usize,
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps a compiler failure with the position and kind of the component
    /// that produced it. Already-wrapped errors keep their original context.
    #[must_use]
    pub fn with_component(self, index: usize, kind: &'static str) -> Self {
        match self {
            Error::Compilation { .. } => self,
            other => Error::Compilation {
                index,
                kind,
                source: Box::new(other),
            },
        }
    }
}
