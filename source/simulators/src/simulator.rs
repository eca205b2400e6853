// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::backend::{Statistics, output_states, transition_amplitude, transition_probability};
use crate::error::Error;
use num_complex::Complex64;
use photonic_circuit::{CircuitSpec, CompiledCircuit, FockState, compile};

/// Single-transition computations on a compiled circuit.
///
/// Where the [`crate::Processor`] produces whole distributions, this façade
/// answers for one input/output pair at a time, taking declared-space states
/// and handling loss-mode bookkeeping internally.
pub struct Simulator {
    compiled: CompiledCircuit,
    statistics: Statistics,
}

impl Simulator {
    pub fn new(spec: &CircuitSpec, statistics: Statistics) -> Result<Self, Error> {
        Ok(Self {
            compiled: compile(spec)?,
            statistics,
        })
    }

    #[must_use]
    pub fn from_compiled(compiled: CompiledCircuit, statistics: Statistics) -> Self {
        Self {
            compiled,
            statistics,
        }
    }

    #[must_use]
    pub fn compiled(&self) -> &CompiledCircuit {
        &self.compiled
    }

    /// Transition amplitude between declared-space states with equal photon
    /// number; loss modes are padded with vacuum on both sides.
    pub fn amplitude(&self, input: &FockState, output: &FockState) -> Result<Complex64, Error> {
        input.expect_modes(self.compiled.modes())?;
        output.expect_modes(self.compiled.modes())?;
        let loss = self.compiled.loss_modes();
        transition_amplitude(
            self.compiled.unitary(),
            &input.padded(loss),
            &output.padded(loss),
            self.statistics,
        )
    }

    /// Transition probability between declared-space states.
    ///
    /// When the circuit is lossy and the output carries fewer photons than
    /// the input, the missing photons are summed over every loss-mode
    /// occupation split.
    pub fn probability(&self, input: &FockState, output: &FockState) -> Result<f64, Error> {
        input.expect_modes(self.compiled.modes())?;
        output.expect_modes(self.compiled.modes())?;
        let photons_in = input.total_photons();
        let photons_out = output.total_photons();
        if photons_out > photons_in {
            return Err(Error::PhotonNumberExceeded {
                input: photons_in,
                output: photons_out,
            });
        }

        let loss = self.compiled.loss_modes();
        let lost = photons_in - photons_out;
        if lost > 0 && loss == 0 {
            return Err(Error::PhotonNumberMismatch {
                input: photons_in,
                output: photons_out,
            });
        }

        let padded_input = input.padded(loss);
        let mut probability = 0.0;
        for loss_split in output_states(loss, lost) {
            let mut occupations = output.occupations().to_vec();
            occupations.extend_from_slice(loss_split.occupations());
            probability += transition_probability(
                self.compiled.unitary(),
                &padded_input,
                &FockState::new(occupations),
                self.statistics,
            )?;
        }
        Ok(probability)
    }
}
