// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::error::Error;
use photonic_circuit::{Error as CircuitError, FockState};
use rand::Rng;

/// Photon detector model.
///
/// A measurement drops each arriving photon independently with probability
/// `1 − efficiency`, injects one dark count per mode with probability
/// `p_dark`, and — unless the detector resolves photon number — clamps each
/// mode's reading to 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detector {
    efficiency: f64,
    p_dark: f64,
    photon_number_resolving: bool,
}

impl Default for Detector {
    fn default() -> Self {
        Self::PERFECT
    }
}

impl Detector {
    /// Unit efficiency, no dark counts, photon-number resolving.
    pub const PERFECT: Self = Self {
        efficiency: 1.0,
        p_dark: 0.0,
        photon_number_resolving: true,
    };

    pub fn new(efficiency: f64, p_dark: f64) -> Result<Self, Error> {
        let mut detector = Self::PERFECT;
        detector.set_efficiency(efficiency)?;
        detector.set_p_dark(p_dark)?;
        Ok(detector)
    }

    pub fn set_efficiency(&mut self, efficiency: f64) -> Result<(), Error> {
        check_unit("efficiency", efficiency)?;
        self.efficiency = efficiency;
        Ok(())
    }

    pub fn set_p_dark(&mut self, p_dark: f64) -> Result<(), Error> {
        check_unit("p_dark", p_dark)?;
        self.p_dark = p_dark;
        Ok(())
    }

    pub fn set_photon_number_resolving(&mut self, resolving: bool) {
        self.photon_number_resolving = resolving;
    }

    #[must_use]
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    #[must_use]
    pub fn p_dark(&self) -> f64 {
        self.p_dark
    }

    #[must_use]
    pub fn photon_number_resolving(&self) -> bool {
        self.photon_number_resolving
    }

    /// No loss and no spurious counts. Threshold clamping alone does not
    /// disqualify a detector here: it never invents or removes photons on
    /// states that heralding already constrains to 0 or 1.
    #[must_use]
    pub fn is_ideal(&self) -> bool {
        self.efficiency == 1.0 && self.p_dark == 0.0
    }

    /// One measurement of a true output state.
    pub fn measure<R: Rng>(&self, true_output: &FockState, rng: &mut R) -> FockState {
        true_output
            .occupations()
            .iter()
            .map(|&count| {
                let mut seen = 0u32;
                for _ in 0..count {
                    if self.efficiency == 1.0 || rng.gen_bool(self.efficiency) {
                        seen += 1;
                    }
                }
                if self.p_dark > 0.0 && rng.gen_bool(self.p_dark) {
                    seen += 1;
                }
                if self.photon_number_resolving {
                    seen
                } else {
                    seen.min(1)
                }
            })
            .collect()
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), Error> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(CircuitError::ValueOutOfRange {
            field,
            low: 0.0,
            high: 1.0,
            value,
        }
        .into());
    }
    Ok(())
}
