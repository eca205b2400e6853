// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::error::Error;
use photonic_circuit::{AnnotatedState, Error as CircuitError, FockState};
use rustc_hash::FxHashMap;

/// Single-photon source quality model.
///
/// - `brightness`: probability a requested photon is emitted at all;
/// - `purity`: probability an emission is a clean single photon rather than
///   carrying a distinguishable companion;
/// - `indistinguishability`: wavepacket overlap between emitted photons.
///
/// A perfect source maps every nominal input to itself with weight 1.
/// Anything less expands the nominal input into a weighted set of real
/// inputs; imperfect purity or indistinguishability produces
/// [`AnnotatedState`]s whose label classes evolve independently downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Source {
    brightness: f64,
    purity: f64,
    indistinguishability: f64,
    prob_threshold: f64,
}

impl Default for Source {
    fn default() -> Self {
        Self::PERFECT
    }
}

impl Source {
    pub const PERFECT: Self = Self {
        brightness: 1.0,
        purity: 1.0,
        indistinguishability: 1.0,
        prob_threshold: 0.0,
    };

    pub fn new(brightness: f64, purity: f64, indistinguishability: f64) -> Result<Self, Error> {
        let mut source = Self::PERFECT;
        source.set_brightness(brightness)?;
        source.set_purity(purity)?;
        source.set_indistinguishability(indistinguishability)?;
        Ok(source)
    }

    pub fn set_brightness(&mut self, brightness: f64) -> Result<(), Error> {
        check_unit("brightness", brightness)?;
        self.brightness = brightness;
        Ok(())
    }

    /// Purity lives in (0.5, 1]: below that the "single photon plus
    /// companion" decomposition stops being meaningful.
    pub fn set_purity(&mut self, purity: f64) -> Result<(), Error> {
        if !(purity > 0.5 && purity <= 1.0) {
            return Err(CircuitError::ValueOutOfRange {
                field: "purity",
                low: 0.5,
                high: 1.0,
                value: purity,
            }
            .into());
        }
        self.purity = purity;
        Ok(())
    }

    pub fn set_indistinguishability(&mut self, indistinguishability: f64) -> Result<(), Error> {
        check_unit("indistinguishability", indistinguishability)?;
        self.indistinguishability = indistinguishability;
        Ok(())
    }

    /// Branches below this weight are discarded and the remainder
    /// renormalized to 1. Zero keeps everything.
    pub fn set_prob_threshold(&mut self, threshold: f64) -> Result<(), Error> {
        check_unit("probability threshold", threshold)?;
        self.prob_threshold = threshold;
        Ok(())
    }

    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    #[must_use]
    pub fn purity(&self) -> f64 {
        self.purity
    }

    #[must_use]
    pub fn indistinguishability(&self) -> f64 {
        self.indistinguishability
    }

    #[must_use]
    pub fn prob_threshold(&self) -> f64 {
        self.prob_threshold
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.brightness == 1.0 && self.purity == 1.0 && self.indistinguishability == 1.0
    }

    /// Expands a nominal input into the weighted set of real inputs this
    /// source can actually produce. Weights always sum to 1.
    pub fn statistics(&self, nominal: &FockState) -> Result<SourceStatistics, Error> {
        if self.is_perfect() {
            let mut stats = SourceStatistics::default();
            stats.push(AnnotatedState::from_fock(nominal), 1.0);
            return Ok(stats);
        }

        let beta = self.brightness;
        let purity = self.purity;
        // Label overlap is an amplitude-level quantity, so the probability of
        // sharing the interference label is the square root of the
        // indistinguishability.
        let shared = self.indistinguishability.sqrt();

        let mut branches: Vec<Branch> = vec![Branch {
            state: AnnotatedState::vacuum(nominal.modes()),
            weight: 1.0,
            next_label: 1,
        }];

        for (mode, &count) in nominal.occupations().iter().enumerate() {
            for _ in 0..count {
                let mut expanded = Vec::with_capacity(branches.len() * 4);
                for branch in &branches {
                    branch.expand_photon(mode, beta, purity, shared, &mut expanded);
                }
                branches = expanded;
            }
        }

        let mut stats = SourceStatistics::default();
        for mut branch in branches {
            branch.state.canonicalize();
            stats.push(branch.state, branch.weight);
        }

        if self.prob_threshold > 0.0 {
            stats.truncate(self.prob_threshold)?;
        }
        Ok(stats)
    }
}

struct Branch {
    state: AnnotatedState,
    weight: f64,
    next_label: u32,
}

impl Branch {
    /// One requested photon expands into the closed outcome set: absent, or
    /// present as {pure, impure} × {indistinguishable, distinguishable}.
    /// Impure outcomes add one distinguishable companion photon in the same
    /// mode. The five weights sum to 1 by construction.
    fn expand_photon(
        &self,
        mode: usize,
        beta: f64,
        purity: f64,
        shared: f64,
        out: &mut Vec<Branch>,
    ) {
        let mut emit = |weight: f64, labels: &[u32], labels_used: u32| {
            if weight <= 0.0 {
                return;
            }
            let mut state = self.state.clone();
            for &label in labels {
                state.push_photon(mode, label);
            }
            out.push(Branch {
                state,
                weight: self.weight * weight,
                next_label: self.next_label + labels_used,
            });
        };

        let fresh = self.next_label;
        emit(1.0 - beta, &[], 0);
        emit(beta * purity * shared, &[0], 0);
        emit(beta * purity * (1.0 - shared), &[fresh], 1);
        emit(beta * (1.0 - purity) * shared, &[0, fresh], 1);
        emit(beta * (1.0 - purity) * (1.0 - shared), &[fresh, fresh + 1], 2);
    }
}

/// Weighted real inputs from a source expansion, canonically merged, in
/// deterministic insertion order.
#[derive(Clone, Debug, Default)]
pub struct SourceStatistics {
    entries: Vec<(AnnotatedState, f64)>,
    index: FxHashMap<AnnotatedState, usize>,
}

impl SourceStatistics {
    /// Accumulates weight onto a canonical state.
    fn push(&mut self, state: AnnotatedState, weight: f64) {
        if let Some(&at) = self.index.get(&state) {
            self.entries[at].1 += weight;
        } else {
            self.index.insert(state.clone(), self.entries.len());
            self.entries.push((state, weight));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnnotatedState, f64)> {
        self.entries.iter().map(|(state, weight)| (state, *weight))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    /// Drops branches below `threshold` and renormalizes the rest to 1.
    fn truncate(&mut self, threshold: f64) -> Result<(), Error> {
        self.entries.retain(|(_, weight)| *weight >= threshold);
        let total = self.total_weight();
        if !(total > 0.0) {
            return Err(Error::ThresholdDiscardedAll { threshold });
        }
        for (_, weight) in &mut self.entries {
            *weight /= total;
        }
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(at, (state, _))| (state.clone(), at))
            .collect();
        Ok(())
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
