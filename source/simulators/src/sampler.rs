// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::distribution::Distribution;
use crate::error::Error;
use crate::processor::Processor;
use photonic_circuit::FockState;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rustc_hash::FxHashMap;

/// How a trial is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleMode {
    /// Redraw a fresh (possibly imperfect) input and a detector outcome per
    /// trial. Faithfully models per-cycle noise — dark counts, sub-unity
    /// efficiency — and may return fewer than the requested number of
    /// accepted samples.
    Input,
    /// Draw directly from the pre-filtered, renormalized valid-output
    /// distribution. Always returns exactly the requested number of
    /// samples, but has no physical mechanism to invent or remove photons
    /// after the fact, so it is incompatible with dark counts and sub-unity
    /// efficiency.
    Output,
}

/// Seeded Monte-Carlo sampling over a [`Processor`] configuration.
///
/// Identical configuration and seed reproduce identical samples.
pub struct Sampler {
    processor: Processor,
    mode: SampleMode,
}

impl Sampler {
    /// Rejects [`SampleMode::Output`] with a noisy detector up front; the
    /// combination has no physical interpretation.
    pub fn new(processor: Processor, mode: SampleMode) -> Result<Self, Error> {
        if mode == SampleMode::Output && !processor.detector().is_ideal() {
            return Err(Error::IncompatibleSampling);
        }
        Ok(Self { processor, mode })
    }

    #[must_use]
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut Processor {
        &mut self.processor
    }

    #[must_use]
    pub fn mode(&self) -> SampleMode {
        self.mode
    }

    /// One accepted sample, or `None` if the single trial was rejected.
    pub fn sample(&mut self, seed: u64) -> Result<Option<FockState>, Error> {
        Ok(self.sample_n(1, seed)?.pop())
    }

    /// Up to `shots` accepted samples over the observable modes.
    pub fn sample_n(&mut self, shots: usize, seed: u64) -> Result<Vec<FockState>, Error> {
        match self.mode {
            SampleMode::Input => self.sample_inputs(shots, seed),
            SampleMode::Output => self.sample_outputs(shots, seed),
        }
    }

    /// Sample counts keyed by observed state.
    pub fn sample_counts(
        &mut self,
        shots: usize,
        seed: u64,
    ) -> Result<FxHashMap<FockState, u64>, Error> {
        let mut counts: FxHashMap<FockState, u64> = FxHashMap::default();
        for state in self.sample_n(shots, seed)? {
            *counts.entry(state).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn sample_outputs(&mut self, shots: usize, seed: u64) -> Result<Vec<FockState>, Error> {
        // The detector may have been reconfigured since construction.
        if !self.processor.detector().is_ideal() {
            return Err(Error::IncompatibleSampling);
        }
        let threshold = !self.processor.detector().photon_number_resolving();
        let valid = self.processor.probabilities()?.clone().conditioned()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(shots);
        for _ in 0..shots {
            let state = valid
                .sample(&mut rng)
                .expect("conditioned distribution has mass")
                .clone();
            samples.push(if threshold { clamp_threshold(&state) } else { state });
        }
        Ok(samples)
    }

    fn sample_inputs(&mut self, shots: usize, seed: u64) -> Result<Vec<FockState>, Error> {
        self.processor.ensure_cache()?;
        let cache = self.processor.cached();
        let branches: Vec<_> = cache.source_statistics.iter().collect();
        let total_weight: f64 = branches.iter().map(|(_, weight)| *weight).sum();
        let declared_modes = cache.compiled.modes();
        let observable_modes = cache.compiled.observable_modes();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut branch_distributions: FxHashMap<usize, Distribution> = FxHashMap::default();
        let mut accepted = Vec::new();

        for _ in 0..shots {
            // Draw a real input for this cycle.
            let mut pick = rng.gen_range(0.0..total_weight);
            let mut chosen = branches.len() - 1;
            for (index, (_, weight)) in branches.iter().enumerate() {
                if pick < *weight {
                    chosen = index;
                    break;
                }
                pick -= *weight;
            }

            let distribution = match branch_distributions.entry(chosen) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => entry.insert(
                    self.processor
                        .branch_distribution(&cache.compiled, branches[chosen].0)?,
                ),
            };

            // The true full-space output, then what the detector sees.
            let full = distribution
                .sample(&mut rng)
                .expect("full-space distribution has mass");
            let declared: FockState = full.occupations()[..declared_modes].into();
            let measured = self.processor.detector().measure(&declared, &mut rng);

            if self.processor.accepts(&cache.compiled, &measured) {
                accepted.push(measured.project(&observable_modes));
            }
        }
        Ok(accepted)
    }
}

fn clamp_threshold(state: &FockState) -> FockState {
    state.occupations().iter().map(|&count| count.min(1)).collect()
}
