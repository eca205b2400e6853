// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::error::Error;
use photonic_circuit::FockState;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::fmt::Display;

/// A probability table over Fock states.
///
/// Keys are unique; iteration follows insertion order, so a deterministic
/// pipeline yields a deterministic table and deterministic samples. The
/// recorded probabilities may sum to less than 1 for lossy or filtered
/// circuits — the shortfall is the mass absorbed into unrecorded
/// loss/vacuum states ([`Distribution::absorbed_mass`]).
#[derive(Clone, Debug, Default)]
pub struct Distribution {
    probabilities: FxHashMap<FockState, f64>,
    order: Vec<FockState>,
}

impl Distribution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates probability mass onto a state.
    pub fn add(&mut self, state: FockState, probability: f64) {
        debug_assert!(probability >= 0.0, "probabilities are non-negative");
        match self.probabilities.entry(state.clone()) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                *entry.get_mut() += probability;
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(probability);
                self.order.push(state);
            }
        }
    }

    /// Probability of a state; zero if unrecorded.
    #[must_use]
    pub fn get(&self, state: &FockState) -> f64 {
        self.probabilities.get(state).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FockState, f64)> {
        self.order
            .iter()
            .map(|state| (state, self.probabilities[state]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all recorded probabilities.
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.probabilities.values().sum()
    }

    /// Probability mass attributed to unrecorded loss-absorbing states.
    #[must_use]
    pub fn absorbed_mass(&self) -> f64 {
        (1.0 - self.total_mass()).max(0.0)
    }

    /// Accumulates `other` scaled by `weight`.
    pub fn merge(&mut self, other: &Distribution, weight: f64) {
        for (state, probability) in other.iter() {
            self.add(state.clone(), probability * weight);
        }
    }

    /// Mode-wise convolution: the joint distribution of two independent
    /// photon ensembles over the same modes.
    #[must_use]
    pub fn convolved(&self, other: &Distribution) -> Distribution {
        let mut joint = Distribution::new();
        for (left, p_left) in self.iter() {
            for (right, p_right) in other.iter() {
                let combined: FockState = left
                    .occupations()
                    .iter()
                    .zip(right.occupations())
                    .map(|(&a, &b)| a + b)
                    .collect();
                joint.add(combined, p_left * p_right);
            }
        }
        joint
    }

    /// Corrects small floating-point drift by renormalizing once; fails with
    /// [`Error::Normalization`] if the sum deviates from 1 beyond
    /// `tolerance`.
    pub fn normalized(mut self, tolerance: f64) -> Result<Self, Error> {
        let sum = self.total_mass();
        if !sum.is_finite() || (sum - 1.0).abs() > tolerance {
            return Err(Error::Normalization { sum, tolerance });
        }
        for probability in self.probabilities.values_mut() {
            *probability /= sum;
        }
        Ok(self)
    }

    /// Renormalizes over the retained mass, turning a filtered table into a
    /// conditional distribution. Fails with [`Error::NoValidOutputs`] when
    /// nothing was retained.
    pub fn conditioned(mut self) -> Result<Self, Error> {
        let sum = self.total_mass();
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(Error::NoValidOutputs);
        }
        for probability in self.probabilities.values_mut() {
            *probability /= sum;
        }
        Ok(self)
    }

    /// Draws one state in proportion to the recorded probabilities.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&FockState> {
        let total = self.total_mass();
        if self.is_empty() || !(total > 0.0) {
            return None;
        }
        let mut remaining = rng.gen_range(0.0..total);
        let mut last = None;
        for (state, probability) in self.iter() {
            last = Some(state);
            if remaining < probability {
                return last;
            }
            remaining -= probability;
        }
        // Floating-point slack lands on the final state.
        last
    }
}

impl FromIterator<(FockState, f64)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (FockState, f64)>>(iter: T) -> Self {
        let mut distribution = Distribution::new();
        for (state, probability) in iter {
            distribution.add(state, probability);
        }
        distribution
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<(&FockState, f64)> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.occupations().cmp(b.occupations()));
        for (state, probability) in entries {
            writeln!(f, "{state}: {probability:.6}")?;
        }
        Ok(())
    }
}
