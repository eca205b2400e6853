// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use crate::fock::FockState;
use rustc_hash::FxHashMap;
use std::fmt::Display;

/// A Fock state whose photons carry distinguishability labels.
///
/// Photons sharing a label interfere with each other; photons with distinct
/// labels evolve independently. Annotated states only appear when a source
/// models imperfect purity or indistinguishability — the perfect-source path
/// stays on plain [`FockState`]s.
///
/// Equality and hashing are only meaningful on canonical states (see
/// [`AnnotatedState::canonicalize`]), where they depend on the
/// label-equivalence-class structure alone and not on the label values a
/// producer happened to pick.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotatedState {
    /// Per-mode label multiset, each kept sorted.
    modes: Vec<Vec<u32>>,
}

impl AnnotatedState {
    /// An annotated state with no photons in any of `modes` modes.
    #[must_use]
    pub fn vacuum(modes: usize) -> Self {
        Self {
            modes: vec![Vec::new(); modes],
        }
    }

    /// Annotates every photon of a plain Fock state with the shared label 0.
    #[must_use]
    pub fn from_fock(state: &FockState) -> Self {
        Self {
            modes: state
                .occupations()
                .iter()
                .map(|&n| vec![0; n as usize])
                .collect(),
        }
    }

    #[must_use]
    pub fn modes(&self) -> usize {
        self.modes.len()
    }

    #[must_use]
    pub fn total_photons(&self) -> u32 {
        self.modes.iter().map(|labels| labels.len() as u32).sum()
    }

    /// Adds one photon with the given label to `mode`, keeping the mode's
    /// label multiset sorted.
    pub fn push_photon(&mut self, mode: usize, label: u32) {
        let labels = &mut self.modes[mode];
        let at = labels.partition_point(|&l| l <= label);
        labels.insert(at, label);
    }

    /// Drops the labels, keeping only occupation counts.
    #[must_use]
    pub fn to_fock(&self) -> FockState {
        self.modes.iter().map(|labels| labels.len() as u32).collect()
    }

    /// Renumbers labels into canonical form.
    ///
    /// Each label class is summarized by its occupation signature (photon
    /// count per mode); classes are renumbered 0, 1, … in lexicographic
    /// signature order. Classes with identical signatures are
    /// interchangeable, so the result depends only on the
    /// label-equivalence-class structure, and weighted branches from a
    /// source expansion merge correctly.
    pub fn canonicalize(&mut self) {
        let mut signatures: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        let mode_count = self.modes.len();
        for (mode, labels) in self.modes.iter().enumerate() {
            for &label in labels {
                signatures
                    .entry(label)
                    .or_insert_with(|| vec![0; mode_count])[mode] += 1;
            }
        }

        let mut classes: Vec<(Vec<u32>, u32)> = signatures
            .into_iter()
            .map(|(label, signature)| (signature, label))
            .collect();
        classes.sort_unstable();

        let remap: FxHashMap<u32, u32> = classes
            .iter()
            .enumerate()
            .map(|(new, (_, old))| (*old, new as u32))
            .collect();
        for labels in &mut self.modes {
            for label in labels.iter_mut() {
                *label = remap[label];
            }
            labels.sort_unstable();
        }
    }

    /// Splits the state into one occupation vector per distinguishability
    /// class, ordered by label. Each class evolves through the circuit
    /// independently of the others.
    #[must_use]
    pub fn label_classes(&self) -> Vec<FockState> {
        let mut labels: Vec<u32> = self.modes.iter().flatten().copied().collect();
        labels.sort_unstable();
        labels.dedup();

        labels
            .iter()
            .map(|&label| {
                self.modes
                    .iter()
                    .map(|mode| mode.iter().filter(|&&l| l == label).count() as u32)
                    .collect()
            })
            .collect()
    }
}

impl Display for AnnotatedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|")?;
        for (i, labels) in self.modes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if labels.is_empty() {
                write!(f, "0")?;
            } else {
                write!(f, "{{")?;
                for (j, label) in labels.iter().enumerate() {
                    if j > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{label}")?;
                }
                write!(f, "}}")?;
            }
        }
        write!(f, "\u{27e9}")
    }
}
