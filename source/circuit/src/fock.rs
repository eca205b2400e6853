// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Index;

/// A Fock state: one photon occupation count per optical mode.
///
/// States are immutable once built; equality and hashing follow the
/// occupation sequence. Counts are unsigned, so the non-negativity
/// invariant holds by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FockState(Vec<u32>);

impl FockState {
    #[must_use]
    pub fn new(occupations: impl Into<Vec<u32>>) -> Self {
        Self(occupations.into())
    }

    /// The state with zero photons in every one of `modes` modes.
    #[must_use]
    pub fn vacuum(modes: usize) -> Self {
        Self(vec![0; modes])
    }

    /// Number of modes.
    #[must_use]
    pub fn modes(&self) -> usize {
        self.0.len()
    }

    /// Total photon number across all modes.
    #[must_use]
    pub fn total_photons(&self) -> u32 {
        self.0.iter().sum()
    }

    #[must_use]
    pub fn occupations(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn is_vacuum(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// The same state with `extra` empty modes appended.
    #[must_use]
    pub fn padded(&self, extra: usize) -> Self {
        let mut occupations = self.0.clone();
        occupations.resize(occupations.len() + extra, 0);
        Self(occupations)
    }

    /// Projects onto the given modes, in the given order.
    ///
    /// Used by the orchestration layer to strip herald and loss modes from a
    /// full-space state.
    #[must_use]
    pub fn project(&self, keep: &[usize]) -> Self {
        Self(keep.iter().map(|&m| self.0[m]).collect())
    }

    /// Fails with [`Error::ModeMismatch`] unless the state has exactly
    /// `expected` modes.
    pub fn expect_modes(&self, expected: usize) -> Result<(), Error> {
        if self.modes() == expected {
            Ok(())
        } else {
            Err(Error::ModeMismatch {
                expected,
                actual: self.modes(),
            })
        }
    }
}

impl Index<usize> for FockState {
    type Output = u32;

    fn index(&self, mode: usize) -> &u32 {
        &self.0[mode]
    }
}

impl From<Vec<u32>> for FockState {
    fn from(occupations: Vec<u32>) -> Self {
        Self(occupations)
    }
}

impl From<&[u32]> for FockState {
    fn from(occupations: &[u32]) -> Self {
        Self(occupations.to_vec())
    }
}

impl FromIterator<u32> for FockState {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for FockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{n}")?;
        }
        write!(f, "\u{27e9}")
    }
}
