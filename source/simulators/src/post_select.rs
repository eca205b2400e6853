// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use photonic_circuit::FockState;
use std::fmt::Display;

/// A predicate over measured output states.
///
/// Conditions sum the photon counts of a mode set and compare against a
/// required count; a state is accepted when every condition holds. Mode
/// indices refer to the declared circuit modes, so the same predicate works
/// with and without heralds — which is exactly what the herald/post-selection
/// equivalence property needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostSelection {
    conditions: Vec<Condition>,
}

#[derive(Clone, Debug, PartialEq)]
struct Condition {
    modes: Vec<usize>,
    op: CmpOp,
    photons: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CmpOp {
    Eq,
    AtLeast,
    AtMost,
}

impl PostSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the mode set to carry exactly `photons` photons.
    #[must_use]
    pub fn eq(mut self, modes: &[usize], photons: u32) -> Self {
        self.conditions.push(Condition {
            modes: modes.to_vec(),
            op: CmpOp::Eq,
            photons,
        });
        self
    }

    /// Requires the mode set to carry at least `photons` photons.
    #[must_use]
    pub fn at_least(mut self, modes: &[usize], photons: u32) -> Self {
        self.conditions.push(Condition {
            modes: modes.to_vec(),
            op: CmpOp::AtLeast,
            photons,
        });
        self
    }

    /// Requires the mode set to carry at most `photons` photons.
    #[must_use]
    pub fn at_most(mut self, modes: &[usize], photons: u32) -> Self {
        self.conditions.push(Condition {
            modes: modes.to_vec(),
            op: CmpOp::AtMost,
            photons,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Largest mode index any condition references.
    #[must_use]
    pub fn max_mode(&self) -> Option<usize> {
        self.conditions
            .iter()
            .flat_map(|condition| condition.modes.iter().copied())
            .max()
    }

    #[must_use]
    pub fn accepts(&self, state: &FockState) -> bool {
        self.conditions.iter().all(|condition| {
            let count: u32 = condition
                .modes
                .iter()
                .map(|&mode| state.occupations()[mode])
                .sum();
            match condition.op {
                CmpOp::Eq => count == condition.photons,
                CmpOp::AtLeast => count >= condition.photons,
                CmpOp::AtMost => count <= condition.photons,
            }
        })
    }
}

impl Display for PostSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            let op = match condition.op {
                CmpOp::Eq => "==",
                CmpOp::AtLeast => ">=",
                CmpOp::AtMost => "<=",
            };
            write!(f, "{:?}{op}{}", condition.modes, condition.photons)?;
        }
        Ok(())
    }
}
