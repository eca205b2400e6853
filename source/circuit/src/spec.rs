// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::component::Component;
use crate::error::Error;
use crate::parameter::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered component sequence over a declared number of modes, plus the
/// input/output heralds.
///
/// This is the mutable build-side description; [`crate::compile`] resolves it
/// into a [`crate::CompiledCircuit`]. Builder mutators validate eagerly, so a
/// spec assembled through them never fails basic mode checks at compile time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircuitSpec {
    modes: usize,
    components: Vec<Component>,
    input_heralds: BTreeMap<usize, u32>,
    output_heralds: BTreeMap<usize, u32>,
}

impl CircuitSpec {
    #[must_use]
    pub fn new(modes: usize) -> Self {
        Self {
            modes,
            components: Vec::new(),
            input_heralds: BTreeMap::new(),
            output_heralds: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn modes(&self) -> usize {
        self.modes
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn input_heralds(&self) -> &BTreeMap<usize, u32> {
        &self.input_heralds
    }

    #[must_use]
    pub fn output_heralds(&self) -> &BTreeMap<usize, u32> {
        &self.output_heralds
    }

    /// Appends a component, rejecting out-of-range mode references up front.
    pub fn add(&mut self, component: impl Into<Component>) -> Result<&mut Self, Error> {
        let component = component.into();
        if let Some(max) = component.max_mode()
            && max >= self.modes
        {
            return Err(Error::ModeOutOfRange {
                mode: max,
                modes: self.modes,
            });
        }
        self.components.push(component);
        Ok(self)
    }

    /// Declares that `mode` must carry `input` photons going in and `output`
    /// photons coming out for a run to count.
    pub fn add_herald(&mut self, mode: usize, input: u32, output: u32) -> Result<&mut Self, Error> {
        if mode >= self.modes {
            return Err(Error::ModeOutOfRange {
                mode,
                modes: self.modes,
            });
        }
        if self.input_heralds.contains_key(&mode) || self.output_heralds.contains_key(&mode) {
            return Err(Error::DuplicateHerald { mode });
        }
        self.input_heralds.insert(mode, input);
        self.output_heralds.insert(mode, output);
        Ok(self)
    }

    /// Modes a user-supplied input covers: every declared mode without an
    /// input herald, in ascending order.
    #[must_use]
    pub fn external_input_modes(&self) -> Vec<usize> {
        (0..self.modes)
            .filter(|mode| !self.input_heralds.contains_key(mode))
            .collect()
    }

    /// Modes visible on the output side: every declared mode without an
    /// output herald, in ascending order.
    #[must_use]
    pub fn observable_modes(&self) -> Vec<usize> {
        (0..self.modes)
            .filter(|mode| !self.output_heralds.contains_key(mode))
            .collect()
    }

    /// Structural snapshot of the resolved configuration.
    ///
    /// Two specs with equal fingerprints compile to the same circuit;
    /// memoization compares fingerprints rather than chasing shared
    /// parameter cells, and parameter epochs make in-place mutation of a
    /// shared cell visible.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut fp = Fingerprint::default();
        fp.push_uint(self.modes as u64);
        for component in &self.components {
            fingerprint_component(component, &mut fp);
        }
        for (&mode, &photons) in &self.input_heralds {
            fp.push_uint(mode as u64);
            fp.push_uint(u64::from(photons));
        }
        for (&mode, &photons) in &self.output_heralds {
            fp.push_uint(mode as u64);
            fp.push_uint(u64::from(photons));
        }
        fp
    }
}

/// Flat structural-equality snapshot of resolved values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fingerprint(Vec<Atom>);

#[derive(Clone, Debug, PartialEq)]
enum Atom {
    Uint(u64),
    Float(f64),
    Str(&'static str),
}

impl Fingerprint {
    pub fn push_uint(&mut self, value: u64) {
        self.0.push(Atom::Uint(value));
    }

    pub fn push_float(&mut self, value: f64) {
        self.0.push(Atom::Float(value));
    }

    pub fn push_str(&mut self, value: &'static str) {
        self.0.push(Atom::Str(value));
    }

    pub fn push_param(&mut self, value: &ParamValue) {
        self.push_float(value.resolve());
        self.push_uint(value.epoch());
    }
}

fn fingerprint_component(component: &Component, fp: &mut Fingerprint) {
    fp.push_str(component.kind());
    match component {
        Component::BeamSplitter(bs) => {
            fp.push_uint(bs.modes.0 as u64);
            fp.push_uint(bs.modes.1 as u64);
            fp.push_param(&bs.reflectivity);
            fp.push_str(match bs.convention {
                crate::component::BsConvention::Rx => "Rx",
                crate::component::BsConvention::H => "H",
            });
            fp.push_float(bs.loss_db);
        }
        Component::PhaseShifter(ps) => {
            fp.push_uint(ps.mode as u64);
            fp.push_param(&ps.phi);
            fp.push_float(ps.loss_db);
        }
        Component::Loss(loss) => {
            fp.push_uint(loss.mode as u64);
            fp.push_float(loss.loss_db);
        }
        Component::Barrier(barrier) => {
            for &mode in &barrier.modes {
                fp.push_uint(mode as u64);
            }
        }
        Component::ModeSwap(swap) => {
            for &(source, target) in &swap.pairs {
                fp.push_uint(source as u64);
                fp.push_uint(target as u64);
            }
        }
        Component::UnitaryBlock(block) => {
            fp.push_uint(block.mode as u64);
            for entry in block.matrix.iter() {
                fp.push_float(entry.re);
                fp.push_float(entry.im);
            }
        }
        Component::Group(group) => {
            fp.push_uint(group.mode as u64);
            for sub in &group.components {
                fingerprint_component(sub, fp);
            }
            for &(mode, photons) in group.input_heralds.iter().chain(&group.output_heralds) {
                fp.push_uint(mode as u64);
                fp.push_uint(u64::from(photons));
            }
        }
    }
}
