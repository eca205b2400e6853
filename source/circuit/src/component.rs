// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::compiler::UNITARITY_TOLERANCE;
use crate::error::Error;
use crate::parameter::ParamValue;
use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One optical element of a circuit.
///
/// The component set is a closed sum type: the compiler matches on it
/// exhaustively, so an unrecognized component is unrepresentable rather
/// than a runtime defect.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Component {
    #[serde(rename = "beamSplitter")]
    BeamSplitter(BeamSplitter),
    #[serde(rename = "phaseShifter")]
    PhaseShifter(PhaseShifter),
    #[serde(rename = "loss")]
    Loss(LossChannel),
    #[serde(rename = "barrier")]
    Barrier(Barrier),
    #[serde(rename = "modeSwap")]
    ModeSwap(ModeSwap),
    #[serde(rename = "unitary")]
    UnitaryBlock(UnitaryBlock),
    #[serde(rename = "group")]
    Group(Group),
}

impl Component {
    /// Short name used in compilation error context.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Component::BeamSplitter(_) => "beam splitter",
            Component::PhaseShifter(_) => "phase shifter",
            Component::Loss(_) => "loss",
            Component::Barrier(_) => "barrier",
            Component::ModeSwap(_) => "mode swap",
            Component::UnitaryBlock(_) => "unitary",
            Component::Group(_) => "group",
        }
    }

    /// Largest mode index the component touches, if it touches any.
    #[must_use]
    pub fn max_mode(&self) -> Option<usize> {
        match self {
            Component::BeamSplitter(bs) => Some(bs.modes.0.max(bs.modes.1)),
            Component::PhaseShifter(ps) => Some(ps.mode),
            Component::Loss(loss) => Some(loss.mode),
            Component::Barrier(barrier) => barrier.modes.iter().copied().max(),
            Component::ModeSwap(swap) => swap
                .pairs
                .iter()
                .map(|&(source, target)| source.max(target))
                .max(),
            Component::UnitaryBlock(block) => {
                Some(block.mode + block.matrix.nrows().saturating_sub(1))
            }
            Component::Group(group) => Some(group.mode + group.span().saturating_sub(1)),
        }
    }
}

/// Beam splitter matrix convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BsConvention {
    /// `[[cos θ, i·sin θ], [i·sin θ, cos θ]]`
    Rx,
    /// `[[cos θ, sin θ], [sin θ, −cos θ]]`
    H,
}

impl Display for BsConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BsConvention::Rx => write!(f, "Rx"),
            BsConvention::H => write!(f, "H"),
        }
    }
}

/// A two-mode beam splitter with reflectivity `r`; the mixing angle is
/// `θ = arccos(√r)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeamSplitter {
    pub modes: (usize, usize),
    pub reflectivity: ParamValue,
    pub convention: BsConvention,
    pub loss_db: f64,
}

impl BeamSplitter {
    pub fn new(
        mode1: usize,
        mode2: usize,
        reflectivity: impl Into<ParamValue>,
        convention: BsConvention,
    ) -> Result<Self, Error> {
        if mode1 == mode2 {
            return Err(Error::DuplicateMode(mode1));
        }
        let reflectivity = reflectivity.into();
        if let ParamValue::Fixed(value) = reflectivity {
            check_range("reflectivity", value, 0.0, 1.0)?;
        }
        Ok(Self {
            modes: (mode1, mode2),
            reflectivity,
            convention,
            loss_db: 0.0,
        })
    }

    /// Attaches an insertion loss in dB to both arms.
    pub fn with_loss(mut self, loss_db: f64) -> Result<Self, Error> {
        check_range("loss (dB)", loss_db, 0.0, f64::INFINITY)?;
        self.loss_db = loss_db;
        Ok(self)
    }
}

impl From<BeamSplitter> for Component {
    fn from(bs: BeamSplitter) -> Self {
        Component::BeamSplitter(bs)
    }
}

/// A single-mode phase shift `exp(iφ)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseShifter {
    pub mode: usize,
    pub phi: ParamValue,
    pub loss_db: f64,
}

impl PhaseShifter {
    #[must_use]
    pub fn new(mode: usize, phi: impl Into<ParamValue>) -> Self {
        Self {
            mode,
            phi: phi.into(),
            loss_db: 0.0,
        }
    }

    pub fn with_loss(mut self, loss_db: f64) -> Result<Self, Error> {
        check_range("loss (dB)", loss_db, 0.0, f64::INFINITY)?;
        self.loss_db = loss_db;
        Ok(self)
    }
}

impl From<PhaseShifter> for Component {
    fn from(ps: PhaseShifter) -> Self {
        Component::PhaseShifter(ps)
    }
}

/// A single-mode loss channel with transmission `10^(−loss_db/10)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LossChannel {
    pub mode: usize,
    pub loss_db: f64,
}

impl LossChannel {
    pub fn new(mode: usize, loss_db: f64) -> Result<Self, Error> {
        check_range("loss (dB)", loss_db, 0.0, f64::INFINITY)?;
        Ok(Self { mode, loss_db })
    }

    /// Fraction of amplitude-squared transmitted past the channel.
    #[must_use]
    pub fn transmission(&self) -> f64 {
        10f64.powf(-self.loss_db / 10.0)
    }
}

impl From<LossChannel> for Component {
    fn from(loss: LossChannel) -> Self {
        Component::Loss(loss)
    }
}

/// A visual separator. No effect on the transfer matrix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Barrier {
    pub modes: Vec<usize>,
}

impl Barrier {
    #[must_use]
    pub fn new(modes: Vec<usize>) -> Self {
        Self { modes }
    }
}

impl From<Barrier> for Component {
    fn from(barrier: Barrier) -> Self {
        Component::Barrier(barrier)
    }
}

/// A permutation of modes, given as (source, target) pairs; unmapped modes
/// stay in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModeSwap {
    pub pairs: Vec<(usize, usize)>,
}

impl ModeSwap {
    /// The pairs must form a bijection: no source or target repeats, and the
    /// source set must equal the target set.
    pub fn new(pairs: Vec<(usize, usize)>) -> Result<Self, Error> {
        let mut sources: Vec<usize> = pairs.iter().map(|&(source, _)| source).collect();
        let mut targets: Vec<usize> = pairs.iter().map(|&(_, target)| target).collect();
        sources.sort_unstable();
        targets.sort_unstable();
        if let Some(dup) = first_duplicate(&sources).or_else(|| first_duplicate(&targets)) {
            return Err(Error::DuplicateMode(dup));
        }
        if sources != targets {
            return Err(Error::IncompletePermutation { sources, targets });
        }
        Ok(Self { pairs })
    }
}

impl From<ModeSwap> for Component {
    fn from(swap: ModeSwap) -> Self {
        Component::ModeSwap(swap)
    }
}

fn first_duplicate(sorted: &[usize]) -> Option<usize> {
    sorted
        .windows(2)
        .find(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
}

/// An arbitrary unitary embedded at a mode offset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitaryBlock {
    pub mode: usize,
    pub matrix: DMatrix<Complex64>,
}

impl UnitaryBlock {
    /// The matrix must be square and unitary within [`UNITARITY_TOLERANCE`].
    pub fn new(mode: usize, matrix: DMatrix<Complex64>) -> Result<Self, Error> {
        if matrix.nrows() != matrix.ncols() || !is_unitary(&matrix, UNITARITY_TOLERANCE) {
            return Err(Error::NotUnitary {
                mode,
                tolerance: UNITARITY_TOLERANCE,
            });
        }
        Ok(Self { mode, matrix })
    }
}

impl From<UnitaryBlock> for Component {
    fn from(block: UnitaryBlock) -> Self {
        Component::UnitaryBlock(block)
    }
}

/// A nested sub-circuit embedded at a mode offset.
///
/// Numerically equivalent to inlining its components shifted by `mode`; the
/// grouping (and any heralds it declares, relative to the group) only
/// matters as metadata and for herald bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub mode: usize,
    pub components: Vec<Component>,
    /// (relative mode, photons) heralds required on the group's inputs.
    pub input_heralds: Vec<(usize, u32)>,
    /// (relative mode, photons) heralds required on the group's outputs.
    pub output_heralds: Vec<(usize, u32)>,
}

impl Group {
    #[must_use]
    pub fn new(mode: usize, components: Vec<Component>) -> Self {
        Self {
            mode,
            components,
            input_heralds: Vec::new(),
            output_heralds: Vec::new(),
        }
    }

    /// Declares a herald on a mode relative to the group's offset.
    #[must_use]
    pub fn with_herald(mut self, relative_mode: usize, input: u32, output: u32) -> Self {
        self.input_heralds.push((relative_mode, input));
        self.output_heralds.push((relative_mode, output));
        self
    }

    /// Number of modes the group spans.
    #[must_use]
    pub fn span(&self) -> usize {
        let component_span = self
            .components
            .iter()
            .filter_map(Component::max_mode)
            .max()
            .map_or(0, |max| max + 1);
        let herald_span = self
            .input_heralds
            .iter()
            .chain(&self.output_heralds)
            .map(|&(mode, _)| mode + 1)
            .max()
            .unwrap_or(0);
        component_span.max(herald_span)
    }
}

impl From<Group> for Component {
    fn from(group: Group) -> Self {
        Component::Group(group)
    }
}

pub(crate) fn check_range(field: &'static str, value: f64, low: f64, high: f64) -> Result<(), Error> {
    if value.is_nan() || value < low || value > high {
        return Err(Error::ValueOutOfRange {
            field,
            low,
            high,
            value,
        });
    }
    Ok(())
}

/// Whether `UᴴU = I` holds entrywise within `tolerance`.
#[must_use]
pub fn is_unitary(matrix: &DMatrix<Complex64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let product = matrix.adjoint() * matrix;
    let identity = DMatrix::<Complex64>::identity(matrix.nrows(), matrix.ncols());
    (product - identity)
        .iter()
        .all(|entry| entry.norm() <= tolerance)
}
