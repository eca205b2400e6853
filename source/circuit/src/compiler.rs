// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::component::{Component, ModeSwap, check_range, is_unitary};
use crate::error::Error;
use crate::spec::CircuitSpec;
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::Zero;
use std::collections::BTreeMap;

/// Entrywise tolerance for the `UᴴU = I` contract on transfer matrices.
pub const UNITARITY_TOLERANCE: f64 = 1e-8;

/// A circuit resolved into a single transfer matrix.
///
/// The full matrix covers the declared modes followed by any synthetic loss
/// modes the compiler appended; it is unitary within
/// [`UNITARITY_TOLERANCE`]. A compiled circuit is a disposable derived
/// value: when parameters may have changed, recompile — nothing is patched
/// incrementally.
#[derive(Clone, Debug)]
pub struct CompiledCircuit {
    unitary: DMatrix<Complex64>,
    modes: usize,
    loss_modes: usize,
    input_heralds: BTreeMap<usize, u32>,
    output_heralds: BTreeMap<usize, u32>,
}

impl CompiledCircuit {
    /// The full transfer matrix over declared plus loss modes.
    #[must_use]
    pub fn unitary(&self) -> &DMatrix<Complex64> {
        &self.unitary
    }

    /// The restriction of the full matrix to the declared modes. Not unitary
    /// when the circuit is lossy; the missing amplitude sits in the loss
    /// columns of the full matrix.
    #[must_use]
    pub fn restricted(&self) -> DMatrix<Complex64> {
        self.unitary.view((0, 0), (self.modes, self.modes)).into()
    }

    /// Declared mode count.
    #[must_use]
    pub fn modes(&self) -> usize {
        self.modes
    }

    /// Synthetic loss modes appended by the compiler.
    #[must_use]
    pub fn loss_modes(&self) -> usize {
        self.loss_modes
    }

    /// Declared plus loss modes; the dimension of the full matrix.
    #[must_use]
    pub fn total_modes(&self) -> usize {
        self.modes + self.loss_modes
    }

    #[must_use]
    pub fn input_heralds(&self) -> &BTreeMap<usize, u32> {
        &self.input_heralds
    }

    #[must_use]
    pub fn output_heralds(&self) -> &BTreeMap<usize, u32> {
        &self.output_heralds
    }

    /// Declared modes without an output herald, in ascending order.
    #[must_use]
    pub fn observable_modes(&self) -> Vec<usize> {
        (0..self.modes)
            .filter(|mode| !self.output_heralds.contains_key(mode))
            .collect()
    }
}

/// Resolves every parameter and folds the component sequence into a
/// [`CompiledCircuit`].
///
/// Validation happens before any matrix work per component, and the
/// unitarity contract is checked after every multiply; failures carry the
/// index and kind of the offending component.
pub fn compile(spec: &CircuitSpec) -> Result<CompiledCircuit, Error> {
    debug!(
        "compiling circuit: {} modes, {} components",
        spec.modes(),
        spec.components().len()
    );

    let mut compiler = Compiler::new(spec.modes());
    for (index, component) in spec.components().iter().enumerate() {
        compiler
            .apply(component)
            .and_then(|()| compiler.check_unitarity())
            .map_err(|error| error.with_component(index, component.kind()))?;
    }

    let Compiler {
        full,
        loss_modes,
        mut input_heralds,
        mut output_heralds,
        ..
    } = compiler;

    // Spec-level heralds join the ones collected from nested groups.
    for (&mode, &photons) in spec.input_heralds() {
        if input_heralds.insert(mode, photons).is_some() {
            return Err(Error::DuplicateHerald { mode });
        }
    }
    for (&mode, &photons) in spec.output_heralds() {
        if output_heralds.insert(mode, photons).is_some() {
            return Err(Error::DuplicateHerald { mode });
        }
    }

    debug!("compiled: {loss_modes} loss modes appended");
    Ok(CompiledCircuit {
        unitary: full,
        modes: spec.modes(),
        loss_modes,
        input_heralds,
        output_heralds,
    })
}

struct Compiler {
    modes: usize,
    full: DMatrix<Complex64>,
    loss_modes: usize,
    input_heralds: BTreeMap<usize, u32>,
    output_heralds: BTreeMap<usize, u32>,
}

impl Compiler {
    fn new(modes: usize) -> Self {
        Self {
            modes,
            full: DMatrix::identity(modes, modes),
            loss_modes: 0,
            input_heralds: BTreeMap::new(),
            output_heralds: BTreeMap::new(),
        }
    }

    fn apply(&mut self, component: &Component) -> Result<(), Error> {
        match component {
            Component::BeamSplitter(bs) => {
                self.check_mode(bs.modes.0)?;
                self.check_mode(bs.modes.1)?;
                if bs.modes.0 == bs.modes.1 {
                    return Err(Error::DuplicateMode(bs.modes.0));
                }
                let reflectivity = bs.reflectivity.resolve();
                check_range("reflectivity", reflectivity, 0.0, 1.0)?;
                check_range("loss (dB)", bs.loss_db, 0.0, f64::INFINITY)?;

                if bs.loss_db > 0.0 {
                    let transmission = db_to_transmission(bs.loss_db);
                    self.apply_loss(bs.modes.0, transmission);
                    self.apply_loss(bs.modes.1, transmission);
                }

                let theta = reflectivity.sqrt().acos();
                let (cos, sin) = (theta.cos(), theta.sin());
                let block = match bs.convention {
                    crate::component::BsConvention::Rx => DMatrix::from_row_slice(
                        2,
                        2,
                        &[
                            Complex64::new(cos, 0.0),
                            Complex64::new(0.0, sin),
                            Complex64::new(0.0, sin),
                            Complex64::new(cos, 0.0),
                        ],
                    ),
                    crate::component::BsConvention::H => DMatrix::from_row_slice(
                        2,
                        2,
                        &[
                            Complex64::new(cos, 0.0),
                            Complex64::new(sin, 0.0),
                            Complex64::new(sin, 0.0),
                            Complex64::new(-cos, 0.0),
                        ],
                    ),
                };
                self.left_multiply(&[bs.modes.0, bs.modes.1], &block);
                Ok(())
            }
            Component::PhaseShifter(ps) => {
                self.check_mode(ps.mode)?;
                check_range("loss (dB)", ps.loss_db, 0.0, f64::INFINITY)?;
                if ps.loss_db > 0.0 {
                    self.apply_loss(ps.mode, db_to_transmission(ps.loss_db));
                }
                let phi = ps.phi.resolve();
                let block = DMatrix::from_element(1, 1, (Complex64::new(0.0, phi)).exp());
                self.left_multiply(&[ps.mode], &block);
                Ok(())
            }
            Component::Loss(loss) => {
                self.check_mode(loss.mode)?;
                check_range("loss (dB)", loss.loss_db, 0.0, f64::INFINITY)?;
                self.apply_loss(loss.mode, loss.transmission());
                Ok(())
            }
            Component::Barrier(barrier) => {
                for &mode in &barrier.modes {
                    self.check_mode(mode)?;
                }
                // No matrix effect.
                Ok(())
            }
            Component::ModeSwap(swap) => {
                // Revalidate: the spec may have been assembled from literals.
                ModeSwap::new(swap.pairs.clone())?;
                for &(source, target) in &swap.pairs {
                    self.check_mode(source)?;
                    self.check_mode(target)?;
                }
                let total = self.total_modes();
                let mut permutation = DMatrix::<Complex64>::identity(total, total);
                for &(source, target) in &swap.pairs {
                    permutation[(source, source)] = Complex64::zero();
                    permutation[(target, source)] = Complex64::new(1.0, 0.0);
                }
                self.full = permutation * &self.full;
                Ok(())
            }
            Component::UnitaryBlock(block) => {
                let size = block.matrix.nrows();
                if size == 0 || block.mode + size > self.modes {
                    return Err(Error::ModeOutOfRange {
                        mode: block.mode + size.saturating_sub(1),
                        modes: self.modes,
                    });
                }
                if !is_unitary(&block.matrix, UNITARITY_TOLERANCE) {
                    return Err(Error::NotUnitary {
                        mode: block.mode,
                        tolerance: UNITARITY_TOLERANCE,
                    });
                }
                let map: Vec<usize> = (block.mode..block.mode + size).collect();
                self.left_multiply(&map, &block.matrix);
                Ok(())
            }
            Component::Group(group) => {
                let span = group.span();
                if group.mode + span > self.modes {
                    return Err(Error::ModeOutOfRange {
                        mode: group.mode + span.saturating_sub(1),
                        modes: self.modes,
                    });
                }

                // Compile the sub-circuit on its own span, then embed it,
                // routing its loss modes onto freshly appended ones.
                let mut sub_spec = CircuitSpec::new(span);
                for sub_component in &group.components {
                    sub_spec.add(sub_component.clone())?;
                }
                let sub = compile(&sub_spec)?;

                let mut map: Vec<usize> = (0..span).map(|i| group.mode + i).collect();
                for _ in 0..sub.loss_modes() {
                    map.push(self.append_loss_mode());
                }
                let sub_unitary = sub.unitary().clone();
                self.left_multiply(&map, &sub_unitary);

                // The group's own heralds plus any collected from nested
                // groups, shifted to the parent's mode space.
                let input_heralds = group
                    .input_heralds
                    .iter()
                    .copied()
                    .chain(sub.input_heralds().iter().map(|(&m, &p)| (m, p)));
                for (relative, photons) in input_heralds {
                    let mode = group.mode + relative;
                    if self.input_heralds.insert(mode, photons).is_some() {
                        return Err(Error::DuplicateHerald { mode });
                    }
                }
                let output_heralds = group
                    .output_heralds
                    .iter()
                    .copied()
                    .chain(sub.output_heralds().iter().map(|(&m, &p)| (m, p)));
                for (relative, photons) in output_heralds {
                    let mode = group.mode + relative;
                    if self.output_heralds.insert(mode, photons).is_some() {
                        return Err(Error::DuplicateHerald { mode });
                    }
                }
                Ok(())
            }
        }
    }

    fn total_modes(&self) -> usize {
        self.full.nrows()
    }

    fn check_mode(&self, mode: usize) -> Result<(), Error> {
        if mode >= self.modes {
            return Err(Error::ModeOutOfRange {
                mode,
                modes: self.modes,
            });
        }
        Ok(())
    }

    /// Grows the full matrix by one vacuum loss mode and returns its index.
    fn append_loss_mode(&mut self) -> usize {
        let size = self.full.nrows();
        let mut grown = DMatrix::<Complex64>::identity(size + 1, size + 1);
        grown.view_mut((0, 0), (size, size)).copy_from(&self.full);
        self.full = grown;
        self.loss_modes += 1;
        size
    }

    /// Couples `mode` to a fresh loss mode with amplitudes (√T, √(1−T)).
    /// The 2×2 rotation is orthogonal for every T, so the full matrix stays
    /// unitary.
    fn apply_loss(&mut self, mode: usize, transmission: f64) {
        let loss_mode = self.append_loss_mode();
        let kept = transmission.sqrt();
        let lost = (1.0 - transmission).sqrt();
        let block = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(kept, 0.0),
                Complex64::new(lost, 0.0),
                Complex64::new(lost, 0.0),
                Complex64::new(-kept, 0.0),
            ],
        );
        self.left_multiply(&[mode, loss_mode], &block);
    }

    /// Left-multiplies the full matrix by `block` embedded at the given mode
    /// indices (identity elsewhere).
    fn left_multiply(&mut self, map: &[usize], block: &DMatrix<Complex64>) {
        let total = self.total_modes();
        let mut embedded = DMatrix::<Complex64>::identity(total, total);
        for (row, &target_row) in map.iter().enumerate() {
            for (col, &target_col) in map.iter().enumerate() {
                embedded[(target_row, target_col)] = block[(row, col)];
            }
        }
        self.full = embedded * &self.full;
    }

    fn check_unitarity(&self) -> Result<(), Error> {
        if is_unitary(&self.full, UNITARITY_TOLERANCE) {
            Ok(())
        } else {
            Err(Error::UnitarityDrift {
                tolerance: UNITARITY_TOLERANCE,
            })
        }
    }
}

/// dB of loss to power transmission.
#[must_use]
pub fn db_to_transmission(loss_db: f64) -> f64 {
    10f64.powf(-loss_db / 10.0)
}
