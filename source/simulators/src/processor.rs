// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::backend::{BackendKind, Statistics, distribution_via_amplitudes};
use crate::detector::Detector;
use crate::distribution::Distribution;
use crate::error::Error;
use crate::full_distribution::full_distribution;
use crate::post_select::PostSelection;
use crate::source::{Source, SourceStatistics};
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;
use photonic_circuit::spec::Fingerprint;
use photonic_circuit::{AnnotatedState, CircuitSpec, CompiledCircuit, FockState, compile};

/// Orchestrates one circuit with its input, noise models, heralds,
/// post-selection, and backend choice into an output probability
/// distribution.
///
/// The distribution is memoized against a structural snapshot of the
/// resolved configuration — resolved parameter values and epochs, input,
/// source/detector parameters, statistics, backend, and filters. Mutating
/// any of them through this API (or mutating a shared [`photonic_circuit::Parameter`]
/// cell in place) makes the next access recompute; nothing is patched
/// incrementally.
pub struct Processor {
    spec: CircuitSpec,
    input: Option<FockState>,
    source: Source,
    detector: Detector,
    statistics: Statistics,
    backend: BackendKind,
    post_selection: Option<PostSelection>,
    min_detected_photons: u32,
    cache: Option<Cache>,
}

pub(crate) struct Cache {
    snapshot: Snapshot,
    pub(crate) compiled: CompiledCircuit,
    pub(crate) source_statistics: SourceStatistics,
    pub(crate) distribution: Distribution,
    pub(crate) performance: f64,
}

#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    circuit: Fingerprint,
    input: Option<FockState>,
    source: Source,
    detector: Detector,
    statistics: Statistics,
    backend: BackendKind,
    post_selection: Option<PostSelection>,
    min_detected_photons: u32,
}

impl Processor {
    #[must_use]
    pub fn new(spec: CircuitSpec, statistics: Statistics) -> Self {
        Self {
            spec,
            input: None,
            source: Source::PERFECT,
            detector: Detector::PERFECT,
            statistics,
            backend: BackendKind::FullDistribution,
            post_selection: None,
            min_detected_photons: 0,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// The circuit description; mutations are picked up on the next access
    /// through the configuration snapshot.
    pub fn circuit_mut(&mut self) -> &mut CircuitSpec {
        &mut self.spec
    }

    #[must_use]
    pub fn circuit(&self) -> &CircuitSpec {
        &self.spec
    }

    /// Sets the nominal input over the non-heralded modes.
    pub fn set_input(&mut self, input: FockState) {
        self.input = Some(input);
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    pub fn set_detector(&mut self, detector: Detector) {
        self.detector = detector;
    }

    pub fn set_backend(&mut self, backend: BackendKind) {
        self.backend = backend;
    }

    /// Attaches a post-selection predicate over the declared modes.
    pub fn set_post_selection(&mut self, predicate: PostSelection) -> Result<(), Error> {
        if let Some(mode) = predicate.max_mode()
            && mode >= self.spec.modes()
        {
            return Err(photonic_circuit::Error::ModeOutOfRange {
                mode,
                modes: self.spec.modes(),
            }
            .into());
        }
        self.post_selection = Some(predicate);
        Ok(())
    }

    pub fn clear_post_selection(&mut self) {
        self.post_selection = None;
    }

    /// Detected states with fewer photons over the observable modes are
    /// discarded.
    pub fn set_min_detected_photons(&mut self, min: u32) {
        self.min_detected_photons = min;
    }

    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    #[must_use]
    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    #[must_use]
    pub fn min_detected_photons(&self) -> u32 {
        self.min_detected_photons
    }

    #[must_use]
    pub fn post_selection(&self) -> Option<&PostSelection> {
        self.post_selection.as_ref()
    }

    /// The filtered output distribution over the observable modes.
    ///
    /// Probabilities sum to the retained mass (≤ 1): herald-violating,
    /// post-selected-out, and below-minimum-detection branches are dropped,
    /// and lossy circuits leave the absorbed shortfall unrecorded.
    pub fn probabilities(&mut self) -> Result<&Distribution, Error> {
        self.ensure_cache()?;
        Ok(&self.cache.as_ref().expect("cache was just filled").distribution)
    }

    /// Retained probability mass after heralding, post-selection, and
    /// minimum detection.
    pub fn performance(&mut self) -> Result<f64, Error> {
        self.ensure_cache()?;
        Ok(self.cache.as_ref().expect("cache was just filled").performance)
    }

    /// The compiled circuit for the current configuration.
    pub fn compiled(&mut self) -> Result<&CompiledCircuit, Error> {
        self.ensure_cache()?;
        Ok(&self.cache.as_ref().expect("cache was just filled").compiled)
    }

    pub(crate) fn ensure_cache(&mut self) -> Result<(), Error> {
        let snapshot = self.snapshot();
        if let Some(cache) = &self.cache
            && cache.snapshot == snapshot
        {
            return Ok(());
        }
        debug!("configuration snapshot changed; recomputing distribution");
        let cache = self.compute(snapshot)?;
        self.cache = Some(cache);
        Ok(())
    }

    pub(crate) fn cached(&self) -> &Cache {
        self.cache
            .as_ref()
            .expect("ensure_cache must run before cached")
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            circuit: self.spec.fingerprint(),
            input: self.input.clone(),
            source: self.source,
            detector: self.detector,
            statistics: self.statistics,
            backend: self.backend,
            post_selection: self.post_selection.clone(),
            min_detected_photons: self.min_detected_photons,
        }
    }

    fn compute(&self, snapshot: Snapshot) -> Result<Cache, Error> {
        let compiled = compile(&self.spec)?;
        let nominal = self.padded_nominal(&compiled)?;
        let source_statistics = self.source.statistics(&nominal)?;
        debug!(
            "expanding {} source branches over {} modes ({} loss)",
            source_statistics.len(),
            compiled.modes(),
            compiled.loss_modes()
        );

        let observable_modes = compiled.observable_modes();
        let mut distribution = Distribution::new();
        for (branch, weight) in source_statistics.iter() {
            let full = self.branch_distribution(&compiled, branch)?;
            for (state, probability) in full.iter() {
                let declared: FockState = state.occupations()[..compiled.modes()].into();
                if !self.accepts(&compiled, &declared) {
                    continue;
                }
                distribution.add(declared.project(&observable_modes), weight * probability);
            }
        }

        let performance = distribution.total_mass();
        debug!(
            "distribution: {} states, retained mass {performance:.6}",
            distribution.len()
        );
        Ok(Cache {
            snapshot,
            compiled,
            source_statistics,
            distribution,
            performance,
        })
    }

    /// Interleaves herald occupations with the user input over the declared
    /// modes.
    fn padded_nominal(&self, compiled: &CompiledCircuit) -> Result<FockState, Error> {
        let input = self.input.as_ref().ok_or(Error::InputNotSet)?;
        let external: Vec<usize> = (0..compiled.modes())
            .filter(|mode| !compiled.input_heralds().contains_key(mode))
            .collect();
        input.expect_modes(external.len())?;

        let mut occupations = vec![0u32; compiled.modes()];
        for (&mode, &photons) in compiled.input_heralds() {
            occupations[mode] = photons;
        }
        for (slot, &mode) in external.iter().enumerate() {
            occupations[mode] = input[slot];
        }
        Ok(FockState::new(occupations))
    }

    /// Full-space output distribution for one (possibly annotated) input:
    /// each label class evolves independently and the class distributions
    /// convolve.
    pub(crate) fn branch_distribution(
        &self,
        compiled: &CompiledCircuit,
        branch: &AnnotatedState,
    ) -> Result<Distribution, Error> {
        let classes = branch.label_classes();
        if classes.is_empty() {
            let mut vacuum = Distribution::new();
            vacuum.add(FockState::vacuum(compiled.total_modes()), 1.0);
            return Ok(vacuum);
        }

        let mut result: Option<Distribution> = None;
        for class in &classes {
            let padded = class.padded(compiled.loss_modes());
            let class_distribution = self.class_distribution(compiled.unitary(), &padded)?;
            result = Some(match result {
                None => class_distribution,
                Some(joint) => joint.convolved(&class_distribution),
            });
        }
        Ok(result.expect("at least one label class"))
    }

    fn class_distribution(
        &self,
        transfer: &DMatrix<Complex64>,
        input: &FockState,
    ) -> Result<Distribution, Error> {
        match (self.statistics, self.backend) {
            // Fermionic statistics always take the determinant path.
            (Statistics::Fermionic, _) => {
                distribution_via_amplitudes(transfer, input, Statistics::Fermionic)
            }
            (Statistics::Bosonic, BackendKind::Permanent) => {
                distribution_via_amplitudes(transfer, input, Statistics::Bosonic)
            }
            (Statistics::Bosonic, BackendKind::FullDistribution) => {
                full_distribution(transfer, input)
            }
        }
    }

    /// Herald, post-selection, and minimum-detection acceptance over a
    /// declared-space state.
    pub(crate) fn accepts(&self, compiled: &CompiledCircuit, declared: &FockState) -> bool {
        for (&mode, &photons) in compiled.output_heralds() {
            if declared[mode] != photons {
                return false;
            }
        }
        if let Some(predicate) = &self.post_selection
            && !predicate.accepts(declared)
        {
            return false;
        }
        let detected: u32 = compiled
            .observable_modes()
            .iter()
            .map(|&mode| declared[mode])
            .sum();
        detected >= self.min_detected_photons
    }
}
