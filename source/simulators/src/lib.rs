// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Many-photon simulation backends for linear-optical circuits.
//!
//! Builds on [`photonic_circuit`]: a compiled transfer matrix goes in, and
//! transition amplitudes (permanent or determinant), full output
//! distributions (incremental creation-operator pass), or calibrated
//! Monte-Carlo samples come out. Source and detector noise models, heralds
//! and post-selection compose in the [`Processor`] orchestration layer.

pub mod analyzer;
pub mod backend;
pub mod detector;
pub mod distribution;
pub mod error;
pub mod full_distribution;
pub mod permanent;
pub mod post_select;
pub mod processor;
pub mod sampler;
pub mod simulator;
pub mod source;
pub mod statistical_testing;

pub use analyzer::{AnalysisTable, Analyzer};
pub use backend::{BackendKind, Statistics};
pub use detector::Detector;
pub use distribution::Distribution;
pub use error::Error;
pub use post_select::PostSelection;
pub use processor::Processor;
pub use sampler::{SampleMode, Sampler};
pub use simulator::Simulator;
pub use source::Source;
