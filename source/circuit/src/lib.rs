// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Model and compiler for linear-optical circuits.
//!
//! A circuit is an ordered sequence of optical components (beam splitters,
//! phase shifters, loss channels, mode permutations, embedded unitaries and
//! nested groups) over a declared number of modes. [`compile`] resolves all
//! parameters and folds the sequence into a single transfer matrix, growing
//! the mode space with synthetic loss modes where components are lossy.

pub mod annotated;
pub mod compiler;
pub mod component;
pub mod error;
pub mod fock;
pub mod parameter;
pub mod spec;

pub use annotated::AnnotatedState;
pub use compiler::{CompiledCircuit, UNITARITY_TOLERANCE, compile};
pub use component::{
    Barrier, BeamSplitter, BsConvention, Component, Group, LossChannel, ModeSwap, PhaseShifter,
    UnitaryBlock,
};
pub use error::Error;
pub use fock::FockState;
pub use parameter::{ParamValue, Parameter};
pub use spec::CircuitSpec;
