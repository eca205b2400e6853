// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use crate::error::Error;
use serde::{Deserialize, Serialize, Serializer};
use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;

/// A named scalar cell that circuit components can share.
///
/// Cloning a `Parameter` shares the underlying cell, so one `set` is visible
/// to every component (and every circuit) referencing it. Each successful
/// `set` bumps a change epoch; memoization layers compare resolved values
/// plus epochs instead of scanning configurations for identity.
///
/// The cell is `Rc`-based and deliberately not `Send`: parameters are not
/// safe for concurrent mutation, and the type system says so.
#[derive(Clone, Debug)]
pub struct Parameter {
    inner: Rc<ParamCell>,
}

#[derive(Debug)]
struct ParamCell {
    name: String,
    value: Cell<f64>,
    bounds: Option<(f64, f64)>,
    epoch: Cell<u64>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            inner: Rc::new(ParamCell {
                name: name.into(),
                value: Cell::new(value),
                bounds: None,
                epoch: Cell::new(0),
            }),
        }
    }

    /// A parameter whose value is constrained to `[low, high]`. The initial
    /// value must already satisfy the bounds.
    pub fn bounded(
        name: impl Into<String>,
        value: f64,
        low: f64,
        high: f64,
    ) -> Result<Self, Error> {
        let name = name.into();
        if value < low || value > high {
            return Err(Error::ValueOutOfRange {
                field: "parameter value",
                low,
                high,
                value,
            });
        }
        Ok(Self {
            inner: Rc::new(ParamCell {
                name,
                value: Cell::new(value),
                bounds: Some((low, high)),
                epoch: Cell::new(0),
            }),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.inner.value.get()
    }

    /// Updates the shared value. Bound violations are rejected here, at
    /// assignment time, and never clamped.
    pub fn set(&self, value: f64) -> Result<(), Error> {
        if let Some((low, high)) = self.inner.bounds
            && (value < low || value > high)
        {
            return Err(Error::ValueOutOfRange {
                field: "parameter value",
                low,
                high,
                value,
            });
        }
        self.inner.value.set(value);
        self.inner.epoch.set(self.inner.epoch.get() + 1);
        Ok(())
    }

    /// Monotone counter of successful `set` calls on the shared cell.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.get()
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.inner.name, self.inner.value.get())
    }
}

/// A component field that is either a literal or a shared [`Parameter`].
#[derive(Clone, Debug)]
pub enum ParamValue {
    Fixed(f64),
    Ref(Parameter),
}

impl ParamValue {
    /// The current numeric value.
    #[must_use]
    pub fn resolve(&self) -> f64 {
        match self {
            ParamValue::Fixed(value) => *value,
            ParamValue::Ref(parameter) => parameter.value(),
        }
    }

    /// Change epoch of the backing cell; literals never change.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            ParamValue::Fixed(_) => 0,
            ParamValue::Ref(parameter) => parameter.epoch(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Fixed(value)
    }
}

impl From<Parameter> for ParamValue {
    fn from(parameter: Parameter) -> Self {
        ParamValue::Ref(parameter)
    }
}

impl From<&Parameter> for ParamValue {
    fn from(parameter: &Parameter) -> Self {
        ParamValue::Ref(parameter.clone())
    }
}

// Serialized circuits carry resolved snapshots: a `ParamValue` writes its
// current value and reads back as a literal.
impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.resolve())
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(ParamValue::Fixed)
    }
}
