// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use crate::error::Error;
use crate::processor::Processor;
use photonic_circuit::FockState;
use rustc_hash::FxHashMap;
use std::fmt::Display;

/// Batch computation of labeled probability tables over many inputs.
pub struct Analyzer {
    processor: Processor,
}

/// A labeled probability table: one row per input, one column per observed
/// output, entries conditional on acceptance.
///
/// `performance` is the mean retained probability across inputs;
/// `error_rate`, when an expected input → output mapping was supplied, is
/// the mean conditional probability of landing on any other output.
#[derive(Clone, Debug)]
pub struct AnalysisTable {
    pub inputs: Vec<FockState>,
    pub outputs: Vec<FockState>,
    pub probabilities: Vec<Vec<f64>>,
    pub performance: f64,
    pub error_rate: Option<f64>,
}

impl Analyzer {
    #[must_use]
    pub fn new(processor: Processor) -> Self {
        Self { processor }
    }

    #[must_use]
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut Processor {
        &mut self.processor
    }

    /// Computes the distribution for every input and assembles the table.
    ///
    /// The processor's configuration (source, heralds, post-selection,
    /// backend) applies to every row; only the input varies.
    pub fn analyze(
        &mut self,
        inputs: &[FockState],
        expected: Option<&FxHashMap<FockState, FockState>>,
    ) -> Result<AnalysisTable, Error> {
        let mut outputs: Vec<FockState> = Vec::new();
        let mut output_index: FxHashMap<FockState, usize> = FxHashMap::default();
        let mut rows: Vec<(Vec<(usize, f64)>, f64)> = Vec::with_capacity(inputs.len());
        let mut performance_sum = 0.0;

        for input in inputs {
            self.processor.set_input(input.clone());
            let distribution = self.processor.probabilities()?;
            let retained = distribution.total_mass();
            performance_sum += retained;

            let mut row = Vec::with_capacity(distribution.len());
            for (state, probability) in distribution.iter() {
                let column = *output_index.entry(state.clone()).or_insert_with(|| {
                    outputs.push(state.clone());
                    outputs.len() - 1
                });
                row.push((column, probability));
            }
            rows.push((row, retained));
        }

        let mut probabilities = vec![vec![0.0; outputs.len()]; inputs.len()];
        for (row_index, (entries, retained)) in rows.iter().enumerate() {
            for &(column, probability) in entries {
                probabilities[row_index][column] = if *retained > 0.0 {
                    probability / retained
                } else {
                    0.0
                };
            }
        }

        let error_rate = expected.and_then(|mapping| {
            let mut total = 0.0;
            let mut counted = 0usize;
            for (row_index, input) in inputs.iter().enumerate() {
                let Some(expected_output) = mapping.get(input) else {
                    continue;
                };
                let hit = output_index
                    .get(expected_output)
                    .map_or(0.0, |&column| probabilities[row_index][column]);
                total += 1.0 - hit;
                counted += 1;
            }
            if counted == 0 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let rate = total / counted as f64;
            Some(rate)
        });

        #[allow(clippy::cast_precision_loss)]
        let performance = if inputs.is_empty() {
            0.0
        } else {
            performance_sum / inputs.len() as f64
        };

        Ok(AnalysisTable {
            inputs: inputs.to_vec(),
            outputs,
            probabilities,
            performance,
            error_rate,
        })
    }
}

impl Display for AnalysisTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>12}", "")?;
        for output in &self.outputs {
            write!(f, "{:>12}", output.to_string())?;
        }
        writeln!(f)?;
        for (input, row) in self.inputs.iter().zip(&self.probabilities) {
            write!(f, "{:>12}", input.to_string())?;
            for probability in row {
                write!(f, "{probability:>12.6}")?;
            }
            writeln!(f)?;
        }
        write!(f, "performance: {:.6}", self.performance)?;
        if let Some(error_rate) = self.error_rate {
            write!(f, ", error rate: {error_rate:.6}")?;
        }
        writeln!(f)
    }
}
