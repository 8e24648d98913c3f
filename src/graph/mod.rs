pub mod delay_line;
pub mod neuron;

pub use delay_line::{DelayLine, Tap};
pub use neuron::Neuron;

use crate::errors::{NetError, NetResult};
use crate::rng::Rng;
use ndarray::Array2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A general directed neural graph with tapped delay lines.
///
/// The adjacency matrix is indexed `[destination, source]`; instantaneous
/// edges (a tap at delay 0) define a DAG used for the evaluation order,
/// delayed edges may form arbitrary feedback and are ignored by the sort.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Graph<T> {
    neurons: Vec<Neuron<T>>,
    connections: Array2<DelayLine<T>>,
    biases: Vec<T>,
    input_order: HashMap<usize, usize>,
    input_count: usize,
    output_count: usize,
    parameter_count: usize,
    sorted_indices: Vec<usize>,
    dirty: bool,
}

impl<T: Float> Graph<T> {
    pub fn new(neuron_count: usize) -> Self {
        let neurons = (0..neuron_count).map(Neuron::new).collect();
        let connections = Array2::from_shape_fn((neuron_count, neuron_count), |_| DelayLine::disconnected());
        Self {
            neurons,
            connections,
            biases: vec![T::one(); neuron_count],
            input_order: HashMap::new(),
            input_count: 0,
            output_count: 0,
            parameter_count: neuron_count,
            sorted_indices: (0..neuron_count).collect(),
            dirty: true,
        }
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn neuron(&self, index: usize) -> &Neuron<T> {
        &self.neurons[index]
    }

    pub fn adjacency(&self) -> &Array2<DelayLine<T>> {
        &self.connections
    }

    pub fn declare_input(&mut self, index: usize) {
        if !self.neurons[index].is_input() {
            self.input_order.insert(index, self.input_count);
            self.input_count += 1;
            self.neurons[index].set_as_input(true);
            self.dirty = true;
        }
    }

    pub fn declare_output(&mut self, index: usize) {
        if !self.neurons[index].is_output() {
            self.output_count += 1;
            self.neurons[index].set_as_output(true);
            self.dirty = true;
        }
    }

    pub fn set_bias(&mut self, index: usize, weight: T) {
        self.biases[index] = weight;
    }

    pub fn bias(&self, index: usize) -> T {
        self.biases[index]
    }

    /// Connects `src` to `dst` with a single instantaneous tap of the given
    /// weight (default 1.0).
    pub fn connect(&mut self, src: usize, dst: usize, weight: T) {
        self.connect_line(src, dst, DelayLine::single(0, weight));
    }

    /// Connects `src` to `dst` with an arbitrary tap set, growing `src`'s
    /// memory if required.
    pub fn connect_line(&mut self, src: usize, dst: usize, line: DelayLine<T>) {
        if line.has_delays() {
            let needed = line.max_delay() + 1;
            self.neurons[src].set_memory_length(needed);
        }
        self.parameter_count += line.tap_count();
        self.connections[[dst, src]] = line;
        self.dirty = true;
    }

    pub fn set_connection_weight(&mut self, src: usize, dst: usize, tap: usize, weight: T) -> NetResult<()> {
        self.connections[[dst, src]].set_weight(tap, weight)
    }

    pub fn connection_weight(&self, src: usize, dst: usize, tap: usize) -> NetResult<T> {
        self.connections[[dst, src]].weight(tap)
    }

    pub fn clear_internal_memory(&mut self) {
        for n in &mut self.neurons {
            n.clear_memory();
        }
    }

    pub fn init_random_uniform(&mut self, rng: &mut Rng, lo: T, hi: T) {
        let params: Vec<T> = (0..self.parameter_count).map(|_| rng.uniform(lo, hi)).collect();
        self.set_parameters(&params).expect("parameter vector length matches parameter_count by construction");
    }

    pub fn init_biases_random(&mut self, rng: &mut Rng, lo: T, hi: T) {
        for b in &mut self.biases {
            *b = rng.uniform(lo, hi);
        }
    }

    /// Non-mutating validity check: runs the sort on a copy and reports
    /// whether it succeeds.
    pub fn is_valid(&self) -> bool {
        self.clone().topological_sort().is_ok()
    }

    fn topological_sort(&mut self) -> NetResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let n = self.neurons.len();
        let has_input = self.neurons.iter().any(|neuron| neuron.is_input());
        let has_output = self.neurons.iter().any(|neuron| neuron.is_output());
        if !has_input {
            return Err(NetError::NoInputs);
        }
        if !has_output {
            return Err(NetError::NoOutputs);
        }
        if let Some(orphan) = self.find_unused_neuron() {
            return Err(NetError::UnusedNeuron(orphan));
        }

        self.sorted_indices.clear();
        let mut current_line = 0usize;
        let mut stack: Vec<usize> = Vec::new();
        while self.sorted_indices.len() < n {
            let emitted = self.parse_line(current_line, &mut stack)?;
            self.sorted_indices.push(emitted);
            if stack.is_empty() {
                current_line = self.find_missing_entry();
            } else {
                current_line = stack[0];
                stack.clear();
            }
        }
        self.dirty = false;
        Ok(())
    }

    /// Depth-first descent through instantaneous predecessors of `line`,
    /// returning the deepest node whose predecessors are all already
    /// sorted (post-order emission point).
    fn parse_line(&self, line: usize, stack: &mut Vec<usize>) -> NetResult<usize> {
        let n = self.neurons.len();
        for src in 0..n {
            if self.connections[[line, src]].is_instantaneous() && !self.sorted_indices.contains(&src) {
                if stack.contains(&src) {
                    return Err(NetError::AlgebraicLoop(cycle_path(stack, line, src)));
                }
                stack.push(line);
                return self.parse_line(src, stack);
            }
        }
        Ok(line)
    }

    fn find_missing_entry(&self) -> usize {
        let mut present = self.sorted_indices.clone();
        present.sort_unstable();
        let mut next = 0usize;
        for v in present {
            if v != next {
                return next;
            }
            next += 1;
        }
        next
    }

    fn find_unused_neuron(&self) -> Option<usize> {
        let n = self.neurons.len();
        for src in 0..n {
            let has_outgoing = (0..n).any(|dst| self.connections[[dst, src]].is_connected());
            if !has_outgoing && !self.neurons[src].is_output() {
                return Some(src);
            }
        }
        for dst in 0..n {
            let has_incoming = (0..n).any(|src| self.connections[[dst, src]].is_connected());
            if !has_incoming && !self.neurons[dst].is_input() {
                return Some(dst);
            }
        }
        None
    }

    /// Batch forward evaluation: `u` is `[samples x input_count]`, the
    /// result is `[samples x output_count]`.
    pub fn evaluate(&mut self, u: &Array2<T>) -> NetResult<Array2<T>> {
        self.topological_sort()?;
        let n = self.neurons.len();
        let samples = u.nrows();
        let mut y = Array2::<T>::zeros((samples, self.output_count));

        for s in 0..samples {
            let mut outputs = vec![T::zero(); n];
            for &i in &self.sorted_indices {
                let mut acc = T::zero();
                if self.neurons[i].is_input() {
                    let port = self.input_order[&i];
                    acc = acc + u[[s, port]];
                }
                for j in 0..n {
                    let line = &self.connections[[i, j]];
                    if !line.is_connected() {
                        continue;
                    }
                    for tap in line.taps() {
                        if tap.delay_index == 0 {
                            acc = acc + tap.weight * outputs[j];
                        } else {
                            acc = acc + tap.weight * self.neurons[j].read(tap.delay_index - 1)?;
                        }
                    }
                }
                acc = acc + self.biases[i];
                outputs[i] = self.neurons[i].activate(acc);
            }

            for i in 0..n {
                if self.neurons[i].has_memory() {
                    self.neurons[i].push(outputs[i]);
                }
            }

            let mut col = 0usize;
            for (i, output) in outputs.iter().enumerate() {
                if self.neurons[i].is_output() {
                    y[[s, col]] = *output;
                    col += 1;
                }
            }
        }
        Ok(y)
    }

    /// Single-sample, single-input/output convenience form (SISO).
    pub fn evaluate_one(&mut self, input: T) -> NetResult<T> {
        let u = Array2::from_shape_vec((1, 1), vec![input]).expect("1x1 shape");
        let y = self.evaluate(&u)?;
        Ok(y[[0, 0]])
    }

    /// Multi-input, single-output convenience form (MISO).
    pub fn evaluate_miso(&mut self, inputs: &[T]) -> NetResult<T> {
        let u = Array2::from_shape_vec((1, inputs.len()), inputs.to_vec())
            .map_err(|e| NetError::OutOfRange(e.to_string()))?;
        let y = self.evaluate(&u)?;
        Ok(y[[0, 0]])
    }

    /// Single-input, multi-output convenience form (SIMO).
    pub fn evaluate_simo(&mut self, input: T) -> NetResult<Vec<T>> {
        let u = Array2::from_shape_vec((1, 1), vec![input]).expect("1x1 shape");
        let y = self.evaluate(&u)?;
        Ok(y.row(0).to_vec())
    }

    /// Multi-input, multi-output convenience form (MIMO).
    pub fn evaluate_mimo(&mut self, inputs: &[T]) -> NetResult<Vec<T>> {
        let u = Array2::from_shape_vec((1, inputs.len()), inputs.to_vec())
            .map_err(|e| NetError::OutOfRange(e.to_string()))?;
        let y = self.evaluate(&u)?;
        Ok(y.row(0).to_vec())
    }

    /// Flattened parameter vector: per destination/source pair's tap
    /// weights (outer loop over source index, inner over destination
    /// index, matching the reference implementation's iteration order),
    /// followed by the bias vector in neuron-index order.
    pub fn get_parameters(&self) -> Vec<T> {
        let mut params = Vec::with_capacity(self.parameter_count);
        let n = self.neurons.len();
        for src in 0..n {
            for dst in 0..n {
                let line = &self.connections[[dst, src]];
                if line.is_connected() {
                    for tap in line.taps() {
                        params.push(tap.weight);
                    }
                }
            }
        }
        params.extend_from_slice(&self.biases);
        params
    }

    pub fn set_parameters(&mut self, params: &[T]) -> NetResult<()> {
        if params.len() != self.parameter_count {
            return Err(NetError::OutOfRange(format!(
                "expected {} parameters, got {}",
                self.parameter_count,
                params.len()
            )));
        }
        let n = self.neurons.len();
        let mut cursor = 0usize;
        for src in 0..n {
            for dst in 0..n {
                let tap_count = self.connections[[dst, src]].tap_count();
                for k in 0..tap_count {
                    self.connections[[dst, src]].set_weight(k, params[cursor])?;
                    cursor += 1;
                }
            }
        }
        for bias in &mut self.biases {
            *bias = params[cursor];
            cursor += 1;
        }
        Ok(())
    }
}

fn cycle_path(stack: &[usize], line: usize, repeated: usize) -> String {
    let mut path: Vec<usize> = stack.to_vec();
    path.push(line);
    path.push(repeated);
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl<T: Float + fmt::Display> fmt::Display for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<usize> = (0..self.neurons.len()).filter(|&i| self.neurons[i].is_input()).collect();
        let outputs: Vec<usize> = (0..self.neurons.len()).filter(|&i| self.neurons[i].is_output()).collect();

        writeln!(
            f,
            "{} Input Neuron{}: {}",
            inputs.len(),
            if inputs.len() == 1 { "" } else { "s" },
            inputs.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "{} Output Neuron{}: {}",
            outputs.len(),
            if outputs.len() == 1 { "" } else { "s" },
            outputs.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "Total Neurons: {}", self.neurons.len())?;
        writeln!(f, "Parameters: {}", self.parameter_count)?;
        for i in 0..self.neurons.len() {
            writeln!(f, "Bias {}: {}", i, self.biases[i])?;
        }
        for dst in 0..self.neurons.len() {
            for src in 0..self.neurons.len() {
                let line = &self.connections[[dst, src]];
                if line.is_connected() {
                    for tap in line.taps() {
                        writeln!(
                            f,
                            "Weight from {} to {} ({} delay): {}",
                            src, dst, tap.delay_index, tap.weight
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
