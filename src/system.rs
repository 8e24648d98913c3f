//! Capability trait the training routines are written against.
//!
//! The reference implementation only ever trains `general_net`; splitting
//! the trainable surface out as a trait rather than hard-coding `Graph<T>`
//! keeps `train::lm`/`train::stepwise` reusable, and makes the numerical
//! Jacobian's need for independent deep copies explicit via `Clone`.

use crate::errors::NetResult;
use crate::graph::Graph;
use ndarray::Array2;
use num_traits::Float;

pub trait TrainableSystem<T: Float>: Clone {
    fn parameter_count(&self) -> usize;
    fn output_count(&self) -> usize;
    fn get_parameters(&self) -> Vec<T>;
    fn set_parameters(&mut self, params: &[T]) -> NetResult<()>;
    fn evaluate(&mut self, inputs: &Array2<T>) -> NetResult<Array2<T>>;
    fn clear_memory(&mut self);
}

impl<T: Float> TrainableSystem<T> for crate::graph::Graph<T> {
    fn parameter_count(&self) -> usize {
        Graph::parameter_count(self)
    }

    fn output_count(&self) -> usize {
        Graph::output_count(self)
    }

    fn get_parameters(&self) -> Vec<T> {
        Graph::get_parameters(self)
    }

    fn set_parameters(&mut self, params: &[T]) -> NetResult<()> {
        Graph::set_parameters(self, params)
    }

    fn evaluate(&mut self, inputs: &Array2<T>) -> NetResult<Array2<T>> {
        Graph::evaluate(self, inputs)
    }

    fn clear_memory(&mut self) {
        Graph::clear_internal_memory(self)
    }
}
