//! Numerical Jacobian of the flattened residual vector with respect to the
//! parameter vector, via backward differences: each parameter is perturbed
//! downward by its optimal epsilon and the column is `(base - perturbed) /
//! epsilon`. Each column perturbs its own deep copy of the system, so
//! columns have no shared mutable state and can be computed in parallel.

use crate::errors::NetResult;
use crate::system::TrainableSystem;
use ndarray::{Array1, Array2};
use num_traits::Float;

pub struct JacobianBuilder;

impl JacobianBuilder {
    /// `use_parallelization` selects the column fan-out strategy; it has no
    /// effect when the `rayon` Cargo feature is disabled, in which case the
    /// sequential path is always used.
    pub fn build<T, S>(
        system: &S,
        inputs: &Array2<T>,
        targets: &Array2<T>,
        use_parallelization: bool,
    ) -> NetResult<(Array2<T>, Array1<T>)>
    where
        T: Float + Send + Sync,
        S: TrainableSystem<T> + Sync,
    {
        let params = system.get_parameters();
        let base_residual = residual(system.clone(), inputs, targets)?;
        let n_residuals = base_residual.len();

        let columns = if use_parallelization {
            Self::columns_parallel(system, &params, inputs, targets, &base_residual)?
        } else {
            Self::columns_sequential(system, &params, inputs, targets, &base_residual)?
        };

        let mut jacobian = Array2::<T>::zeros((n_residuals, params.len()));
        for (col_index, column) in columns.into_iter().enumerate() {
            jacobian.column_mut(col_index).assign(&column);
        }
        Ok((jacobian, base_residual))
    }

    #[cfg(feature = "rayon")]
    fn columns_parallel<T, S>(
        system: &S,
        params: &[T],
        inputs: &Array2<T>,
        targets: &Array2<T>,
        base_residual: &Array1<T>,
    ) -> NetResult<Vec<Array1<T>>>
    where
        T: Float + Send + Sync,
        S: TrainableSystem<T> + Sync,
    {
        use rayon::prelude::*;
        (0..params.len())
            .into_par_iter()
            .map(|i| jacobian_column(system, params, i, inputs, targets, base_residual))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn columns_parallel<T, S>(
        system: &S,
        params: &[T],
        inputs: &Array2<T>,
        targets: &Array2<T>,
        base_residual: &Array1<T>,
    ) -> NetResult<Vec<Array1<T>>>
    where
        T: Float,
        S: TrainableSystem<T>,
    {
        Self::columns_sequential(system, params, inputs, targets, base_residual)
    }

    fn columns_sequential<T, S>(
        system: &S,
        params: &[T],
        inputs: &Array2<T>,
        targets: &Array2<T>,
        base_residual: &Array1<T>,
    ) -> NetResult<Vec<Array1<T>>>
    where
        T: Float,
        S: TrainableSystem<T>,
    {
        (0..params.len())
            .map(|i| jacobian_column(system, params, i, inputs, targets, base_residual))
            .collect()
    }
}

fn jacobian_column<T, S>(
    system: &S,
    params: &[T],
    i: usize,
    inputs: &Array2<T>,
    targets: &Array2<T>,
    base_residual: &Array1<T>,
) -> NetResult<Array1<T>>
where
    T: Float,
    S: TrainableSystem<T>,
{
    let eps = step_size(params[i]);
    let mut perturbed_params = params.to_vec();
    perturbed_params[i] = perturbed_params[i] - eps;

    let mut perturbed = system.clone();
    perturbed.set_parameters(&perturbed_params)?;
    let perturbed_residual = residual(perturbed, inputs, targets)?;
    Ok((base_residual - &perturbed_residual) / eps)
}

fn step_size<T: Float>(value: T) -> T {
    value.abs().max(T::one()) * T::epsilon().sqrt()
}

fn residual<T, S>(mut system: S, inputs: &Array2<T>, targets: &Array2<T>) -> NetResult<Array1<T>>
where
    T: Float,
    S: TrainableSystem<T>,
{
    system.clear_memory();
    let predicted = system.evaluate(inputs)?;
    let diff = targets - &predicted;
    Ok(Array1::from_iter(diff.iter().copied()))
}
