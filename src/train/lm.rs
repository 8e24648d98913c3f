//! The damped Gauss-Newton inner loop: builds a numerical Jacobian, solves
//! the normal equations with a diagonal damping term, and accepts or
//! rejects the resulting step based on whether it actually reduces the
//! mean-squared error.

use crate::errors::NetResult;
use crate::linalg::LinearSolver;
use crate::system::TrainableSystem;
use crate::train::jacobian::JacobianBuilder;
use crate::train::options::LMOptions;
use ndarray::{Array1, Array2};
use num_traits::Float;
use std::collections::VecDeque;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq)]
pub struct LMReport<T> {
    pub iterations: usize,
    pub final_error: T,
    pub converged: bool,
}

/// Trains `system` in place against `inputs`/`targets`, starting from its
/// current parameters. Tracks the best parameters seen across the whole
/// run (`p*`/`E*`) separately from the current iterate, since a rejected
/// step never moves the current iterate but the loop still has to know
/// what to write back at the end.
///
/// Stops when the mean-squared error drops below `abs_tol`, when
/// `max_iterations` is reached, or when the largest adjacent change within
/// the last `rel_tol_horizon` errors drops below `rel_tol` (this last check
/// only engages once that many iterations have actually run, so a short
/// run can never trip it spuriously).
#[tracing::instrument(skip(system, inputs, targets, opts), name = "train_lm")]
pub fn train_lm<T, S>(
    system: &mut S,
    inputs: &Array2<T>,
    targets: &Array2<T>,
    opts: &LMOptions<T>,
) -> NetResult<LMReport<T>>
where
    T: Float + Send + Sync + std::fmt::Display,
    S: TrainableSystem<T> + Sync,
{
    let sample_count = T::from(inputs.nrows().max(1)).unwrap();
    let horizon = opts.rel_tol_horizon.max(1);

    let mut params = system.get_parameters();
    let mut lambda = T::one();
    let mut iterations = 0usize;
    let mut recompute = true;

    let mut hessian = Array2::<T>::zeros((params.len(), params.len()));
    let mut gradient = Array1::<T>::zeros(params.len());
    let mut current_error = T::zero();

    let mut best_params = params.clone();
    let mut best_error = T::infinity();

    let mut error_history: VecDeque<T> = VecDeque::with_capacity(horizon);
    let mut converged = false;

    loop {
        if recompute {
            system.set_parameters(&params)?;
            let (jacobian, residual) = JacobianBuilder::build(system, inputs, targets, opts.use_parallelization)?;
            hessian = jacobian.t().dot(&jacobian);
            // residual = target - y, so -J^T*residual is the descent
            // direction for mean-squared error in the model's parameters.
            gradient = -jacobian.t().dot(&residual);
            current_error = mean_squared(&residual, sample_count);
            if current_error < best_error {
                best_error = current_error;
                best_params = params.clone();
            }
        }

        if error_history.len() == horizon {
            error_history.pop_front();
        }
        error_history.push_back(current_error);

        let horizon_full = error_history.len() == horizon;
        let max_adjacent_change = if horizon_full {
            error_history
                .iter()
                .zip(error_history.iter().skip(1))
                .fold(T::zero(), |acc, (&a, &b)| acc.max((b - a).abs()))
        } else {
            T::infinity()
        };

        if current_error < opts.abs_tol || iterations >= opts.max_iterations || max_adjacent_change < opts.rel_tol {
            converged = current_error < opts.abs_tol || (horizon_full && max_adjacent_change < opts.rel_tol);
            break;
        }

        let mut damped = hessian.clone();
        for i in 0..damped.nrows() {
            damped[[i, i]] = damped[[i, i]] + lambda * hessian[[i, i]];
        }
        let delta = LinearSolver::solve(damped, gradient.clone())?;

        let mut trial_params = params.clone();
        for (p, d) in trial_params.iter_mut().zip(delta.iter()) {
            *p = *p + *d;
        }

        let mut trial_system = system.clone();
        trial_system.set_parameters(&trial_params)?;
        trial_system.clear_memory();
        let trial_predicted = trial_system.evaluate(inputs)?;
        let trial_residual = Array1::from_iter((targets - &trial_predicted).iter().copied());
        let trial_error = mean_squared(&trial_residual, sample_count);

        if trial_error.is_finite() && trial_error < current_error {
            params = trial_params;
            lambda = lambda / opts.lambda_dec_factor;
            recompute = true;
            if trial_error < best_error {
                best_error = trial_error;
                best_params = params.clone();
            }
            debug!(iteration = iterations, error = %trial_error, lambda = %lambda, "lm step accepted");
        } else {
            lambda = (lambda * opts.lambda_inc_factor).min(opts.max_lambda);
            recompute = false;
        }

        iterations += 1;
        if opts.display_iterations {
            info!(iteration = iterations, error = %current_error, lambda = %lambda, "lm iteration");
        }
    }

    system.set_parameters(&best_params)?;
    system.clear_memory();

    Ok(LMReport {
        iterations,
        final_error: best_error,
        converged,
    })
}

fn mean_squared<T: Float>(residual: &Array1<T>, sample_count: T) -> T {
    let sum_sq = residual.iter().fold(T::zero(), |acc, &v| acc + v * v);
    let mean = sum_sq / sample_count;
    if mean.is_finite() {
        mean
    } else {
        T::max_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use ndarray::Array2;

    #[test]
    fn lm_recovers_known_affine_mapping() {
        let mut g = Graph::new(2);
        g.connect(0, 1, 1.0);
        g.declare_input(0);
        g.declare_output(1);
        g.set_bias(1, 0.0);

        let xs: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * x - 1.0).collect();
        let u = Array2::from_shape_vec((xs.len(), 1), xs).unwrap();
        let y = Array2::from_shape_vec((ys.len(), 1), ys).unwrap();

        let opts = LMOptions::default();
        let report = train_lm(&mut g, &u, &y, &opts).unwrap();

        assert!(report.final_error < 1e-6);
    }

    #[test]
    fn lm_never_makes_the_fit_worse() {
        let mut g = Graph::new(2);
        g.connect(0, 1, 0.1);
        g.declare_input(0);
        g.declare_output(1);
        g.set_bias(1, 5.0);

        let u = Array2::from_shape_vec((6, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = Array2::from_shape_vec((6, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let initial_predicted = g.clone().evaluate(&u).unwrap();
        let initial_mse: f64 = (&initial_predicted - &y).iter().map(|v| v * v).sum::<f64>() / 6.0;

        let mut opts = LMOptions::default();
        opts.max_iterations = 30;
        let report = train_lm(&mut g, &u, &y, &opts).unwrap();

        assert!(report.final_error <= initial_mse);
    }

    #[test]
    fn lambda_respects_configured_ceiling() {
        let mut g = Graph::new(2);
        g.connect(0, 1, 1.0);
        g.declare_input(0);
        g.declare_output(1);

        let u = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();

        let mut opts = LMOptions::default();
        opts.max_lambda = 1.0;
        opts.max_iterations = 5;
        let report = train_lm(&mut g, &u, &y, &opts).unwrap();
        assert!(report.iterations <= 5);
    }
}
