use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Tuning knobs for a single Levenberg-Marquardt run. Field names and
/// defaults follow the reference implementation's options struct.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LMOptions<T> {
    /// Hard cap on inner iterations.
    pub max_iterations: usize,
    /// Length of the rolling error-history FIFO used for the relative
    /// convergence check.
    pub rel_tol_horizon: usize,
    /// Upper clamp on the damping factor.
    pub max_lambda: T,
    /// Convergence threshold on the largest adjacent change within the
    /// error-history FIFO.
    pub rel_tol: T,
    /// Convergence threshold on the mean-squared error itself.
    pub abs_tol: T,
    /// Multiplier applied to `lambda` on a rejected step.
    pub lambda_inc_factor: T,
    /// Divisor applied to `lambda` on an accepted step.
    pub lambda_dec_factor: T,
    pub display_iterations: bool,
    /// Whether the Jacobian's parameter columns are computed in parallel
    /// (subject to the `rayon` Cargo feature also being enabled).
    pub use_parallelization: bool,
}

impl<T: Float> Default for LMOptions<T> {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            rel_tol_horizon: 10,
            max_lambda: T::from(1e9).unwrap(),
            rel_tol: T::from(1e-6).unwrap(),
            abs_tol: T::from(1e-6).unwrap(),
            lambda_inc_factor: T::from(2.0).unwrap(),
            lambda_dec_factor: T::from(10.0).unwrap(),
            display_iterations: false,
            use_parallelization: true,
        }
    }
}

/// Tuning knobs for the outer restart/expanding-window trainer built on
/// top of a single LM run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StepOptions<T> {
    pub lm_opts: LMOptions<T>,
    pub display_iterations: bool,
    /// Whether each trial starts from a batch of random parameter draws
    /// (keeping the best) rather than the system's current parameters.
    pub init_weights_random: bool,
    /// Whether to additionally apply the heuristic output-neuron
    /// initialization after drawing random weights.
    pub init_output_weights_special: bool,
    /// Number of independent trials.
    pub max_iterations: usize,
    /// Candidate parameter draws sampled per trial before picking the best
    /// starting point.
    pub random_samples_per_iteration: usize,
    /// Fraction of the sample count used as the expanding-window step size.
    pub step_percentage: T,
    pub abs_tol: T,
    pub min_random: T,
    pub max_random: T,
}

impl<T: Float> Default for StepOptions<T> {
    fn default() -> Self {
        Self {
            lm_opts: LMOptions::default(),
            display_iterations: false,
            init_weights_random: true,
            init_output_weights_special: false,
            max_iterations: 100,
            random_samples_per_iteration: 10,
            step_percentage: T::from(0.5).unwrap(),
            abs_tol: T::from(1e-3).unwrap(),
            min_random: T::from(-0.5).unwrap(),
            max_random: T::from(0.5).unwrap(),
        }
    }
}
