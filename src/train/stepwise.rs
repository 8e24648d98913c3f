//! Outer trial/expanding-window trainer built on top of a single LM run:
//! each trial picks a starting point, trains on a growing prefix of the
//! data, and is scored against a validation batch (or the training batch
//! itself, if none was supplied).

use crate::errors::NetResult;
use crate::graph::Graph;
use crate::rng::Rng;
use crate::system::TrainableSystem;
use crate::train::lm::train_lm;
use crate::train::options::StepOptions;
use ndarray::{s, Array2};
use num_traits::{Float, ToPrimitive};
use tracing::info;

/// Seeds output-adjacent parameters before a trial. Parameterized over the
/// system type `S` so a no-op implementation can apply to any
/// `TrainableSystem`, while the heuristic implementation — which needs to
/// inspect actual graph connectivity — is only ever implemented for
/// `Graph<T>`. Replaces the conditional-inheritance trick the reference
/// implementation used to pick between the two at compile time.
pub trait OutputInitializer<T: Float, S> {
    fn initialize(&self, system: &mut S, targets: &Array2<T>, rng: &mut Rng);
}

/// For each output-tagged neuron: takes the range of its column in the
/// desired-output matrix, draws a random count `r` in `[1, tap_count + 1]`
/// where `tap_count` is the number of taps across all *delayed* incoming
/// connections, and spreads `range / r` over the first `r` of those taps
/// (sources in ascending index, taps in ascending index within a source).
/// Instantaneous connections are never touched by this heuristic. Any
/// leftover share — when `r` exceeds the number of incoming taps — goes to
/// the neuron's bias instead.
pub struct HeuristicOutputInit;

impl<T: Float> OutputInitializer<T, Graph<T>> for HeuristicOutputInit {
    fn initialize(&self, system: &mut Graph<T>, targets: &Array2<T>, rng: &mut Rng) {
        let n = system.neuron_count();
        let mut output_col = 0usize;
        for dst in 0..n {
            if !system.neuron(dst).is_output() {
                continue;
            }
            let col = output_col;
            output_col += 1;
            if col >= targets.ncols() {
                continue;
            }

            let column = targets.column(col);
            let max = column.iter().cloned().fold(T::neg_infinity(), T::max);
            let min = column.iter().cloned().fold(T::infinity(), T::min);
            let range = max - min;

            let mut incoming_taps: Vec<(usize, usize)> = Vec::new();
            for src in 0..n {
                let line = &system.adjacency()[[dst, src]];
                if line.has_delays() {
                    for tap in 0..line.tap_count() {
                        incoming_taps.push((src, tap));
                    }
                }
            }

            let r = rng.uniform_usize(1, incoming_taps.len() + 1);
            let share = range / T::from(r).unwrap_or(T::one());
            let take = r.min(incoming_taps.len());
            for &(src, tap) in incoming_taps.iter().take(take) {
                let _ = system.set_connection_weight(src, dst, tap, share);
            }
            if r > incoming_taps.len() {
                system.set_bias(dst, share);
            }
        }
    }
}

/// Leaves whatever initialization the trial loop already applied untouched.
/// Usable with any `TrainableSystem`, since it never looks at connectivity.
pub struct NoopOutputInit;

impl<T: Float, S> OutputInitializer<T, S> for NoopOutputInit {
    fn initialize(&self, _system: &mut S, _targets: &Array2<T>, _rng: &mut Rng) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepwiseReport<T> {
    pub trials_tried: usize,
    pub best_window: usize,
    pub best_score: T,
}

/// Trains `system` against `inputs`/`targets`, scoring each trial against
/// `val_inputs`/`val_targets` (pass the same arrays twice for no real
/// holdout — see `train_lm_stepwise_no_validation`).
#[tracing::instrument(skip_all, name = "train_lm_stepwise")]
pub fn train_lm_stepwise<T, S, I>(
    system: &mut S,
    inputs: &Array2<T>,
    targets: &Array2<T>,
    val_inputs: &Array2<T>,
    val_targets: &Array2<T>,
    opts: &StepOptions<T>,
    init: &I,
    rng: &mut Rng,
) -> NetResult<StepwiseReport<T>>
where
    T: Float + Send + Sync + std::fmt::Display,
    S: TrainableSystem<T> + Sync,
    I: OutputInitializer<T, S>,
{
    let total_samples = inputs.nrows();
    let abandon_ceiling = T::max_value() / T::from(100.0).unwrap();
    let has_validation = val_inputs.nrows() > 0;

    let step_size = (T::from(total_samples).unwrap() * opts.step_percentage)
        .to_usize()
        .unwrap_or(total_samples)
        .min(total_samples)
        .max(1);

    let mut best_params: Option<Vec<T>> = None;
    let mut best_score = T::infinity();
    let mut longest_trial = 0usize;
    let mut last_trial_params = system.get_parameters();
    let mut trials_tried = 0usize;

    for trial in 0..opts.max_iterations {
        trials_tried += 1;
        let mut candidate = system.clone();
        candidate.clear_memory();

        if opts.init_weights_random {
            let param_count = candidate.parameter_count();
            let mut best_candidate_params: Option<Vec<T>> = None;
            let mut best_candidate_error = T::infinity();

            for _ in 0..opts.random_samples_per_iteration.max(1) {
                let draw: Vec<T> = (0..param_count).map(|_| rng.uniform(opts.min_random, opts.max_random)).collect();
                candidate.set_parameters(&draw)?;
                if opts.init_output_weights_special {
                    init.initialize(&mut candidate, targets, rng);
                }
                candidate.clear_memory();
                let untrained_error = mean_squared_error(&mut candidate, inputs, targets)?;
                if untrained_error < best_candidate_error {
                    best_candidate_error = untrained_error;
                    best_candidate_params = Some(candidate.get_parameters());
                }
            }

            if let Some(params) = best_candidate_params {
                candidate.set_parameters(&params)?;
            }
        }

        let mut trial_best_error = T::infinity();
        let mut trial_window = 0usize;
        let mut abandoned = false;

        let mut j = step_size;
        loop {
            let window_inputs = inputs.slice(s![0..j, ..]).to_owned();
            let window_targets = targets.slice(s![0..j, ..]).to_owned();

            let report = train_lm(&mut candidate, &window_inputs, &window_targets, &opts.lm_opts)?;

            if report.final_error > abandon_ceiling {
                abandoned = true;
                break;
            }

            if j >= total_samples {
                if report.final_error < trial_best_error {
                    trial_best_error = report.final_error;
                    trial_window = j;
                }
                break;
            }

            j = (j + step_size).min(total_samples);
        }

        if abandoned {
            last_trial_params = candidate.get_parameters();
            continue;
        }

        candidate.clear_memory();
        let score = if has_validation {
            trial_best_error + normalized_first_column_error(&mut candidate, val_inputs, val_targets)?
        } else {
            trial_best_error
        };

        last_trial_params = candidate.get_parameters();

        if opts.display_iterations {
            info!(trial, window = trial_window, score = %score, best = %best_score, "stepwise trial");
        }

        if score < best_score && trial_window >= longest_trial {
            best_score = score;
            best_params = Some(candidate.get_parameters());
            longest_trial = trial_window;
        }

        if best_score < opts.abs_tol {
            break;
        }
    }

    let final_params = best_params.unwrap_or(last_trial_params);
    system.set_parameters(&final_params)?;
    system.clear_memory();

    Ok(StepwiseReport {
        trials_tried,
        best_window: longest_trial,
        best_score,
    })
}

/// Trains without a held-out set: the training batch itself doubles as the
/// validation batch used to score trials.
pub fn train_lm_stepwise_no_validation<T, S, I>(
    system: &mut S,
    inputs: &Array2<T>,
    targets: &Array2<T>,
    opts: &StepOptions<T>,
    init: &I,
    rng: &mut Rng,
) -> NetResult<StepwiseReport<T>>
where
    T: Float + Send + Sync + std::fmt::Display,
    S: TrainableSystem<T> + Sync,
    I: OutputInitializer<T, S>,
{
    train_lm_stepwise(system, inputs, targets, inputs, targets, opts, init, rng)
}

fn mean_squared_error<T, S>(system: &mut S, inputs: &Array2<T>, targets: &Array2<T>) -> NetResult<T>
where
    T: Float,
    S: TrainableSystem<T>,
{
    let predicted = system.evaluate(inputs)?;
    let sum_sq = (&predicted - targets).iter().fold(T::zero(), |acc, &v| acc + v * v);
    let count = T::from(inputs.nrows().max(1)).unwrap();
    Ok(sum_sq / count)
}

/// Normalized squared error over the first output column only, divided by
/// `samples + 1` — the validation score term used when accepting a trial.
fn normalized_first_column_error<T, S>(system: &mut S, inputs: &Array2<T>, targets: &Array2<T>) -> NetResult<T>
where
    T: Float,
    S: TrainableSystem<T>,
{
    let predicted = system.evaluate(inputs)?;
    if predicted.ncols() == 0 {
        return Ok(T::zero());
    }
    let sum_sq = predicted
        .column(0)
        .iter()
        .zip(targets.column(0).iter())
        .fold(T::zero(), |acc, (&p, &t)| acc + (p - t) * (p - t));
    let count = T::from(inputs.nrows()).unwrap();
    Ok(sum_sq / (count + T::one()))
}
