//! Identifies a first-order low-pass filter with a two-neuron recurrent
//! graph: an input neuron feeding an output neuron that also holds a
//! one-step delayed feedback tap on its own output. Since the output
//! neuron's activation is the identity, the graph computes exactly
//! `y[n] = w_in * x[n] + w_fb * y[n-1] + b`, the same recurrence a
//! first-order IIR low-pass filter follows.

use dyn_net_lm::graph::{DelayLine, Graph};
use dyn_net_lm::rng::Rng;
use dyn_net_lm::signals::{amp_pseudo_random_binary_sequence, linspace, low_pass_filter};
use dyn_net_lm::train::{train_lm, LMOptions};
use ndarray::Array2;

fn build_recurrent_graph() -> Graph<f64> {
    let mut g = Graph::new(2);
    g.connect(0, 1, 1.0);
    g.connect_line(1, 1, DelayLine::single(1, 0.0));
    g.declare_input(0);
    g.declare_output(1);
    g
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let gain = 2.0;
    let time_constant = 3.0;
    let time = linspace(0.0, 399.0, 400);
    let input = amp_pseudo_random_binary_sequence(&time, 20, -1.0, 1.0)?;
    let target = low_pass_filter(&time, &input, gain, time_constant);

    let u = Array2::from_shape_vec((input.len(), 1), input.iter().copied().collect())?;
    let y = Array2::from_shape_vec((target.len(), 1), target.iter().copied().collect())?;

    let mut g = build_recurrent_graph();
    let mut rng = Rng::from_seed(42);
    g.init_random_uniform(&mut rng, -0.5, 0.5);

    let mut opts: LMOptions<f64> = LMOptions::default();
    opts.max_iterations = 150;
    opts.display_iterations = true;

    let report = train_lm(&mut g, &u, &y, &opts)?;
    println!("iterations: {}", report.iterations);
    println!("converged: {}", report.converged);
    println!("final error: {:.8}", report.final_error);
    println!("w_in = {:.4}", g.connection_weight(0, 1, 0)?);
    println!("w_fb = {:.4}", g.connection_weight(1, 1, 0)?);
    println!("bias = {:.4}", g.bias(1));

    Ok(())
}
