//! Trains a small feedforward graph (2 inputs, 2 hidden, 1 output) to
//! reproduce XOR, using the stepwise restart trainer.

use dyn_net_lm::graph::Graph;
use dyn_net_lm::rng::Rng;
use dyn_net_lm::train::{train_lm_stepwise_no_validation, HeuristicOutputInit, StepOptions};
use ndarray::Array2;

fn build_xor_graph() -> Graph<f64> {
    let mut g = Graph::new(5);
    g.connect(0, 2, 1.0);
    g.connect(0, 3, 1.0);
    g.connect(1, 2, 1.0);
    g.connect(1, 3, 1.0);
    g.connect(2, 4, 1.0);
    g.connect(3, 4, 1.0);
    g.declare_input(0);
    g.declare_input(1);
    g.declare_output(4);
    g
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let mut g = build_xor_graph();
    let mut rng = Rng::from_seed(1234);
    g.init_random_uniform(&mut rng, -1.0, 1.0);

    let inputs = Array2::from_shape_vec((4, 2), vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0])?;
    let targets = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 1.0, 0.0])?;

    let mut opts: StepOptions<f64> = StepOptions::default();
    opts.max_iterations = 20;
    opts.random_samples_per_iteration = 10;
    opts.init_output_weights_special = true;
    opts.lm_opts.max_iterations = 200;
    opts.lm_opts.display_iterations = true;

    let report = train_lm_stepwise_no_validation(&mut g, &inputs, &targets, &opts, &HeuristicOutputInit, &mut rng)?;

    println!("trials tried: {}", report.trials_tried);
    println!("best score: {:.6}", report.best_score);

    g.clear_internal_memory();
    let predicted = g.evaluate(&inputs)?;
    for row in 0..4 {
        println!(
            "{:.0} xor {:.0} = {:.4} (target {:.0})",
            inputs[[row, 0]],
            inputs[[row, 1]],
            predicted[[row, 0]],
            targets[[row, 0]]
        );
    }
    Ok(())
}
