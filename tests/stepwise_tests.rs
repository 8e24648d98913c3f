use dyn_net_lm::graph::Graph;
use dyn_net_lm::train::{train_lm_stepwise, HeuristicOutputInit, NoopOutputInit, StepOptions};
use dyn_net_lm::Rng;
use ndarray::Array2;

fn linear_graph() -> Graph<f64> {
    let mut g = Graph::new(2);
    g.connect(0, 1, 1.0);
    g.declare_input(0);
    g.declare_output(1);
    g
}

#[test]
fn held_out_validation_selects_a_finite_best_score() {
    let mut g = linear_graph();
    let train_x: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let train_y: Vec<f64> = train_x.iter().map(|&x| 3.0 * x + 2.0).collect();
    let val_x: Vec<f64> = (12..16).map(|i| i as f64).collect();
    let val_y: Vec<f64> = val_x.iter().map(|&x| 3.0 * x + 2.0).collect();

    let u = Array2::from_shape_vec((train_x.len(), 1), train_x).unwrap();
    let y = Array2::from_shape_vec((train_y.len(), 1), train_y).unwrap();
    let uv = Array2::from_shape_vec((val_x.len(), 1), val_x).unwrap();
    let yv = Array2::from_shape_vec((val_y.len(), 1), val_y).unwrap();

    let mut opts = StepOptions::default();
    opts.max_iterations = 4;
    opts.random_samples_per_iteration = 5;
    opts.init_output_weights_special = true;
    opts.lm_opts.max_iterations = 50;

    let mut rng = Rng::from_seed(21);
    let report = train_lm_stepwise(&mut g, &u, &y, &uv, &yv, &opts, &HeuristicOutputInit, &mut rng).unwrap();

    assert!(report.best_score.is_finite());
    assert!(report.best_score >= 0.0);
    assert!(report.best_window <= 12);
}

#[test]
fn window_never_exceeds_available_samples() {
    let mut g = linear_graph();
    let u = Array2::from_shape_vec((5, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    let y = Array2::from_shape_vec((5, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();

    let mut opts = StepOptions::default();
    opts.max_iterations = 3;
    opts.init_weights_random = false;
    opts.lm_opts.max_iterations = 10;

    let mut rng = Rng::from_seed(2);
    let report = train_lm_stepwise(&mut g, &u, &y, &u, &y, &opts, &NoopOutputInit, &mut rng).unwrap();
    assert!(report.best_window <= 5);
}
