use dyn_net_lm::graph::Graph;
use dyn_net_lm::train::{train_lm, LMOptions};
use ndarray::Array2;

#[test]
fn lm_recovers_known_affine_mapping() {
    let mut g = Graph::<f64>::new(2);
    g.connect(0, 1, 1.0);
    g.declare_input(0);
    g.declare_output(1);
    g.set_bias(1, 0.0);

    // y = 2x - 1
    let xs: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * x - 1.0).collect();
    let u = Array2::from_shape_vec((xs.len(), 1), xs).unwrap();
    let y = Array2::from_shape_vec((ys.len(), 1), ys).unwrap();

    let opts = LMOptions::default();
    let report = train_lm(&mut g, &u, &y, &opts).unwrap();

    assert!(report.final_error < 1e-6);
    let w = g.connection_weight(0, 1, 0).unwrap();
    let b = g.bias(1);
    assert!((w - 2.0).abs() < 1e-3);
    assert!((b + 1.0).abs() < 1e-3);
}

#[test]
fn lm_never_makes_the_fit_worse() {
    let mut g = Graph::<f64>::new(2);
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
