use dyn_net_lm::linalg::LinearSolver;
use dyn_net_lm::NetError;
use ndarray::{arr1, arr2, Array1, Array2};

#[test]
fn identity_system_returns_rhs_unchanged() {
    let a: Array2<f64> = Array2::eye(4);
    let b = arr1(&[1.0, 2.0, 3.0, 4.0]);
    let x = LinearSolver::solve(a, b.clone()).unwrap();
    assert_eq!(x, b);
}

#[test]
fn documented_two_by_two_scenario_matches_spec() {
    // A = [[2,1],[1,3]], b = [3,4] => x = [1,1].
    let a = arr2(&[[2.0, 1.0], [1.0, 3.0]]);
    let b = arr1(&[3.0, 4.0]);
    let x = LinearSolver::solve(a, b).unwrap();
    assert!((x[0] - 1.0).abs() < 1e-8);
    assert!((x[1] - 1.0).abs() < 1e-8);
}

#[test]
fn three_by_three_system_solves_correctly() {
    let a = arr2(&[[4.0, -2.0, 1.0], [1.0, 1.0, -3.0], [2.0, 3.0, 1.0]]);
    let b = arr1(&[9.0, -6.0, 11.0]);
    let x = LinearSolver::solve(a.clone(), b.clone()).unwrap();
    let reconstructed: Array1<f64> = a.dot(&x);
    for (got, want) in reconstructed.iter().zip(b.iter()) {
        assert!((got - want).abs() < 1e-8);
    }
}

#[test]
fn rank_deficient_system_reports_singular() {
    let a = arr2(&[[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]]);
    let b = arr1(&[1.0, 2.0, 1.0]);
    assert_eq!(LinearSolver::solve(a, b), Err(NetError::SingularSystem));
}
