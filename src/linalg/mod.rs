//! Dense linear algebra used by the Levenberg-Marquardt inner loop: a single
//! Gaussian elimination solver with partial pivoting.

use crate::errors::{NetError, NetResult};
use ndarray::{Array1, Array2};
use num_traits::Float;

/// Solves `a * x = b` for square `a`, by value, via Gaussian elimination
/// with partial pivoting and back-substitution. Both arguments are
/// consumed since elimination works in place on a copy.
pub struct LinearSolver;

impl LinearSolver {
    pub fn solve<T: Float>(mut a: Array2<T>, mut b: Array1<T>) -> NetResult<Array1<T>> {
        let n = a.nrows();
        if a.ncols() != n || b.len() != n {
            return Err(NetError::OutOfRange(
                "linear solver requires a square matrix matching the right-hand side length".to_string(),
            ));
        }

        for col in 0..n {
            let mut pivot_row = col;
            let mut pivot_value = a[[col, col]].abs();
            for row in (col + 1)..n {
                let candidate = a[[row, col]].abs();
                if candidate > pivot_value {
                    pivot_row = row;
                    pivot_value = candidate;
                }
            }

            if pivot_value <= T::epsilon() * T::from(10.0).unwrap() {
                return Err(NetError::SingularSystem);
            }

            if pivot_row != col {
                for k in 0..n {
                    a.swap((col, k), (pivot_row, k));
                }
                b.swap(col, pivot_row);
            }

            let pivot = a[[col, col]];
            for row in (col + 1)..n {
                let factor = a[[row, col]] / pivot;
                if factor == T::zero() {
                    continue;
                }
                for k in col..n {
                    let sub = a[[col, k]];
                    a[[row, k]] = a[[row, k]] - factor * sub;
                }
                b[row] = b[row] - factor * b[col];
            }
        }

        let mut x = Array1::<T>::zeros(n);
        for row in (0..n).rev() {
            let mut sum = b[row];
            for k in (row + 1)..n {
                sum = sum - a[[row, k]] * x[k];
            }
            x[row] = sum / a[[row, row]];
        }
        Ok(x)
    }
}
