//! Small dense linear-algebra helpers for the uncertainty engine.

use ndarray::Array2;

/// Determinant of a square matrix by partial-pivot LU elimination.
///
/// The Jacobians handled here are at most a few rows, so a dense
/// elimination is the whole story; a singular matrix yields 0.0 and the
/// caller decides what a near-zero determinant means.
pub fn determinant(matrix: &Array2<f64>) -> f64 {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols());
    if n == 0 {
        return 1.0;
    }

    let mut a = matrix.clone();
    let mut det = 1.0;

    for col in 0..n {
        // Pivot on the largest magnitude entry in this column.
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if a[[pivot, col]] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot, k]];
                a[[pivot, k]] = tmp;
            }
            det = -det;
        }

        det *= a[[col, col]];
        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
        }
    }

    det
}
