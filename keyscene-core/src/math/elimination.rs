/// Partial-pivot Gaussian elimination over fixed-size square arrays
use super::SINGULAR_TOLERANCE;

fn pivot_row<const N: usize>(rows: &[[f64; N]], column: usize) -> usize {
    let mut max = column;
    for row in column + 1..rows.len() {
        if rows[row][column].abs() > rows[max][column].abs() {
            max = row;
        }
    }
    max
}

/// Determinant by forward elimination; 0 when a pivot falls below tolerance
pub(crate) fn determinant<const N: usize>(mut rows: [[f64; N]; N]) -> f64 {
    let mut det = 1.0;

    for i in 0..N {
        let max = pivot_row(&rows, i);
        if max != i {
            rows.swap(i, max);
            det = -det;
        }

        if rows[i][i].abs() < SINGULAR_TOLERANCE {
            return 0.0;
        }

        for j in i + 1..N {
            let factor = rows[j][i] / rows[i][i];
            for k in i..N {
                rows[j][k] -= factor * rows[i][k];
            }
        }

        det *= rows[i][i];
    }

    det
}

/// Gauss-Jordan inverse on the augmented matrix `[M | I]`.
///
/// Returns `None` when the determinant is effectively zero.
pub(crate) fn inverse<const N: usize>(rows: [[f64; N]; N]) -> Option<[[f64; N]; N]> {
    if determinant(rows) == 0.0 {
        return None;
    }

    // Left half is the input, right half starts as the identity
    let mut left = rows;
    let mut right = [[0.0; N]; N];
    for (i, row) in right.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for i in 0..N {
        let max = pivot_row(&left, i);
        left.swap(i, max);
        right.swap(i, max);

        for j in i + 1..N {
            let factor = left[j][i] / left[i][i];
            for k in 0..N {
                left[j][k] -= factor * left[i][k];
                right[j][k] -= factor * right[i][k];
            }
        }
    }

    for i in (0..N).rev() {
        for j in (0..i).rev() {
            let factor = left[j][i] / left[i][i];
            for k in 0..N {
                left[j][k] -= factor * left[i][k];
                right[j][k] -= factor * right[i][k];
            }
        }
    }

    for i in 0..N {
        let pivot = left[i][i];
        for k in 0..N {
            left[i][k] /= pivot;
            right[i][k] /= pivot;
        }
    }

    Some(right)
}
