//! Binary operations on matrices.
//!
//! Every function checks the operand shapes and returns a new matrix carrying the
//! tolerance of the left operand.

use crate::{error::LinalgError, matrix::Matrix, Shape};

/// Add two matrices of the same shape.
///
/// # Arguments
///
/// * `lhs` - Left-hand side matrix.
/// * `rhs` - Right-hand side matrix.
///
/// # Returns
///
/// A new `Matrix` with the entry-wise sum.
pub fn add(lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError> {
    combine(lhs, rhs, |a, b| a + b).map_err(|e| rename(e, "add"))
}

/// Subtract two matrices of the same shape.
///
/// # Arguments
///
/// * `lhs` - Left-hand side matrix.
/// * `rhs` - Right-hand side matrix.
///
/// # Returns
///
/// A new `Matrix` with the entry-wise difference.
pub fn sub(lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError> {
    combine(lhs, rhs, |a, b| a - b).map_err(|e| rename(e, "sub"))
}

/// Apply `f` to every pair of corresponding entries.
///
/// This is a convenience function that delegates to [`Matrix::combine`].
pub fn combine(
    lhs: &Matrix,
    rhs: &Matrix,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Matrix, LinalgError> {
    lhs.combine(rhs, f)
}

/// Matrix product `lhs * rhs`.
///
/// # Errors
///
/// Fails with [`LinalgError::DimensionMismatch`] unless `lhs.cols() == rhs.rows()`.
///
/// # Example
///
/// ```
/// use warpgrid_linalg::{ops, Matrix};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
/// let x = Matrix::column(&[1.0, 1.0])?;
/// assert_eq!(ops::matmul(&a, &x)?.as_slice(), &[3.0, 7.0]);
/// # Ok::<(), warpgrid_linalg::LinalgError>(())
/// ```
pub fn matmul(lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError> {
    if lhs.cols() != rhs.rows() {
        return Err(LinalgError::DimensionMismatch {
            op: "matmul",
            expected: Shape::new(lhs.cols(), rhs.cols()),
            actual: rhs.shape(),
        });
    }

    let (m, k, n) = (lhs.rows(), lhs.cols(), rhs.cols());
    let (a, b) = (lhs.as_slice(), rhs.as_slice());
    let mut data = vec![0.0; m * n];
    for (i, out_row) in data.chunks_exact_mut(n).enumerate() {
        let a_row = &a[i * k..(i + 1) * k];
        for (j, out) in out_row.iter_mut().enumerate() {
            *out = a_row
                .iter()
                .enumerate()
                .map(|(p, &a_ip)| a_ip * b[p * n + j])
                .sum();
        }
    }

    Ok(Matrix::from_raw(Shape::new(m, n), data, lhs.tolerance()))
}

fn rename(err: LinalgError, op: &'static str) -> LinalgError {
    match err {
        LinalgError::DimensionMismatch {
            expected, actual, ..
        } => LinalgError::DimensionMismatch {
            op,
            expected,
            actual,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let b = Matrix::unit(2, 2)?;
        assert_eq!(add(&a, &b)?.as_slice(), &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sub(&a, &b)?.as_slice(), &[0.0, 1.0, 2.0, 3.0]);

        let c = Matrix::new(2, 3)?;
        assert_eq!(
            add(&a, &c),
            Err(LinalgError::DimensionMismatch {
                op: "add",
                expected: Shape::new(2, 2),
                actual: Shape::new(2, 3),
            })
        );
        assert!(matches!(
            sub(&a, &c),
            Err(LinalgError::DimensionMismatch { op: "sub", .. })
        ));
        Ok(())
    }

    #[test]
    fn sub_snaps_cancellation() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[0.1 + 0.2]])?;
        let b = Matrix::from_rows(&[[0.3]])?;
        assert_eq!(sub(&a, &b)?.as_slice(), &[0.0]);
        Ok(())
    }

    #[test]
    fn matmul_shapes() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let b = Matrix::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]])?;
        let c = matmul(&a, &b)?;
        assert_eq!(c.shape(), Shape::new(2, 2));
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);

        assert!(matches!(
            matmul(&a, &a),
            Err(LinalgError::DimensionMismatch { op: "matmul", .. })
        ));
        Ok(())
    }

    #[test]
    fn identity_is_neutral() -> Result<(), LinalgError> {
        let a = Matrix::from_fn(3, 3, |r, c| (r as f64) - 2.0 * (c as f64))?;
        let eye = Matrix::identity(3, 3)?;
        assert_eq!(matmul(&a, &eye)?, a);
        assert_eq!(matmul(&eye, &a)?, a);
        Ok(())
    }
}
