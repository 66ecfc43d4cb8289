use crate::{error::LinalgError, matrix::Matrix, tolerance::Tolerance, Shape};

/// Householder QR factorization of an `m x n` matrix with `m >= n`.
///
/// Used by [`Matrix::solve`] to compute least-squares solutions of overdetermined systems.
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    qr: Vec<f64>,
    r_diag: Vec<f64>,
    shape: Shape,
    tol: Tolerance,
}

impl QrDecomposition {
    /// Factorize `a`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::Underdetermined`] if `a` has fewer rows than columns.
    pub fn new(a: &Matrix) -> Result<Self, LinalgError> {
        let shape = a.shape();
        if shape.rows < shape.cols {
            return Err(LinalgError::Underdetermined(shape));
        }

        let (m, n) = (shape.rows, shape.cols);
        let mut qr = a.as_slice().to_vec();
        let mut r_diag = vec![0.0; n];

        for k in 0..n {
            // 2-norm of the k-th column below the diagonal
            let mut nrm = (k..m).fold(0.0f64, |acc, i| acc.hypot(qr[i * n + k]));

            if nrm != 0.0 {
                if qr[k * n + k] < 0.0 {
                    nrm = -nrm;
                }
                for i in k..m {
                    qr[i * n + k] /= nrm;
                }
                qr[k * n + k] += 1.0;

                // apply the reflection to the remaining columns
                for j in k + 1..n {
                    let s: f64 = (k..m).map(|i| qr[i * n + k] * qr[i * n + j]).sum();
                    let s = -s / qr[k * n + k];
                    for i in k..m {
                        qr[i * n + j] += s * qr[i * n + k];
                    }
                }
            }
            r_diag[k] = -nrm;
        }

        Ok(Self {
            qr,
            r_diag,
            shape,
            tol: a.tolerance(),
        })
    }

    /// Whether `R` has no diagonal entry below the tolerance.
    pub fn is_full_rank(&self) -> bool {
        self.r_diag.iter().all(|&d| !self.tol.is_zero(d))
    }

    /// The upper triangular factor `R` (`n x n`).
    pub fn r(&self) -> Matrix {
        let n = self.shape.cols;
        let data = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| match i.cmp(&j) {
                std::cmp::Ordering::Less => self.qr[i * n + j],
                std::cmp::Ordering::Equal => self.r_diag[i],
                std::cmp::Ordering::Greater => 0.0,
            })
            .collect();
        Matrix::from_raw(Shape::new(n, n), data, self.tol)
    }

    /// Least-squares solution `X` minimizing `||A * X - b||`.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::DimensionMismatch`] if `b` does not have one row per equation.
    /// * [`LinalgError::RankDeficient`] if [`QrDecomposition::is_full_rank`] is false.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix, LinalgError> {
        let (m, n) = (self.shape.rows, self.shape.cols);
        if b.rows() != m {
            return Err(LinalgError::DimensionMismatch {
                op: "qr_solve",
                expected: Shape::new(m, b.cols()),
                actual: b.shape(),
            });
        }
        if !self.is_full_rank() {
            return Err(LinalgError::RankDeficient);
        }

        let nx = b.cols();
        let mut x = b.as_slice().to_vec();

        // compute Y = Q^T * b
        for k in 0..n {
            for j in 0..nx {
                let s: f64 = (k..m).map(|i| self.qr[i * n + k] * x[i * nx + j]).sum();
                let s = -s / self.qr[k * n + k];
                for i in k..m {
                    x[i * nx + j] += s * self.qr[i * n + k];
                }
            }
        }

        // solve R * X = Y
        for k in (0..n).rev() {
            for j in 0..nx {
                x[k * nx + j] /= self.r_diag[k];
            }
            for i in 0..k {
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * self.qr[i * n + k];
                }
            }
        }

        x.truncate(n * nx);
        Ok(Matrix::from_raw(Shape::new(n, nx), x, self.tol))
    }
}
