use crate::{error::LinalgError, matrix::Matrix, tolerance::Tolerance, Shape};

/// LU factorization with partial pivoting.
///
/// For an `m x n` matrix `A` with `m >= n` this computes a unit lower triangular `L`
/// (`m x n`), an upper triangular `U` (`n x n`) and a row permutation `piv` so that
/// `A[piv, :] = L * U`. Both factors are packed into a single `m x n` buffer.
///
/// The factorization always exists, even for singular input; [`LuDecomposition::solve`]
/// is the operation that fails when a pivot falls below the tolerance.
///
/// # Example
///
/// ```
/// use warpgrid_linalg::{LuDecomposition, Matrix};
///
/// let a = Matrix::from_rows(&[[4.0, 3.0], [6.0, 3.0]])?;
/// let lu = LuDecomposition::new(&a)?;
/// assert_eq!(lu.pivot(), &[1, 0]);
/// assert!((lu.det()? + 6.0).abs() < 1e-12);
///
/// let x = lu.solve(&Matrix::column(&[10.0, 12.0])?)?;
/// assert!((x[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((x[(1, 0)] - 2.0).abs() < 1e-12);
/// # Ok::<(), warpgrid_linalg::LinalgError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Vec<f64>,
    shape: Shape,
    piv: Vec<usize>,
    pivot_sign: f64,
    tol: Tolerance,
}

impl LuDecomposition {
    /// Factorize `a` using the left-looking Crout/Doolittle scheme.
    ///
    /// For each column the previous eliminations are applied first, then the row with the
    /// largest magnitude in the working column is swapped into the pivot position, then the
    /// multipliers below the pivot are computed.
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
        let mut lu = a.as_slice().to_vec();
        let mut piv: Vec<usize> = (0..m).collect();
        let mut pivot_sign = 1.0;
        let mut col_j = vec![0.0; m];

        for j in 0..n {
            for (i, v) in col_j.iter_mut().enumerate() {
                *v = lu[i * n + j];
            }

            // apply previous transformations
            for i in 0..m {
                let kmax = i.min(j);
                let s: f64 = lu[i * n..i * n + kmax]
                    .iter()
                    .zip(&col_j[..kmax])
                    .map(|(a, b)| a * b)
                    .sum();
                col_j[i] -= s;
                lu[i * n + j] = col_j[i];
            }

            // find pivot and exchange if necessary
            let mut p = j;
            for i in j + 1..m {
                if col_j[i].abs() > col_j[p].abs() {
                    p = i;
                }
            }
            if p != j {
                for k in 0..n {
                    lu.swap(p * n + k, j * n + k);
                }
                piv.swap(p, j);
                pivot_sign = -pivot_sign;
            }

            // compute multipliers
            let pivot = lu[j * n + j];
            if pivot != 0.0 {
                for i in j + 1..m {
                    lu[i * n + j] /= pivot;
                }
            }
        }

        Ok(Self {
            lu,
            shape,
            piv,
            pivot_sign,
            tol: a.tolerance(),
        })
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.lu[row * self.shape.cols + col]
    }

    /// Shape of the factorized matrix.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Row permutation: row `i` of `L * U` is row `pivot()[i]` of the input.
    pub fn pivot(&self) -> &[usize] {
        &self.piv
    }

    /// `+1.0` or `-1.0` depending on the parity of the row swaps.
    pub fn pivot_sign(&self) -> f64 {
        self.pivot_sign
    }

    /// Whether every diagonal entry of `U` is at least the tolerance in magnitude.
    pub fn is_nonsingular(&self) -> bool {
        (0..self.shape.cols).all(|j| !self.tol.is_zero(self.at(j, j)))
    }

    /// The unit lower triangular factor.
    pub fn l(&self) -> Matrix {
        let (m, n) = (self.shape.rows, self.shape.cols.min(self.shape.rows));
        let data = (0..m)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| match i.cmp(&j) {
                std::cmp::Ordering::Greater => self.at(i, j),
                std::cmp::Ordering::Equal => 1.0,
                std::cmp::Ordering::Less => 0.0,
            })
            .collect();
        Matrix::from_raw(Shape::new(m, n), data, self.tol)
    }

    /// The upper triangular factor.
    pub fn u(&self) -> Matrix {
        let (m, n) = (self.shape.cols.min(self.shape.rows), self.shape.cols);
        let data = (0..m)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| if i <= j { self.at(i, j) } else { 0.0 })
            .collect();
        Matrix::from_raw(Shape::new(m, n), data, self.tol)
    }

    /// Determinant of the factorized matrix.
    ///
    /// The running product of the pivots is checked after every factor: as soon as its
    /// magnitude drops below the tolerance the determinant is reported as exactly zero,
    /// even if later pivots would have grown it back.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::NotSquare`] for rectangular input.
    pub fn det(&self) -> Result<f64, LinalgError> {
        if self.shape.rows != self.shape.cols {
            return Err(LinalgError::NotSquare(self.shape));
        }
        let mut d = self.pivot_sign;
        for j in 0..self.shape.cols {
            d *= self.at(j, j);
            if self.tol.is_zero(d) {
                return Ok(0.0);
            }
        }
        Ok(d)
    }

    /// Return `m` with its rows moved back to the order of the original input, i.e. undo
    /// the pivoting applied to `L * U`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::DimensionMismatch`] if `m` does not have one row per pivot.
    pub fn restore(&self, m: &Matrix) -> Result<Matrix, LinalgError> {
        if m.rows() != self.shape.rows {
            return Err(LinalgError::DimensionMismatch {
                op: "restore",
                expected: Shape::new(self.shape.rows, m.cols()),
                actual: m.shape(),
            });
        }
        let cols = m.cols();
        let mut data = vec![0.0; m.shape().numel()];
        for (i, row) in m.iter_rows().enumerate() {
            let dst = self.piv[i];
            data[dst * cols..(dst + 1) * cols].copy_from_slice(row);
        }
        Ok(Matrix::from_raw(m.shape(), data, m.tolerance()))
    }

    /// Solve `A * X = b` for the factorized square matrix `A`.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::NotSquare`] if the factorized matrix is rectangular.
    /// * [`LinalgError::DimensionMismatch`] if `b` does not have one row per equation.
    /// * [`LinalgError::Singular`] if [`LuDecomposition::is_nonsingular`] is false.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix, LinalgError> {
        let (m, n) = (self.shape.rows, self.shape.cols);
        if m != n {
            return Err(LinalgError::NotSquare(self.shape));
        }
        if b.rows() != m {
            return Err(LinalgError::DimensionMismatch {
                op: "lu_solve",
                expected: Shape::new(m, b.cols()),
                actual: b.shape(),
            });
        }
        if !self.is_nonsingular() {
            log::debug!("lu solve: {} matrix is singular", self.shape);
            return Err(LinalgError::Singular);
        }

        // copy right hand side with pivoting
        let nx = b.cols();
        let mut x = vec![0.0; m * nx];
        for (i, row) in x.chunks_exact_mut(nx).enumerate() {
            row.copy_from_slice(&b.as_slice()[self.piv[i] * nx..(self.piv[i] + 1) * nx]);
        }

        // solve L * Y = B[piv, :]
        for k in 0..n {
            for i in k + 1..n {
                let l_ik = self.at(i, k);
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * l_ik;
                }
            }
        }

        // solve U * X = Y
        for k in (0..n).rev() {
            let u_kk = self.at(k, k);
            for j in 0..nx {
                x[k * nx + j] /= u_kk;
            }
            for i in 0..k {
                let u_ik = self.at(i, k);
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * u_ik;
                }
            }
        }

        Ok(Matrix::from_raw(Shape::new(m, nx), x, self.tol))
    }

    /// Inverse of the factorized square matrix.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::NotSquare`] if the factorized matrix is rectangular.
    /// * [`LinalgError::Singular`] if [`LuDecomposition::is_nonsingular`] is false.
    pub fn inverse(&self) -> Result<Matrix, LinalgError> {
        let eye = Matrix::identity(self.shape.rows, self.shape.rows)?.with_tolerance(self.tol);
        self.solve(&eye)
    }
}
