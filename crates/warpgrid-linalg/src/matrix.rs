use std::fmt;
use std::ops;

use rand::Rng;

use crate::{
    error::LinalgError,
    lu::LuDecomposition,
    qr::QrDecomposition,
    tolerance::Tolerance,
};

/// Matrix dimensions as `rows x cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Shape {
    /// Create a new shape.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of entries.
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl From<[usize; 2]> for Shape {
    fn from(shape: [usize; 2]) -> Self {
        Shape::new(shape[0], shape[1])
    }
}

/// Dense row-major matrix of `f64`.
///
/// Every entry whose magnitude falls below the matrix [`Tolerance`] is stored as exactly
/// zero, both on construction and after every operation producing a new matrix. Results
/// of unary operations keep the tolerance of their input; results of binary operations
/// keep the tolerance of the left operand.
///
/// # Example
///
/// ```
/// use warpgrid_linalg::{ops, Matrix};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0, 4.0], [8.0, 2.0, 1.0], [-2.0, 3.0, 0.0]])?;
/// let a_inv = a.inverse()?;
/// let eye = ops::matmul(&a_inv, &a)?;
/// assert!(ops::sub(&eye, &Matrix::identity(3, 3)?)?.max_abs() < 1e-12);
/// # Ok::<(), warpgrid_linalg::LinalgError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Matrix {
    shape: Shape,
    data: Vec<f64>,
    tol: Tolerance,
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

impl Matrix {
    // NOTE: callers guarantee data.len() == shape.numel() and a non-empty shape
    pub(crate) fn from_raw(shape: Shape, mut data: Vec<f64>, tol: Tolerance) -> Self {
        debug_assert_eq!(data.len(), shape.numel());
        data.iter_mut().for_each(|v| *v = tol.snap(*v));
        Self { shape, data, tol }
    }

    fn check_shape(shape: Shape) -> Result<(), LinalgError> {
        if shape.rows == 0 || shape.cols == 0 {
            return Err(LinalgError::EmptyMatrix);
        }
        Ok(())
    }

    /// Create a zero-filled matrix of the given size.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::EmptyMatrix`] if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::from_fn(rows, cols, |_, _| 0.0)
    }

    /// Create a matrix by evaluating `f(row, col)` for every entry.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, LinalgError> {
        let shape = Shape::new(rows, cols);
        Self::check_shape(shape)?;
        let data = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        Ok(Self::from_raw(shape, data, Tolerance::default()))
    }

    /// Copy a 2D array into a new matrix using the default tolerance.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::DimensionMismatch`] if the rows have different lengths and
    /// with [`LinalgError::EmptyMatrix`] if there are no rows or no columns.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, LinalgError> {
        Self::from_rows_with(rows, Tolerance::default())
    }

    /// Copy a 2D array into a new matrix with an explicit tolerance.
    pub fn from_rows_with<R: AsRef<[f64]>>(
        rows: &[R],
        tol: Tolerance,
    ) -> Result<Self, LinalgError> {
        let num_rows = rows.len();
        let num_cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let shape = Shape::new(num_rows, num_cols);
        Self::check_shape(shape)?;

        let mut data = Vec::with_capacity(shape.numel());
        for row in rows {
            let row = row.as_ref();
            if row.len() != num_cols {
                return Err(LinalgError::DimensionMismatch {
                    op: "from_rows",
                    expected: Shape::new(1, num_cols),
                    actual: Shape::new(1, row.len()),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self::from_raw(shape, data, tol))
    }

    /// Create an `n x 1` column vector.
    pub fn column(values: &[f64]) -> Result<Self, LinalgError> {
        let shape = Shape::new(values.len(), 1);
        Self::check_shape(shape)?;
        Ok(Self::from_raw(shape, values.to_vec(), Tolerance::default()))
    }

    /// The `rows x cols` identity matrix: ones on the main diagonal, zeros elsewhere.
    pub fn identity(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::from_fn(rows, cols, |r, c| if r == c { 1.0 } else { 0.0 })
    }

    /// The `rows x cols` matrix filled with ones.
    pub fn unit(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::from_fn(rows, cols, |_, _| 1.0)
    }

    /// A matrix of uniform random values in `[0, 1)` drawn from the thread-local generator.
    pub fn random(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::random_with(rows, cols, &mut rand::rng())
    }

    /// A matrix of uniform random values in `[0, 1)` drawn from `rng`.
    pub fn random_with<G: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        rng: &mut G,
    ) -> Result<Self, LinalgError> {
        Self::from_fn(rows, cols, |_, _| rng.random::<f64>())
    }

    /// Return the same matrix re-snapped under another tolerance.
    pub fn with_tolerance(self, tol: Tolerance) -> Self {
        Self::from_raw(self.shape, self.data, tol)
    }

    /// The tolerance carried by this matrix.
    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// The matrix dimensions.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether the matrix has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.shape.rows == self.shape.cols
    }

    /// The entry at `(row, col)`, or `None` if out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows() && col < self.cols() {
            Some(self.data[row * self.cols() + col])
        } else {
            None
        }
    }

    /// The entries of one row, or `None` if out of range.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let cols = self.cols();
        self.data.get(row * cols..(row + 1) * cols)
    }

    /// Iterate over the rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols())
    }

    /// The row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy the matrix out as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }

    /// Consume the matrix and return its row-major storage.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Copy the `rows x cols` block whose first entry is at `(from_row, from_col)`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::IndexOutOfRange`] if the block does not fit inside the
    /// matrix and with [`LinalgError::EmptyMatrix`] for an empty block.
    pub fn submatrix(
        &self,
        from_row: usize,
        from_col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Self, LinalgError> {
        let block = Shape::new(rows, cols);
        Self::check_shape(block)?;
        let fits = from_row
            .checked_add(rows)
            .is_some_and(|end| end <= self.rows())
            && from_col
                .checked_add(cols)
                .is_some_and(|end| end <= self.cols());
        if !fits {
            return Err(LinalgError::IndexOutOfRange {
                op: "submatrix",
                row: from_row,
                col: from_col,
                block,
                shape: self.shape,
            });
        }

        let data = (from_row..from_row + rows)
            .flat_map(|r| self.data[r * self.cols() + from_col..][..cols].iter().copied())
            .collect();
        Ok(Self::from_raw(block, data, self.tol))
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Self {
        let shape = Shape::new(self.cols(), self.rows());
        let data = (0..shape.rows)
            .flat_map(|r| (0..shape.cols).map(move |c| self[(c, r)]))
            .collect();
        Self::from_raw(shape, data, self.tol)
    }

    /// The matrix with every entry multiplied by `scalar`.
    pub fn scale(&self, scalar: f64) -> Self {
        self.map(|v| scalar * v)
    }

    /// Apply `f` to every entry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let data = self.data.iter().map(|&v| f(v)).collect();
        Self::from_raw(self.shape, data, self.tol)
    }

    /// Apply `f` to every pair of corresponding entries of `self` and `other`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::DimensionMismatch`] if the shapes differ.
    pub fn combine(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Result<Self, LinalgError> {
        if self.shape != other.shape {
            return Err(LinalgError::DimensionMismatch {
                op: "combine",
                expected: self.shape,
                actual: other.shape,
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_raw(self.shape, data, self.tol))
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> f64 {
        let t: f64 = (0..self.rows().min(self.cols()))
            .map(|i| self[(i, i)])
            .sum();
        self.tol.snap(t)
    }

    /// The main diagonal as a `min(rows, cols) x 1` column vector.
    pub fn diag_of(&self) -> Self {
        let n = self.rows().min(self.cols());
        let data = (0..n).map(|i| self[(i, i)]).collect();
        Self::from_raw(Shape::new(n, 1), data, self.tol)
    }

    /// Square diagonal matrix built from an `m x 1` column vector.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::NotColumnVector`] if the matrix has more than one column.
    pub fn diag(&self) -> Result<Self, LinalgError> {
        if self.cols() != 1 {
            return Err(LinalgError::NotColumnVector(self.shape));
        }
        let n = self.rows();
        let mut data = vec![0.0; n * n];
        for (i, &v) in self.data.iter().enumerate() {
            data[i * n + i] = v;
        }
        Ok(Self::from_raw(Shape::new(n, n), data, self.tol))
    }

    /// The largest entry.
    pub fn max(&self) -> f64 {
        let m = self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.tol.snap(m)
    }

    /// The smallest entry.
    pub fn min(&self) -> f64 {
        let m = self.data.iter().copied().fold(f64::INFINITY, f64::min);
        self.tol.snap(m)
    }

    /// The largest entry magnitude.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Determinant of a square matrix, computed through its LU factorization.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::NotSquare`] for rectangular input.
    pub fn det(&self) -> Result<f64, LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare(self.shape));
        }
        let det = LuDecomposition::new(self)?.det()?;
        Ok(self.tol.snap(det))
    }

    /// Inverse of a square matrix.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::NotSquare`] for rectangular input and with
    /// [`LinalgError::Singular`] if a pivot falls below the tolerance.
    pub fn inverse(&self) -> Result<Self, LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare(self.shape));
        }
        let eye = Self::identity(self.rows(), self.rows())?.with_tolerance(self.tol);
        self.solve(&eye)
    }

    /// Solve `self * X = rhs`.
    ///
    /// Square systems are solved exactly through a pivoted LU factorization. Systems with
    /// more rows than columns are solved in the least-squares sense through a Householder
    /// QR factorization.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::DimensionMismatch`] if `rhs` has a different number of rows.
    /// * [`LinalgError::Singular`] or [`LinalgError::RankDeficient`] for degenerate systems.
    /// * [`LinalgError::Underdetermined`] if there are fewer rows than columns.
    pub fn solve(&self, rhs: &Matrix) -> Result<Self, LinalgError> {
        use std::cmp::Ordering;
        match self.rows().cmp(&self.cols()) {
            Ordering::Equal => LuDecomposition::new(self)?.solve(rhs),
            Ordering::Greater => QrDecomposition::new(self)?.solve(rhs),
            Ordering::Less => Err(LinalgError::Underdetermined(self.shape)),
        }
    }

    /// Format the matrix with a fixed number of decimal places.
    ///
    /// ```
    /// use warpgrid_linalg::Matrix;
    ///
    /// let m = Matrix::from_rows(&[[1.0, -0.5], [0.3, 2.0]])?;
    /// assert_eq!(m.display(1).to_string(), "  1.0 -0.5\n  0.3  2.0\n");
    /// # Ok::<(), warpgrid_linalg::LinalgError>(())
    /// ```
    pub fn display(&self, precision: usize) -> MatrixDisplay<'_> {
        MatrixDisplay {
            matrix: self,
            precision,
        }
    }
}

impl ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows() && col < self.cols(),
            "index ({row}, {col}) out of range for a {} matrix",
            self.shape
        );
        &self.data[row * self.cols() + col]
    }
}

/// Helper returned by [`Matrix::display`].
pub struct MatrixDisplay<'a> {
    matrix: &'a Matrix,
    precision: usize,
}

impl fmt::Display for MatrixDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = self.precision;
        let cells: Vec<String> = self
            .matrix
            .data
            .iter()
            .map(|v| format!("{v:.p$}"))
            .collect();
        let width = cells.iter().map(|c| c.len()).max().unwrap_or(0);
        for row in cells.chunks_exact(self.matrix.cols()) {
            for cell in row {
                write!(f, " {cell:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.display(3).fmt(f)
    }
}
